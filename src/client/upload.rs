//! HTTP client for the remote background-removal service.

use std::time::Duration;
use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::ImageAsset;
use crate::utils::UploadError;

/// Path of the removal route on the service.
pub const REMOVE_BACKGROUND_PATH: &str = "/remove-background";
/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";
/// Name used when the service does not suggest one.
pub const DEFAULT_DOWNLOAD_NAME: &str = "removed_bg.png";

const DEFAULT_RESPONSE_MIME: &str = "image/png";

/// Image bytes handed back by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub bytes: Bytes,
    pub mime_type: String,
    /// Filename from `Content-Disposition`, if the service sent one
    pub file_name: Option<String>,
}

/// Error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

/// Client for a single-attempt upload to the removal service.
#[derive(Debug, Clone)]
pub struct RemovalClient {
    http: Client,
    endpoint: String,
}

impl RemovalClient {
    /// Builds a client posting to `{endpoint}/remove-background`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::InvalidRequest(format!("Error building HTTP client: {e}")))?;

        Ok(Self::with_client(http, endpoint))
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { http, endpoint }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.endpoint, REMOVE_BACKGROUND_PATH)
    }

    /// Uploads `asset` as multipart form data and returns the processed image.
    ///
    /// One attempt only. Non-success statuses surface the `error` field of
    /// the JSON payload when present.
    pub async fn remove_background(&self, asset: &ImageAsset) -> Result<ProcessedImage, UploadError> {
        let part = Part::bytes(asset.bytes().to_vec())
            .file_name(asset.name().to_string())
            .mime_str(asset.mime_type())
            .map_err(|e| UploadError::InvalidRequest(format!("Invalid MIME type: {e}")))?;
        let form = Form::new().part(FILE_FIELD, part);

        info!("Uploading '{}' ({} bytes) to {}", asset.name(), asset.size_bytes(), self.url());

        let response = self
            .http
            .post(self.url())
            .multipart(form)
            .send()
            .await?;

        read_response(response).await
    }
}

async fn read_response(response: Response) -> Result<ProcessedImage, UploadError> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = error_message(status, &body);
        warn!("Removal service returned {}: {}", status.as_u16(), message);
        return Err(UploadError::Service {
            status: status.as_u16(),
            message,
        });
    }

    if body.is_empty() {
        return Err(UploadError::EmptyResponse);
    }

    let mime_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_RESPONSE_MIME.to_string());

    let file_name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_filename);

    debug!("Received {} bytes ({})", body.len(), mime_type);

    Ok(ProcessedImage {
        bytes: body,
        mime_type,
        file_name,
    })
}

/// Picks a human-readable message out of a failed response.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorPayload>(body)
        .map(|p| p.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

/// Extracts `filename` from a `Content-Disposition` header value.
///
/// Only the plain `filename=` parameter is read, quoted or bare. Any
/// directory components are stripped; `.` and `..` are rejected.
pub fn disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (key, raw) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("filename") {
                return None;
            }
            let name = raw.trim().trim_matches('"');
            let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
            (!matches!(name, "" | "." | "..")).then(|| name.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn asset() -> ImageAsset {
        ImageAsset::new(b"fake-jpeg-bytes".to_vec(), "image/jpeg", "cat.jpg")
    }

    fn client(url: String) -> RemovalClient {
        RemovalClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_multipart_and_returns_image() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", REMOVE_BACKGROUND_PATH)
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="cat.jpg""#.into()),
                Matcher::Regex("fake-jpeg-bytes".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_header("content-disposition", "attachment; filename=removed_bg.png")
            .with_body(b"png-output")
            .create_async()
            .await;

        let out = client(server.url()).remove_background(&asset()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(out.bytes.as_ref(), b"png-output");
        assert_eq!(out.mime_type, "image/png");
        assert_eq!(out.file_name.as_deref(), Some("removed_bg.png"));
    }

    #[tokio::test]
    async fn json_error_payload_becomes_service_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", REMOVE_BACKGROUND_PATH)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "File too large. Maximum size: 5MB"}"#)
            .create_async()
            .await;

        let err = client(server.url()).remove_background(&asset()).await.unwrap_err();
        assert_eq!(
            err,
            UploadError::Service {
                status: 400,
                message: "File too large. Maximum size: 5MB".into(),
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_uses_status_reason() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", REMOVE_BACKGROUND_PATH)
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = client(server.url()).remove_background(&asset()).await.unwrap_err();
        assert_eq!(
            err,
            UploadError::Service { status: 502, message: "Bad Gateway".into() }
        );
    }

    #[tokio::test]
    async fn empty_success_body_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", REMOVE_BACKGROUND_PATH)
            .with_status(200)
            .create_async()
            .await;

        let err = client(server.url()).remove_background(&asset()).await.unwrap_err();
        assert_eq!(err, UploadError::EmptyResponse);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Port 9 (discard) is closed on any sane test host.
        let err = client("http://127.0.0.1:9".into())
            .remove_background(&asset())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_endpoint() {
        let c = client("http://localhost:5000/".into());
        assert_eq!(c.url(), "http://localhost:5000/remove-background");
    }

    #[test]
    fn content_disposition_filename_is_parsed() {
        assert_eq!(
            disposition_filename("attachment; filename=\"removed_bg.png\"").as_deref(),
            Some("removed_bg.png")
        );
        assert_eq!(
            disposition_filename("attachment; FILENAME=../../etc/out.png").as_deref(),
            Some("out.png")
        );
        assert_eq!(disposition_filename("inline"), None);
        assert_eq!(disposition_filename("attachment; filename=\"\""), None);
        assert_eq!(disposition_filename("attachment; filename=\"..\""), None);
        assert_eq!(disposition_filename("attachment; filename=."), None);
        assert_eq!(disposition_filename("attachment; filename=\"a/..\""), None);
    }
}
