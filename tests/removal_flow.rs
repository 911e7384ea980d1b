use std::io::Cursor;

use bg_remover_lib::{
    AppConfig, AppError, AppState, NormalizationPolicy, UploadError, download_result,
    remove_background_file,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mockito::{Matcher, Server};

fn write_png(path: &std::path::Path, w: u32, h: u32) {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x * y) % 256) as u8])
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    std::fs::write(path, buf.into_inner()).unwrap();
}

fn state(endpoint: String, policy: NormalizationPolicy) -> AppState {
    AppState::new(AppConfig {
        endpoint,
        policy,
        ..AppConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn oversized_image_is_shrunk_uploaded_and_saved() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("portrait.png");
    write_png(&input, 200, 100);

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/remove-background")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"filename="portrait.png""#.into()),
            Matcher::Regex("(?i)content-type: image/jpeg".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_header("content-disposition", "attachment; filename=removed_bg.png")
        .with_body(b"cutout")
        .create_async()
        .await;

    let state = state(
        server.url(),
        NormalizationPolicy {
            size_threshold_bytes: 1,
            max_dimension_pixels: 64,
            ..NormalizationPolicy::default()
        },
    );

    let result = remove_background_file(&state, &input).await.unwrap();
    mock.assert_async().await;

    assert_eq!(result.bytes.as_ref(), b"cutout");
    assert_eq!(result.download_name, "removed_bg.png");
    assert_eq!(state.current_result().await, Some(result.clone()));

    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();
    let saved = download_result(&result, &out_dir).await.unwrap();
    assert_eq!(saved, out_dir.join("removed_bg.png"));
    assert_eq!(std::fs::read(saved).unwrap(), b"cutout");
}

#[tokio::test]
async fn corrupt_image_is_uploaded_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"definitely not a png, but big enough").unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/remove-background")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("(?i)content-type: image/png".into()),
            Matcher::Regex("definitely not a png".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(b"cutout")
        .create_async()
        .await;

    let state = state(
        server.url(),
        NormalizationPolicy {
            size_threshold_bytes: 1,
            ..NormalizationPolicy::default()
        },
    );

    let result = remove_background_file(&state, &input).await.unwrap();
    mock.assert_async().await;

    // No Content-Disposition: the configured default name is used
    assert_eq!(result.download_name, "removed_bg.png");
}

#[tokio::test]
async fn service_error_is_surfaced_and_nothing_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("small.png");
    write_png(&input, 16, 16);

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/remove-background")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Error processing image: model unavailable"}"#)
        .create_async()
        .await;

    let state = state(server.url(), NormalizationPolicy::default());
    let err = remove_background_file(&state, &input).await.unwrap_err();

    match err {
        AppError::Upload(UploadError::Service { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Error processing image: model unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(state.current_result().await.is_none());
}

#[tokio::test]
async fn oversized_selection_never_reaches_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("huge.jpg");
    std::fs::write(&input, vec![0u8; 2048]).unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/remove-background")
        .expect(0)
        .create_async()
        .await;

    let state = AppState::new(AppConfig {
        endpoint: server.url(),
        max_upload_bytes: 1024,
        ..AppConfig::default()
    })
    .unwrap();

    let err = remove_background_file(&state, &input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    mock.assert_async().await;
}
