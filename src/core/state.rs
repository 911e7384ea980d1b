//! Controller state shared by the command handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;
use crate::client::RemovalClient;
use crate::config::AppConfig;
use crate::core::RemovalResult;
use crate::utils::AppResult;

/// Identifier of one removal request. Later requests get larger ids.
pub type RequestId = u64;

/// Controller state.
///
/// Holds the config, the upload client, and the latest accepted result.
/// Only the most recent request's outcome is ever accepted; results of
/// requests overtaken by a newer selection are dropped.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    client: RemovalClient,
    latest_request: Arc<AtomicU64>,
    current: Arc<Mutex<Option<RemovalResult>>>,
}

impl AppState {
    /// Creates controller state and the HTTP client for `config`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let client = RemovalClient::new(config.endpoint.clone(), config.request_timeout())?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: AppConfig, client: RemovalClient) -> Self {
        debug!("Controller state ready (endpoint: {})", config.endpoint);
        Self {
            config: Arc::new(config),
            client,
            latest_request: Arc::new(AtomicU64::new(0)),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &RemovalClient {
        &self.client
    }

    /// Starts a new request, making every earlier one stale.
    pub fn begin_request(&self) -> RequestId {
        self.latest_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `id` is still the most recent request.
    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest_request.load(Ordering::SeqCst) == id
    }

    /// Stores `result` if its request is still current.
    ///
    /// Returns `false` and drops the result when a newer request exists.
    pub async fn accept(&self, result: RemovalResult) -> bool {
        let mut current = self.current.lock().await;
        if !self.is_current(result.request_id) {
            debug!("Discarding stale result of request {}", result.request_id);
            return false;
        }
        *current = Some(result);
        true
    }

    /// Latest accepted result, if any.
    pub async fn current_result(&self) -> Option<RemovalResult> {
        self.current.lock().await.clone()
    }

    /// Forgets the latest result, e.g. when the user clears the selection.
    pub async fn clear(&self) {
        self.current.lock().await.take();
    }
}
