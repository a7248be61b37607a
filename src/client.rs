//! HTTP client for the remote move service.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tictactoe_session::{
    MoveError, MoveOutcome, MoveReply, MoveRequest, PendingMove, decode_failure, decode_success,
};
use tracing::{debug, info, instrument, warn};

/// Client-side bound on a single move exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Anything that can answer a pending move.
///
/// Implementations never retry; a failed exchange is reported once and the
/// session decides what to do with it.
#[async_trait]
pub trait MoveService: Send + Sync {
    /// Sends one move request and waits for its outcome.
    ///
    /// The outcome carries the epoch of `pending` regardless of success.
    async fn request_move(&self, pending: PendingMove) -> MoveOutcome;
}

/// Move service reached over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpMoveClient {
    /// Full URL of the move endpoint.
    endpoint: String,
    /// HTTP client.
    client: reqwest::Client,
    /// Bound on each exchange, including reading the body.
    timeout: Duration,
}

impl HttpMoveClient {
    /// Creates a client for `endpoint` with the default 2000 ms timeout.
    #[instrument(skip_all, fields(endpoint = %endpoint.as_ref()))]
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        info!("Creating move client");
        Self {
            endpoint: endpoint.as_ref().to_string(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the exchange timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The exchange timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Posts `request` and classifies the response.
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, timeout_ms = self.timeout.as_millis() as u64))]
    pub async fn exchange(&self, request: &MoveRequest) -> Result<MoveReply, MoveError> {
        debug!(?request, "Sending move request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(error = %e, "Move request timed out");
                } else {
                    warn!(error = %e, "Move request failed before a response");
                }
                MoveError::network(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, %status, "Failed to read response body");
            MoveError::network(format!("Failed to read response: {}", e))
        })?;
        debug!(%status, body = %body, "Received move response");

        if status.is_success() {
            decode_success(&body)
        } else {
            warn!(%status, "Move service returned an error status");
            Err(decode_failure(status.as_u16(), &body))
        }
    }
}

#[async_trait]
impl MoveService for HttpMoveClient {
    #[instrument(skip(self, pending), fields(epoch = %pending.epoch()))]
    async fn request_move(&self, pending: PendingMove) -> MoveOutcome {
        let result = self.exchange(pending.request()).await;
        match &result {
            Ok(reply) => info!(
                computer_move = ?reply.computer_move(),
                status = ?reply.status(),
                "Move exchange complete"
            ),
            Err(error) => warn!(%error, "Move exchange failed"),
        }
        MoveOutcome::new(*pending.epoch(), result)
    }
}
