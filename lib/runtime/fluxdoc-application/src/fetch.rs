use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use fluxdoc_domain::StoreError;
use fluxdoc_ports::StoreResult;

/// Per-call bound on store access: one timeout per fetch and one shared
/// cancellation signal for the whole diagnostic call.
#[derive(Debug, Clone)]
pub struct FetchScope {
    timeout: Duration,
    cancel: CancellationToken,
}

impl FetchScope {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Runs one store call. Cancelled scopes skip the call entirely.
    pub async fn run<T, F>(&self, action: &str, fetch: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        if self.cancel.is_cancelled() {
            debug!(action, "skipping fetch, call cancelled");
            return Err(StoreError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StoreError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, fetch) => {
                outcome.unwrap_or(Err(StoreError::Timeout))
            }
        };

        match &result {
            Err(StoreError::NotFound) => debug!(action, "not found"),
            Err(error) => warn!(action, %error, "fetch failed"),
            Ok(_) => {}
        }
        result
    }
}
