use thiserror::Error;

const NOT_INSTALLED_MARKERS: [&str; 3] = [
    "no matches for kind",
    "no kind is registered",
    "the server could not find the requested resource",
];

/// Failure of a single resource-store, event-store or pod-store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    NotInstalled(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Wraps a free-form failure, recognising a missing CRD by its message.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if Self::is_not_installed_message(&message) {
            Self::NotInstalled(message)
        } else {
            Self::Other(message)
        }
    }

    pub fn is_not_installed_message(message: &str) -> bool {
        NOT_INSTALLED_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource kind: {0}")]
pub struct UnknownKind(pub String);
