use fluxdoc_domain::StoreError;

pub const NOT_INSTALLED_GUIDANCE: &str = "FluxCD is not installed in this cluster. The required Custom Resource Definitions were not found.\n\nTo install FluxCD: https://fluxcd.io/flux/installation/";

/// Final text handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub text: String,
    pub is_error: bool,
}

impl DiagnosticReport {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// Primary-path failure. A missing Flux install is informational.
    pub fn from_store_error(action: &str, error: &StoreError) -> Self {
        match error {
            StoreError::NotInstalled(_) => Self::success(NOT_INSTALLED_GUIDANCE),
            StoreError::NotFound => Self::error(format!("Not found: {action}")),
            StoreError::Forbidden(_) => Self::error(format!(
                "Permission denied: {action}. Check RBAC permissions."
            )),
            StoreError::Unauthorized(_) => Self::error(format!(
                "Unauthorized: {action}. Check cluster credentials."
            )),
            StoreError::Timeout => Self::error(format!(
                "Timeout: {action}. The cluster may be unreachable."
            )),
            StoreError::Cancelled => Self::error(format!("Cancelled: {action}")),
            StoreError::Other(message) => Self::error(format!("Error {action}: {message}")),
        }
    }
}
