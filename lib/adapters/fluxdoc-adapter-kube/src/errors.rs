use tracing::debug;

use fluxdoc_domain::StoreError;

/// Maps an API status code and message onto the store error taxonomy.
pub fn classify_api_failure(code: u16, message: &str) -> StoreError {
    match code {
        404 if StoreError::is_not_installed_message(message) => {
            StoreError::NotInstalled(message.to_string())
        }
        404 => StoreError::NotFound,
        403 => StoreError::Forbidden(message.to_string()),
        401 => StoreError::Unauthorized(message.to_string()),
        408 | 504 => StoreError::Timeout,
        _ => StoreError::classify(message),
    }
}

pub fn store_error(error: kube::Error) -> StoreError {
    match error {
        kube::Error::Api(response) => {
            debug!(code = response.code, reason = %response.reason, "api error");
            classify_api_failure(response.code, &response.message)
        }
        other => StoreError::classify(other.to_string()),
    }
}
