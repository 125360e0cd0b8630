use thiserror::Error;

/// Errors raised while sending relay messages to the widget frame.
///
/// Inbound problems are never errors; see `chattlin_widget::relay`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to encode '{tag}' message: {reason}")]
    Encode { tag: &'static str, reason: String },

    #[error("widget frame is not attached")]
    FrameMissing,

    #[error("post to widget frame failed: {0}")]
    Post(String),
}

/// Errors from repository operations (used by trait definitions in chattlin-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors talking to the release hub.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("hub request failed: {0}")]
    Request(String),

    #[error("hub returned status {0}")]
    Status(u16),

    #[error("invalid hub response: {0}")]
    InvalidResponse(String),
}

/// Errors that abort a version-check run.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to write to store: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors forwarding identity signals to the analytics service.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("analytics request failed: {0}")]
    Request(String),

    #[error("analytics service returned status {0}")]
    Status(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::Encode {
            tag: "set-user",
            reason: "bad map key".to_string(),
        };
        assert_eq!(err.to_string(), "failed to encode 'set-user' message: bad map key");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_job_error_wraps_store_failure() {
        let err: JobError = RepositoryError::Connection.into();
        assert_eq!(err.to_string(), "failed to write to store: database connection error");
    }

    #[test]
    fn test_hub_error_display() {
        assert_eq!(HubError::Status(503).to_string(), "hub returned status 503");
    }
}
