//! Error types for the remote store and for sync operations.

/// Errors from a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            BackendError::Request(e) => e.status().map(|s| s.as_u16()),
            BackendError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors from a load, commit or batch submission.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: BackendError,
    },

    /// At least one create/delete failed. The remote may be partially
    /// mutated; the local working set is untouched.
    #[error("{failed} of {total} requests failed (first error: {first})")]
    Commit {
        failed: usize,
        total: usize,
        first: String,
    },

    #[error("no annotations to submit")]
    NothingToSubmit,

    /// The result belongs to an image that is no longer on screen.
    #[error("stale result discarded")]
    Stale,
}

impl SyncError {
    pub fn fetch(what: &'static str) -> impl FnOnce(BackendError) -> SyncError {
        move |source| SyncError::Fetch { what, source }
    }

    /// One human-readable line for the UI.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Fetch { what, .. } => format!("Failed to fetch {what}."),
            SyncError::Commit { failed, total, .. } => format!(
                "Failed to save annotations: {failed} of {total} requests failed."
            ),
            SyncError::NothingToSubmit => "No annotations to submit.".to_string(),
            SyncError::Stale => "The image changed before the result arrived.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_helpers() {
        let e = BackendError::Api {
            status: 404,
            body: "{\"detail\":\"Annotation not found\"}".into(),
        };
        assert!(e.is_not_found());
        assert_eq!(BackendError::Decode("x".into()).status(), None);
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            SyncError::NothingToSubmit.user_message(),
            "No annotations to submit."
        );
        let e = SyncError::Commit {
            failed: 2,
            total: 5,
            first: "API error (500): boom".into(),
        };
        assert_eq!(
            e.user_message(),
            "Failed to save annotations: 2 of 5 requests failed."
        );
        assert!(e.to_string().contains("boom"));

        let e = SyncError::fetch("tags")(BackendError::Decode("not json".into()));
        assert_eq!(e.user_message(), "Failed to fetch tags.");
    }
}
