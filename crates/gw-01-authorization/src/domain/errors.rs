//! Authorization error types.
//!
//! Absence of a record is never an error here; these cover the repository
//! collaborators only.

use thiserror::Error;

/// Failure reported by a repository collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error.
    #[error("Repository query failed: {0}")]
    Query(String),
}

/// Failure of a cache reload. The cache is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReloadError {
    #[error("Sensor repository failed: {0}")]
    Sensors(#[source] RepositoryError),

    #[error("User repository failed: {0}")]
    Users(#[source] RepositoryError),

    #[error("API key repository failed: {0}")]
    Keys(#[source] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_error_names_repository() {
        let err = ReloadError::Users(RepositoryError::Unavailable("timeout".into()));
        let text = err.to_string();
        assert!(text.contains("User repository"));
        assert!(text.contains("timeout"));
    }
}
