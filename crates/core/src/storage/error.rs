use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let error = RepositoryError::not_found("Promotion", 42);
        assert_eq!(
            error,
            RepositoryError::NotFound {
                entity_type: "Promotion",
                id: "42".to_string()
            }
        );
        assert_eq!(error.to_string(), "Promotion not found: 42");
    }

    #[test]
    fn test_clones_compare_equal() {
        // Cache waiters each receive a clone of the leader's error.
        let error = RepositoryError::ConnectionFailed("db down".to_string());
        let shared = vec![error.clone(), error.clone()];
        assert!(shared.iter().all(|e| *e == error));
        assert_eq!(error.to_string(), "Connection failed: db down");
    }
}
