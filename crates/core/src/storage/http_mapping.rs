//! Mapping of repository errors to HTTP status codes.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404
/// - `AlreadyExists` -> 409
/// - `ConnectionFailed` -> 503
/// - `InvalidData` -> 400
///
/// # Examples
///
/// ```
/// use bulletin_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::not_found("Event", "ev-1");
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::InvalidData(_) => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (RepositoryError::not_found("Promotion", "p"), 404),
            (
                RepositoryError::AlreadyExists {
                    entity_type: "Event",
                    id: "e".to_string(),
                },
                409,
            ),
            (RepositoryError::ConnectionFailed("down".into()), 503),
            (RepositoryError::InvalidData("limit".into()), 400),
        ];
        for (error, expected) in cases {
            assert_eq!(repository_error_to_status_code(&error), expected, "{error}");
        }
    }
}
