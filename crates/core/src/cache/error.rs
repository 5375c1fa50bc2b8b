use thiserror::Error;

/// Errors raised by the caches themselves.
///
/// Misses, staleness and backing-store failures are not errors at this
/// level: the first two are served from the cache and the last one is the
/// fetch function's own error, returned unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid cache capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_display() {
        let error = CacheError::InvalidCapacity(0);
        assert_eq!(
            error.to_string(),
            "Invalid cache capacity: 0 (must be greater than zero)"
        );
    }

    #[test]
    fn test_invalid_config_display() {
        let error = CacheError::InvalidConfig("sweep interval is zero".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid cache configuration: sweep interval is zero"
        );
    }
}
