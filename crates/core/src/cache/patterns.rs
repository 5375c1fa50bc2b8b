//! Key matching used by bulk invalidation.
//!
//! Keys are namespaced as `"<table>:<discriminators>"`. Table invalidation
//! matches on the namespace; pattern invalidation takes a glob where `*`
//! stands for any run of characters, including none.

/// Checks whether `key` belongs to the table `prefix`.
///
/// # Examples
///
/// ```
/// use bulletin_core::cache::table_matches;
///
/// assert!(table_matches("news", "news:featured:5"));
/// assert!(!table_matches("news", "newsletter:1"));
/// assert!(!table_matches("news", "news"));
/// ```
pub fn table_matches(prefix: &str, key: &str) -> bool {
    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Checks whether `key` matches the glob `pattern`.
///
/// Only `*` is special. Everything else, including `?` and `[`, matches
/// itself.
///
/// # Examples
///
/// ```
/// use bulletin_core::cache::pattern_matches;
///
/// assert!(pattern_matches("news:*", "news:latest:10"));
/// assert!(pattern_matches("*:featured:*", "news:featured:3"));
/// assert!(!pattern_matches("events:*", "news:latest:10"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key offset it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(&c) if c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    k = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
