//! Credential extraction from request headers.
//!
//! Clients have stored the access token in several shapes over time. The
//! extractor accepts all of them and treats anything unreadable as "no
//! credential" rather than an error.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde_json::Value;

/// Suffix shared by generically named auth cookies (`<prefix><project>-auth-token`).
pub const GENERIC_COOKIE_SUFFIX: &str = "-auth-token";

/// Marker for cookie values stored as base64-encoded JSON.
const BASE64_VALUE_PREFIX: &str = "base64-";

/// Which cookies may carry a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCookies {
    /// Exact cookie names, tried in order before any generic cookie.
    pub names: Vec<String>,
    /// Prefix of generically named cookies, e.g. `sb-` for `sb-<project>-auth-token`.
    pub generic_prefix: Option<String>,
}

impl Default for CredentialCookies {
    fn default() -> Self {
        Self {
            names: vec!["access_token".to_string(), "auth-token".to_string()],
            generic_prefix: Some("sb-".to_string()),
        }
    }
}

/// Split a `Cookie` header into `(name, value)` pairs, preserving order.
///
/// Fragments without `=` are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<(&str, &str)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().trim_matches('"')))
        })
        .collect()
}

/// Find the first decodable credential in a `Cookie` header.
///
/// Exact names are tried in configured order, then generically prefixed
/// cookies in header order. Chunked generic cookies (`name.0`, `name.1`, ...)
/// are joined before decoding.
///
/// # Examples
///
/// ```
/// use bulletin_core::auth::{extract_credential, CredentialCookies};
///
/// let cookies = CredentialCookies::default();
/// let header = r#"theme=dark; access_token={"access_token":"abc.def.ghi"}"#;
/// assert_eq!(extract_credential(header, &cookies), Some("abc.def.ghi".to_string()));
///
/// assert_eq!(extract_credential("theme=dark", &cookies), None);
/// ```
pub fn extract_credential(cookie_header: &str, cookies: &CredentialCookies) -> Option<String> {
    let pairs = parse_cookie_header(cookie_header);

    let named = cookies.names.iter().flat_map(|wanted| {
        pairs
            .iter()
            .filter(move |(name, _)| name == wanted)
            .map(|(_, value)| value.to_string())
    });

    let generic = cookies
        .generic_prefix
        .as_deref()
        .map(|prefix| generic_cookie_values(&pairs, prefix))
        .unwrap_or_default();

    named
        .chain(generic)
        .find_map(|value| decode_credential(&value))
}

/// Collect values of generically named cookies, joining chunked ones.
fn generic_cookie_values(pairs: &[(&str, &str)], prefix: &str) -> Vec<String> {
    let mut values = Vec::new();

    for (name, value) in pairs {
        if !name.starts_with(prefix) {
            continue;
        }
        if name.ends_with(GENERIC_COOKIE_SUFFIX) {
            values.push(value.to_string());
            continue;
        }
        // Only the first chunk starts a reassembly; later chunks are consumed by it.
        if let Some(base) = name.strip_suffix(".0") {
            if base.ends_with(GENERIC_COOKIE_SUFFIX) {
                values.push(join_chunks(pairs, base));
            }
        }
    }

    values
}

fn join_chunks(pairs: &[(&str, &str)], base: &str) -> String {
    let mut joined = String::new();
    for index in 0.. {
        let chunk_name = format!("{base}.{index}");
        match pairs.iter().find(|(name, _)| *name == chunk_name) {
            Some((_, value)) => joined.push_str(value),
            None => break,
        }
    }
    joined
}

/// Decode one stored credential value into a bare token.
///
/// Accepted shapes, after percent-decoding and optional `base64-` decoding:
/// an object with a string `access_token`, an object with a string `token`,
/// an array whose first element is a string, a JSON string, or a raw token.
pub fn decode_credential(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let decoded = decoded.trim();

    let payload = match decoded.strip_prefix(BASE64_VALUE_PREFIX) {
        Some(encoded) => decode_base64(encoded)?,
        None => decoded.to_string(),
    };

    match serde_json::from_str::<Value>(&payload) {
        Ok(Value::Object(map)) => ["access_token", "token"]
            .iter()
            .find_map(|field| non_empty(map.get(*field)?.as_str()?)),
        Ok(Value::Array(items)) => non_empty(items.first()?.as_str()?),
        Ok(Value::String(token)) => non_empty(&token),
        Ok(_) => None,
        Err(_) => plausible_raw_token(&payload),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn decode_base64(encoded: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .or_else(|_| STANDARD.decode(encoded))
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn plausible_raw_token(value: &str) -> Option<String> {
    let looks_structured = value.starts_with('{') || value.starts_with('[');
    let has_whitespace = value.chars().any(char::is_whitespace);
    if value.is_empty() || looks_structured || has_whitespace {
        return None;
    }
    Some(value.to_string())
}
