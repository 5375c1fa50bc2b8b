//! Route classification for the identity guard.
//!
//! The guard only resolves identity for paths where `requires_auth` is set;
//! public reads never touch the session cache.

use std::str::FromStr;

use serde::Serialize;

/// Access requirements of a request path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteClass {
    pub requires_admin_role: bool,
    pub requires_sector_admin_role: bool,
    pub is_admin_api: bool,
    pub is_public_read_api: bool,
    pub requires_auth: bool,
}

/// Returns true if `path` is `prefix` itself or lies below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Classify a request path.
///
/// # Examples
///
/// ```
/// use bulletin_core::auth::classify_route;
///
/// let admin = classify_route("/api/admin/news");
/// assert!(admin.is_admin_api && admin.requires_auth);
///
/// let public = classify_route("/api/public/news");
/// assert!(public.is_public_read_api && !public.requires_auth);
/// ```
pub fn classify_route(path: &str) -> RouteClass {
    let requires_admin_role = under(path, "/admin");
    let requires_sector_admin_role = under(path, "/sector");
    let is_admin_api = under(path, "/api/admin");
    let is_public_read_api = under(path, "/api/public");
    let requires_identity = under(path, "/api/me") || under(path, "/account");

    RouteClass {
        requires_admin_role,
        requires_sector_admin_role,
        is_admin_api,
        is_public_read_api,
        requires_auth: requires_admin_role
            || requires_sector_admin_role
            || is_admin_api
            || requires_identity,
    }
}

/// Roles known to the guard. Anything unrecognised is an ordinary member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    SectorAdmin,
    Member(String),
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "admin" => Self::Admin,
            "sector_admin" => Self::SectorAdmin,
            other => Self::Member(other.to_string()),
        })
    }
}

impl Role {
    /// Whether this role may access a route of the given class.
    ///
    /// Admins pass every check. Sector admins pass sector routes only.
    pub fn satisfies(&self, class: &RouteClass) -> bool {
        match self {
            Self::Admin => true,
            Self::SectorAdmin => !class.requires_admin_role && !class.is_admin_api,
            Self::Member(_) => {
                !class.requires_admin_role
                    && !class.is_admin_api
                    && !class.requires_sector_admin_role
            }
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::SectorAdmin => write!(f, "sector_admin"),
            Self::Member(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(s: &str) -> Role {
        s.parse().unwrap()
    }

    #[test]
    fn test_admin_pages_require_admin_role() {
        let class = classify_route("/admin/dashboard");
        assert!(class.requires_admin_role);
        assert!(class.requires_auth);
        assert!(!class.is_admin_api);
        assert!(classify_route("/admin").requires_admin_role);
    }

    #[test]
    fn test_prefix_match_respects_segment_boundaries() {
        let class = classify_route("/administrators");
        assert!(!class.requires_admin_role);
        assert!(!class.requires_auth);
        assert!(!classify_route("/api/publicity").is_public_read_api);
    }

    #[test]
    fn test_sector_pages_require_sector_role() {
        let class = classify_route("/sector/north/news");
        assert!(class.requires_sector_admin_role);
        assert!(class.requires_auth);
    }

    #[test]
    fn test_admin_api_requires_auth() {
        let class = classify_route("/api/admin/cache/stats");
        assert!(class.is_admin_api);
        assert!(class.requires_auth);
        assert!(!class.is_public_read_api);
    }

    #[test]
    fn test_public_reads_do_not_require_auth() {
        let class = classify_route("/api/public/promotions");
        assert!(class.is_public_read_api);
        assert!(!class.requires_auth);
    }

    #[test]
    fn test_account_pages_require_identity_only() {
        for path in ["/api/me", "/account", "/account/settings"] {
            let class = classify_route(path);
            assert!(class.requires_auth, "path: {path}");
            assert!(!class.requires_admin_role);
            assert!(!class.requires_sector_admin_role);
        }
    }

    #[test]
    fn test_unclassified_paths_are_open() {
        assert_eq!(classify_route("/"), RouteClass::default());
        assert_eq!(classify_route("/livez"), RouteClass::default());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(role("admin"), Role::Admin);
        assert_eq!(role("sector_admin"), Role::SectorAdmin);
        assert_eq!(role("editor"), Role::Member("editor".to_string()));
        assert_eq!(role("editor").to_string(), "editor");
    }

    #[test]
    fn test_role_satisfaction() {
        let admin_api = classify_route("/api/admin/news");
        let sector = classify_route("/sector/north");
        let account = classify_route("/api/me");

        assert!(role("admin").satisfies(&admin_api));
        assert!(role("admin").satisfies(&sector));

        assert!(!role("sector_admin").satisfies(&admin_api));
        assert!(role("sector_admin").satisfies(&sector));
        assert!(role("sector_admin").satisfies(&account));

        assert!(!role("member").satisfies(&admin_api));
        assert!(!role("member").satisfies(&sector));
        assert!(role("member").satisfies(&account));
    }
}
