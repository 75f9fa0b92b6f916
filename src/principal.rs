//! Authenticated-principal adapter. Authentication itself happens upstream
//! (token gateway or reverse proxy); this module only translates the
//! forwarded identity headers into the policy-layer [`Principal`] carried
//! in request extensions. Requests without the headers simply carry no
//! principal and the authorization filter lets them pass.

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

pub const SUBJECT_HEADER: &str = "x-auth-subject";
pub const ROLES_HEADER: &str = "x-auth-roles";

/// Transport-layer authority prefix, stripped before policy matching.
pub const ROLE_PREFIX: &str = "ROLE_";

#[derive(Clone, Debug)]
pub struct Principal {
    pub subject: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(subject: String, authorities: impl IntoIterator<Item = String>) -> Self {
        let roles = authorities
            .into_iter()
            .map(|a| policy_role(a.trim()).to_string())
            .filter(|r| !r.is_empty())
            .collect();
        Self { subject, roles }
    }

    /// Parse the identity headers forwarded by the authentication layer.
    /// The roles header is a comma-separated authority list.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let subject = headers.get(SUBJECT_HEADER)?.to_str().ok()?.trim();
        if subject.is_empty() {
            return None;
        }
        let authorities = headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        Some(Self::new(subject.to_string(), authorities))
    }
}

/// "ROLE_ADMIN" and "ADMIN" both match policy subject "ADMIN".
pub fn policy_role(authority: &str) -> &str {
    authority.strip_prefix(ROLE_PREFIX).unwrap_or(authority)
}

/// Middleware attaching the [`Principal`] extension when identity headers
/// are present. Never rejects a request.
pub async fn attach_principal(mut req: Request, next: Next) -> Response {
    if let Some(principal) = Principal::from_headers(req.headers()) {
        req.extensions_mut().insert(principal);
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(subject: Option<&str>, roles: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(s) = subject {
            map.insert(SUBJECT_HEADER, HeaderValue::from_str(s).unwrap());
        }
        if let Some(r) = roles {
            map.insert(ROLES_HEADER, HeaderValue::from_str(r).unwrap());
        }
        map
    }

    #[test]
    fn test_policy_role_strips_transport_prefix() {
        assert_eq!(policy_role("ROLE_ADMIN"), "ADMIN");
        assert_eq!(policy_role("ADMIN"), "ADMIN");
        // Only a leading prefix is stripped
        assert_eq!(policy_role("CLIENT_ROLE_"), "CLIENT_ROLE_");
    }

    #[test]
    fn test_from_headers_parses_roles() {
        let p = Principal::from_headers(&headers(
            Some("user-42"),
            Some("ROLE_CLIENT, ROLE_COMPTABLE"),
        ))
        .unwrap();
        assert_eq!(p.subject, "user-42");
        assert_eq!(p.roles, vec!["CLIENT", "COMPTABLE"]);
    }

    #[test]
    fn test_from_headers_without_subject_is_anonymous() {
        assert!(Principal::from_headers(&headers(None, Some("ROLE_ADMIN"))).is_none());
        assert!(Principal::from_headers(&headers(Some("  "), Some("ROLE_ADMIN"))).is_none());
    }

    #[test]
    fn test_from_headers_without_roles_yields_empty_set() {
        let p = Principal::from_headers(&headers(Some("user-42"), None)).unwrap();
        assert!(p.roles.is_empty());

        let blank = Principal::from_headers(&headers(Some("user-42"), Some(" , ,"))).unwrap();
        assert!(blank.roles.is_empty());
    }
}
