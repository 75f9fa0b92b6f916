use axum::http::Method;

use crate::authz::types::{ACTION_READ, ACTION_WRITE};

/// Path prefix -> protected resource, in declaration order. Lookup is
/// first-match-wins, so ordering is semantically significant. Several
/// distinct endpoint families deliberately share one resource: sites and
/// per-society user management are administered as part of the `societes`
/// domain, and the stock endpoints fall under `ventes`.
const PATH_RESOURCES: &[(&str, &str)] = &[
    // Administrative endpoints
    ("/api/admin/societes", "societes"),
    ("/api/admin/societes/{id}/users", "societes"),
    ("/api/admin/sites", "societes"),
    ("/api/admin/utilisateurs", "utilisateurs"),
    ("/api/admin/demandes", "demandes"),
    ("/api/admin/enlevements", "enlevements"),
    ("/api/admin/planifications", "planifications"),
    ("/api/admin/comptabilite", "comptabilite"),
    ("/api/admin/ventes/stocks", "ventes"),
    ("/api/admin/ventes", "ventes"),
    ("/api/admin/documents", "documents"),
    ("/api/admin/policies", "policies"),
    // Client-facing endpoints
    ("/api/client/demandes", "demandes"),
    ("/api/client/enlevements", "enlevements"),
    ("/api/client/documents", "documents"),
    // API documentation
    ("/swagger-ui", "api-docs"),
    ("/v3/api-docs", "api-docs"),
];

/// Maps request paths to protected resource names and HTTP verbs to policy
/// actions. Built once at startup, read-only afterwards.
#[derive(Debug)]
pub struct ResourceResolver {
    table: Vec<(String, String)>,
}

impl ResourceResolver {
    pub fn new() -> Self {
        Self::from_table(
            PATH_RESOURCES
                .iter()
                .map(|(prefix, resource)| (prefix.to_string(), resource.to_string()))
                .collect(),
        )
    }

    /// Build from an explicit table, flagging ambiguous entries: overlapping
    /// prefixes that resolve to *different* resources are shadowed by the
    /// earlier entry and almost certainly a configuration mistake. Overlaps
    /// that share a resource are the intentional grouping and pass silently.
    pub fn from_table(table: Vec<(String, String)>) -> Self {
        for (i, (prefix_a, resource_a)) in table.iter().enumerate() {
            for (prefix_b, resource_b) in table.iter().skip(i + 1) {
                let overlap =
                    prefix_a.starts_with(prefix_b.as_str()) || prefix_b.starts_with(prefix_a.as_str());
                if overlap && resource_a != resource_b {
                    tracing::warn!(
                        first = %prefix_a,
                        second = %prefix_b,
                        "Overlapping path prefixes map to different resources; first match wins"
                    );
                }
            }
        }
        Self { table }
    }

    /// Resolve a request path to its protected resource. Iterates the table
    /// in declaration order and returns the first prefix match. `None` means
    /// the path is not protected and the filter lets the request through.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.table
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, resource)| resource.as_str())
    }

    /// GET reads, mutating verbs write, anything else falls back to read.
    pub fn action_for(method: &Method) -> &'static str {
        match *method {
            Method::GET => ACTION_READ,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE => ACTION_WRITE,
            _ => ACTION_READ,
        }
    }

    /// Distinct resource names in first-appearance order, used for seeding.
    pub fn resources(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for (_, resource) in &self.table {
            if !seen.contains(&resource.as_str()) {
                seen.push(resource.as_str());
            }
        }
        seen
    }
}

impl Default for ResourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let resolver = ResourceResolver::new();
        // Both /api/admin/societes and /api/admin/societes/{id}/users are
        // declared; the earlier, broader prefix answers for nested paths.
        assert_eq!(resolver.resolve("/api/admin/societes"), Some("societes"));
        assert_eq!(
            resolver.resolve("/api/admin/societes/42/users"),
            Some("societes")
        );
        assert_eq!(resolver.resolve("/api/admin/societes/42"), Some("societes"));
    }

    #[test]
    fn test_shared_resource_grouping() {
        let resolver = ResourceResolver::new();
        assert_eq!(resolver.resolve("/api/admin/sites/3"), Some("societes"));
        assert_eq!(
            resolver.resolve("/api/admin/ventes/stocks"),
            Some("ventes")
        );
        assert_eq!(resolver.resolve("/api/admin/ventes/18"), Some("ventes"));
    }

    #[test]
    fn test_client_and_docs_prefixes() {
        let resolver = ResourceResolver::new();
        assert_eq!(resolver.resolve("/api/client/demandes"), Some("demandes"));
        assert_eq!(
            resolver.resolve("/api/client/enlevements/9"),
            Some("enlevements")
        );
        assert_eq!(resolver.resolve("/swagger-ui/index.html"), Some("api-docs"));
        assert_eq!(resolver.resolve("/v3/api-docs/swagger-config"), Some("api-docs"));
    }

    #[test]
    fn test_unlisted_paths_are_unprotected() {
        let resolver = ResourceResolver::new();
        assert_eq!(resolver.resolve("/healthz"), None);
        assert_eq!(resolver.resolve("/actuator/health"), None);
        assert_eq!(resolver.resolve("/api/public/tarifs"), None);
    }

    #[test]
    fn test_declaration_order_decides_shadowed_entries() {
        // A narrower prefix declared after a broader one with a different
        // resource is shadowed; first match still wins.
        let resolver = ResourceResolver::from_table(vec![
            ("/api/admin/ventes".to_string(), "ventes".to_string()),
            ("/api/admin/ventes/rapports".to_string(), "rapports".to_string()),
        ]);
        assert_eq!(resolver.resolve("/api/admin/ventes/rapports"), Some("ventes"));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(ResourceResolver::action_for(&Method::GET), "read");
        assert_eq!(ResourceResolver::action_for(&Method::POST), "write");
        assert_eq!(ResourceResolver::action_for(&Method::PUT), "write");
        assert_eq!(ResourceResolver::action_for(&Method::PATCH), "write");
        assert_eq!(ResourceResolver::action_for(&Method::DELETE), "write");
        // Unlisted verbs fall back to read, not an error
        assert_eq!(ResourceResolver::action_for(&Method::OPTIONS), "read");
        assert_eq!(ResourceResolver::action_for(&Method::HEAD), "read");
    }

    #[test]
    fn test_resources_deduplicated() {
        let resolver = ResourceResolver::new();
        let resources = resolver.resources();
        assert_eq!(
            resources,
            vec![
                "societes",
                "utilisateurs",
                "demandes",
                "enlevements",
                "planifications",
                "comptabilite",
                "ventes",
                "documents",
                "policies",
                "api-docs",
            ]
        );
    }
}
