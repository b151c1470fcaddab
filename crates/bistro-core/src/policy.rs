//! # Access Policy
//!
//! Declarative table mapping each route to the access it requires.
//! The HTTP layer evaluates this table once per request instead of
//! wiring checks into individual handlers.
//!
//! Paths use the router's template syntax (`/menu/{id}`) and are matched
//! against the route template, never the concrete URI.

/// Where an owner-scoped route carries the owning email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Named path parameter
    Path(&'static str),
    /// Named query parameter
    Query(&'static str),
}

/// Requirement a route places on its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No credential needed
    Public,
    /// Any valid token
    Authenticated,
    /// Valid token whose email matches the owning email of the request.
    /// `denial` is the 403 message for a mismatch.
    Owner {
        param: ParamSource,
        denial: &'static str,
    },
    /// Valid token whose stored user has the admin role
    Admin,
}

impl Access {
    pub fn needs_token(&self) -> bool {
        !matches!(self, Access::Public)
    }
}

#[derive(Debug, Clone)]
struct RouteRule {
    method: &'static str,
    path: &'static str,
    access: Access,
}

/// Route → access table
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<RouteRule>,
    fallback: Access,
}

impl AccessPolicy {
    /// Empty table; unlisted routes require `fallback`
    pub fn new(fallback: Access) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Add a rule (builder pattern). A later rule for the same route wins.
    pub fn allow(mut self, method: &'static str, path: &'static str, access: Access) -> Self {
        self.rules.retain(|r| !(r.method == method && r.path == path));
        self.rules.push(RouteRule {
            method,
            path,
            access,
        });
        self
    }

    /// Access required for `method` on the route template `path`
    pub fn required(&self, method: &str, path: &str) -> Access {
        self.rules
            .iter()
            .find(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
            .map(|r| r.access)
            .unwrap_or(self.fallback)
    }

    /// Number of listed routes
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The Bistro route table. Unlisted routes are admin-only.
    pub fn bistro() -> Self {
        Self::new(Access::Admin)
            .allow("GET", "/", Access::Public)
            .allow("GET", "/health", Access::Public)
            // Issuance has its own credential check
            .allow("POST", "/jwt", Access::Public)
            // Users
            .allow("GET", "/users", Access::Authenticated)
            .allow("POST", "/users", Access::Public)
            .allow(
                "GET",
                "/users/admin-check/{email}",
                Access::Owner {
                    param: ParamSource::Path("email"),
                    denial: "access denied",
                },
            )
            .allow("PATCH", "/users/admin/{id}", Access::Admin)
            // Menu
            .allow("GET", "/menu", Access::Public)
            .allow("POST", "/menu", Access::Admin)
            .allow("DELETE", "/menu/{id}", Access::Admin)
            // Reviews
            .allow("GET", "/reviews", Access::Public)
            // Carts
            .allow("POST", "/carts", Access::Public)
            .allow(
                "GET",
                "/carts",
                Access::Owner {
                    param: ParamSource::Query("email"),
                    denial: "no access",
                },
            )
            .allow("DELETE", "/carts/{id}", Access::Public)
            // Payments
            .allow("POST", "/payments", Access::Authenticated)
            .allow("POST", "/create-payment-intent", Access::Authenticated)
            // Dashboard
            .allow("GET", "/admin-stats", Access::Admin)
            .allow("GET", "/order-stats", Access::Admin)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::bistro()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bistro_table() {
        let policy = AccessPolicy::bistro();
        assert_eq!(policy.required("GET", "/menu"), Access::Public);
        assert_eq!(policy.required("POST", "/menu"), Access::Admin);
        assert_eq!(policy.required("DELETE", "/menu/{id}"), Access::Admin);
        assert_eq!(policy.required("GET", "/users"), Access::Authenticated);
        assert_eq!(
            policy.required("GET", "/carts"),
            Access::Owner {
                param: ParamSource::Query("email"),
                denial: "no access",
            }
        );
        assert_eq!(
            policy.required("get", "/users/admin-check/{email}"),
            Access::Owner {
                param: ParamSource::Path("email"),
                denial: "access denied",
            }
        );
    }

    #[test]
    fn test_role_assignment_requires_admin() {
        let policy = AccessPolicy::bistro();
        assert_eq!(policy.required("PATCH", "/users/admin/{id}"), Access::Admin);
    }

    #[test]
    fn test_unlisted_routes_use_fallback() {
        let policy = AccessPolicy::bistro();
        assert_eq!(policy.required("PUT", "/menu/{id}"), Access::Admin);
        assert_eq!(
            AccessPolicy::new(Access::Authenticated).required("GET", "/anything"),
            Access::Authenticated
        );
    }

    #[test]
    fn test_later_rule_replaces_earlier() {
        let policy = AccessPolicy::new(Access::Admin)
            .allow("GET", "/menu", Access::Admin)
            .allow("GET", "/menu", Access::Public);
        assert_eq!(policy.len(), 1);
        assert_eq!(policy.required("GET", "/menu"), Access::Public);
        assert!(!Access::Public.needs_token());
        assert!(Access::Admin.needs_token());
    }
}
