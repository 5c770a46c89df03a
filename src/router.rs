//! Role-based landing-page dispatch.

use std::fmt;

use crate::claims::{Claims, Role};

/// Client-side navigation collaborator.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// The closed set of post-login landing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    AdminDashboard,
    AgentDashboard,
    Dashboard,
}

impl Destination {
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Agent => Self::AgentDashboard,
            Role::Default => Self::Dashboard,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::AdminDashboard => "/admin-dashboard",
            Self::AgentDashboard => "/agent-dashboard",
            Self::Dashboard => "/dashboard",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Sends the user to the landing page for the `type` claim.
pub struct RoleRouter<N> {
    navigator: N,
}

impl<N: Navigator> RoleRouter<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Navigate exactly once. Unknown or missing roles land on the default dashboard.
    pub fn route(&self, claims: &Claims) -> Destination {
        let destination = Destination::for_role(claims.role());
        tracing::debug!(%destination, role = ?claims.role(), "routing after login");
        self.navigator.navigate(destination.path());
        destination
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;
