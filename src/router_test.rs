use super::*;
use crate::test_helpers::{RecordingNavigator, fake_token};
use serde_json::json;

fn route_token(claims: serde_json::Value) -> (Destination, Vec<String>) {
    let router = RoleRouter::new(RecordingNavigator::default());
    let decoded = Claims::decode(&fake_token(&claims)).unwrap();
    let destination = router.route(&decoded);
    (destination, router.navigator().visits())
}

#[test]
fn admin_claim_routes_to_admin_dashboard() {
    let (destination, visits) = route_token(json!({ "type": "admin" }));
    assert_eq!(destination, Destination::AdminDashboard);
    assert_eq!(visits, vec!["/admin-dashboard"]);
}

#[test]
fn agent_claim_routes_to_agent_dashboard() {
    let (destination, visits) = route_token(json!({ "type": "agent" }));
    assert_eq!(destination, Destination::AgentDashboard);
    assert_eq!(visits, vec!["/agent-dashboard"]);
}

#[test]
fn missing_claim_routes_to_default_dashboard() {
    let (destination, visits) = route_token(json!({}));
    assert_eq!(destination, Destination::Dashboard);
    assert_eq!(visits, vec!["/dashboard"]);
}

#[test]
fn unknown_claim_routes_to_default_dashboard() {
    for kind in ["unknown", "Branch Manager", "superuser"] {
        let (destination, visits) = route_token(json!({ "type": kind }));
        assert_eq!(destination, Destination::Dashboard, "type {kind:?}");
        assert_eq!(visits, vec!["/dashboard"]);
    }
}

#[test]
fn server_capitalized_roles_are_recognized() {
    assert_eq!(route_token(json!({ "type": "Admin" })).0, Destination::AdminDashboard);
    assert_eq!(route_token(json!({ "type": "Agent" })).0, Destination::AgentDashboard);
}

#[test]
fn destination_display_is_path() {
    assert_eq!(Destination::AgentDashboard.to_string(), "/agent-dashboard");
    assert_eq!(Destination::for_role(Role::Default).path(), "/dashboard");
}
