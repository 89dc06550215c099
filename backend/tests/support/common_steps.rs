//! Steps shared by every HTTP behaviour suite.
//!
//! Signed-in accounts are named after their role, so `a signed-in educator`
//! creates and logs in the user `educator`.

use learning_backend::domain::Role;
use rstest_bdd_macros::{given, then};
use serde_json::Value;

use crate::api_world::{PASSWORD, WorldFixture};

#[given("a signed-in {role}")]
fn a_signed_in_user(world: &WorldFixture, role: String) {
    let parsed: Role = role.parse().expect("known role");
    world.seed_user(&role, parsed);
    world.sign_in(&role, PASSWORD);
    assert_eq!(world.last().status, 200, "{role} should sign in");
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    let last = world.last();
    assert_eq!(last.status, status, "unexpected body: {}", last.body);
}

#[then("the response is unauthorised with a trace id")]
fn the_response_is_unauthorised_with_a_trace_id(world: &WorldFixture) {
    let last = world.last();
    assert_eq!(last.status, 401);
    let trace_id = last.trace_id.expect("trace id header");
    assert_eq!(
        last.body.get("traceId").and_then(Value::as_str),
        Some(trace_id.as_str())
    );
    assert_eq!(
        last.body.get("code").and_then(Value::as_str),
        Some("unauthorized")
    );
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    let body = world.last().body;
    let reported = body
        .pointer("/details/code")
        .or_else(|| body.get("code"))
        .and_then(Value::as_str);
    assert_eq!(reported, Some(code.as_str()), "unexpected body: {body}");
}
