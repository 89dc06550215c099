//! Behaviour tests for registration, sessions and role management.
//!
//! These scenarios confirm that registration never signs the caller in,
//! that session-protected endpoints answer with trace identifiers, and that
//! role changes take effect for an existing session.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Not every suite uses every helper of the shared world.
#[allow(dead_code)]
#[path = "support/api_world.rs"]
mod api_world;
#[allow(dead_code)]
#[path = "support/common_steps.rs"]
mod common_steps;

use actix_web::http::Method;
use api_world::WorldFixture;
use rstest::fixture;
use rstest_bdd_macros::{scenario, then, when};
use serde_json::{Value, json};

const REGISTERED_PASSWORD: &str = "ballot-box-2026";

#[fixture]
fn world() -> WorldFixture {
    api_world::world()
}

fn register(world: &WorldFixture, username: &str, role: Option<&str>) {
    world.send(
        None,
        Method::POST,
        "/api/v1/register",
        Some(json!({
            "username": username,
            "email": format!("{username}@example.org"),
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": role,
            "password": REGISTERED_PASSWORD,
            "passwordConfirmation": REGISTERED_PASSWORD
        })),
    );
}

#[when("a visitor registers as an {role} named {username}")]
fn a_visitor_registers_with_role(world: &WorldFixture, role: String, username: String) {
    register(world, &username, Some(&role));
}

#[when("a visitor registers the username {username}")]
fn a_visitor_registers(world: &WorldFixture, username: String) {
    register(world, &username, None);
}

#[when("the {username} signs in with the registered password")]
fn signs_in_with_the_registered_password(world: &WorldFixture, username: String) {
    world.sign_in(&username, REGISTERED_PASSWORD);
}

#[when("the {username} signs in with a wrong password")]
fn signs_in_with_a_wrong_password(world: &WorldFixture, username: String) {
    world.sign_in(&username, "not-the-password");
}

#[when("the {username} requests the current user")]
fn the_user_requests_the_current_user(world: &WorldFixture, username: String) {
    world.send(Some(&username), Method::GET, "/api/v1/me", None);
}

#[when("the {username} signs out")]
fn the_user_signs_out(world: &WorldFixture, username: String) {
    world.send(Some(&username), Method::POST, "/api/v1/logout", None);
    assert_eq!(world.last().status, 204);
}

#[when("the {admin} makes the {username} an {role}")]
fn the_admin_changes_a_role(world: &WorldFixture, admin: String, username: String, role: String) {
    let target = world.send(Some(&username), Method::GET, "/api/v1/me", None);
    let user_id = target["id"].as_str().expect("user id").to_owned();
    world.send(
        Some(&admin),
        Method::PUT,
        &format!("/api/v1/admin/users/{user_id}/role"),
        Some(json!({ "role": role })),
    );
}

#[then("the current user is {username} with role {role}")]
fn the_current_user_is(world: &WorldFixture, username: String, role: String) {
    let last = world.last();
    assert_eq!(last.status, 200, "me: {}", last.body);
    assert_eq!(
        last.body.get("username").and_then(Value::as_str),
        Some(username.as_str())
    );
    assert_eq!(
        last.body.get("role").and_then(Value::as_str),
        Some(role.as_str())
    );
    assert!(last.body.get("password").is_none());
}

#[then("the {username} dashboard is tagged {role}")]
fn the_dashboard_is_tagged(world: &WorldFixture, username: String, role: String) {
    let dashboard = world.send(Some(&username), Method::GET, "/api/v1/dashboard", None);
    assert_eq!(world.last().status, 200, "dashboard: {dashboard}");
    assert_eq!(dashboard["role"], role.as_str());
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Registering does not sign the user in"
)]
fn registering_does_not_sign_in(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Registered users can sign in"
)]
fn registered_users_can_sign_in(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Wrong passwords are rejected"
)]
fn wrong_passwords_are_rejected(world: WorldFixture) {
    drop(world);
}

#[scenario(path = "tests/features/accounts.feature", name = "Usernames are unique")]
fn usernames_are_unique(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Admins cannot be self-registered"
)]
fn admins_cannot_be_self_registered(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Educators can self-register"
)]
fn educators_can_self_register(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Admins promote citizens to educators"
)]
fn admins_promote_citizens(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/accounts.feature",
    name = "Signing out ends the session"
)]
fn signing_out_ends_the_session(world: WorldFixture) {
    drop(world);
}
