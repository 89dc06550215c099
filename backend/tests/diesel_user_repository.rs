//! Integration tests for `DieselUserRepository` against embedded PostgreSQL.

use learning_backend::domain::ports::{UserFilter, UserRepository, UserRepositoryError};
use learning_backend::domain::{Email, PasswordHash, Role};
use learning_backend::test_support::user_with_role;
use pagination::PageRequest;
use rstest::{fixture, rstest};

#[allow(dead_code)]
#[path = "support/pg_embed.rs"]
mod pg_embed;

#[allow(dead_code)]
#[path = "support/diesel_context.rs"]
mod diesel_context;

use diesel_context::DieselContext;

const TEST_DB: &str = "diesel_user_repo_test";

#[fixture]
fn context() -> Option<DieselContext> {
    DieselContext::provision(TEST_DB)
}

#[rstest]
#[case::username_any_case(None, Some("ALICE"), vec!["alice"])]
#[case::role_only(Some(Role::Educator), None, vec!["bob"])]
#[case::role_and_search(Some(Role::Citizen), Some("example"), vec!["alice", "carol"])]
fn listing_filters_by_role_and_search(
    context: Option<DieselContext>,
    #[case] role: Option<Role>,
    #[case] search: Option<&str>,
    #[case] expected: Vec<&str>,
) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: listing_filters_by_role_and_search skipped");
        return;
    };
    let repository = context.users();
    // Inserted out of order; listings sort by username.
    for (name, role) in [
        ("carol", Role::Citizen),
        ("bob", Role::Educator),
        ("alice", Role::Citizen),
    ] {
        let user = user_with_role(name, role);
        context
            .runtime
            .block_on(repository.insert(&user, &PasswordHash::from_stored("hash")))
            .expect("insert user");
    }

    let filter = UserFilter {
        role,
        search: search.map(str::to_owned),
    };
    let page = PageRequest::new(1, 20).expect("page");
    let listed = context
        .runtime
        .block_on(repository.list(&filter, page))
        .expect("list users");
    let names: Vec<&str> = listed
        .items
        .iter()
        .map(|user| user.username.as_ref())
        .collect();
    assert_eq!(names, expected);
}

#[rstest]
fn duplicate_usernames_conflict_and_credentials_load(context: Option<DieselContext>) {
    let Some(context) = context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_usernames_conflict_and_credentials_load skipped");
        return;
    };
    let repository = context.users();
    let runtime = &context.runtime;
    let user = context.seed_user("dana", Role::Citizen);

    let mut twin = user_with_role("dana", Role::Citizen);
    twin.email = Email::new("twin@example.org").expect("email");
    let error = runtime
        .block_on(repository.insert(&twin, &PasswordHash::from_stored("hash")))
        .expect_err("duplicate username");
    assert!(matches!(error, UserRepositoryError::Conflict { .. }));

    let stored = runtime
        .block_on(repository.find_credentials("dana"))
        .expect("query")
        .expect("credentials");
    assert_eq!(stored.user.id, user.id);
    assert!(stored.password_hash.as_str().starts_with("$argon2id$"));
    assert!(
        runtime
            .block_on(repository.find_credentials("nobody"))
            .expect("query")
            .is_none()
    );
    assert_eq!(runtime.block_on(repository.count()).expect("count"), 1);
}
