//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::{Email, ProfileFields, Role, User, UserId, Username};

/// Clock frozen at a settable instant.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used across fixtures.
pub fn fixture_now() -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339("2026-03-02T10:00:00Z") {
        Ok(value) => value.with_timezone(&Utc),
        Err(error) => panic!("fixture timestamp: {error}"),
    }
}

/// Build a user with `role` and a username derived from it.
pub fn user_with_role(username: &str, role: Role) -> User {
    let now = fixture_now();
    let username = match Username::new(username) {
        Ok(value) => value,
        Err(error) => panic!("fixture username: {error}"),
    };
    let email = match Email::new(format!("{username}@example.org")) {
        Ok(value) => value,
        Err(error) => panic!("fixture email: {error}"),
    };
    User {
        id: UserId::random(),
        username,
        email,
        role,
        profile: ProfileFields::default(),
        is_email_verified: false,
        created_at: now,
        updated_at: now,
    }
}

/// An admin fixture.
pub fn admin() -> User {
    user_with_role("root", Role::Admin)
}

/// An educator fixture.
pub fn educator() -> User {
    user_with_role("tutor", Role::Educator)
}

/// A citizen fixture.
pub fn citizen() -> User {
    user_with_role("learner", Role::Citizen)
}
