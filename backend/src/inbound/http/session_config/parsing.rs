//! Value parsers for the session environment variables.
//!
//! Every parser applies one rule through [`tolerate`]: a debug build logs
//! the problem and continues with a default, a release build fails.

use actix_web::cookie::SameSite;
use actix_web::cookie::time::Duration;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError, TTL_ENV};

const FLAG_SPELLINGS: &str = "1|0|true|false|yes|no|y|n|on|off";
const SAMESITE_SPELLINGS: &str = "Strict|Lax|None";
pub(super) const DEFAULT_TTL_MINUTES: i64 = 120;

/// Continue with `fallback` in debug builds; surface `error` otherwise.
pub(super) fn tolerate<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "session setting ignored; continuing with default");
        Ok(fallback)
    } else {
        Err(error)
    }
}

/// Read an on/off flag named `name`.
pub(super) fn flag_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(raw) = env.string(name) else {
        return tolerate(mode, default, SessionConfigError::MissingEnv { name });
    };
    match parse_flag(&raw) {
        Some(flag) => Ok(flag),
        None => tolerate(
            mode,
            default,
            SessionConfigError::InvalidEnv {
                name,
                value: raw,
                expected: FLAG_SPELLINGS,
            },
        ),
    }
}

/// Read the `SameSite` policy. `None` is only accepted for secure cookies
/// in release builds.
pub(super) fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(raw) = env.string(SAMESITE_ENV) else {
        return tolerate(
            mode,
            fallback,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
        );
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => tolerate(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => tolerate(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: raw,
                expected: SAMESITE_SPELLINGS,
            },
        ),
    }
}

/// Read the cookie lifetime in minutes. Absence is fine in every build.
pub(super) fn ttl_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<Duration, SessionConfigError> {
    let fallback = Duration::minutes(DEFAULT_TTL_MINUTES);
    let Some(raw) = env.string(TTL_ENV) else {
        return Ok(fallback);
    };
    match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => Ok(Duration::minutes(minutes)),
        _ => tolerate(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: TTL_ENV,
                value: raw,
                expected: "a positive number of minutes",
            },
        ),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn env_returning(value: Option<&'static str>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .returning(move |_| value.map(str::to_owned));
        env
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("YES", Some(true))]
    #[case(" on ", Some(true))]
    #[case("n", Some(false))]
    #[case("Off", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn flag_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw), expected);
    }

    #[rstest]
    fn debug_builds_tolerate_bad_flags() {
        let env = env_returning(Some("sometimes"));
        let flag = flag_from_env(&env, BuildMode::Debug, "SESSION_COOKIE_SECURE", true)
            .expect("debug fallback");
        assert!(flag);
    }

    #[rstest]
    fn same_site_none_needs_secure_cookies_in_release() {
        let env = env_returning(Some("None"));
        let result = same_site_from_env(&env, BuildMode::Release, false);
        assert!(matches!(result, Err(SessionConfigError::InsecureSameSiteNone)));
    }

    #[rstest]
    #[case(BuildMode::Debug)]
    #[case(BuildMode::Release)]
    fn same_site_is_case_insensitive(#[case] mode: BuildMode) {
        let env = env_returning(Some("sTrIcT"));
        let parsed = same_site_from_env(&env, mode, true).expect("valid value");
        assert_eq!(parsed, SameSite::Strict);
    }

    #[rstest]
    fn missing_same_site_defaults_to_lax_in_debug() {
        let env = env_returning(None);
        let parsed = same_site_from_env(&env, BuildMode::Debug, true).expect("debug fallback");
        assert_eq!(parsed, SameSite::Lax);
    }
}
