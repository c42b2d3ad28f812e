use axum::{
    body::Body,
    extract::FromRequestParts,
    http::Request,
};
use biodiversity_portal::{
    AppConfig, AppState, Decision, RedirectReason,
    auth::{CurrentSession, DEV_ROLES_HEADER},
    config::{DEFAULT_BIND_ADDR, Env, LOCAL_JWT_SECRET},
};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: [&str; 3] = ["APP_ENV", "SESSION_JWT_SECRET", "BIND_ADDR"];

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::remove_var("SESSION_JWT_SECRET");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic on a missing session secret"
    );
}

#[test]
#[serial]
fn test_app_config_production_reads_secret() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("SESSION_JWT_SECRET", "prod-secret");
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
            env::remove_var("SESSION_JWT_SECRET");
            env::remove_var("BIND_ADDR");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.jwt_secret, LOCAL_JWT_SECRET);
    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
}

#[test]
fn test_only_explicit_local_selects_local_env() {
    assert_eq!(Env::from_app_env(Some("local")), Env::Local);
    assert_eq!(Env::from_app_env(Some("LOCAL")), Env::Local);
    assert_eq!(Env::from_app_env(Some(" Local ")), Env::Local);

    for other in ["production", "Production", "prod", "staging", "dev", ""] {
        assert_eq!(
            Env::from_app_env(Some(other)),
            Env::Production,
            "APP_ENV={other:?} must not enable local mode"
        );
    }
    assert_eq!(Env::from_app_env(None), Env::Production);
}

#[test]
#[serial]
fn test_unknown_app_env_resolves_to_production() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "staging");
            env::set_var("SESSION_JWT_SECRET", "staging-secret");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "staging-secret");
}

#[test]
#[serial]
fn test_unset_app_env_requires_production_secret() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::remove_var("APP_ENV");
                env::remove_var("SESSION_JWT_SECRET");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "An unset APP_ENV is production and must not fall back to the local secret"
    );
}

#[tokio::test]
#[serial]
async fn test_dev_roles_header_ignored_when_env_is_unknown() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "Staging");
            env::set_var("SESSION_JWT_SECRET", "staging-secret");
        }
        AppConfig::load()
    });
    let app_state = AppState::new(config).unwrap();

    let request = Request::builder()
        .uri("/admin/dashboard")
        .header(DEV_ROLES_HEADER, "admin")
        .body(Body::empty())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert!(!session.is_authenticated());

    let decision = app_state.gate.resolve("/admin/dashboard", &session).unwrap();
    assert_eq!(
        decision,
        Decision::Redirect {
            to: "/auth/login".to_string(),
            reason: RedirectReason::Unauthenticated,
        }
    );
}
