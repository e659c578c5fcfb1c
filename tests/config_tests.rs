use maff_portal::{AppConfig, config::Env, pin::AccessPin};
use serial_test::serial;
use std::{env, panic};

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "ACCESS_PIN",
    "STRIPE_SECRET_KEY",
    "STRIPE_API_BASE",
    "SITE_URL",
    "BIND_ADDR",
    "ASSETS_DIR",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly `vars` set (every other config variable removed) and
/// restores the previous environment afterward, even if the test panics.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    unsafe {
        for (key, original) in originals {
            match original {
                Some(value) => env::set_var(key, value),
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
fn test_local_defaults() {
    let config = run_with_env(&[], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.access_pin, AccessPin::default());
    assert_eq!(config.stripe_secret_key, "sk_test_local");
    assert_eq!(config.stripe_api_base, "https://api.stripe.com");
    assert_eq!(config.site_url, "http://localhost:3000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.assets_dir, "assets");
}

#[test]
#[serial]
fn test_access_pin_override() {
    let config = run_with_env(&[("ACCESS_PIN", "0420")], AppConfig::load);
    assert!(config.access_pin.matches("0420"));
    assert!(!config.access_pin.matches("5555"));
}

#[test]
#[serial]
fn test_invalid_access_pin_fails_fast() {
    for bad in ["123", "12345", "abcd", ""] {
        let result = run_with_env(&[("ACCESS_PIN", bad)], || {
            panic::catch_unwind(AppConfig::load)
        });
        assert!(result.is_err(), "ACCESS_PIN={bad:?} should not load");
    }
}

#[test]
#[serial]
fn test_production_fail_fast_without_stripe_key() {
    let result = run_with_env(
        &[("APP_ENV", "production"), ("SITE_URL", "https://maff.example")],
        || panic::catch_unwind(AppConfig::load),
    );
    assert!(
        result.is_err(),
        "Production config loading should panic on a missing STRIPE_SECRET_KEY"
    );
}

#[test]
#[serial]
fn test_production_fail_fast_without_site_url() {
    let result = run_with_env(
        &[("APP_ENV", "production"), ("STRIPE_SECRET_KEY", "sk_live_x")],
        || panic::catch_unwind(AppConfig::load),
    );
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_production_loads_with_required_secrets() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("STRIPE_SECRET_KEY", "sk_live_x"),
            ("SITE_URL", "https://maff.example"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.stripe_secret_key, "sk_live_x");
    assert_eq!(config.site_url, "https://maff.example");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.access_pin, AccessPin::default());
}

#[test]
fn test_default_config_is_safe_for_tests() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert!(config.access_pin.matches("5555"));
}
