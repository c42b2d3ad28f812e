use std::env;

/// Fallback secret for local development and tests only.
pub const LOCAL_JWT_SECRET: &str = "local-development-session-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Runtime configuration of the navigation service, loaded once at startup and shared
/// read-only through the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the development session bypass and log format.
    pub env: Env,
    // Secret used to validate session tokens (HS256).
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Local enables the `x-dev-roles` session bypass and pretty logs; Production
/// requires every secret to be set explicitly. Local must be asked for by name.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    /// Only an explicit `local` (any case) selects `Env::Local`. Unset, misspelled or
    /// unknown values resolve to `Env::Production`, which keeps the development
    /// session bypass off.
    pub fn from_app_env(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("local") => Env::Local,
            _ => Env::Production,
        }
    }
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests, independent of the process environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (`APP_ENV`,
    /// `SESSION_JWT_SECRET`, `BIND_ADDR`).
    ///
    /// # Panics
    /// Panics in production when `SESSION_JWT_SECRET` is missing, so the service never
    /// starts validating tokens against a well-known secret.
    pub fn load() -> Self {
        let env = Env::from_app_env(env::var("APP_ENV").ok().as_deref());

        let jwt_secret = match env {
            Env::Production => env::var("SESSION_JWT_SECRET")
                .expect("FATAL: SESSION_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self {
            env,
            jwt_secret,
            bind_addr,
        }
    }
}
