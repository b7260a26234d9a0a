use std::env;

use crate::authorizer::{
    Authorizer, DEFAULT_ADMIN_LANDING, DEFAULT_LOGIN_PATH, DEFAULT_REGISTER_PATH,
    DEFAULT_USER_LANDING, LandingPaths,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_COOKIE: &str = "user";

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and pulled
/// into handlers and extractors via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and fail-fast checks.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Name of the cookie carrying the serialized session (the browser keeps it under `user`).
    pub session_cookie: String,
    // Where unauthenticated navigations to protected pages are sent.
    pub login_path: String,
    // Landing pages per role.
    pub admin_landing_path: String,
    pub user_landing_path: String,
}

/// Env
///
/// Defines the runtime context: developer-friendly defaults locally, explicit settings
/// in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// The local defaults, used for test setup without touching the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            admin_landing_path: DEFAULT_ADMIN_LANDING.to_string(),
            user_landing_path: DEFAULT_USER_LANDING.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics in production when `BIND_ADDR` is not set, so the service never comes up
    /// listening on an address nobody chose.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = match env {
            Env::Production => {
                env::var("BIND_ADDR").expect("FATAL: BIND_ADDR must be set in production.")
            }
            Env::Local => env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        };

        Self {
            env,
            bind_addr,
            session_cookie: var_or("SESSION_COOKIE", DEFAULT_SESSION_COOKIE),
            login_path: var_or("LOGIN_PATH", DEFAULT_LOGIN_PATH),
            admin_landing_path: var_or("ADMIN_LANDING_PATH", DEFAULT_ADMIN_LANDING),
            user_landing_path: var_or("USER_LANDING_PATH", DEFAULT_USER_LANDING),
        }
    }

    /// authorizer
    ///
    /// The navigation authorizer for the configured paths. The login page and the
    /// registration page are the guest-only entry points.
    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(
            self.login_path.as_str(),
            [self.login_path.as_str(), DEFAULT_REGISTER_PATH],
            LandingPaths::new(
                self.admin_landing_path.as_str(),
                self.user_landing_path.as_str(),
            ),
        )
    }
}

// Empty values count as unset.
fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
