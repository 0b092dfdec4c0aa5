// src/config/mod.rs
//! Process configuration, read once from the environment at startup.

pub mod ai;

use std::env;
use std::path::PathBuf;

use tracing::warn;

pub use ai::{AiConfig, TestMode};

pub const ENV_ENVIRONMENT: &str = "RAILWAY_ENVIRONMENT";
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";
pub const ENV_PORT: &str = "PORT";
pub const ENV_MODEL_PATH: &str = "MODEL_PATH";
pub const ENV_MODEL_RESET: &str = "MODEL_RESET_ON_START";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_MODEL_PATH: &str = "components/score_model.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    /// Allowed CORS origin in production; `None` or `*` means any.
    pub frontend_url: Option<String>,
    pub port: u16,
    pub model_path: PathBuf,
    pub reset_model_on_start: bool,
    pub debug_routes: bool,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            frontend_url: None,
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            reset_model_on_start: false,
            debug_routes: true,
            ai: AiConfig::disabled(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env::var(ENV_ENVIRONMENT)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let production = environment.eq_ignore_ascii_case("production");

        let port = match env::var(ENV_PORT) {
            Ok(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(%raw, "invalid PORT, falling back to {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let model_path = env::var(ENV_MODEL_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH));

        Self {
            frontend_url: env::var(ENV_FRONTEND_URL).ok().filter(|v| !v.trim().is_empty()),
            port,
            model_path,
            reset_model_on_start: env_flag(ENV_MODEL_RESET).unwrap_or(false),
            debug_routes: env_flag(ENV_DEBUG_ROUTES).unwrap_or(!production),
            ai: AiConfig::from_env(),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// `1`/`true`/`yes` → Some(true), `0`/`false`/`no` → Some(false), anything else → None.
fn env_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear() {
        for k in [
            ENV_ENVIRONMENT,
            ENV_FRONTEND_URL,
            ENV_PORT,
            ENV_MODEL_PATH,
            ENV_MODEL_RESET,
            ENV_DEBUG_ROUTES,
        ] {
            env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn defaults_without_env() {
        clear();
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.environment, "development");
        assert_eq!(cfg.port, 5050);
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(cfg.debug_routes);
        assert!(!cfg.reset_model_on_start);
        assert!(!cfg.is_production());
    }

    #[serial_test::serial]
    #[test]
    fn production_disables_debug_routes_and_keeps_bad_port_default() {
        clear();
        env::set_var(ENV_ENVIRONMENT, "production");
        env::set_var(ENV_PORT, "not-a-port");
        env::set_var(ENV_FRONTEND_URL, "https://app.example.com");
        let cfg = AppConfig::from_env();
        assert!(cfg.is_production());
        assert!(!cfg.debug_routes);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.frontend_url.as_deref(), Some("https://app.example.com"));
        clear();
    }
}
