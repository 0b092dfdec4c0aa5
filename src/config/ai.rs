// src/config/ai.rs
use std::env;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_TEST_MODE: &str = "AI_TEST_MODE";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Offline oracle behaviours selectable through `AI_TEST_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// Deterministic canned responses, no network.
    Mock,
    /// Every call fails.
    Error,
}

impl TestMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    /// Blank keys are normalized to `None`.
    pub api_key: Option<String>,
    pub model: String,
    pub test_mode: Option<TestMode>,
}

impl AiConfig {
    pub fn from_env() -> Self {
        let api_key = env::var(ENV_API_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let model = env::var(ENV_MODEL)
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let test_mode = env::var(ENV_TEST_MODE).ok().and_then(|v| TestMode::parse(&v));
        Self {
            api_key,
            model,
            test_mode,
        }
    }

    /// Config with no credential; the service runs in demo mode.
    pub fn disabled() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            test_mode: None,
        }
    }

    /// True when some oracle (real or test double) can be built.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() || self.test_mode.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_is_case_insensitive() {
        assert_eq!(TestMode::parse("MOCK"), Some(TestMode::Mock));
        assert_eq!(TestMode::parse(" error "), Some(TestMode::Error));
        assert_eq!(TestMode::parse("daily-limit"), None);
    }

    #[serial_test::serial]
    #[test]
    fn blank_key_means_demo_mode() {
        env::set_var(ENV_API_KEY, "   ");
        env::remove_var(ENV_TEST_MODE);
        let cfg = AiConfig::from_env();
        assert!(cfg.api_key.is_none());
        assert!(!cfg.is_configured());
        assert_eq!(cfg.model, DEFAULT_MODEL);
        env::remove_var(ENV_API_KEY);
    }

    #[serial_test::serial]
    #[test]
    fn mock_mode_counts_as_configured() {
        env::remove_var(ENV_API_KEY);
        env::set_var(ENV_TEST_MODE, "mock");
        let cfg = AiConfig::from_env();
        assert!(cfg.is_configured());
        env::remove_var(ENV_TEST_MODE);
    }
}
