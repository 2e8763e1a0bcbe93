use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::screening::{AiFallback, EvaluationConfig, DEFAULT_APPROVAL_THRESHOLD};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub evaluation: EvaluationConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let approval_threshold = match env::var("EVAL_DEFAULT_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => DEFAULT_APPROVAL_THRESHOLD,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            evaluation: EvaluationConfig { approval_threshold },
            ai: AiConfig::from_env()?,
        })
    }
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidThreshold(raw.to_string()))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold(raw.to_string()));
    }
    Ok(value)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Controls for the AI grading provider sitting behind the evaluator dispatch.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub fallback: AiFallback,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            timeout: Duration::from_millis(10_000),
            fallback: AiFallback::RuleBased,
        }
    }
}

impl AiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let enabled = env::var("AI_ENABLED")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.enabled);
        let provider = env::var("AI_PROVIDER").unwrap_or(defaults.provider);
        let model = env::var("AI_MODEL").unwrap_or(defaults.model);

        let max_tokens = match env::var("AI_MAX_TOKENS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidAiSetting("AI_MAX_TOKENS"))?,
            Err(_) => defaults.max_tokens,
        };

        let timeout = match env::var("AI_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => return Err(ConfigError::InvalidAiSetting("AI_TIMEOUT_MS")),
            },
            Err(_) => defaults.timeout,
        };

        let fallback = match env::var("AI_FALLBACK") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "rule" | "rules" | "fixed_rule" => AiFallback::RuleBased,
                "fail_closed" | "none" => AiFallback::FailClosed,
                _ => return Err(ConfigError::InvalidAiSetting("AI_FALLBACK")),
            },
            Err(_) => defaults.fallback,
        };

        Ok(Self {
            enabled,
            provider,
            model,
            max_tokens,
            timeout,
            fallback,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold(String),
    InvalidAiSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold(value) => write!(
                f,
                "EVAL_DEFAULT_THRESHOLD must be a number between 0 and 100 (found '{value}')"
            ),
            ConfigError::InvalidAiSetting(key) => write!(f, "{key} has an invalid value"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidThreshold(_)
            | ConfigError::InvalidAiSetting(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "EVAL_DEFAULT_THRESHOLD",
            "AI_ENABLED",
            "AI_PROVIDER",
            "AI_MODEL",
            "AI_MAX_TOKENS",
            "AI_TIMEOUT_MS",
            "AI_FALLBACK",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.evaluation.approval_threshold, 70.0);
        assert!(!config.ai.enabled);
        assert_eq!(config.ai.timeout, Duration::from_millis(10_000));
        assert_eq!(config.ai.fallback, AiFallback::RuleBased);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_threshold_and_ai_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EVAL_DEFAULT_THRESHOLD", "65.5");
        env::set_var("AI_ENABLED", "true");
        env::set_var("AI_TIMEOUT_MS", "2500");
        env::set_var("AI_FALLBACK", "fail_closed");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.evaluation.approval_threshold, 65.5);
        assert!(config.ai.enabled);
        assert_eq!(config.ai.timeout, Duration::from_millis(2500));
        assert_eq!(config.ai.fallback, AiFallback::FailClosed);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EVAL_DEFAULT_THRESHOLD", "140");
        match AppConfig::load() {
            Err(ConfigError::InvalidThreshold(value)) => assert_eq!(value, "140"),
            other => panic!("expected invalid threshold, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_zero_ai_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("AI_TIMEOUT_MS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidAiSetting("AI_TIMEOUT_MS"))
        ));
        reset_env();
    }
}
