use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::lending::PolicyConfig;

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
    pub models: ModelConfig,
    pub policy: PolicyConfig,
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
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        let models = ModelConfig {
            regressor_path: env::var("LOAN_REGRESSOR_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_REGRESSOR_PATH)),
            classifier_path: env::var("LOAN_CLASSIFIER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CLASSIFIER_PATH)),
        };

        let mut policy = PolicyConfig::default();
        if let Ok(raw) = env::var("LOAN_INCLUDE_MODEL_METRICS") {
            policy.include_model_metrics = parse_flag("LOAN_INCLUDE_MODEL_METRICS", &raw)?;
        }
        if let Ok(raw) = env::var("LOAN_MAX_TENURE_MONTHS") {
            policy.max_tenure_months = parse_months("LOAN_MAX_TENURE_MONTHS", &raw)?;
        }
        if let Ok(raw) = env::var("LOAN_FEASIBILITY_TENURE_MONTHS") {
            policy.feasibility_tenure_months =
                parse_months("LOAN_FEASIBILITY_TENURE_MONTHS", &raw)?;
        }
        if policy.feasibility_tenure_months > policy.max_tenure_months {
            return Err(ConfigError::TenureAboveLimit {
                feasibility: policy.feasibility_tenure_months,
                max: policy.max_tenure_months,
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            models,
            policy,
        })
    }
}

const DEFAULT_REGRESSOR_PATH: &str = "models/interest_regressor.json";
const DEFAULT_CLASSIFIER_PATH: &str = "models/feasibility_classifier.json";

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name }),
    }
}

fn parse_months(name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|months| *months > 0)
        .ok_or(ConfigError::InvalidTenure { name })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Locations of the trained model artifacts loaded at startup.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub regressor_path: PathBuf,
    pub classifier_path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str },
    InvalidTenure { name: &'static str },
    TenureAboveLimit { feasibility: u32, max: u32 },
    InvalidLogFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name } => {
                write!(f, "{name} must be one of true/false/1/0/yes/no/on/off")
            }
            ConfigError::InvalidTenure { name } => write!(f, "{name} must be a positive integer"),
            ConfigError::TenureAboveLimit { feasibility, max } => write!(
                f,
                "feasibility tenure of {feasibility} months exceeds the {max}-month maximum"
            ),
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT '{value}' is not one of compact/json")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
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
            "APP_LOG_FORMAT",
            "LOAN_REGRESSOR_PATH",
            "LOAN_CLASSIFIER_PATH",
            "LOAN_INCLUDE_MODEL_METRICS",
            "LOAN_FEASIBILITY_TENURE_MONTHS",
            "LOAN_MAX_TENURE_MONTHS",
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
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(
            config.models.regressor_path,
            PathBuf::from("models/interest_regressor.json")
        );
        assert_eq!(config.policy, PolicyConfig::default());
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
    fn policy_overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_INCLUDE_MODEL_METRICS", "yes");
        env::set_var("LOAN_FEASIBILITY_TENURE_MONTHS", "36");
        env::set_var("APP_LOG_FORMAT", "json");
        let config = AppConfig::load().expect("config loads");
        assert!(config.policy.include_model_metrics);
        assert_eq!(config.policy.feasibility_tenure_months, 36);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_zero_feasibility_tenure() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_FEASIBILITY_TENURE_MONTHS", "0");
        let err = AppConfig::load().expect_err("zero tenure rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidTenure {
                name: "LOAN_FEASIBILITY_TENURE_MONTHS"
            }
        ));
        reset_env();
    }

    #[test]
    fn feasibility_tenure_must_fit_under_maximum() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_MAX_TENURE_MONTHS", "48");
        let err = AppConfig::load().expect_err("default 60 exceeds 48");
        assert!(matches!(
            err,
            ConfigError::TenureAboveLimit {
                feasibility: 60,
                max: 48
            }
        ));

        env::set_var("LOAN_FEASIBILITY_TENURE_MONTHS", "36");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.policy.max_tenure_months, 48);
        reset_env();
    }

    #[test]
    fn rejects_unknown_flag_value() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_INCLUDE_MODEL_METRICS", "maybe");
        let err = AppConfig::load().expect_err("flag rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidFlag {
                name: "LOAN_INCLUDE_MODEL_METRICS"
            }
        ));
        reset_env();
    }
}
