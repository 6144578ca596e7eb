use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::offers::export::DEFAULT_LINES_PER_PAGE;
use crate::workflows::offers::{MatchingConfig, OfferServiceConfig, ScoringConfig};

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
    pub offers: OffersConfig,
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

        let catalog_path = non_empty_var("APP_CATALOG_PATH").map(PathBuf::from);
        let store_dir = non_empty_var("APP_STORE_DIR").map(PathBuf::from);
        let drop_expired = match non_empty_var("APP_DROP_EXPIRED_OFFERS") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_DROP_EXPIRED_OFFERS",
            })?,
            None => false,
        };
        let lines_per_page = match non_empty_var("APP_EXPORT_LINES_PER_PAGE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|lines| *lines > 0)
                .ok_or(ConfigError::InvalidLinesPerPage)?,
            None => DEFAULT_LINES_PER_PAGE,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            offers: OffersConfig {
                catalog_path,
                store_dir,
                drop_expired,
                lines_per_page,
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
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
}

/// Catalog location, persisted session directory and engine dials.
#[derive(Debug, Clone)]
pub struct OffersConfig {
    pub catalog_path: Option<PathBuf>,
    /// Directory for `wishlist.json` and `userProfile.json`; in-memory when unset.
    pub store_dir: Option<PathBuf>,
    pub drop_expired: bool,
    pub lines_per_page: usize,
}

impl OffersConfig {
    pub fn service_config(&self) -> OfferServiceConfig {
        OfferServiceConfig {
            matching: MatchingConfig {
                drop_expired: self.drop_expired,
            },
            scoring: ScoringConfig::default(),
            export_lines_per_page: self.lines_per_page,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str },
    InvalidLinesPerPage,
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
            ConfigError::InvalidLinesPerPage => {
                write!(f, "APP_EXPORT_LINES_PER_PAGE must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidLinesPerPage => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_CATALOG_PATH",
            "APP_STORE_DIR",
            "APP_DROP_EXPIRED_OFFERS",
            "APP_EXPORT_LINES_PER_PAGE",
        ] {
            env::remove_var(name);
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
        assert!(config.offers.catalog_path.is_none());
        assert!(!config.offers.drop_expired);
        assert_eq!(config.offers.lines_per_page, DEFAULT_LINES_PER_PAGE);
    }

    #[test]
    fn reads_offer_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CATALOG_PATH", "data/catalog.json");
        env::set_var("APP_DROP_EXPIRED_OFFERS", "yes");
        env::set_var("APP_EXPORT_LINES_PER_PAGE", "20");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(
            config.offers.catalog_path,
            Some(PathBuf::from("data/catalog.json"))
        );
        assert!(config.offers.service_config().matching.drop_expired);
        assert_eq!(config.offers.service_config().export_lines_per_page, 20);
    }

    #[test]
    fn rejects_malformed_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DROP_EXPIRED_OFFERS", "maybe");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidFlag { .. })));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        reset_env();
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }
}
