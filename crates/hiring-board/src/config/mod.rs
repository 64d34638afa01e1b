use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::hiring::rounds::{
    RoundPlan, DEFAULT_STAGE_TWO_ROUNDS, MAX_STAGE_TWO_ROUNDS, MIN_STAGE_TWO_ROUNDS,
};

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
    pub pipeline: PipelineConfig,
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

        let stage_two_rounds = env::var("APP_STAGE_TWO_ROUNDS")
            .unwrap_or_else(|_| DEFAULT_STAGE_TWO_ROUNDS.to_string())
            .trim()
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidStageTwoRounds)?;
        let pipeline = PipelineConfig::new(stage_two_rounds)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline,
        })
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

/// Defaults applied to job postings created without an explicit round list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub round_plan: RoundPlan,
}

impl PipelineConfig {
    pub fn new(stage_two_rounds: u8) -> Result<Self, ConfigError> {
        let round_plan =
            RoundPlan::new(stage_two_rounds).map_err(|_| ConfigError::InvalidStageTwoRounds)?;
        Ok(Self { round_plan })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error(
        "APP_STAGE_TWO_ROUNDS must be a number between {} and {}",
        MIN_STAGE_TWO_ROUNDS,
        MAX_STAGE_TWO_ROUNDS
    )]
    InvalidStageTwoRounds,
}
