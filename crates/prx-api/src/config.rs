use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use prx_srs::{SchedulerConfig, SchedulerError};
use serde::Deserialize;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "PRX_";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "invalid environment '{other}', expected 'development' or 'production'"
            )),
        }
    }
}

/// Service configuration, read from `PRX_*` environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// No URL means items are kept in memory only.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    /// Comma-separated list of origins allowed by CORS.
    #[serde(default)]
    pub allowed_origins: Option<String>,

    // Scheduler overrides
    #[serde(default)]
    pub ease_floor: Option<f64>,
    #[serde(default)]
    pub initial_ease: Option<f64>,
    #[serde(default)]
    pub mastery_repetitions: Option<u32>,
    #[serde(default)]
    pub mastery_ease: Option<f64>,
    #[serde(default)]
    pub maximum_interval_days: Option<u32>,
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    3000
}

const fn default_db_max_connections() -> u32 {
    10
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    /// Scheduler policy with any configured overrides applied.
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, SchedulerError> {
        let defaults = SchedulerConfig::default();
        let config = SchedulerConfig {
            ease_floor: self.ease_floor.unwrap_or(defaults.ease_floor),
            initial_ease: self.initial_ease.unwrap_or(defaults.initial_ease),
            mastery_repetitions: self
                .mastery_repetitions
                .unwrap_or(defaults.mastery_repetitions),
            mastery_ease: self.mastery_ease.unwrap_or(defaults.mastery_ease),
            maximum_interval_days: self
                .maximum_interval_days
                .unwrap_or(defaults.maximum_interval_days),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ApiConfig, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_iter(
            pairs
                .iter()
                .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), (*v).to_string())),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr().port(), 3000);
        assert!(config.database_url.is_none());
        assert!(config.parsed_allowed_origins().is_empty());
        assert_eq!(
            config.scheduler_config().unwrap(),
            SchedulerConfig::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("ENV", "production"),
            ("PORT", "8081"),
            ("DATABASE_URL", "postgres://localhost/recall"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("MASTERY_REPETITIONS", "7"),
            ("EASE_FLOOR", "1.4"),
        ])
        .unwrap();

        assert_eq!(config.env, Environment::Production);
        assert_eq!(config.port, 8081);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/recall"));
        assert_eq!(
            config.parsed_allowed_origins(),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );

        let scheduler = config.scheduler_config().unwrap();
        assert_eq!(scheduler.mastery_repetitions, 7);
        assert_eq!(scheduler.ease_floor, 1.4);
    }

    #[test]
    fn test_invalid_values() {
        assert!(from_pairs(&[("ENV", "staging")]).is_err());

        let config = from_pairs(&[("EASE_FLOOR", "0.2")]).unwrap();
        assert!(config.scheduler_config().is_err());
    }
}
