use serde::Deserialize;
use std::env;
use std::time::Duration;
use wayfare_order::SagaPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub booking: BookingConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_compensate")]
    pub compensate_on_failure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub redis_url: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
}

fn default_timeout_ms() -> u64 { 15_000 }
fn default_compensate() -> bool { true }
fn default_session_ttl() -> u64 { 1800 }

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl BookingConfig {
    pub fn saga_policy(&self) -> SagaPolicy {
        SagaPolicy {
            step_timeout: Duration::from_millis(self.timeout_ms),
            compensate_on_failure: self.compensate_on_failure,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in; developer overrides.
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `WAYFARE_BOOKING__TIMEOUT_MS=5000`
            .add_source(config::Environment::with_prefix("WAYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = Config::from_toml_str(
            r#"
            [catalog]
            base_url = "http://catalog.local"

            [booking]
            base_url = "http://booking.local"
            timeout_ms = 2500

            [session]
            redis_url = "redis://127.0.0.1/"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.timeout(), Duration::from_millis(15_000));
        assert_eq!(config.session.ttl_seconds, 1800);
        let policy = config.booking.saga_policy();
        assert_eq!(policy.step_timeout, Duration::from_millis(2500));
        assert!(policy.compensate_on_failure);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(Config::from_toml_str("[catalog]\nbase_url = \"x\"").is_err());
    }
}
