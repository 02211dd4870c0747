//! Configuration management for the field metrics engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with AGRO_ prefix

use std::time::Duration;

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use shared::{validate_country_code, MetricDefaults};

use crate::external::location::PositionOptions;

/// Main engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Geometry, prediction and advice backend
    pub backend: BackendConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Place search configuration
    pub geocoding: GeocodingConfig,

    /// Weather fallback sources
    pub weather: WeatherConfig,

    /// Device location tracking
    pub tracking: TrackingConfig,

    /// Persisted farmer profile
    pub profile: ProfileConfig,

    /// Log filter and output format
    pub logging: LoggingConfig,

    /// Values used when a metric cannot be resolved
    #[serde(default)]
    pub defaults: MetricDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL serving /calculate, /predict and /chat
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HttpConfig {
    /// Request timeout in seconds; unset keeps the transport default
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Nominatim base URL
    pub base_url: String,

    /// ISO country code results are restricted to
    pub country_code: String,

    /// Country name used in user-facing messages
    pub country_name: String,

    /// User-Agent sent with every search
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    pub primary_url: String,

    /// NASA POWER daily point endpoint
    pub secondary_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackingConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    /// Maximum cached fix age for continuous tracking
    pub max_cached_age_ms: u64,
    /// Maximum cached fix age for one-shot "locate me"
    pub once_max_cached_age_ms: u64,
    /// Camera zoom after the first fix or a place search
    pub fly_to_zoom: u8,
}

impl TrackingConfig {
    pub fn watch_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout_ms: self.timeout_ms,
            max_cached_age_ms: self.max_cached_age_ms,
        }
    }

    pub fn once_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout_ms: self.timeout_ms,
            max_cached_age_ms: self.once_max_cached_age_ms,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            max_cached_age_ms: 0,
            once_max_cached_age_ms: 60_000,
            fly_to_zoom: 16,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    /// JSON file holding the key/value profile record
    pub path: String,

    /// Key under which the profile is stored
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "agro_field_engine=debug".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment =
            std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO_ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    /// Code defaults overlaid with a TOML document, without touching the
    /// filesystem or the process environment
    pub fn from_toml(environment: &str, toml: &str) -> Result<Self, ConfigError> {
        Self::defaults(environment)?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        validate_country_code(&self.geocoding.country_code)
            .map_err(|e| ConfigError::Message(format!("geocoding.country_code: {}", e)))?;
        Ok(self)
    }

    fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let tracking = TrackingConfig::default();
        let logging = LoggingConfig::default();

        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("backend.base_url", "http://localhost:5000")?
            .set_default("geocoding.base_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoding.country_code", "NG")?
            .set_default("geocoding.country_name", "Nigeria")?
            .set_default("geocoding.user_agent", "agro-field-engine/0.1")?
            .set_default("weather.primary_url", "https://api.open-meteo.com")?
            .set_default("weather.secondary_url", "https://power.larc.nasa.gov")?
            .set_default("tracking.high_accuracy", tracking.high_accuracy)?
            .set_default("tracking.timeout_ms", tracking.timeout_ms)?
            .set_default("tracking.max_cached_age_ms", tracking.max_cached_age_ms)?
            .set_default(
                "tracking.once_max_cached_age_ms",
                tracking.once_max_cached_age_ms,
            )?
            .set_default("tracking.fly_to_zoom", u64::from(tracking.fly_to_zoom))?
            .set_default("profile.path", "data/profile.json")?
            .set_default("profile.key", "farmInfo")?
            .set_default("logging.filter", logging.filter)?
            .set_default("logging.json", logging.json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("test", "").unwrap();

        assert_eq!(config.environment, "test");
        assert_eq!(config.geocoding.country_code, "NG");
        assert_eq!(config.geocoding.country_name, "Nigeria");
        assert_eq!(config.profile.key, "farmInfo");
        assert_eq!(config.http.timeout(), None);
        assert_eq!(config.tracking.fly_to_zoom, 16);
        assert_eq!(config.tracking.watch_options().max_cached_age_ms, 0);
        assert_eq!(config.tracking.once_options().max_cached_age_ms, 60_000);
        assert_eq!(config.defaults, MetricDefaults::default());
    }

    #[test]
    fn test_file_overrides() {
        let config = Config::from_toml(
            "test",
            r#"
            [backend]
            base_url = "https://agro.example"

            [http]
            timeout_secs = 15

            [geocoding]
            country_code = "GH"
            country_name = "Ghana"

            [defaults]
            temperature_c = 28.5
            state = "Ashanti"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://agro.example");
        assert_eq!(config.http.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.geocoding.country_code, "GH");
        assert_eq!(config.defaults.temperature_c, 28.5);
        assert_eq!(config.defaults.state, "Ashanti");
        // Untouched defaults survive a partial table
        assert_eq!(config.defaults.rainfall_mm, 100.0);
    }

    #[test]
    fn test_invalid_country_code_rejected() {
        let err = Config::from_toml(
            "test",
            r#"
            [geocoding]
            country_code = "NGA"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("geocoding.country_code"));
    }
}
