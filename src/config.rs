use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the flight directory, without the `/api` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    /// Seconds between background refreshes of the flight list
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:18080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            enabled: default_true(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            weather: WeatherConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

/// Per-user config file, e.g. `~/.config/flight-console/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flight-console").join("config.toml"))
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Add config file sources in order of precedence (lower to higher)
        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    config::File::with_name(path)
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.add_source(
                        config::File::from(path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // Environment variables (highest precedence), e.g. FLIGHT_CONSOLE__API__BASE_URL
        builder = builder.add_source(
            config::Environment::with_prefix("FLIGHT_CONSOLE")
                .prefix_separator("__")
                .separator("__"),
        );

        let config = builder.build().map_err(|e| Error::Config {
            msg: format!("Failed to load configuration: {}", e),
        })?;

        config.try_deserialize().map_err(|e| Error::Config {
            msg: format!("Failed to deserialize configuration: {}", e),
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        // A zero interval would spin the refresh task
        Duration::from_secs(self.view.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:18080");
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert!(config.weather.enabled);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://flights.test:9000\"\n\n[view]\nrefresh_interval_secs = 2\n\n[weather]\nenabled = false"
        )
        .unwrap();

        let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.api.base_url, "http://flights.test:9000");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.refresh_interval(), Duration::from_secs(2));
        assert!(!config.weather.enabled);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some("/nonexistent/flight-console.toml"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_zero_refresh_interval_is_raised_to_one_second() {
        let mut config = Config::default();
        config.view.refresh_interval_secs = 0;
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
