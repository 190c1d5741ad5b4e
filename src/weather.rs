//! Current conditions at an airport from an Open-Meteo compatible API.

use crate::config::WeatherConfig;
use crate::error::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

pub const UNAVAILABLE: &str = "Weather unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius
    pub temperature: f64,
    pub weathercode: u16,
}

impl CurrentWeather {
    pub fn label(&self) -> &'static str {
        weather_label(self.weathercode)
    }

    /// `"-3.5°C, Snow"`
    pub fn summary(&self) -> String {
        format!("{:.1}°C, {}", self.temperature, self.label())
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

/// Short label for a WMO weather interpretation code
pub fn weather_label(code: u16) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base: Url,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|e| Error::Url {
            msg: format!("{base_url}: {e}"),
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    /// `None` when weather is switched off
    pub fn from_config(weather: &WeatherConfig, timeout: Duration) -> Result<Option<Self>> {
        if !weather.enabled {
            return Ok(None);
        }
        Self::new(&weather.base_url, timeout).map(Some)
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather> {
        let mut url = self.base.join("v1/forecast").map_err(|e| Error::Url {
            msg: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("latitude", &latitude.to_string())
            .append_pair("longitude", &longitude.to_string())
            .append_pair("current_weather", "true");

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(Error::Http {
                status,
                message: format!("HTTP {status}"),
            });
        }
        let forecast: ForecastResponse = serde_json::from_str(&response.text().await?)?;
        Ok(forecast.current_weather)
    }

    /// Line for a card: the summary, or the unavailable text on any failure
    pub async fn describe(&self, coordinates: Option<(f64, f64)>) -> String {
        let Some((lat, lon)) = coordinates else {
            return UNAVAILABLE.to_string();
        };
        match self.current(lat, lon).await {
            Ok(weather) => weather.summary(),
            Err(e) => {
                tracing::debug!(error = %e, lat, lon, "Weather lookup failed");
                UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(weather_label(0), "Clear");
        assert_eq!(weather_label(81), "Rain showers");
        assert_eq!(weather_label(99), "Thunderstorm with hail");
        assert_eq!(weather_label(42), "Unknown");
    }

    #[test]
    fn test_parse_forecast() {
        let body = r#"{"latitude":43.7,"current_weather":{"temperature":-3.5,"windspeed":12.0,"weathercode":73}}"#;
        let forecast: ForecastResponse = serde_json::from_str(body).unwrap();
        assert_eq!(forecast.current_weather.summary(), "-3.5°C, Snow");
    }

    #[test]
    fn test_disabled_config_yields_no_client() {
        let config = WeatherConfig {
            enabled: false,
            ..Default::default()
        };
        let client = WeatherClient::from_config(&config, Duration::from_secs(1)).unwrap();
        assert!(client.is_none());
    }

    #[tokio::test]
    async fn test_describe_without_coordinates() {
        let client = WeatherClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(client.describe(None).await, UNAVAILABLE);
    }

    /// Forecast endpoint answering only for Toronto; anywhere else is a 500
    async fn forecast_server() -> String {
        use axum::extract::Query;
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Response};
        use std::collections::HashMap;

        async fn forecast(Query(params): Query<HashMap<String, String>>) -> Response {
            match params.get("latitude").map(String::as_str) {
                Some("43.68") => axum::Json(serde_json::json!({
                    "current_weather": { "temperature": 2.0, "weathercode": 3 }
                }))
                .into_response(),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response(),
            }
        }

        let app = axum::Router::new().route("/v1/forecast", axum::routing::get(forecast));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_describe_degrades_on_server_error() {
        let client = WeatherClient::new(&forecast_server().await, Duration::from_secs(5)).unwrap();

        assert_eq!(client.describe(Some((43.68, -79.63))).await, "2.0°C, Overcast");
        assert_eq!(client.describe(Some((49.19, -123.18))).await, UNAVAILABLE);

        let err = client.current(49.19, -123.18).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_describe_degrades_when_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = WeatherClient::new(&format!("http://{addr}/"), Duration::from_secs(2)).unwrap();
        assert_eq!(client.describe(Some((43.68, -79.63))).await, UNAVAILABLE);
    }
}
