use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Number;
use tracing::debug;

use crate::{
    config::WeatherConfig,
    error::{ProviderError, SetupError},
    model::Observation,
};

use super::WeatherProvider;

/// Key sent when no OpenWeather key is configured.
pub const DEMO_API_KEY: &str = "demo";

pub struct OpenWeatherProvider {
    api_key: SecretString,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, SetupError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            http,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, SetupError> {
        let api_key = config
            .api_key
            .clone()
            .unwrap_or_else(|| DEMO_API_KEY.to_string());

        Self::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Number,
    feels_like: Number,
    humidity: Number,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    dt: Option<i64>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<Observation, ProviderError> {
        debug!(city, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.expose_secret()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(ProviderError::Status(status));
        }

        let body = res.text().await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or(ProviderError::MissingField("weather[0]"))?;

        Ok(Observation {
            city: city.to_string(),
            description,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            observed_at: parsed.dt.and_then(unix_to_utc),
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
