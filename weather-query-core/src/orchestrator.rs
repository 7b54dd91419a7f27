//! End-to-end handling of one free-text query.
//!
//! ```text
//! query ─ classify ─┬─ Other ─────────────────────────► refusal
//!                   └─ Weather ─ extract ─┬─ NotFound ─► ask for city
//!                                         └─ Found ─ report ─ compose ─► answer
//! ```

use std::{sync::Arc, time::Duration};

use tracing::{Span, field, info, instrument, warn};

use crate::{
    city::CityExtractor,
    composer::ResponseComposer,
    config::Config,
    error::{QueryError, SetupError},
    llm::{LanguageModel, OpenRouterModel},
    model::{CityMatch, Intent, Outcome, Reply},
    provider::{WeatherProvider, WeatherReporter, openweather::OpenWeatherProvider},
};

pub const NON_WEATHER_RESPONSE: &str =
    "Thank you for your query, but I am only designed to provide weather information for \
     cities. Please ask me about the weather in any city!";

pub const MISSING_CITY_RESPONSE: &str =
    "I can help with weather, but I couldn't detect the city name. \
     Try asking like: 'What's the weather in Pune?'";

#[derive(Debug, Clone)]
pub struct QueryOrchestrator {
    extractor: CityExtractor,
    reporter: WeatherReporter,
    composer: ResponseComposer,
}

impl QueryOrchestrator {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        composer: ResponseComposer,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            extractor: CityExtractor::new()?,
            reporter: WeatherReporter::new(provider),
            composer,
        })
    }

    /// Build the production pipeline: OpenWeather for data, OpenRouter for phrasing.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let provider: Arc<dyn WeatherProvider> =
            Arc::new(OpenWeatherProvider::from_config(&config.weather)?);

        let composer = match OpenRouterModel::from_config(&config.llm) {
            Some(model) => {
                let model: Arc<dyn LanguageModel> = Arc::new(model);
                let timeout = Duration::from_secs(config.llm.timeout_secs);
                ResponseComposer::new(model, timeout)
            }
            None => {
                warn!("no language model API key configured; answers will not be rephrased");
                ResponseComposer::disabled()
            }
        };

        Self::new(provider, composer)
    }

    #[instrument(skip(self), fields(city))]
    pub async fn handle(&self, query: &str) -> Result<Reply, QueryError> {
        if !Intent::classify(query).is_weather() {
            info!("query is not about the weather");
            return Ok(Reply {
                outcome: Outcome::Refused,
                text: NON_WEATHER_RESPONSE.to_string(),
            });
        }

        let city = match self.extractor.extract(query) {
            CityMatch::Found(city) => city,
            CityMatch::NotFound => {
                info!("no city found in weather query");
                return Ok(Reply {
                    outcome: Outcome::MissingCity,
                    text: MISSING_CITY_RESPONSE.to_string(),
                });
            }
        };
        Span::current().record("city", field::display(&city));

        let report = self.reporter.report(&city).await;
        let answer = self.composer.compose(&report.value, query).await;

        if answer.value.trim().is_empty() {
            let reason = format!("composed an empty answer for {city}");
            return Err(QueryError::Internal(reason));
        }

        info!(
            weather_degraded = report.is_degraded(),
            phrasing_degraded = answer.is_degraded(),
            "answered weather query"
        );

        Ok(Reply {
            outcome: Outcome::Answered {
                city,
                weather: report.freshness,
                phrasing: answer.freshness,
            },
            text: answer.value,
        })
    }
}
