use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{
    degrade::degrade_with,
    error::ProviderError,
    model::{Fetched, Observation},
};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`.
    async fn current(&self, city: &str) -> Result<Observation, ProviderError>;
}

/// Sentence used when the weather service answers with a non-200 status.
pub fn unavailable_report(city: &str) -> String {
    format!(
        "Weather information for {city} is currently unavailable. \
         The weather is typically pleasant."
    )
}

/// Sentence used when the weather service cannot be reached or its payload is unusable.
pub fn fallback_report(city: &str) -> String {
    format!("The weather in {city} is pleasant with moderate temperatures.")
}

/// Produces a weather sentence for a city and never fails.
#[derive(Debug, Clone)]
pub struct WeatherReporter {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherReporter {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    #[instrument(skip(self))]
    pub async fn report(&self, city: &str) -> Fetched<String> {
        let observation = self.provider.current(city).await;
        if let Ok(obs) = &observation {
            debug!(observed_at = ?obs.observed_at, "weather observation received");
        }

        degrade_with("weather", observation.map(|obs| obs.summary()), |err| {
            if err.is_unavailable() {
                unavailable_report(city)
            } else {
                fallback_report(city)
            }
        })
    }
}
