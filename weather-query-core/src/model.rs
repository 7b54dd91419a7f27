use chrono::{DateTime, Utc};
use serde_json::Number;

/// Whether a piece of free text asks about the weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Weather,
    Other,
}

/// Result of looking for a city name in free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityMatch {
    Found(String),
    NotFound,
}

/// Current conditions for a city, as reported by the weather service.
///
/// Numbers are kept exactly as the service sent them so that the rendered
/// sentence shows `25` rather than `25.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub city: String,
    pub description: String,
    pub temperature_c: Number,
    pub feels_like_c: Number,
    pub humidity_pct: Number,
    pub observed_at: Option<DateTime<Utc>>,
}

impl Observation {
    /// One-sentence summary used as the raw weather report.
    pub fn summary(&self) -> String {
        format!(
            "The weather in {} is {}. Temperature: {}°C (feels like {}°C), Humidity: {}%",
            self.city, self.description, self.temperature_c, self.feels_like_c, self.humidity_pct
        )
    }
}

/// Whether a value came from its real source or from a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Degraded { reason: String },
}

/// A value produced by a best-effort step, tagged with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub value: T,
    pub freshness: Freshness,
}

impl<T> Fetched<T> {
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            freshness: Freshness::Fresh,
        }
    }

    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            freshness: Freshness::Degraded {
                reason: reason.into(),
            },
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.freshness, Freshness::Degraded { .. })
    }
}

/// Terminal state reached by one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The query was not about the weather.
    Refused,
    /// The query was about the weather but named no city.
    MissingCity,
    /// A weather answer was produced for `city`.
    Answered {
        city: String,
        weather: Freshness,
        phrasing: Freshness,
    },
}

/// Final answer for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outcome: Outcome,
    pub text: String,
}
