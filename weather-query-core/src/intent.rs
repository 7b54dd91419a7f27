use crate::model::Intent;

/// Words that mark a query as weather-related.
pub const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "temp",
    "forecast",
    "humidity",
    "rain",
    "sunny",
    "cloud",
    "wind",
];

impl Intent {
    /// Classify free text by case-insensitive substring match against [`WEATHER_KEYWORDS`].
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();

        let matched = WEATHER_KEYWORDS.iter().any(|k| lower.contains(k));

        if matched {
            Intent::Weather
        } else {
            Intent::Other
        }
    }

    pub fn is_weather(self) -> bool {
        self == Intent::Weather
    }
}
