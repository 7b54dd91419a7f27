//! Heuristic city-name extraction.
//!
//! Two matchers are tried in order and the first non-empty result wins:
//!
//! 1. [`CityExtractor::after_preposition`]: "weather in Pune", "forecast for New York".
//! 2. [`CityExtractor::before_weather`]: "Pune weather".
//!
//! Both use a loose character class (letters, space, `.`, `'`, `-`) and will
//! sometimes capture trailing words ("Pune right"); that is accepted.

use regex::Regex;

use crate::model::CityMatch;

const PREPOSITION_PATTERN: &str = r"(?i)\b(?:in|of|for)\s+([A-Za-z][A-Za-z .'\-]{1,60})";
const LEADING_PATTERN: &str = r"(?i)^([A-Za-z][A-Za-z .'\-]{1,60})\s+weather\b";
const TEMPORAL_SUFFIX_PATTERN: &str = r"(?i)\b(?:today|tomorrow|now)\b.*$";

#[derive(Debug, Clone)]
pub struct CityExtractor {
    preposition: Regex,
    leading: Regex,
    temporal_suffix: Regex,
}

impl CityExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            preposition: Regex::new(PREPOSITION_PATTERN)?,
            leading: Regex::new(LEADING_PATTERN)?,
            temporal_suffix: Regex::new(TEMPORAL_SUFFIX_PATTERN)?,
        })
    }

    pub fn extract(&self, text: &str) -> CityMatch {
        let text = text.trim();

        let city = self
            .after_preposition(text)
            .or_else(|| self.before_weather(text));

        match city {
            Some(city) => CityMatch::Found(city),
            None => CityMatch::NotFound,
        }
    }

    /// City following the first `in` / `of` / `for`, minus a trailing
    /// "today", "tomorrow" or "now" and anything after it.
    pub fn after_preposition(&self, text: &str) -> Option<String> {
        let captured = self.preposition.captures(text)?.get(1)?.as_str();
        let candidate = trim_city(captured);
        let candidate = self.temporal_suffix.replace(candidate, "");

        non_empty(trim_city(&candidate))
    }

    /// City written before the word "weather" at the start of the text.
    pub fn before_weather(&self, text: &str) -> Option<String> {
        let captured = self.leading.captures(text)?.get(1)?.as_str();

        non_empty(trim_city(captured))
    }
}

fn trim_city(raw: &str) -> &str {
    raw.trim_matches(is_padding)
}

fn is_padding(c: char) -> bool {
    c.is_whitespace() || matches!(c, '?' | '.' | '!' | ',')
}

fn non_empty(city: &str) -> Option<String> {
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}
