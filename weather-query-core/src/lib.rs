//! Core library for the weather query assistant.
//!
//! This crate defines:
//! - Intent classification and city extraction for free-text queries
//! - The weather data provider and the language-model rephrasing step
//! - The orchestrator that turns a query into a single text answer
//! - Configuration & credentials handling
//!
//! It is used by the `weather-query` binary, but can also be reused by other binaries or services.

pub mod city;
pub mod composer;
pub mod config;
pub mod degrade;
pub mod error;
pub mod intent;
pub mod llm;
pub mod model;
pub mod orchestrator;
pub mod provider;

pub use city::CityExtractor;
pub use composer::ResponseComposer;
pub use config::{Config, LlmConfig, ServerConfig, ServiceId, WeatherConfig};
pub use error::{CompletionError, ProviderError, QueryError, SetupError};
pub use llm::{LanguageModel, OpenRouterModel};
pub use model::{CityMatch, Fetched, Freshness, Intent, Observation, Outcome, Reply};
pub use orchestrator::QueryOrchestrator;
pub use provider::{WeatherProvider, WeatherReporter, openweather::OpenWeatherProvider};
