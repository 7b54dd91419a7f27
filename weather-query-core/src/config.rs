use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// External services that need credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    OpenWeather,
    OpenRouter,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "openweather",
            ServiceId::OpenRouter => "openrouter",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::OpenWeather, ServiceId::OpenRouter]
    }

    /// Environment variable that overrides the stored key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "OPENWEATHER_API_KEY",
            ServiceId::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ServiceId::OpenWeather),
            "openrouter" => Ok(ServiceId::OpenRouter),
            _ => Err(anyhow!(
                "Unknown service '{value}'. Supported services: openweather, openrouter."
            )),
        }
    }
}

/// Weather data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://api.openweathermap.org/data/2.5/weather".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Language model settings used for rephrasing answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://openrouter.ai/api/v1".to_string(),
            model: "meta-llama/llama-3.2-3b-instruct:free".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// api_key = "..."
///
/// [llm]
/// api_key = "..."
/// model = "meta-llama/llama-3.2-3b-instruct:free"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_overrides(|name| std::env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load only what is stored on disk, or an empty default if nothing is stored yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// A zero timeout would expire every request before it is sent.
    pub fn validate(&self) -> Result<()> {
        if self.weather.timeout_secs == 0 {
            bail!("weather.timeout_secs must be at least 1");
        }

        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be at least 1");
        }

        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-query", "weather-query")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from `lookup`, which maps an environment variable name to its value.
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        for id in ServiceId::all() {
            if let Some(key) = get(id.api_key_env()) {
                self.set_api_key(*id, key);
            }
        }

        if let Some(base) = get("OPENROUTER_API_BASE") {
            self.llm.api_base = base;
        }

        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(raw) = get("LLM_TEMPERATURE") {
            self.llm.temperature = raw
                .parse()
                .with_context(|| format!("LLM_TEMPERATURE must be a number, got '{raw}'"))?;
        }

        Ok(())
    }

    /// Set or replace the API key for a service.
    pub fn set_api_key(&mut self, id: ServiceId, api_key: String) {
        match id {
            ServiceId::OpenWeather => self.weather.api_key = Some(api_key),
            ServiceId::OpenRouter => self.llm.api_key = Some(api_key),
        }
    }

    /// Returns the API key for a service, if present.
    pub fn api_key(&self, id: ServiceId) -> Option<&str> {
        match id {
            ServiceId::OpenWeather => self.weather.api_key.as_deref(),
            ServiceId::OpenRouter => self.llm.api_key.as_deref(),
        }
    }

    pub fn is_configured(&self, id: ServiceId) -> bool {
        self.api_key(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn service_id_as_str_roundtrip() {
        for id in ServiceId::all() {
            let parsed = ServiceId::try_from(id.as_str()).unwrap();
            assert_eq!(*id, parsed);
        }

        let mixed_case = ServiceId::try_from("OpenRouter").unwrap();
        assert_eq!(mixed_case, ServiceId::OpenRouter);
    }

    #[test]
    fn unknown_service_error() {
        let err = ServiceId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown service"));
        assert!(err.to_string().contains("openweather, openrouter"));
    }

    #[test]
    fn defaults_match_public_endpoints() {
        let cfg = Config::default();
        assert_eq!(cfg.weather.timeout_secs, 10);
        assert_eq!(cfg.llm.api_base, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.llm.temperature, 0.7);
        assert_eq!(cfg.server.port, 8000);
        assert!(!cfg.is_configured(ServiceId::OpenWeather));
        assert!(!cfg.is_configured(ServiceId::OpenRouter));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [llm]
            api_key = "or-key"
            model = "some/model"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key(ServiceId::OpenRouter), Some("or-key"));
        assert_eq!(cfg.llm.model, "some/model");
        assert_eq!(cfg.llm.timeout_secs, 30);
        assert_eq!(
            cfg.weather.base_url,
            "http://api.openweathermap.org/data/2.5/weather"
        );
    }

    #[test]
    fn env_overrides_stored_values() {
        let mut cfg = Config::default();
        cfg.set_api_key(ServiceId::OpenWeather, "FILE_KEY".into());

        cfg.apply_overrides(lookup(&[
            ("OPENWEATHER_API_KEY", "ENV_KEY"),
            ("OPENROUTER_API_KEY", "OR_KEY"),
            ("OPENROUTER_API_BASE", "http://localhost:9999/v1"),
            ("LLM_MODEL", "other/model"),
            ("LLM_TEMPERATURE", "0.2"),
        ]))
        .unwrap();

        assert_eq!(cfg.api_key(ServiceId::OpenWeather), Some("ENV_KEY"));
        assert_eq!(cfg.api_key(ServiceId::OpenRouter), Some("OR_KEY"));
        assert_eq!(cfg.llm.api_base, "http://localhost:9999/v1");
        assert_eq!(cfg.llm.model, "other/model");
        assert_eq!(cfg.llm.temperature, 0.2);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key(ServiceId::OpenRouter, "FILE_KEY".into());

        let env = lookup(&[("OPENROUTER_API_KEY", "  ")]);
        cfg.apply_overrides(env).unwrap();

        assert_eq!(cfg.api_key(ServiceId::OpenRouter), Some("FILE_KEY"));
    }

    #[test]
    fn bad_temperature_is_an_error() {
        let mut cfg = Config::default();
        let env = lookup(&[("LLM_TEMPERATURE", "warm")]);

        let err = cfg.apply_overrides(env).unwrap_err();
        assert!(err.to_string().contains("LLM_TEMPERATURE"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn save_then_load_keeps_keys_and_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key(ServiceId::OpenWeather, "ow-key".into());
        cfg.set_api_key(ServiceId::OpenRouter, "or-key".into());
        cfg.llm.model = "some/model".into();
        cfg.server.port = 9000;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key(ServiceId::OpenWeather), Some("ow-key"));
        assert_eq!(loaded.api_key(ServiceId::OpenRouter), Some("or-key"));
        assert_eq!(loaded.llm.model, "some/model");
        assert_eq!(loaded.server.port, 9000);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm\napi_key = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn zero_timeout_is_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("llm.timeout_secs"), "error was {message}");

        let mut cfg = Config::default();
        cfg.weather.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
