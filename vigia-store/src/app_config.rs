use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub narrative: NarrativeConfig,
    pub risk: RiskConfig,
}

/// Settings for the LLM narrative collaborator
#[derive(Debug, Deserialize, Clone)]
pub struct NarrativeConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// USD per million input tokens, for usage tracking
    #[serde(default)]
    pub input_cost_per_mtok: f64,
    /// USD per million output tokens
    #[serde(default)]
    pub output_cost_per_mtok: f64,
}

/// Tunable risk calibration. The scoring weights themselves are a fixed
/// starting calibration; only the pattern minority threshold is exposed.
#[derive(Debug, Deserialize, Clone)]
pub struct RiskConfig {
    #[serde(default = "default_minority_threshold")]
    pub pattern_minority_threshold_pct: u32,
}

fn default_minority_threshold() -> u32 {
    10
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `VIGIA__NARRATIVE__API_KEY=...`
            .add_source(config::Environment::with_prefix("VIGIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
