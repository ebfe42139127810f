use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::scoring::StrategyKind;
use crate::selection::RankingMode;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// heuristic, weighted_heuristic or trained_model
    #[serde(default)]
    pub strategy: StrategyKind,
    /// JSON dense network, required for trained_model
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// |odds| above this costs confidence
    #[serde(default = "default_odds_penalty_threshold")]
    pub odds_penalty_threshold: f64,
    /// |odds| inside this band earns confidence
    #[serde(default = "default_odds_sweet_spot")]
    pub odds_sweet_spot: [f64; 2],
    /// Confidence points added or removed by the odds band
    #[serde(default = "default_odds_band_adjustment")]
    pub odds_band_adjustment: f64,
}

fn default_odds_penalty_threshold() -> f64 {
    200.0
}

fn default_odds_sweet_spot() -> [f64; 2] {
    [100.0, 150.0]
}

fn default_odds_band_adjustment() -> f64 {
    5.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            model_path: None,
            odds_penalty_threshold: default_odds_penalty_threshold(),
            odds_sweet_spot: default_odds_sweet_spot(),
            odds_band_adjustment: default_odds_band_adjustment(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub ranking: RankingMode,
    /// Candidates below this expected value are not viable (unset = no gate)
    #[serde(default)]
    pub min_expected_value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Call budget per sliding window
    #[serde(default = "default_calls_per_minute")]
    pub calls_per_minute: u32,
    /// Sliding window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Wrap the provider in a read-through cache
    #[serde(default = "default_true")]
    pub cache: bool,
    /// Recent games fetched per team
    #[serde(default = "default_recent_games")]
    pub recent_games: usize,
}

fn default_calls_per_minute() -> u32 {
    60
}

fn default_window_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_recent_games() -> usize {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            calls_per_minute: default_calls_per_minute(),
            window_secs: default_window_secs(),
            cache: true,
            recent_games: default_recent_games(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Answer with a conservative pick instead of 422 when nothing is viable
    #[serde(default = "default_true")]
    pub fallback_on_no_candidate: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            fallback_on_no_candidate: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directives used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rolling log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info,pickwise=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info,pickwise=debug")?
            .set_default("logging.json", false)?
            .set_default("scoring.strategy", "weighted_heuristic")?
            .set_default("selection.ranking", "ev_weighted_confidence")?
            .set_default("provider.calls_per_minute", 60)?
            .set_default("api.port", 8000)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PICKWISE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PICKWISE__SCORING__STRATEGY, etc.)
            .add_source(
                Environment::with_prefix("PICKWISE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let [low, high] = self.scoring.odds_sweet_spot;
        if !(low.is_finite() && high.is_finite()) || low > high {
            errors.push(format!("odds_sweet_spot [{low}, {high}] must be an ordered range"));
        }
        if self.scoring.odds_penalty_threshold <= 0.0 {
            errors.push("odds_penalty_threshold must be positive".to_string());
        }
        if self.scoring.strategy == StrategyKind::TrainedModel && self.scoring.model_path.is_none()
        {
            errors.push("trained_model strategy requires scoring.model_path".to_string());
        }

        if let Some(ev) = self.selection.min_expected_value {
            if !ev.is_finite() {
                errors.push("min_expected_value must be finite".to_string());
            }
        }

        if self.provider.calls_per_minute == 0 {
            errors.push("calls_per_minute must be at least 1".to_string());
        }
        if self.provider.window_secs == 0 {
            errors.push("window_secs must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.strategy, StrategyKind::WeightedHeuristic);
        assert_eq!(config.selection.ranking, RankingMode::EvWeightedConfidence);
        assert_eq!(config.selection.min_expected_value, None);
        assert_eq!(config.provider.calls_per_minute, 60);
        assert!(config.api.fallback_on_no_candidate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let config = AppConfig::load_from("does-not-exist").unwrap();
        assert_eq!(config.scoring.odds_sweet_spot, [100.0, 150.0]);
        assert_eq!(config.api.port, 8000);
    }

    #[test]
    fn test_validate_catches_bad_values() {
        let mut config = AppConfig::default();
        config.scoring.odds_sweet_spot = [150.0, 100.0];
        config.scoring.strategy = StrategyKind::TrainedModel;
        config.provider.calls_per_minute = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
