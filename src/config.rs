use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Everything the agent can be tuned with, stored as TOML:
///
/// ```toml
/// [search]
/// max_depth = 64
/// unbounded_depth = 3
///
/// [eval]
/// live_weight = 0.1
///
/// [time]
/// time_divisor = 20.0
/// ```
///
/// Missing sections and keys fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub search: SearchConfig,
    pub eval: EvalConfig,
    pub time: TimeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Weight of live towers next to frozen ones
    pub live_weight: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            live_weight: LIVE_MATERIAL_WEIGHT,
        }
    }
}

/// Per-move budget out of the remaining time credit, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub time_divisor: f64,
    pub min_move_time: f64,
    pub max_move_time: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_divisor: 20.0,
            min_move_time: 0.05,
            max_move_time: 10.0,
        }
    }
}

impl TimeConfig {
    /// `time_left / time_divisor`, clamped to the configured bounds.
    /// Never more than what is left.
    pub fn move_budget(&self, time_left: f64) -> Duration {
        let time_left = time_left.max(0.0);
        let share = time_left / self.time_divisor.max(1.0);
        let lower = self.min_move_time.min(self.max_move_time);
        let secs = share.clamp(lower, self.max_move_time).min(time_left);
        Duration::from_secs_f64(secs)
    }
}

impl AgentConfig {
    pub fn evaluator(&self) -> FrozenMaterial {
        FrozenMaterial::new(self.eval.live_weight)
    }

    pub fn validate(&self) -> miette::Result<()> {
        let search = &self.search;
        miette::ensure!(search.min_depth >= 1, "min_depth must be at least 1");
        miette::ensure!(
            search.min_depth <= search.max_depth,
            "min_depth {} exceeds max_depth {}",
            search.min_depth,
            search.max_depth
        );
        miette::ensure!(search.unbounded_depth >= 1, "unbounded_depth must be at least 1");
        miette::ensure!(
            search.tt_capacity != Some(0),
            "tt_capacity of 0 disables the tables, leave it unset instead"
        );
        miette::ensure!(
            self.eval.live_weight.is_finite(),
            "live_weight must be finite"
        );
        let time = &self.time;
        miette::ensure!(time.time_divisor > 0.0, "time_divisor must be positive");
        miette::ensure!(
            time.max_move_time.is_finite(),
            "max_move_time must be finite"
        );
        miette::ensure!(
            time.min_move_time >= 0.0 && time.min_move_time <= time.max_move_time,
            "Need 0 <= min_move_time <= max_move_time, got {} and {}",
            time.min_move_time,
            time.max_move_time
        );
        Ok(())
    }

    /// Save to a TOML File
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> miette::Result<()> {
        let toml_string = toml::to_string_pretty(self).into_diagnostic()?;
        fs::write(path, toml_string).into_diagnostic()?;
        Ok(())
    }

    /// Load from a TOML File
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> miette::Result<Self> {
        let path = path.as_ref();
        let file_content = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Reading config {}", path.display()))?;
        let config: Self = toml::from_str(&file_content)
            .into_diagnostic()
            .with_context(|| format!("Parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            [search]
            unbounded_depth = 5
            seed = 9

            [eval]
            live_weight = 0.25
        "#;
        let config: AgentConfig = toml::from_str(text).unwrap();
        assert_eq!(config.search.unbounded_depth, 5);
        assert_eq!(config.search.seed, Some(9));
        assert_eq!(config.search.min_depth, SearchConfig::default().min_depth);
        assert_eq!(config.eval.live_weight, 0.25);
        assert_eq!(config.time, TimeConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_survives_toml() {
        let mut config = AgentConfig::default();
        config.search.tt_capacity = Some(1 << 16);
        config.time.time_divisor = 12.5;
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AgentConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("avalanche_config_{}.toml", std::process::id()));
        let mut config = AgentConfig::default();
        config.search.max_depth = 12;
        config.save_to_file(&path).unwrap();
        let loaded = AgentConfig::load_from_file(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AgentConfig::default();
        config.search.min_depth = 10;
        config.search.max_depth = 4;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.time.time_divisor = 0.0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.time.max_move_time = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_move_budget_is_clamped() {
        let time = TimeConfig {
            time_divisor: 10.0,
            min_move_time: 0.5,
            max_move_time: 4.0,
        };
        assert_eq!(time.move_budget(20.0), Duration::from_secs(2));
        assert_eq!(time.move_budget(100.0), Duration::from_secs(4));
        assert_eq!(time.move_budget(2.0), Duration::from_millis(500));
        // Never more than what is left
        assert_eq!(time.move_budget(0.2), Duration::from_millis(200));
        assert_eq!(time.move_budget(-1.0), Duration::ZERO);
        assert_eq!(time.move_budget(f64::INFINITY), Duration::from_secs(4));
        assert_eq!(time.move_budget(f64::NAN), Duration::ZERO);
    }
}
