//! Session configuration loaded from TOML.

use std::time::Duration;

use grid_defence_core::{BoardConfig, Faction};
use grid_defence_system_spawning::Config as SpawnConfig;
use grid_defence_system_wave_progression::Config as ProgressionConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading or validating a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A duration field holds a negative or non-finite number of seconds.
    #[error("`{field}` must be a non-negative number of seconds, got {value}")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the document.
        value: f32,
    },
    /// An interval field is zero, negative or non-finite.
    #[error("`{field}` must be a positive number of seconds, got {value}")]
    InvalidInterval {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the document.
        value: f32,
    },
    /// The per-wave spawn interval reduction is not a finite number.
    #[error("spawn reduction per wave must be finite, got {0}")]
    InvalidSpawnReduction(f32),
    /// The initial time scale is not a positive finite number.
    #[error("time scale must be positive and finite, got {0}")]
    InvalidTimeScale(f32),
}

/// Starting resources of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Money available before the first placement.
    pub starting_money: u32,
    /// Enemies that may escape before the game is lost.
    pub starting_lives: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: 100,
            starting_lives: 10,
        }
    }
}

/// Wave pacing settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    /// Number of waves in a full game.
    pub max_waves: u32,
    /// Countdown before the first wave, in seconds.
    pub first_wave_delay_secs: f32,
    /// Countdown after each completed wave, in seconds.
    pub next_wave_delay_secs: f32,
    /// Whether waves start on their own when the countdown elapses.
    pub auto_start: bool,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            max_waves: 30,
            first_wave_delay_secs: 10.0,
            next_wave_delay_secs: 5.0,
            auto_start: true,
        }
    }
}

/// Spawn cadence settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Interval between spawns of the first wave, in seconds.
    pub base_interval_secs: f32,
    /// Fraction of the base interval removed per elapsed wave.
    pub reduction_per_wave: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            base_interval_secs: 1.0,
            reduction_per_wave: 0.02,
        }
    }
}

/// Complete description of a session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Board dimensions and endpoints.
    pub board: BoardConfig,
    /// Tower roster offered to the player.
    pub faction: Faction,
    /// Starting money and lives.
    pub economy: EconomyConfig,
    /// Wave pacing.
    pub waves: WaveSettings,
    /// Spawn cadence.
    pub spawn: SpawnSettings,
    /// Initial simulation speed multiplier.
    pub time_scale: f32,
    /// Seed of the enemy kind selection.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            faction: Faction::default(),
            economy: EconomyConfig::default(),
            waves: WaveSettings::default(),
            spawn: SpawnSettings::default(),
            time_scale: 1.0,
            seed: 0x5eed,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_time_scale(self.time_scale) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        let _ = self.progression()?;
        let _ = self.spawning()?;
        Ok(())
    }

    pub(crate) fn progression(&self) -> Result<ProgressionConfig, ConfigError> {
        Ok(ProgressionConfig::new(
            self.waves.max_waves,
            seconds("waves.first_wave_delay_secs", self.waves.first_wave_delay_secs)?,
            seconds("waves.next_wave_delay_secs", self.waves.next_wave_delay_secs)?,
            self.waves.auto_start,
        ))
    }

    pub(crate) fn spawning(&self) -> Result<SpawnConfig, ConfigError> {
        let base_interval = self.spawn.base_interval_secs;
        if !(base_interval.is_finite() && base_interval > 0.0) {
            return Err(ConfigError::InvalidInterval {
                field: "spawn.base_interval_secs",
                value: base_interval,
            });
        }
        let reduction = self.spawn.reduction_per_wave;
        if !reduction.is_finite() {
            return Err(ConfigError::InvalidSpawnReduction(reduction));
        }

        Ok(SpawnConfig::new(
            seconds("spawn.base_interval_secs", base_interval)?,
            reduction,
            self.seed,
        ))
    }
}

pub(crate) fn is_valid_time_scale(scale: f32) -> bool {
    scale.is_finite() && scale > 0.0
}

fn seconds(field: &'static str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::CellCoord;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SessionConfig::from_toml_str("").expect("empty config parses");

        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            faction = "energy"
            seed = 7

            [board]
            size = 9
            end = { column = 8, row = 0 }

            [economy]
            starting_money = 500
            "#,
        )
        .expect("config parses");

        assert_eq!(config.faction, Faction::Energy);
        assert_eq!(config.seed, 7);
        assert_eq!(config.board.size, 9);
        assert_eq!(config.board.end_cell(), CellCoord::new(8, 0));
        assert!(config.board.allow_diagonal);
        assert_eq!(config.economy.starting_money, 500);
        assert_eq!(config.economy.starting_lives, 10);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            SessionConfig::from_toml_str("time_scale = 0.0"),
            Err(ConfigError::InvalidTimeScale(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("[waves]\nnext_wave_delay_secs = -1.0"),
            Err(ConfigError::InvalidDuration {
                field: "waves.next_wave_delay_secs",
                ..
            })
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("faction = \"unknown\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_spawn_settings_that_never_trigger() {
        for interval in ["0.0", "-2.0", "inf", "nan"] {
            let source = format!("[spawn]\nbase_interval_secs = {interval}");
            assert!(
                matches!(
                    SessionConfig::from_toml_str(&source),
                    Err(ConfigError::InvalidInterval {
                        field: "spawn.base_interval_secs",
                        ..
                    })
                ),
                "interval {interval} accepted"
            );
        }
        for reduction in ["nan", "inf", "-inf"] {
            let source = format!("[spawn]\nreduction_per_wave = {reduction}");
            assert!(
                matches!(
                    SessionConfig::from_toml_str(&source),
                    Err(ConfigError::InvalidSpawnReduction(_))
                ),
                "reduction {reduction} accepted"
            );
        }
        assert!(SessionConfig::from_toml_str("[spawn]\nreduction_per_wave = -0.5").is_ok());
    }
}
