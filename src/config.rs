use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest collection that still fits a letter-indexed menu.
pub const MENU_LETTERS: usize = 26;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Starting combat profile of the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub hp: i32,
    pub mp: i32,
    pub defense: i32,
    pub power: i32,
    pub magic: i32,
    pub regen: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            hp: 50,
            mp: 15,
            defense: 1,
            power: 5,
            magic: 5,
            regen: 1,
        }
    }
}

/// Tuning knobs for one run. Every field has a default, so a config file
/// only needs the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub room_min: i32,
    pub room_max: i32,
    pub room_attempts: usize,
    pub fov_radius: i32,
    pub level_up_base: i32,
    pub level_up_factor: i32,
    pub inventory_capacity: usize,
    pub equipment_capacity: usize,
    pub regen_interval: u64,
    pub seed: Option<u64>,
    pub player: PlayerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 80,
            map_height: 43,
            room_min: 5,
            room_max: 13,
            room_attempts: 30,
            fov_radius: 10,
            level_up_base: 200,
            level_up_factor: 150,
            inventory_capacity: MENU_LETTERS,
            equipment_capacity: MENU_LETTERS,
            regen_interval: 10,
            seed: None,
            player: PlayerConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `GIRAFFELIKE_CONFIG`, or falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os("GIRAFFELIKE_CONFIG") {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_min < 3 || self.room_min > self.room_max {
            return Err(ConfigError::Invalid(format!(
                "room size range {}..={} is empty or too small",
                self.room_min, self.room_max
            )));
        }
        if self.room_max + 1 >= self.map_width || self.room_max + 1 >= self.map_height {
            return Err(ConfigError::Invalid(format!(
                "rooms up to {} tiles do not fit a {}x{} map",
                self.room_max, self.map_width, self.map_height
            )));
        }
        if self.room_attempts == 0 {
            return Err(ConfigError::Invalid("room_attempts must be positive".into()));
        }
        if self.fov_radius <= 0 {
            return Err(ConfigError::Invalid("fov_radius must be positive".into()));
        }
        if self.inventory_capacity > MENU_LETTERS || self.equipment_capacity > MENU_LETTERS {
            return Err(ConfigError::Invalid(format!(
                "collections are limited to {MENU_LETTERS} entries"
            )));
        }
        if self.regen_interval == 0 {
            return Err(ConfigError::Invalid("regen_interval must be positive".into()));
        }
        if self.player.hp <= 0 {
            return Err(ConfigError::Invalid("player hp must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "fov_radius": 6, "player": { "hp": 80 } }"#).unwrap();
        assert_eq!(config.fov_radius, 6);
        assert_eq!(config.player.hp, 80);
        assert_eq!(config.player.power, 5);
        assert_eq!(config.room_attempts, 30);
    }

    #[test]
    fn oversized_inventory_is_rejected() {
        let config = GameConfig {
            inventory_capacity: 40,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_room_range_is_rejected() {
        let config = GameConfig {
            room_min: 9,
            room_max: 6,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
