use crate::player::Direction;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Values used when `config.json` is missing, incomplete or invalid
pub mod defaults {
    pub const PATH_COUNT: usize = 10;
    pub const LONG_SIDE: f64 = 300.0;
    pub const SHORT_SIDE: f64 = 150.0;
    pub const PATH_COLOR: &str = "blue";

    /// player radius and start offset are fractions of the track short side
    pub const PLAYER_RADIUS_RATIO: f64 = 0.2;
    pub const PLAYER_START_RATIO: f64 = 0.5;
    pub const PLAYER_SPEED: f64 = 150.0;
    pub const PLAYER_COLOR: &str = "red";

    pub const BACKGROUND_COLOR: &str = "coral";
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackConfig {
    pub path_count: usize,
    pub long_side: f64,
    pub short_side: f64,
    pub color: String,
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            path_count: defaults::PATH_COUNT,
            long_side: defaults::LONG_SIDE,
            short_side: defaults::SHORT_SIDE,
            color: defaults::PATH_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius_ratio: f64,
    pub speed: f64,
    pub direction: Direction,
    pub color: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            radius_ratio: defaults::PLAYER_RADIUS_RATIO,
            speed: defaults::PLAYER_SPEED,
            direction: Direction::AlongX,
            color: defaults::PLAYER_COLOR.to_string(),
        }
    }
}

/// Shape of `config.json`, every field optional
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub track: TrackConfig,
    pub player: PlayerConfig,
    pub background_color: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            track: TrackConfig::default(),
            player: PlayerConfig::default(),
            background_color: defaults::BACKGROUND_COLOR.to_string(),
        }
    }
}

impl GameConfig {
    pub const PATH: &'static str = "config.json";

    /// Rejects values that would build a broken corridor
    /// - the corridor needs short_side < long_side to advance at all
    /// - the player disk has to fit inside the corridor
    pub fn validate(&self) -> Result<()> {
        let track = &self.track;
        if track.path_count == 0 {
            return Err(anyhow!("track.path_count must be at least 1"));
        }
        if !(track.short_side > 0.0) {
            return Err(anyhow!("track.short_side must be positive, got {}", track.short_side));
        }
        if !(track.long_side > track.short_side) {
            return Err(anyhow!(
                "track.long_side ({}) must be greater than track.short_side ({})",
                track.long_side,
                track.short_side
            ));
        }
        if !(self.player.radius_ratio > 0.0 && self.player.radius_ratio < 0.5) {
            return Err(anyhow!(
                "player.radius_ratio must be within (0, 0.5), got {}",
                self.player.radius_ratio
            ));
        }
        if !(self.player.speed >= 0.0) {
            return Err(anyhow!("player.speed must not be negative, got {}", self.player.speed));
        }
        Ok(())
    }

    pub fn player_radius(&self) -> f64 {
        self.track.short_side * self.player.radius_ratio
    }

    /// Centre of the first tile's leading square
    pub fn player_start(&self) -> f64 {
        self.track.short_side * defaults::PLAYER_START_RATIO
    }
}
