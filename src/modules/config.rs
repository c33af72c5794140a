use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::grid::{Grid, MIN_GRID_HEIGHT, MIN_GRID_WIDTH};
use crate::modules::session::Mode;
use crate::modules::strategy::Strategy;

/// 800x600 playfield at 20px cells.
pub const DEFAULT_GRID_WIDTH: i32 = 40;
pub const DEFAULT_GRID_HEIGHT: i32 = 30;
/// Roughly 60 frames per second.
pub const DEFAULT_FRAME_MS: u64 = 16;
/// Move delay for a zero-length body; shrinks geometrically as the body grows.
pub const DEFAULT_CADENCE_BASE_MS: u64 = 200;
pub const DEFAULT_CADENCE_DECAY: f64 = 0.90;
/// Fastest the agent is ever allowed to move.
pub const DEFAULT_CADENCE_FLOOR_MS: u64 = 40;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    GridTooSmall { width: i32, height: i32 },
    ZeroFrameInterval,
    InvalidCadence { base_ms: u64, floor_ms: u64, decay: f64 },
    ZeroSearchCap,
    /// A snake needs at least two segments behind its head.
    BodyTooShort { len: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::GridTooSmall { width, height } => write!(
                f,
                "grid {}x{} is too small (minimum {}x{})",
                width, height, MIN_GRID_WIDTH, MIN_GRID_HEIGHT
            ),
            ConfigError::ZeroFrameInterval => write!(f, "frame interval must be greater than 0"),
            ConfigError::InvalidCadence {
                base_ms,
                floor_ms,
                decay,
            } => write!(
                f,
                "invalid cadence: base {}ms, floor {}ms, decay {} (need base >= floor > 0 and 0 < decay < 1)",
                base_ms, floor_ms, decay
            ),
            ConfigError::ZeroSearchCap => write!(f, "search node cap must be greater than 0"),
            ConfigError::BodyTooShort { len } => {
                write!(f, "snake body has {} segments (minimum 2)", len)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub width: i32,
    pub height: i32,
    pub frame_ms: u64,
    pub cadence_base_ms: u64,
    pub cadence_decay: f64,
    pub cadence_floor_ms: u64,
    /// Upper bound on A* node expansions; `None` means one per grid cell.
    pub search_cap: Option<usize>,
    /// Fixed seed for target placement; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub mode: Mode,
    pub strategy: Strategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            frame_ms: DEFAULT_FRAME_MS,
            cadence_base_ms: DEFAULT_CADENCE_BASE_MS,
            cadence_decay: DEFAULT_CADENCE_DECAY,
            cadence_floor_ms: DEFAULT_CADENCE_FLOOR_MS,
            search_cap: None,
            seed: None,
            mode: Mode::Autonomous,
            strategy: Strategy::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<Grid, ConfigError> {
        let grid = Grid::new(self.width, self.height)?;
        if self.frame_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        let decay_ok = self.cadence_decay > 0.0 && self.cadence_decay < 1.0;
        if self.cadence_floor_ms == 0 || self.cadence_base_ms < self.cadence_floor_ms || !decay_ok
        {
            return Err(ConfigError::InvalidCadence {
                base_ms: self.cadence_base_ms,
                floor_ms: self.cadence_floor_ms,
                decay: self.cadence_decay,
            });
        }
        if self.search_cap == Some(0) {
            return Err(ConfigError::ZeroSearchCap);
        }
        Ok(grid)
    }

    pub fn search_cap_for(&self, grid: &Grid) -> usize {
        self.search_cap.unwrap_or_else(|| grid.cell_count())
    }

    /// Move delay for a body of `body_len` segments: `max(floor, base * decay^len)`.
    pub fn cadence_ms(&self, body_len: usize) -> u64 {
        let exponent = i32::try_from(body_len).unwrap_or(i32::MAX);
        let scaled = self.cadence_base_ms as f64 * self.cadence_decay.powi(exponent);
        (scaled as u64).max(self.cadence_floor_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let grid = SessionConfig::default().validate().unwrap();
        assert_eq!(grid.width(), DEFAULT_GRID_WIDTH);
        assert_eq!(grid.height(), DEFAULT_GRID_HEIGHT);
        assert_eq!(
            SessionConfig::default().search_cap_for(&grid),
            (DEFAULT_GRID_WIDTH * DEFAULT_GRID_HEIGHT) as usize
        );
    }

    #[test]
    fn cadence_speeds_up_until_the_floor() {
        let config = SessionConfig::default();
        assert_eq!(config.cadence_ms(0), 200);
        assert_eq!(config.cadence_ms(2), 162);

        let mut previous = config.cadence_ms(0);
        let mut len = 1;
        while previous > config.cadence_floor_ms {
            let next = config.cadence_ms(len);
            assert!(next < previous, "cadence must shrink at len {}", len);
            previous = next;
            len += 1;
        }
        assert_eq!(config.cadence_ms(len + 100), DEFAULT_CADENCE_FLOOR_MS);
        assert_eq!(config.cadence_ms(usize::MAX), DEFAULT_CADENCE_FLOOR_MS);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_frame = SessionConfig {
            frame_ms: 0,
            ..SessionConfig::default()
        };
        assert_eq!(zero_frame.validate(), Err(ConfigError::ZeroFrameInterval));

        let flat_cadence = SessionConfig {
            cadence_decay: 1.0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            flat_cadence.validate(),
            Err(ConfigError::InvalidCadence { .. })
        ));

        let no_search = SessionConfig {
            search_cap: Some(0),
            ..SessionConfig::default()
        };
        assert_eq!(no_search.validate(), Err(ConfigError::ZeroSearchCap));

        let tiny = SessionConfig {
            width: 2,
            ..SessionConfig::default()
        };
        assert!(tiny.validate().unwrap_err().to_string().contains("too small"));
    }
}
