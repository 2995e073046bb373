//! Carousel configuration
//!
//! The serializable half of a carousel's options. Callbacks (slide change
//! notification, state reducer) cannot be serialized and are set on the
//! [`CarouselBuilder`](crate::CarouselBuilder) instead.
//!
//! ```toml
//! autoplay = true
//! interval_ms = 2500
//! direction = 1
//! loop = true
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Step applied to the active index on every autoplay tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Direction {
    /// +1
    #[default]
    Forward,
    /// -1
    Backward,
}

impl Direction {
    /// Signed step for this direction
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Backward),
            other => Err(ConfigError::InvalidDirection(other)),
        }
    }
}

impl From<Direction> for i64 {
    fn from(direction: Direction) -> Self {
        direction.step() as i64
    }
}

/// Carousel options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Start ticking at mount (needs at least two slides)
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
    /// Tick period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Step applied on every tick
    #[serde(default)]
    pub direction: Direction,
    /// Wrap around at the ends instead of stopping
    #[serde(default = "default_loop", rename = "loop")]
    pub looping: bool,
}

fn default_autoplay() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    2500
}

fn default_loop() -> bool {
    true
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay: default_autoplay(),
            interval_ms: default_interval_ms(),
            direction: Direction::default(),
            looping: default_loop(),
        }
    }
}

impl CarouselConfig {
    /// Parse and validate a TOML table
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: CarouselConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Reject options the state machine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Tick period
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}
