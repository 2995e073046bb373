//! Error types for reel_carousel

use thiserror::Error;

/// Errors raised while loading or validating a carousel configuration
///
/// Slide transitions never fail: out-of-range requests are resolved by the
/// index policy instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Interval of zero milliseconds
    #[error("Carousel interval must be greater than zero")]
    ZeroInterval,

    /// Direction other than 1 or -1
    #[error("Invalid carousel direction {0}, expected 1 or -1")]
    InvalidDirection(i64),

    /// Malformed TOML
    #[error("Failed to parse carousel config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("Failed to read carousel config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for carousel configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
