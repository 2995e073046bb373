//! Scripted commands for `reel step`

use anyhow::{Context, Result};
use reel_carousel::prelude::*;
use std::fmt;
use std::str::FromStr;

/// One scripted interaction with a carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    /// Fire the pending autoplay tick, if any
    Tick,
    Next,
    Prev,
    /// Jump to an index (may be negative or out of range)
    Goto(isize),
    Play,
    Stop,
}

impl StepCommand {
    pub fn apply(self, carousel: &Carousel<String>, timer: &ManualTimer) {
        match self {
            StepCommand::Tick => {
                let fired = timer.run_only_pending();
                tracing::debug!("Fired {} pending tick(s)", fired);
            }
            StepCommand::Next => carousel.next(),
            StepCommand::Prev => carousel.prev(),
            StepCommand::Goto(index) => carousel.set_active_slide_index(index),
            StepCommand::Play => carousel.play(),
            StepCommand::Stop => carousel.stop(),
        }
    }
}

impl FromStr for StepCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let command = match s {
            "tick" => StepCommand::Tick,
            "next" => StepCommand::Next,
            "prev" => StepCommand::Prev,
            "play" => StepCommand::Play,
            "stop" => StepCommand::Stop,
            other => {
                let Some(index) = other.strip_prefix("goto:") else {
                    anyhow::bail!(
                        "Unknown command '{}'. Valid commands: tick, next, prev, goto:<i>, play, stop",
                        other
                    );
                };
                let index = index
                    .parse()
                    .with_context(|| format!("Invalid slide index in '{}'", other))?;
                StepCommand::Goto(index)
            }
        };
        Ok(command)
    }
}

impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepCommand::Tick => write!(f, "tick"),
            StepCommand::Next => write!(f, "next"),
            StepCommand::Prev => write!(f, "prev"),
            StepCommand::Goto(index) => write!(f, "goto:{}", index),
            StepCommand::Play => write!(f, "play"),
            StepCommand::Stop => write!(f, "stop"),
        }
    }
}

/// Parse every command up front so a typo fails before anything runs
pub fn parse_commands(commands: &[String]) -> Result<Vec<StepCommand>> {
    commands.iter().map(|command| command.parse()).collect()
}
