//! Reel deck files
//!
//! A deck is a TOML file holding carousel options and the slides to show:
//!
//! ```toml
//! [carousel]
//! autoplay = true
//! interval_ms = 1500
//! direction = 1
//! loop = true
//!
//! [[slides]]
//! text = "hello"
//! ```

use anyhow::{Context, Result};
use reel_carousel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A carousel configuration plus its slides
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReelDeck {
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub slides: Vec<SlideConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlideConfig {
    pub text: String,
}

impl ReelDeck {
    /// Load and validate a deck file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let deck: ReelDeck = toml::from_str(content).context("Failed to parse deck")?;
        deck.carousel
            .validate()
            .context("Invalid [carousel] table")?;
        Ok(deck)
    }

    /// Combine an optional deck file with slides given on the command line
    pub fn resolve(path: Option<&Path>, extra_slides: &[String]) -> Result<Self> {
        let mut deck = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        deck.slides.extend(extra_slides.iter().map(|text| SlideConfig {
            text: text.clone(),
        }));

        if deck.slides.is_empty() {
            anyhow::bail!("No slides to show. Pass --slide TEXT or a deck with [[slides]].");
        }

        Ok(deck)
    }

    /// Build a text carousel with a status control after the slides
    pub fn build<F>(&self, on_slide_change: F) -> Carousel<String>
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        Carousel::builder()
            .config(self.carousel.clone())
            .children(
                self.slides
                    .iter()
                    .map(|slide_config| Child::Slide(Slide::new(slide_config.text.clone()))),
            )
            .control(status)
            .on_slide_change(on_slide_change)
            .build()
    }
}

fn status(ctx: &CarouselContext) -> String {
    format!(
        "[{}/{} {}]",
        ctx.active_slide_index + 1,
        ctx.slide_count,
        if ctx.is_playing { "playing" } else { "paused" }
    )
}

/// One terminal line for the carousel's current render
pub fn frame(carousel: &Carousel<String>) -> String {
    carousel.render().join("  ")
}
