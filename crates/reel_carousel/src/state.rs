//! Carousel state, proposed changes, and the context handed to descendants

use std::ops::Deref;
use std::time::Duration;

use crate::carousel::CarouselHandle;
use crate::config::{CarouselConfig, Direction};

/// Snapshot of a carousel's state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarouselState {
    /// Number of slides, fixed at construction
    pub slide_count: usize,
    /// Currently visible slide, in `[0, slide_count)` when there are slides
    pub active_slide_index: usize,
    /// Whether autoplay ticks are advancing the carousel
    pub is_playing: bool,
    pub autoplay: bool,
    pub interval: Duration,
    pub direction: Direction,
    pub looping: bool,
}

impl CarouselState {
    /// Initial state for `slide_count` slides
    pub fn new(slide_count: usize, config: &CarouselConfig) -> Self {
        Self {
            slide_count,
            active_slide_index: 0,
            is_playing: config.autoplay,
            autoplay: config.autoplay,
            interval: config.interval(),
            direction: config.direction,
            looping: config.looping,
        }
    }

    /// Whether the slide at `index` is the visible one
    pub fn is_active(&self, index: usize) -> bool {
        index == self.active_slide_index
    }
}

/// What triggered a state update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Explicit `set_active_slide_index` (also `next`/`prev`)
    SetActiveSlide,
    /// Autoplay timer tick
    Tick,
    /// `play()`
    Play,
    /// `stop()`
    Stop,
}

/// A proposed state update
///
/// Every update passes through the carousel's state reducer (if any) as a
/// `StateChange` before it is applied. `None` fields leave the current value
/// alone, so a reducer can block a transition by clearing them. `kind` is only
/// informational and is never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub kind: ChangeKind,
    pub active_slide_index: Option<usize>,
    pub is_playing: Option<bool>,
}

impl StateChange {
    /// An update of the given kind that changes nothing
    pub fn none(kind: ChangeKind) -> Self {
        Self {
            kind,
            active_slide_index: None,
            is_playing: None,
        }
    }

    pub fn set_active_slide(index: usize) -> Self {
        Self::none(ChangeKind::SetActiveSlide).with_active_slide_index(index)
    }

    pub fn tick(index: usize, keep_playing: bool) -> Self {
        Self::none(ChangeKind::Tick)
            .with_active_slide_index(index)
            .with_is_playing(keep_playing)
    }

    pub fn play() -> Self {
        Self::none(ChangeKind::Play).with_is_playing(true)
    }

    pub fn stop() -> Self {
        Self::none(ChangeKind::Stop).with_is_playing(false)
    }

    pub fn with_active_slide_index(mut self, index: usize) -> Self {
        self.active_slide_index = Some(index);
        self
    }

    pub fn with_is_playing(mut self, is_playing: bool) -> Self {
        self.is_playing = Some(is_playing);
        self
    }

    /// Drop every proposed field, keeping the kind
    pub fn blocked(self) -> Self {
        Self::none(self.kind)
    }
}

/// What a carousel passes to its slides, controls and subscribers
///
/// Dereferences to the [`CarouselState`] snapshot and carries a
/// [`CarouselHandle`] for triggering transitions.
#[derive(Clone, Debug)]
pub struct CarouselContext {
    state: CarouselState,
    handle: CarouselHandle,
}

impl CarouselContext {
    pub fn new(state: CarouselState, handle: CarouselHandle) -> Self {
        Self { state, handle }
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn handle(&self) -> &CarouselHandle {
        &self.handle
    }

    /// Jump to `index`; see [`CarouselHandle::set_active_slide_index`]
    pub fn set_active_slide_index(&self, index: isize) {
        self.handle.set_active_slide_index(index);
    }

    pub fn next(&self) {
        self.handle.next();
    }

    pub fn prev(&self) {
        self.handle.prev();
    }

    pub fn play(&self) {
        self.handle.play();
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

impl Deref for CarouselContext {
    type Target = CarouselState;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}
