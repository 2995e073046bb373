//! # Reel Carousel
//!
//! A carousel (slideshow) component: cycles through slides on a timer or on
//! demand and hands its state plus control functions to caller-rendered UI.
//!
//! - **[`Carousel`]**: owns the active slide index and the autoplay timer
//! - **[`Slide`]**: renders only while its index is the active one
//! - **[`Control`]**: render-prop child receiving the full [`CarouselContext`]
//!
//! Rendering is generic over the output type `R`; the carousel only decides
//! which children appear.
//!
//! ## Example
//!
//! ```ignore
//! use reel_carousel::prelude::*;
//!
//! let carousel = Carousel::builder()
//!     .slide("foo".to_string())
//!     .slide("bar".to_string())
//!     .control(|ctx| format!("{}/{}", ctx.active_slide_index + 1, ctx.slide_count))
//!     .build();
//!
//! let timer = Arc::new(ManualTimer::new());
//! carousel.mount(timer.clone());
//!
//! assert_eq!(carousel.render(), vec!["foo", "1/2"]);
//! timer.run_only_pending();
//! assert_eq!(carousel.render(), vec!["bar", "2/2"]);
//! ```

pub mod carousel;
pub mod children;
pub mod config;
pub mod control;
pub mod error;
pub mod index;
pub mod slide;
pub mod state;

pub use carousel::{Carousel, CarouselBuilder, CarouselHandle, SlideChangeFn, StateReducerFn};
pub use children::{assign_slide_indices, count_slides, Child, SlideIndices};
pub use config::{CarouselConfig, Direction};
pub use control::{control, Control};
pub use error::{ConfigError, Result};
pub use index::resolve_index;
pub use slide::{slide, Slide};
pub use state::{CarouselContext, CarouselState, ChangeKind, StateChange};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        control, slide, Carousel, CarouselBuilder, CarouselConfig, CarouselContext, CarouselHandle,
        CarouselState, ChangeKind, Child, Control, Direction, Slide, StateChange,
    };
    pub use reel_core::timer::{IntervalTimer, ManualTimer, TimerDriver};
    pub use std::sync::Arc;
}
