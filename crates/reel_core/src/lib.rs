//! Reel Core Runtime
//!
//! Foundational primitives shared by Reel components:
//!
//! - **Stores**: observable values with explicit subscriptions, used to
//!   broadcast component state to descendants without implicit context
//! - **Timers**: a [`TimerDriver`] abstraction with a deterministic
//!   [`ManualTimer`], a thread-backed [`IntervalTimer`] and, behind the
//!   `tokio` feature, a runtime-backed `TokioTimer`
//!
//! # Example
//!
//! ```rust
//! use reel_core::store::Store;
//!
//! let store = Store::new(0i32);
//! let handle = store.subscribe(|value| println!("now {value}"));
//!
//! store.set(5);
//! assert_eq!(store.get(), 5);
//!
//! store.unsubscribe(&handle);
//! ```

pub mod store;
pub mod timer;

#[cfg(feature = "tokio")]
pub mod tokio_timer;

pub use store::{Store, SubscriptionHandle};
pub use timer::{IntervalTimer, ManualTimer, TickFn, TimerDriver, TimerError, TimerId};

#[cfg(feature = "tokio")]
pub use tokio_timer::TokioTimer;
