//! Carousel - slide selection state machine with an autoplay timer
//!
//! The carousel owns the active slide index and the playing flag. Slides and
//! controls never mutate it directly: they read a [`CarouselContext`] snapshot
//! and call back through a [`CarouselHandle`], which funnels every transition
//! into one mutex-guarded update path.
//!
//! # Example
//!
//! ```ignore
//! use reel_carousel::prelude::*;
//!
//! let carousel = Carousel::builder()
//!     .slide("foo".to_string())
//!     .slide("bar".to_string())
//!     .control(|ctx| format!("{} / {}", ctx.active_slide_index + 1, ctx.slide_count))
//!     .on_slide_change(|index| tracing::info!("now showing {index}"))
//!     .build();
//!
//! carousel.mount(Arc::new(IntervalTimer::new()));
//! let frame = carousel.render(); // ["foo", "1 / 2"]
//! ```
//!
//! # Transitions
//!
//! | call | effect |
//! |---|---|
//! | `set_active_slide_index(i)` | cancel timer, resolve `i`, commit, re-arm if playing |
//! | timer tick | advance by `direction`; at a non-looping end, stop |
//! | `play()` | set playing and arm (no-op if playing) |
//! | `stop()` | cancel and clear playing (no-op if stopped) |
//!
//! Each update attempt passes its [`StateChange`] through the optional state
//! reducer exactly once. A committed update (index or playing flag changed)
//! notifies subscribers; committed index updates from jumps and ticks also call
//! `on_slide_change`.
//!
//! Commits are queued while the carousel is locked and announced afterwards by
//! one thread at a time, so announcements arrive in commit order even when a
//! timer thread and a caller transition concurrently. A transition made while
//! another thread is announcing is delivered by that thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;

use reel_core::store::{Store, SubscriptionHandle};
use reel_core::timer::{TickFn, TimerDriver, TimerId};

use crate::children::{assign_slide_indices, count_slides, Child, SlideIndices};
use crate::config::{CarouselConfig, Direction};
use crate::control::Control;
use crate::index::resolve_index;
use crate::slide::Slide;
use crate::state::{CarouselContext, CarouselState, StateChange};

/// Called with the new active index after a committed slide change
pub type SlideChangeFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Intercepts every state update: `(current, proposed) -> applied`
///
/// Runs while the carousel is locked, so it must not call back into the
/// carousel. A timer driver that fails to arm stops the carousel without
/// consulting the reducer.
pub type StateReducerFn = Arc<dyn Fn(&CarouselState, StateChange) -> StateChange + Send + Sync>;

// ============================================================================
// Internal State
// ============================================================================

struct CarouselInner {
    state: CarouselState,
    /// Armed autoplay timer (at most one)
    timer: Option<TimerId>,
    /// Set at mount, cleared at unmount
    driver: Option<Arc<dyn TimerDriver>>,
    state_reducer: Option<StateReducerFn>,
}

impl CarouselInner {
    /// Run a proposed change through the reducer and apply it
    fn apply(&mut self, proposed: StateChange) {
        let change = match &self.state_reducer {
            Some(reducer) => reducer(&self.state, proposed),
            None => proposed,
        };

        if let Some(index) = change.active_slide_index {
            if index < self.state.slide_count {
                self.state.active_slide_index = index;
            } else if self.state.slide_count > 0 {
                tracing::warn!(
                    "Carousel: discarding out-of-range index {} ({} slides)",
                    index,
                    self.state.slide_count
                );
            }
        }
        if let Some(is_playing) = change.is_playing {
            self.state.is_playing = is_playing;
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            if let Some(driver) = &self.driver {
                driver.cancel(id);
            }
            tracing::trace!("Carousel: canceled timer {:?}", id);
        }
    }

    fn arm_timer(&mut self, shared: &Weak<Shared>) {
        if self.timer.is_some() {
            return;
        }
        let Some(driver) = self.driver.clone() else {
            // Not mounted yet; mount() arms
            return;
        };

        let weak = shared.clone();
        let tick: TickFn = Arc::new(move |id| {
            if let Some(shared) = weak.upgrade() {
                shared.tick(id);
            }
        });

        match driver.arm(self.state.interval, tick) {
            Ok(id) => {
                tracing::trace!("Carousel: armed timer {:?}", id);
                self.timer = Some(id);
            }
            Err(err) => {
                tracing::warn!("Carousel: failed to arm autoplay timer: {}", err);
                self.state.is_playing = false;
            }
        }
    }

    /// Make the timer follow the playing flag
    fn sync_timer(&mut self, shared: &Weak<Shared>) {
        if self.state.is_playing {
            self.arm_timer(shared);
        } else {
            self.cancel_timer();
        }
    }
}

/// Result of one update attempt
struct Commit {
    before: CarouselState,
    after: CarouselState,
    /// Call `on_slide_change` if committed
    notify_slide_change: bool,
}

impl Commit {
    fn is_change(&self) -> bool {
        self.before.active_slide_index != self.after.active_slide_index
            || self.before.is_playing != self.after.is_playing
    }
}

/// Commits waiting to be announced, in commit order
#[derive(Default)]
struct Outbox {
    pending: VecDeque<Commit>,
    /// Some thread is delivering `pending`
    draining: bool,
}

/// Releases the outbox if an announcement callback panics
struct DrainGuard<'a> {
    shared: &'a Shared,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.shared.outbox().draining = false;
        }
    }
}

struct Shared {
    inner: Mutex<CarouselInner>,
    outbox: Mutex<Outbox>,
    /// Broadcasts committed states to subscribers
    store: Store<CarouselState>,
    on_slide_change: Option<SlideChangeFn>,
    /// Back-reference handed to timers and handles
    this: Weak<Shared>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CarouselInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self) -> CarouselHandle {
        CarouselHandle {
            shared: self.this.clone(),
        }
    }

    /// Queue a commit for announcement. Called with the carousel locked.
    fn post(&self, commit: Commit) {
        if commit.is_change() {
            self.outbox().pending.push_back(commit);
        }
    }

    /// Announce queued commits unless another thread already is
    fn flush(&self) {
        {
            let mut outbox = self.outbox();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }

        let _guard = DrainGuard { shared: self };
        loop {
            let commit = {
                let mut outbox = self.outbox();
                match outbox.pending.pop_front() {
                    Some(commit) => commit,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };
            self.announce(commit);
        }
    }

    /// Runs with the carousel unlocked
    fn announce(&self, commit: Commit) {
        tracing::debug!(
            "Carousel: slide {} -> {}, playing {} -> {}",
            commit.before.active_slide_index,
            commit.after.active_slide_index,
            commit.before.is_playing,
            commit.after.is_playing
        );

        let index = commit.after.active_slide_index;
        self.store.set(commit.after);

        if commit.notify_slide_change {
            if let Some(on_slide_change) = &self.on_slide_change {
                on_slide_change(index);
            }
        }
    }

    fn set_active_slide_index_with<F>(&self, requested: F)
    where
        F: FnOnce(&CarouselState) -> isize,
    {
        {
            let mut inner = self.lock();
            inner.cancel_timer();

            let before = inner.state.clone();
            let index = resolve_index(
                requested(&before),
                before.active_slide_index,
                before.slide_count,
                before.looping,
            );
            inner.apply(StateChange::set_active_slide(index));
            inner.sync_timer(&self.this);

            self.post(Commit {
                before,
                after: inner.state.clone(),
                notify_slide_change: true,
            });
        }
        self.flush();
    }

    fn tick(&self, id: TimerId) {
        {
            let mut inner = self.lock();
            if inner.timer != Some(id) {
                tracing::trace!("Carousel: ignoring tick from stale timer {:?}", id);
                return;
            }
            if !inner.state.is_playing {
                return;
            }

            let before = inner.state.clone();
            let current = before.active_slide_index;
            let next = resolve_index(
                current as isize + before.direction.step(),
                current,
                before.slide_count,
                before.looping,
            );
            tracing::trace!("Carousel: tick {} -> {}", current, next);

            // Reaching a non-looping end commits the same index and stops
            inner.apply(StateChange::tick(next, next != current));
            inner.sync_timer(&self.this);

            self.post(Commit {
                before,
                after: inner.state.clone(),
                notify_slide_change: true,
            });
        }
        self.flush();
    }

    fn play(&self) {
        {
            let mut inner = self.lock();
            if inner.state.is_playing {
                return;
            }

            let before = inner.state.clone();
            inner.apply(StateChange::play());
            inner.sync_timer(&self.this);

            self.post(Commit {
                before,
                after: inner.state.clone(),
                notify_slide_change: false,
            });
        }
        self.flush();
    }

    fn stop(&self) {
        {
            let mut inner = self.lock();
            if !inner.state.is_playing {
                return;
            }

            inner.cancel_timer();
            let before = inner.state.clone();
            inner.apply(StateChange::stop());
            inner.sync_timer(&self.this);

            self.post(Commit {
                before,
                after: inner.state.clone(),
                notify_slide_change: false,
            });
        }
        self.flush();
    }

    fn mount(&self, driver: Arc<dyn TimerDriver>) {
        {
            let mut inner = self.lock();
            if inner.driver.is_some() {
                tracing::debug!("Carousel: already mounted");
                return;
            }
            inner.driver = Some(driver);

            let before = inner.state.clone();
            if inner.state.is_playing {
                if inner.state.slide_count >= 2 {
                    inner.arm_timer(&self.this);
                } else {
                    // Nothing to cycle through
                    inner.apply(StateChange::stop());
                    if inner.state.is_playing {
                        tracing::warn!(
                            "Carousel: cannot keep playing with {} slide(s)",
                            inner.state.slide_count
                        );
                        inner.state.is_playing = false;
                    }
                }
            }

            self.post(Commit {
                before,
                after: inner.state.clone(),
                notify_slide_change: false,
            });
        }
        self.flush();
    }

    fn unmount(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.driver = None;
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Control surface for a carousel
///
/// Cheap to clone and safe to move into callbacks. Holds a weak reference, so
/// once the carousel is dropped every method is a no-op.
#[derive(Clone)]
pub struct CarouselHandle {
    shared: Weak<Shared>,
}

impl CarouselHandle {
    /// Jump to `index`
    ///
    /// Negative indices select the last slide. Indices past the end select the
    /// first slide when looping and are ignored otherwise. Restarts the
    /// autoplay interval if playing.
    pub fn set_active_slide_index(&self, index: isize) {
        if let Some(shared) = self.shared.upgrade() {
            shared.set_active_slide_index_with(|_| index);
        }
    }

    /// Jump one slide in the configured direction
    pub fn next(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.set_active_slide_index_with(|state| {
                state.active_slide_index as isize + state.direction.step()
            });
        }
    }

    /// Jump one slide against the configured direction
    pub fn prev(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.set_active_slide_index_with(|state| {
                state.active_slide_index as isize - state.direction.step()
            });
        }
    }

    /// Resume autoplay
    pub fn play(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.play();
        }
    }

    /// Pause autoplay
    pub fn stop(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.stop();
        }
    }

    /// Current state, or `None` if the carousel is gone
    pub fn state(&self) -> Option<CarouselState> {
        self.shared
            .upgrade()
            .map(|shared| shared.lock().state.clone())
    }

    /// Whether the carousel still exists
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

impl std::fmt::Debug for CarouselHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ============================================================================
// Carousel
// ============================================================================

/// A carousel over children rendering to `R`
///
/// The slide count is fixed from the children given at construction. Timers
/// are only armed once a [`TimerDriver`] is attached with [`Carousel::mount`];
/// dropping the carousel cancels its timer.
pub struct Carousel<R> {
    shared: Arc<Shared>,
    children: Vec<Child<R>>,
}

impl<R> Carousel<R> {
    /// Create a carousel with default callbacks (none)
    pub fn new(children: Vec<Child<R>>, config: CarouselConfig) -> Self {
        Self::from_parts(children, config, None, None)
    }

    pub fn builder() -> CarouselBuilder<R> {
        CarouselBuilder::new()
    }

    fn from_parts(
        children: Vec<Child<R>>,
        config: CarouselConfig,
        on_slide_change: Option<SlideChangeFn>,
        state_reducer: Option<StateReducerFn>,
    ) -> Self {
        let state = CarouselState::new(count_slides(&children), &config);
        tracing::debug!(
            "Carousel: created with {} slides (autoplay={}, interval={:?})",
            state.slide_count,
            state.autoplay,
            state.interval
        );

        let shared = Arc::new_cyclic(|this| Shared {
            inner: Mutex::new(CarouselInner {
                state: state.clone(),
                timer: None,
                driver: None,
                state_reducer,
            }),
            outbox: Mutex::new(Outbox::default()),
            store: Store::new(state),
            on_slide_change,
            this: this.clone(),
        });

        Self { shared, children }
    }

    /// Attach a timer driver and start autoplay if configured
    ///
    /// Autoplay arms only with at least two slides; otherwise the carousel
    /// stops playing. Mounting twice is a no-op.
    pub fn mount(&self, driver: Arc<dyn TimerDriver>) {
        self.shared.mount(driver);
    }

    /// Cancel the timer and detach the driver
    ///
    /// Transitions keep working afterwards but nothing ticks.
    pub fn unmount(&self) {
        self.shared.unmount();
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.lock().driver.is_some()
    }

    /// Whether an autoplay timer is currently armed
    pub fn has_armed_timer(&self) -> bool {
        self.shared.lock().timer.is_some()
    }

    pub fn handle(&self) -> CarouselHandle {
        self.shared.handle()
    }

    pub fn state(&self) -> CarouselState {
        self.shared.lock().state.clone()
    }

    pub fn context(&self) -> CarouselContext {
        CarouselContext::new(self.state(), self.handle())
    }

    /// Subscribe to committed state changes
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&CarouselContext) + Send + Sync + 'static,
    {
        let handle = self.handle();
        self.shared.store.subscribe(move |state: &CarouselState| {
            callback(&CarouselContext::new(state.clone(), handle.clone()));
        })
    }

    pub fn unsubscribe(&self, subscription: &SubscriptionHandle) -> bool {
        self.shared.store.unsubscribe(subscription)
    }

    pub fn set_active_slide_index(&self, index: isize) {
        self.shared.set_active_slide_index_with(|_| index);
    }

    pub fn next(&self) {
        self.handle().next();
    }

    pub fn prev(&self) {
        self.handle().prev();
    }

    pub fn play(&self) {
        self.shared.play();
    }

    pub fn stop(&self) {
        self.shared.stop();
    }

    pub fn children(&self) -> &[Child<R>] {
        &self.children
    }

    /// Replace the children
    ///
    /// Slide indices are re-derived on the next render. The slide count stays
    /// what it was at construction.
    pub fn set_children(&mut self, children: Vec<Child<R>>) {
        let slides = count_slides(&children);
        let slide_count = self.shared.lock().state.slide_count;
        if slides != slide_count {
            tracing::warn!(
                "Carousel: children now hold {} slides, slide count stays {}",
                slides,
                slide_count
            );
        }
        self.children = children;
    }

    /// Slide index of each child, recomputed from the current order
    pub fn slide_indices(&self) -> SlideIndices {
        assign_slide_indices(&self.children)
    }
}

impl<R: Clone> Carousel<R> {
    /// Render the children in order
    ///
    /// Only the active slide renders; controls and other nodes always do.
    pub fn render(&self) -> Vec<R> {
        let ctx = self.context();
        let indices = assign_slide_indices(&self.children);

        self.children
            .iter()
            .zip(indices)
            .filter_map(|(child, index)| match (child, index) {
                (Child::Slide(slide), Some(index)) => slide.render(index, &ctx),
                (Child::Slide(_), None) => None,
                (Child::Control(control), _) => Some(control.render(&ctx)),
                (Child::Node(node), _) => Some(node.clone()),
            })
            .collect()
    }

    /// Render the children into a single container
    pub fn render_as<F>(&self, container: F) -> R
    where
        F: FnOnce(Vec<R>) -> R,
    {
        container(self.render())
    }
}

impl<R> Drop for Carousel<R> {
    fn drop(&mut self) {
        self.shared.unmount();
    }
}

impl<R> std::fmt::Debug for Carousel<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("state", &self.state())
            .field("children", &self.children.len())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Carousel`]
pub struct CarouselBuilder<R> {
    children: Vec<Child<R>>,
    config: CarouselConfig,
    on_slide_change: Option<SlideChangeFn>,
    state_reducer: Option<StateReducerFn>,
}

impl<R> CarouselBuilder<R> {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            config: CarouselConfig::default(),
            on_slide_change: None,
            state_reducer: None,
        }
    }

    pub fn child(mut self, child: impl Into<Child<R>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Child<R>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Add a slide with static content
    pub fn slide(self, content: R) -> Self {
        self.child(Slide::new(content))
    }

    /// Add a control rendered from the carousel context
    pub fn control<F>(self, render: F) -> Self
    where
        F: Fn(&CarouselContext) -> R + Send + Sync + 'static,
    {
        self.child(Control::new(render))
    }

    /// Add a non-slide node
    pub fn node(self, node: R) -> Self {
        self.child(Child::Node(node))
    }

    pub fn config(mut self, config: CarouselConfig) -> Self {
        self.config = config;
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.config.autoplay = autoplay;
        self
    }

    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.interval_ms = interval_ms;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.config.direction = direction;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.config.looping = looping;
        self
    }

    pub fn on_slide_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_slide_change = Some(Arc::new(callback));
        self
    }

    pub fn state_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&CarouselState, StateChange) -> StateChange + Send + Sync + 'static,
    {
        self.state_reducer = Some(Arc::new(reducer));
        self
    }

    pub fn build(self) -> Carousel<R> {
        Carousel::from_parts(
            self.children,
            self.config,
            self.on_slide_change,
            self.state_reducer,
        )
    }
}

impl<R> Default for CarouselBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
