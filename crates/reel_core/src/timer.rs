//! Periodic timer drivers
//!
//! Components that tick on an interval (autoplaying carousels, blinking
//! cursors) schedule their ticks through a [`TimerDriver`] instead of owning a
//! thread or an event loop themselves. The driver is injected at mount time,
//! which keeps the component logic deterministic under test:
//!
//! - [`ManualTimer`] - nothing fires until the test asks it to
//! - [`IntervalTimer`] - one background thread per armed timer
//! - `TokioTimer` - a task on a tokio runtime (feature `tokio`)
//!
//! Every tick receives the [`TimerId`] it was armed under, so a component can
//! ignore ticks from a timer it has already replaced.

use slotmap::{new_key_type, SlotMap};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use thiserror::Error;

new_key_type! {
    /// Handle to an armed periodic timer
    pub struct TimerId;
}

/// Callback invoked on every tick of a periodic timer
pub type TickFn = Arc<dyn Fn(TimerId) + Send + Sync>;

/// Timer errors
#[derive(Error, Debug)]
pub enum TimerError {
    /// A zero period would tick continuously
    #[error("Timer period must be non-zero")]
    ZeroPeriod,

    /// The background thread could not be started
    #[error("Failed to spawn timer thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// No async runtime to schedule the timer on
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}

/// Result type for timer operations
pub type Result<T> = std::result::Result<T, TimerError>;

/// Schedules recurring ticks
pub trait TimerDriver: Send + Sync {
    /// Start a recurring timer firing every `period`
    ///
    /// The first tick happens one full period after arming.
    fn arm(&self, period: Duration, tick: TickFn) -> Result<TimerId>;

    /// Cancel a timer. Unknown or already canceled ids are ignored.
    fn cancel(&self, id: TimerId);
}

fn check_period(period: Duration) -> Result<()> {
    if period.is_zero() {
        return Err(TimerError::ZeroPeriod);
    }
    Ok(())
}

// ============================================================================
// Manual Timer
// ============================================================================

struct ManualEntry {
    period: Duration,
    elapsed: Duration,
    tick: TickFn,
}

#[derive(Default)]
struct ManualInner {
    timers: SlotMap<TimerId, ManualEntry>,
    armed: usize,
    canceled: usize,
}

/// A timer driver that only fires when told to
///
/// Time does not pass on its own: call [`ManualTimer::run_only_pending`] to
/// fire every armed timer once, or [`ManualTimer::advance`] to simulate the
/// passage of time. Ticks run on the calling thread with no lock held, so a
/// tick may arm or cancel timers.
///
/// ```ignore
/// let timer = Arc::new(ManualTimer::new());
/// carousel.mount(timer.clone());
///
/// timer.run_only_pending();
/// assert_eq!(carousel.state().active_slide_index, 1);
/// ```
#[derive(Default)]
pub struct ManualTimer {
    inner: Mutex<ManualInner>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every currently armed timer once
    ///
    /// Timers armed by a tick during this call do not fire until the next
    /// call. Returns the number of ticks delivered.
    pub fn run_only_pending(&self) -> usize {
        let pending: Vec<TimerId> = self.lock().timers.keys().collect();

        let mut fired = 0;
        for id in pending {
            let tick = {
                let mut inner = self.lock();
                inner.timers.get_mut(id).map(|entry| {
                    entry.elapsed = Duration::ZERO;
                    entry.tick.clone()
                })
            };
            // A previous tick in this pass may have canceled it
            if let Some(tick) = tick {
                tick(id);
                fired += 1;
            }
        }
        fired
    }

    /// Simulate `by` of elapsed time, firing timers as their periods complete
    ///
    /// Returns the number of ticks delivered.
    pub fn advance(&self, by: Duration) -> usize {
        let mut remaining = by;
        let mut fired = 0;

        loop {
            let next = {
                let inner = self.lock();
                inner
                    .timers
                    .iter()
                    .map(|(id, entry)| (id, entry.period.saturating_sub(entry.elapsed)))
                    .min_by_key(|(_, due)| *due)
            };

            let Some((id, due)) = next else {
                break;
            };

            if due > remaining {
                let mut inner = self.lock();
                for entry in inner.timers.values_mut() {
                    entry.elapsed += remaining;
                }
                break;
            }

            remaining -= due;
            let tick = {
                let mut inner = self.lock();
                for (timer_id, entry) in inner.timers.iter_mut() {
                    if timer_id == id {
                        entry.elapsed = Duration::ZERO;
                    } else {
                        entry.elapsed += due;
                    }
                }
                inner.timers.get(id).map(|entry| entry.tick.clone())
            };

            if let Some(tick) = tick {
                tick(id);
                fired += 1;
            }
        }

        fired
    }

    /// Whether `id` is still armed
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.lock().timers.contains_key(id)
    }

    /// Number of timers currently armed
    pub fn active_count(&self) -> usize {
        self.lock().timers.len()
    }

    /// Total number of successful `arm` calls
    pub fn armed_count(&self) -> usize {
        self.lock().armed
    }

    /// Total number of `cancel` calls that removed a live timer
    pub fn canceled_count(&self) -> usize {
        self.lock().canceled
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TimerDriver for ManualTimer {
    fn arm(&self, period: Duration, tick: TickFn) -> Result<TimerId> {
        check_period(period)?;
        let mut inner = self.lock();
        inner.armed += 1;
        Ok(inner.timers.insert(ManualEntry {
            period,
            elapsed: Duration::ZERO,
            tick,
        }))
    }

    fn cancel(&self, id: TimerId) {
        let mut inner = self.lock();
        if inner.timers.remove(id).is_some() {
            inner.canceled += 1;
        }
    }
}

// ============================================================================
// Interval Timer (background threads)
// ============================================================================

/// A timer driver backed by one background thread per armed timer
///
/// Each thread waits on a channel with a timeout of one period; a timeout is a
/// tick. Canceling drops the sending half, which wakes the thread and makes it
/// exit. Threads are never joined, since a tick may cancel its own timer.
pub struct IntervalTimer {
    stops: Mutex<SlotMap<TimerId, Sender<()>>>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self {
            stops: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Number of timers currently armed
    pub fn active_count(&self) -> usize {
        self.stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerDriver for IntervalTimer {
    fn arm(&self, period: Duration, tick: TickFn) -> Result<TimerId> {
        check_period(period)?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let id = self
            .stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stop_tx);

        let spawned = thread::Builder::new()
            .name("reel-timer".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => tick(id),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        match spawned {
            Ok(_) => {
                tracing::trace!("IntervalTimer: armed {:?} every {:?}", id, period);
                Ok(id)
            }
            Err(err) => {
                self.stops
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(id);
                Err(TimerError::Spawn(err))
            }
        }
    }

    fn cancel(&self, id: TimerId) {
        let removed = self
            .stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            tracing::trace!("IntervalTimer: canceled {:?}", id);
        }
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_tick() -> (TickFn, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let tick: TickFn = Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (tick, count)
    }

    #[test]
    fn test_zero_period_rejected() {
        let timer = ManualTimer::new();
        let (tick, _) = counting_tick();
        assert!(matches!(
            timer.arm(Duration::ZERO, tick),
            Err(TimerError::ZeroPeriod)
        ));
        assert_eq!(timer.armed_count(), 0);
    }

    #[test]
    fn test_manual_run_only_pending() {
        let timer = ManualTimer::new();
        let (tick, count) = counting_tick();
        let id = timer.arm(Duration::from_millis(100), tick).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(timer.run_only_pending(), 1);
        assert_eq!(timer.run_only_pending(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);

        timer.cancel(id);
        assert_eq!(timer.run_only_pending(), 0);
        assert_eq!(timer.canceled_count(), 1);

        // Canceling twice only counts once
        timer.cancel(id);
        assert_eq!(timer.canceled_count(), 1);
    }

    #[test]
    fn test_manual_advance() {
        let timer = ManualTimer::new();
        let (fast, fast_count) = counting_tick();
        let (slow, slow_count) = counting_tick();
        timer.arm(Duration::from_millis(100), fast).unwrap();
        timer.arm(Duration::from_millis(250), slow).unwrap();

        assert_eq!(timer.advance(Duration::from_millis(99)), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
        assert_eq!(fast_count.load(Ordering::SeqCst), 1);

        assert_eq!(timer.advance(Duration::from_millis(400)), 6);
        assert_eq!(fast_count.load(Ordering::SeqCst), 5);
        assert_eq!(slow_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_manual_tick_can_cancel_itself() {
        let timer = Arc::new(ManualTimer::new());
        let timer_clone = timer.clone();
        let tick: TickFn = Arc::new(move |id| timer_clone.cancel(id));

        let id = timer.arm(Duration::from_millis(10), tick).unwrap();
        assert_eq!(timer.advance(Duration::from_millis(100)), 1);
        assert!(!timer.is_armed(id));
        assert_eq!(timer.active_count(), 0);
    }

    #[test]
    fn test_interval_timer_ticks_and_cancels() {
        let timer = IntervalTimer::new();
        let (tick, count) = counting_tick();
        let id = timer.arm(Duration::from_millis(5), tick).unwrap();
        assert_eq!(timer.active_count(), 1);

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while count.load(Ordering::SeqCst) < 2 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(count.load(Ordering::SeqCst) >= 2);

        timer.cancel(id);
        assert_eq!(timer.active_count(), 0);

        // Allow an in-flight tick to land, then make sure ticking stopped
        thread::sleep(Duration::from_millis(30));
        let settled = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), settled);
    }
}
