//! Timer driver backed by a tokio runtime

use crate::timer::{Result, TickFn, TimerDriver, TimerError, TimerId};
use slotmap::SlotMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Runs each armed timer as a task on a tokio runtime
///
/// Canceling aborts the task. The runtime needs the `time` driver enabled.
pub struct TokioTimer {
    runtime: Handle,
    tasks: Mutex<SlotMap<TimerId, Option<AbortHandle>>>,
}

impl TokioTimer {
    /// Schedule timers on the given runtime
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tasks: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Schedule timers on the runtime of the calling context
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|err| TimerError::NoRuntime(err.to_string()))
    }

    /// Number of timers currently armed
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl TimerDriver for TokioTimer {
    fn arm(&self, period: Duration, tick: TickFn) -> Result<TimerId> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let id = tasks.insert(None);

        let task = self.runtime.spawn(async move {
            // interval() would fire immediately; the first tick is one period out
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick(id);
            }
        });

        if let Some(slot) = tasks.get_mut(id) {
            *slot = Some(task.abort_handle());
        }
        tracing::trace!("TokioTimer: armed {:?} every {:?}", id, period);
        Ok(id)
    }

    fn cancel(&self, id: TimerId) {
        let removed = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        if let Some(Some(abort)) = removed {
            abort.abort();
            tracing::trace!("TokioTimer: canceled {:?}", id);
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, abort) in tasks.drain() {
            if let Some(abort) = abort {
                abort.abort();
            }
        }
    }
}
