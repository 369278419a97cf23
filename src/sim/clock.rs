//! Cancelable one-shot and recurring tasks on an externally driven clock.
//!
//! Tasks are plain values handed back by [`Scheduler::next_due`]; the owner
//! dispatches them itself. Nothing here reads the wall clock: the game loop
//! feeds measured elapsed time into `advance`, tests feed whatever they like.
//!
//! Dispatch loop:
//! ```ignore
//! clock.advance(elapsed);
//! while let Some(task) = clock.next_due() {
//!     handle(task); // may schedule or cancel further tasks
//! }
//! ```

use std::time::Duration;

/// Identifies a scheduled task for cancellation and queries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TaskHandle(u64);

pub trait Scheduler {
    type Task;

    /// Current clock time since creation.
    fn now(&self) -> Duration;

    fn schedule_once(&mut self, delay: Duration, task: Self::Task) -> TaskHandle;

    /// First run happens one `period` from now.
    fn schedule_every(&mut self, period: Duration, task: Self::Task) -> TaskHandle;

    /// Returns false if the task already fired (one-shot) or was never known.
    fn cancel(&mut self, handle: TaskHandle) -> bool;

    /// Time until the task's next run, if it is still pending.
    fn remaining(&self, handle: TaskHandle) -> Option<Duration>;

    /// Move the horizon forward. Due tasks are collected with `next_due`.
    fn advance(&mut self, elapsed: Duration);

    /// Pop the earliest task due at or before the horizon.
    fn next_due(&mut self) -> Option<Self::Task>;
}

#[derive(Debug)]
struct Entry<T> {
    handle: TaskHandle,
    due: Duration,
    period: Option<Duration>,
    task: T,
}

/// Manually advanced clock.
#[derive(Debug)]
pub struct VirtualClock<T> {
    now: Duration,
    horizon: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

/// Recurring tasks never run faster than this, so a zero period cannot
/// spin `next_due` forever.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl<T> VirtualClock<T> {
    pub fn new() -> Self {
        VirtualClock {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, task: T) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.entries.push(Entry { handle, due: self.now + delay, period, task });
        handle
    }
}

impl<T> Default for VirtualClock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler for VirtualClock<T> {
    type Task = T;

    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration, task: T) -> TaskHandle {
        self.push(delay, None, task)
    }

    fn schedule_every(&mut self, period: Duration, task: T) -> TaskHandle {
        let period = period.max(MIN_PERIOD);
        self.push(period, Some(period), task)
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    fn remaining(&self, handle: TaskHandle) -> Option<Duration> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.due.saturating_sub(self.now))
    }

    fn advance(&mut self, elapsed: Duration) {
        self.horizon = self.horizon.max(self.now) + elapsed;
    }

    fn next_due(&mut self) -> Option<T> {
        // Earliest due first; ties go to the task scheduled first.
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= self.horizon)
            .min_by_key(|(_, e)| (e.due, e.handle.0))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now = self.horizon;
            return None;
        };

        let entry = &mut self.entries[idx];
        self.now = entry.due;
        match entry.period {
            Some(period) => {
                entry.due += period;
                Some(entry.task.clone())
            }
            None => Some(self.entries.swap_remove(idx).task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn drain(clock: &mut VirtualClock<&'static str>) -> Vec<&'static str> {
        std::iter::from_fn(|| clock.next_due()).collect()
    }

    #[test]
    fn one_shot_fires_once_when_due() {
        let mut c = VirtualClock::new();
        c.schedule_once(secs(10), "lockout");
        c.advance(secs(9));
        assert!(drain(&mut c).is_empty());
        c.advance(secs(1));
        assert_eq!(drain(&mut c), vec!["lockout"]);
        c.advance(secs(100));
        assert!(drain(&mut c).is_empty());
    }

    #[test]
    fn recurring_fires_every_period_across_a_large_step() {
        let mut c = VirtualClock::new();
        c.schedule_every(secs(1), "tick");
        c.advance(secs(5));
        assert_eq!(drain(&mut c).len(), 5);
        assert_eq!(c.now(), secs(5));
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut c = VirtualClock::new();
        let h = c.schedule_once(secs(1), "restart");
        assert!(c.cancel(h));
        assert!(!c.cancel(h));
        c.advance(secs(2));
        assert!(drain(&mut c).is_empty());
    }

    #[test]
    fn fired_one_shot_cannot_be_cancelled() {
        let mut c = VirtualClock::new();
        let h = c.schedule_once(secs(1), "x");
        c.advance(secs(1));
        assert_eq!(drain(&mut c), vec!["x"]);
        assert!(!c.cancel(h));
        assert_eq!(c.remaining(h), None);
    }

    #[test]
    fn tasks_fire_in_due_order() {
        let mut c = VirtualClock::new();
        c.schedule_once(secs(3), "late");
        c.schedule_once(secs(1), "early");
        c.schedule_once(secs(1), "early-second");
        c.advance(secs(3));
        assert_eq!(drain(&mut c), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn scheduling_during_dispatch_uses_dispatch_time() {
        let mut c = VirtualClock::new();
        c.schedule_once(secs(2), "first");
        c.advance(secs(10));
        assert_eq!(c.next_due(), Some("first"));
        assert_eq!(c.now(), secs(2));
        let h = c.schedule_once(secs(3), "second");
        assert_eq!(c.remaining(h), Some(secs(3)));
        assert_eq!(c.next_due(), Some("second"));
        assert_eq!(c.now(), secs(5));
        assert_eq!(c.next_due(), None);
        assert_eq!(c.now(), secs(10));
    }

    #[test]
    fn remaining_counts_down() {
        let mut c = VirtualClock::new();
        let h = c.schedule_once(secs(60), "restart");
        c.advance(Duration::from_millis(15_500));
        drain(&mut c);
        assert_eq!(c.remaining(h), Some(Duration::from_millis(44_500)));
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut c = VirtualClock::new();
        c.schedule_every(Duration::ZERO, "spin");
        c.advance(Duration::from_millis(3));
        assert_eq!(drain(&mut c).len(), 3);
    }
}
