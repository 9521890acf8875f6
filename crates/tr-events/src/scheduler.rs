//! Virtual-clock timer queue.
//!
//! Nothing fires on its own: the host moves the clock forward and pulls due
//! timers one at a time, so a callback that schedules or clears timers is
//! observed by the very next pull.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    /// Arming order, breaks ties between timers due at the same instant.
    seq: u64,
    payload: T,
}

/// One timer callback that became due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing<T> {
    pub id: TimerId,
    pub at_ms: u64,
    pub payload: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            next_seq: 0,
            timers: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn set_timeout(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.arm(delay_ms, None, payload)
    }

    /// Recurring timer; the first firing is one period from now. Periods below
    /// one millisecond are raised to one so the clock always makes progress.
    pub fn set_interval(&mut self, period_ms: u64, payload: T) -> TimerId {
        let period_ms = period_ms.max(1);
        self.arm(period_ms, Some(period_ms), payload)
    }

    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Moves the clock to `until_ms` once every due timer has been pulled.
    /// The clock never runs backwards.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn arm(&mut self, delay_ms: u64, period_ms: Option<u64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let seq = self.take_seq();
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            seq,
            payload,
        });
        id
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }
}

impl<T: Clone> Scheduler<T> {
    /// Removes (or re-arms, for intervals) the earliest timer due at or before
    /// `until_ms` and advances the clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Firing<T>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.seq))
            .map(|(index, _)| index)?;

        let at_ms = self.timers[index].due_ms;
        self.now_ms = self.now_ms.max(at_ms);

        let firing = match self.timers[index].period_ms {
            Some(period_ms) => {
                let seq = self.take_seq();
                let timer = &mut self.timers[index];
                timer.due_ms = at_ms.saturating_add(period_ms);
                timer.seq = seq;
                Firing {
                    id: timer.id,
                    at_ms,
                    payload: timer.payload.clone(),
                }
            }
            None => {
                let timer = self.timers.remove(index);
                Firing {
                    id: timer.id,
                    at_ms,
                    payload: timer.payload,
                }
            }
        };

        Some(firing)
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;

    fn drain(scheduler: &mut Scheduler<&'static str>, until_ms: u64) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(firing) = scheduler.pop_due(until_ms) {
            fired.push((firing.at_ms, firing.payload));
        }
        scheduler.settle(until_ms);
        fired
    }

    #[test]
    fn intervals_rearm_and_interleave_with_timeouts() {
        let mut scheduler = Scheduler::new();
        scheduler.set_interval(100, "tick");
        scheduler.set_timeout(250, "once");

        assert_eq!(
            drain(&mut scheduler, 300),
            vec![(100, "tick"), (200, "tick"), (250, "once"), (300, "tick")]
        );
        assert_eq!(scheduler.now_ms(), 300);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn cleared_timers_never_fire() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.set_timeout(10, "gone");
        scheduler.set_timeout(10, "kept");
        assert!(scheduler.clear(id));
        assert!(!scheduler.is_pending(id));
        assert_eq!(drain(&mut scheduler, 10), vec![(10, "kept")]);
    }

    #[test]
    fn zero_period_interval_still_advances() {
        let mut scheduler = Scheduler::new();
        scheduler.set_interval(0, "spin");
        assert_eq!(drain(&mut scheduler, 3).len(), 3);
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.settle(1_000);
        scheduler.set_timeout(2_000, "reset");
        assert_eq!(drain(&mut scheduler, 2_999), vec![]);
        assert_eq!(drain(&mut scheduler, 3_000), vec![(3_000, "reset")]);
    }
}
