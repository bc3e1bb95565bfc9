//! Single-threaded timer service.
//!
//! Timers never call back by themselves. The runtime asks for the earliest
//! deadline, sleeps until then, and pulls due timers out with
//! [`Timers::pop_due`], turning each into a timer message for the dispatcher.

use crate::view::ViewId;
use std::time::{Duration, Instant};

/// Handle returned when a timer is armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// The two polling cadences every view can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Roughly once a second
    Slow,
    /// Roughly ten times a second
    Fast,
}

/// What a view's timer slot is being woken for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    /// The slow cadence
    Slow,
    /// The fast cadence
    Fast,
    /// A timer armed through `Cx::arm_timer`; views compare the handle with their own
    Timer(TimerHandle),
}

impl From<Cadence> for Tick {
    fn from(cadence: Cadence) -> Self {
        match cadence {
            Cadence::Slow => Tick::Slow,
            Cadence::Fast => Tick::Fast,
        }
    }
}

/// Who a timer belongs to; decides where the fired timer is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerOwner {
    /// Click detector, keyed by button index
    Gesture(usize),
    /// Overlay transition stepper
    Animation,
    /// Polling cadence delivered to the whole tree
    Cadence(Cadence),
    /// A timer a view armed for itself
    View(ViewId),
}

#[derive(Debug, Clone)]
struct Armed {
    handle: TimerHandle,
    owner: TimerOwner,
    deadline: Instant,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Timers {
    next_handle: u64,
    armed: Vec<Armed>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay` after `now`
    pub fn arm(&mut self, owner: TimerOwner, now: Instant, delay: Duration) -> TimerHandle {
        self.insert(owner, now + delay, None)
    }

    /// Fire every `period`, starting one period after `now`
    pub fn arm_repeating(
        &mut self,
        owner: TimerOwner,
        now: Instant,
        period: Duration,
    ) -> TimerHandle {
        // A zero period would starve the loop
        let period = period.max(Duration::from_millis(1));
        self.insert(owner, now + period, Some(period))
    }

    fn insert(&mut self, owner: TimerOwner, deadline: Instant, period: Option<Duration>) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.armed.push(Armed {
            handle,
            owner,
            deadline,
            period,
        });
        handle
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.armed.len();
        self.armed.retain(|t| t.handle != handle);
        self.armed.len() != before
    }

    /// Cancel every timer belonging to `owner`
    pub fn cancel_owner(&mut self, owner: TimerOwner) {
        self.armed.retain(|t| t.owner != owner);
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.armed.iter().any(|t| t.handle == handle)
    }

    pub fn owner(&self, handle: TimerHandle) -> Option<TimerOwner> {
        self.armed.iter().find(|t| t.handle == handle).map(|t| t.owner)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.armed.iter().map(|t| t.deadline).min()
    }

    /// Remove (one-shot) or reschedule (repeating) the earliest timer due at `now`.
    ///
    /// Ties fire in arming order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerHandle, TimerOwner)> {
        let index = self
            .armed
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.handle))
            .map(|(i, _)| i)?;

        let fired = (self.armed[index].handle, self.armed[index].owner);
        match self.armed[index].period {
            Some(period) => {
                // Missed periods stay due and fire on the following calls
                self.armed[index].deadline += period;
            }
            None => {
                self.armed.remove(index);
            }
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        let h = timers.arm(TimerOwner::Animation, t0, ms(100));

        assert_eq!(timers.pop_due(t0 + ms(99)), None);
        assert_eq!(timers.pop_due(t0 + ms(100)), Some((h, TimerOwner::Animation)));
        assert_eq!(timers.pop_due(t0 + ms(500)), None);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_timers_fire_in_deadline_order() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        let late = timers.arm(TimerOwner::Gesture(0), t0, ms(500));
        let early = timers.arm(TimerOwner::Gesture(1), t0, ms(250));

        let now = t0 + ms(600);
        assert_eq!(timers.pop_due(now).map(|(h, _)| h), Some(early));
        assert_eq!(timers.pop_due(now).map(|(h, _)| h), Some(late));
    }

    #[test]
    fn test_repeating_timer_reschedules() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        let h = timers.arm_repeating(TimerOwner::Cadence(Cadence::Fast), t0, ms(100));

        assert_eq!(timers.pop_due(t0 + ms(100)).map(|(h, _)| h), Some(h));
        assert_eq!(timers.next_deadline(), Some(t0 + ms(200)));

        // A late caller still sees every missed period, 200 through 1000
        let mut fired = 0;
        while timers.pop_due(t0 + ms(1000)).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 9);
        assert_eq!(timers.next_deadline(), Some(t0 + ms(1100)));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut timers = Timers::new();
        let h = timers.arm(TimerOwner::Animation, t0, ms(10));
        assert!(timers.cancel(h));
        assert!(!timers.cancel(h));
        assert_eq!(timers.pop_due(t0 + ms(20)), None);
    }
}
