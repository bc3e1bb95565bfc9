//! Step animation driver and interpolation helpers.
//!
//! An [`Animator`] runs one step function at a time on a repeating timer,
//! passing increasing step indices until the step count is reached. Starting a
//! new animation or cancelling preempts the running one.

use crate::timer::{TimerHandle, TimerOwner};
use crate::tree::ViewTree;
use std::time::Duration;

/// Called with `(tree, step, count)`; `step` runs from 1 to `count`
pub type StepFn = Box<dyn FnMut(&mut ViewTree, u32, u32)>;

/// Ease out (quadratic) - fast start, decelerating
pub fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Linearly interpolate between two pixel values, rounding to the nearest pixel
pub fn lerp_i32(a: i32, b: i32, t: f32) -> i32 {
    a + ((b - a) as f32 * t).round() as i32
}

/// Fraction of the animation done after `step` of `count` steps
pub fn progress(step: u32, count: u32) -> f32 {
    if count == 0 {
        1.0
    } else {
        (step as f32 / count as f32).clamp(0.0, 1.0)
    }
}

pub struct Animator {
    interval: Duration,
    step_fn: Option<StepFn>,
    step: u32,
    count: u32,
    timer: Option<TimerHandle>,
}

impl Animator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            step_fn: None,
            step: 0,
            count: 0,
            timer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Current step index (0 before the first tick)
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Start stepping `step_fn` `count` times, cancelling any running animation
    pub fn start(&mut self, tree: &mut ViewTree, count: u32, step_fn: impl FnMut(&mut ViewTree, u32, u32) + 'static) {
        self.cancel(tree);
        if count == 0 {
            return;
        }
        self.step_fn = Some(Box::new(step_fn));
        self.count = count;
        let now = tree.now();
        self.timer = Some(
            tree.timers
                .arm_repeating(TimerOwner::Animation, now, self.interval),
        );
    }

    /// Feed a fired animation timer. Returns true when this tick ran the last step.
    pub fn advance(&mut self, tree: &mut ViewTree, handle: TimerHandle) -> bool {
        if self.timer != Some(handle) {
            return false;
        }
        let Some(mut step_fn) = self.step_fn.take() else {
            self.cancel(tree);
            return false;
        };

        self.step += 1;
        step_fn(tree, self.step, self.count);

        if self.step >= self.count {
            self.cancel(tree);
            return true;
        }
        self.step_fn = Some(step_fn);
        false
    }

    /// Stop and forget the running animation
    pub fn cancel(&mut self, tree: &mut ViewTree) {
        if let Some(handle) = self.timer.take() {
            tree.timers.cancel(handle);
        }
        self.step_fn = None;
        self.step = 0;
        self.count = 0;
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("step", &self.step)
            .field("count", &self.count)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn drive(animator: &mut Animator, tree: &mut ViewTree, ticks: u32) -> Vec<bool> {
        let mut results = Vec::new();
        let mut now = tree.now();
        for _ in 0..ticks {
            now += Duration::from_millis(16);
            while let Some((handle, _)) = tree.timers.pop_due(now) {
                results.push(animator.advance(tree, handle));
            }
        }
        results
    }

    #[test]
    fn test_steps_run_in_order_then_stop() {
        let mut tree = ViewTree::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut animator = Animator::new(Duration::from_millis(16));
        animator.start(&mut tree, 3, move |_, step, count| sink.borrow_mut().push((step, count)));

        let results = drive(&mut animator, &mut tree, 10);
        assert_eq!(*seen.borrow(), vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(results, vec![false, false, true]);
        assert!(!animator.is_running());
        assert!(tree.timers().is_empty());
    }

    #[test]
    fn test_start_preempts_running_animation() {
        let mut tree = ViewTree::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut animator = Animator::new(Duration::from_millis(16));

        let first = seen.clone();
        animator.start(&mut tree, 5, move |_, step, _| first.borrow_mut().push(("first", step)));
        drive(&mut animator, &mut tree, 1);
        let second = seen.clone();
        animator.start(&mut tree, 1, move |_, step, _| second.borrow_mut().push(("second", step)));
        drive(&mut animator, &mut tree, 5);

        assert_eq!(*seen.borrow(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn test_cancel_resets_state() {
        let mut tree = ViewTree::new();
        let mut animator = Animator::new(Duration::from_millis(16));
        animator.start(&mut tree, 4, |_, _, _| {});
        drive(&mut animator, &mut tree, 2);
        assert_eq!(animator.step(), 2);

        animator.cancel(&mut tree);
        assert_eq!(animator.step(), 0);
        assert!(!animator.is_running());
    }

    #[test]
    fn test_lerp_i32() {
        assert_eq!(lerp_i32(0, 10, 0.0), 0);
        assert_eq!(lerp_i32(0, 10, 0.55), 6);
        assert_eq!(lerp_i32(100, 80, 1.0), 80);
        assert_eq!(lerp_i32(0, 16, ease_out(progress(4, 8))), 12);
    }
}
