//! Click detection: raw presses and releases into taps, double taps and long presses.
//!
//! Every tracked mouse button runs its own idle/armed state machine with two
//! timers: the long-press threshold and the double-click window. The detector
//! only decides; the runtime posts the resulting [`Gesture`] to its queue so it
//! is dispatched on the next loop turn.

use crate::config::EngineConfig;
use crate::input::MouseButton;
use crate::primitives::Point;
use crate::timer::{TimerHandle, TimerOwner, Timers};
use std::time::{Duration, Instant};

/// Kind of synthesized gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// A single completed click
    Tap,
    /// Two presses inside the double-click window and tolerance
    DoubleTap,
    /// Button held past the long-press threshold
    Press,
}

/// A synthesized gesture, in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub button: MouseButton,
    pub position: Point,
    pub time: Instant,
}

impl Gesture {
    pub fn is_press(&self) -> bool {
        self.kind == GestureKind::Press
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Track {
    last_press: Option<Instant>,
    last_position: Point,
    armed: bool,
    down: bool,
    double_timer: Option<TimerHandle>,
    long_timer: Option<TimerHandle>,
}

impl Track {
    fn disarm(&mut self, timers: &mut Timers) {
        if let Some(handle) = self.double_timer.take() {
            timers.cancel(handle);
        }
        if let Some(handle) = self.long_timer.take() {
            timers.cancel(handle);
        }
        self.armed = false;
    }
}

const TRACKED_BUTTONS: usize = 3;

#[derive(Debug, Clone)]
pub struct ClickDetector {
    tracks: [Track; TRACKED_BUTTONS],
    double_click: Duration,
    long_press: Duration,
    tolerance: i32,
}

impl ClickDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tracks: [Track::default(); TRACKED_BUTTONS],
            double_click: config.double_click,
            long_press: config.long_press,
            tolerance: config.click_tolerance,
        }
    }

    /// Whether `button` is waiting to resolve a gesture
    pub fn is_armed(&self, button: MouseButton) -> bool {
        button
            .index()
            .map(|i| self.tracks[i].armed)
            .unwrap_or(false)
    }

    fn gesture(kind: GestureKind, index: usize, position: Point, time: Instant) -> Option<Gesture> {
        let button = MouseButton::from_index(index)?;
        log::trace!("gesture {:?} on {:?} at {:?}", kind, button, position);
        Some(Gesture {
            kind,
            button,
            position,
            time,
        })
    }

    pub fn button_down(
        &mut self,
        button: MouseButton,
        position: Point,
        now: Instant,
        timers: &mut Timers,
    ) -> Option<Gesture> {
        let index = button.index()?;
        let track = &mut self.tracks[index];
        track.down = true;

        if track.armed {
            let in_window = track
                .last_press
                .is_some_and(|at| now.saturating_duration_since(at) <= self.double_click);
            if in_window && position.is_near(track.last_position, self.tolerance) {
                track.disarm(timers);
                return Self::gesture(GestureKind::DoubleTap, index, position, now);
            }
            return None;
        }

        track.armed = true;
        track.last_press = Some(now);
        track.last_position = position;
        track.long_timer = Some(timers.arm(TimerOwner::Gesture(index), now, self.long_press));
        track.double_timer = Some(timers.arm(TimerOwner::Gesture(index), now, self.double_click));
        None
    }

    pub fn button_up(
        &mut self,
        button: MouseButton,
        now: Instant,
        timers: &mut Timers,
    ) -> Option<Gesture> {
        let index = button.index()?;
        let track = &mut self.tracks[index];
        track.down = false;
        if !track.armed {
            return None;
        }

        if let Some(handle) = track.long_timer.take() {
            timers.cancel(handle);
        }
        let elapsed = track
            .last_press
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();
        if elapsed > self.double_click {
            // A slow click-release counts as a completed double tap
            let position = track.last_position;
            track.disarm(timers);
            return Self::gesture(GestureKind::DoubleTap, index, position, now);
        }
        None
    }

    /// Double click reported by the platform
    pub fn double_click(
        &mut self,
        button: MouseButton,
        position: Point,
        now: Instant,
        timers: &mut Timers,
    ) -> Option<Gesture> {
        let index = button.index()?;
        self.tracks[index].disarm(timers);
        Self::gesture(GestureKind::DoubleTap, index, position, now)
    }

    /// Feed a fired timer owned by `TimerOwner::Gesture(index)`
    pub fn timer_fired(&mut self, index: usize, handle: TimerHandle, now: Instant, timers: &mut Timers) -> Option<Gesture> {
        let track = self.tracks.get_mut(index)?;

        if track.long_timer == Some(handle) {
            track.long_timer = None;
            if track.armed && track.down {
                let position = track.last_position;
                track.disarm(timers);
                return Self::gesture(GestureKind::Press, index, position, now);
            }
            return None;
        }

        if track.double_timer == Some(handle) {
            track.double_timer = None;
            if !track.armed || track.down {
                // Still held: the release or the long-press timer decides
                return None;
            }
            let position = track.last_position;
            track.disarm(timers);
            return Self::gesture(GestureKind::Tap, index, position, now);
        }

        None
    }
}
