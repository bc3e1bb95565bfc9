//! Toasts and tooltips.
//!
//! At most one overlay is active. An overlay is a detached subtree (inserted
//! into the tree but never attached) that is laid out on its own, painted
//! above the main tree and offered input before it. Showing a new overlay
//! replaces the current one at once; a timed, close-box or ESC dismissal plays
//! the exit transition first. Either way the replaced view's `dismissed` slot
//! runs exactly once.

use crate::animation::{ease_out, lerp_i32, progress, Animator};
use crate::config::EngineConfig;
use crate::events::EventDispatcher;
use crate::gesture::Gesture;
use crate::input::{Key, KeyEvent, MouseButton, MouseEvent, MouseEventKind, NamedKey};
use crate::layout::layout_subtree;
use crate::paint::{paint_subtree, Painter, Stroke};
use crate::primitives::{palette, Point, Rect, Size};
use crate::timer::{Tick, TimerHandle};
use crate::tree::ViewTree;
use crate::view::{slot, ViewId};
use std::time::{Duration, Instant};

/// Where an overlay is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Centered horizontally near the bottom edge; modal for pointer and keys
    Toast,
    /// Next to a window position; input it does not use falls through
    Tooltip { anchor: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Entering,
    Shown,
    Leaving,
}

#[derive(Debug, Clone, Copy)]
struct ActiveOverlay {
    view: ViewId,
    kind: OverlayKind,
    dismiss_at: Option<Instant>,
    phase: Phase,
}

#[derive(Debug)]
pub struct OverlayCoordinator {
    active: Option<ActiveOverlay>,
    animator: Animator,
    steps: u32,
    toast_margin: i32,
    close_box: i32,
    close_box_inset: i32,
    tooltip_offset: Point,
    slide: i32,
}

impl OverlayCoordinator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            active: None,
            animator: Animator::new(config.animation_interval),
            steps: config.animation_steps,
            toast_margin: config.toast_margin,
            close_box: config.close_box,
            close_box_inset: config.close_box_inset,
            tooltip_offset: config.tooltip_offset,
            slide: config.overlay_slide,
        }
    }

    /// The active overlay's root view
    pub fn active(&self) -> Option<ViewId> {
        self.active.map(|a| a.view)
    }

    pub fn kind(&self) -> Option<OverlayKind> {
        self.active.map(|a| a.kind)
    }

    /// The overlay is playing its exit transition
    pub fn is_leaving(&self) -> bool {
        self.active.is_some_and(|a| a.phase == Phase::Leaving)
    }

    /// When the active overlay times out
    pub fn deadline(&self) -> Option<Instant> {
        self.active
            .filter(|a| a.phase != Phase::Leaving)
            .and_then(|a| a.dismiss_at)
    }

    /// Show `view` as the overlay, replacing the active one.
    ///
    /// `init` runs the first time a view is shown; `localize` is asked for a
    /// translation of every text in the subtree. A zero `timeout` keeps the
    /// overlay until it is dismissed.
    pub fn show(
        &mut self,
        tree: &mut ViewTree,
        view: ViewId,
        kind: OverlayKind,
        timeout: Duration,
        localize: &mut dyn FnMut(&str) -> Option<String>,
    ) {
        self.cancel(tree);

        tree.init_subtree(view);
        for id in tree.pre_order(view) {
            let translated = tree.view(id).text().and_then(|text| localize(text));
            if let Some(text) = translated {
                tree.view_mut(id).set_text(text);
            }
        }

        tree.view_mut(view).set_hidden(false);
        tree.view_mut(view).set_position(0, 0);
        layout_subtree(tree, view);

        let size = tree.view(view).size();
        let rest = self.rest_position(tree.client_size(), size, kind);
        let start = Point::new(rest.x, rest.y + self.slide);
        let dismiss_at = (!timeout.is_zero()).then(|| tree.now() + timeout);

        self.active = Some(ActiveOverlay {
            view,
            kind,
            dismiss_at,
            phase: Phase::Entering,
        });
        log::debug!("showing {:?} overlay {:?} for {:?}", kind, view, timeout);

        if self.steps == 0 {
            tree.view_mut(view).set_position(rest.x, rest.y);
            self.set_phase(Phase::Shown);
        } else {
            tree.view_mut(view).set_position(start.x, start.y);
            self.animator
                .start(tree, self.steps, slide_step(view, start, rest));
        }
        tree.invalidate_view(view);
    }

    fn rest_position(&self, client: Size, size: Size, kind: OverlayKind) -> Point {
        match kind {
            OverlayKind::Toast => Point::new(
                (client.w - size.w) / 2,
                client.h - size.h - self.toast_margin,
            ),
            OverlayKind::Tooltip { anchor } => {
                let at = anchor.offset(self.tooltip_offset);
                Point::new(
                    at.x.min(client.w - size.w).max(0),
                    at.y.min(client.h - size.h).max(0),
                )
            }
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if let Some(active) = self.active.as_mut() {
            active.phase = phase;
        }
    }

    /// Remove the active overlay at once, without an exit transition
    pub fn cancel(&mut self, tree: &mut ViewTree) {
        self.animator.cancel(tree);
        self.release(tree);
    }

    /// Start the exit transition; the overlay is released when it ends
    pub fn dismiss(&mut self, tree: &mut ViewTree) {
        let Some(active) = self.active else {
            return;
        };
        if active.phase == Phase::Leaving {
            return;
        }
        log::debug!("dismissing overlay {:?}", active.view);
        if self.steps == 0 {
            self.cancel(tree);
            return;
        }
        self.set_phase(Phase::Leaving);
        let from = tree.view(active.view).position();
        let to = Point::new(from.x, from.y + self.slide);
        self.animator
            .start(tree, self.steps, slide_step(active.view, from, to));
    }

    fn release(&mut self, tree: &mut ViewTree) {
        let Some(active) = self.active.take() else {
            return;
        };
        if !tree.contains(active.view) {
            return;
        }
        tree.invalidate_view(active.view);
        for id in tree.pre_order(active.view) {
            let view = tree.view_mut(id);
            view.set_hovered(false);
            view.hover_at = None;
            view.hover_active = false;
        }
        tree.with_slot(active.view, slot::dismissed, |f, cx| f(cx));
        log::debug!("overlay {:?} released", active.view);
    }

    /// Every-message service: start the exit transition once the timeout passed
    pub fn service(&mut self, tree: &mut ViewTree, now: Instant) {
        if self.deadline().is_some_and(|at| now >= at) {
            self.dismiss(tree);
        }
    }

    /// Feed a fired animation timer
    pub fn on_timer(&mut self, tree: &mut ViewTree, handle: TimerHandle) {
        if !self.animator.advance(tree, handle) {
            return;
        }
        match self.active.map(|a| a.phase) {
            Some(Phase::Entering) => self.set_phase(Phase::Shown),
            Some(Phase::Leaving) => self.release(tree),
            _ => {}
        }
    }

    /// Close box in window coordinates
    pub fn close_box(&self, tree: &ViewTree) -> Option<Rect> {
        let active = self.active?;
        if tree.view(active.view).has_mouse() {
            return None;
        }
        let rect = tree.absolute_rect(active.view);
        Some(Rect::new(
            rect.right() - self.close_box_inset - self.close_box,
            rect.y + self.close_box_inset,
            self.close_box,
            self.close_box,
        ))
    }

    // ========== Input interception ==========

    /// Offer a mouse event to the overlay. Returns true if the tree must not see it.
    pub fn intercept_mouse(&mut self, tree: &mut ViewTree, dispatcher: &mut EventDispatcher, event: &MouseEvent) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        if tree.view(active.view).has_mouse() {
            dispatcher.dispatch_mouse(tree, active.view, event);
            return true;
        }

        let pointer = match event.kind {
            MouseEventKind::Leave => None,
            _ => Some(event.position),
        };
        dispatcher.update_hover(tree, active.view, pointer);

        if event.kind == MouseEventKind::Down(MouseButton::Left)
            && self.close_box(tree).is_some_and(|r| r.contains(event.position))
        {
            self.dismiss(tree);
            return true;
        }
        matches!(active.kind, OverlayKind::Toast)
    }

    /// Offer a key press or release to the overlay. ESC dismisses it.
    pub fn intercept_key(&mut self, tree: &mut ViewTree, dispatcher: &mut EventDispatcher, event: &KeyEvent, down: bool) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        if event.key == Key::Named(NamedKey::Escape) {
            if down {
                self.dismiss(tree);
            }
            return true;
        }
        if down {
            dispatcher.dispatch_key_down(tree, active.view, event);
        } else {
            dispatcher.dispatch_key_up(tree, active.view, event);
        }
        matches!(active.kind, OverlayKind::Toast)
    }

    pub fn intercept_char(&mut self, tree: &mut ViewTree, dispatcher: &mut EventDispatcher, ch: char) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        dispatcher.dispatch_char(tree, active.view, ch);
        matches!(active.kind, OverlayKind::Toast)
    }

    /// Offer a gesture to the overlay subtree first
    pub fn intercept_gesture(&mut self, tree: &mut ViewTree, dispatcher: &mut EventDispatcher, gesture: &Gesture) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        if dispatcher.dispatch_gesture(tree, active.view, gesture).is_some() {
            return true;
        }
        matches!(active.kind, OverlayKind::Toast)
    }

    /// Cadence ticks reach the overlay subtree as well
    pub fn dispatch_tick(&mut self, tree: &mut ViewTree, dispatcher: &mut EventDispatcher, tick: Tick) {
        if let Some(active) = self.active {
            dispatcher.dispatch_tick(tree, active.view, tick);
        }
    }

    pub fn service_hover(&mut self, tree: &mut ViewTree, dispatcher: &mut EventDispatcher, now: Instant) {
        if let Some(active) = self.active {
            dispatcher.service_hover(tree, active.view, now);
        }
    }

    /// Paint the overlay (and its close box) above everything else
    pub fn paint(&self, tree: &mut ViewTree, painter: &mut dyn Painter) {
        let Some(active) = self.active else {
            return;
        };
        paint_subtree(tree, active.view, painter);

        if let Some(close) = self.close_box(tree) {
            painter.save();
            painter.set_pen(Some(Stroke::new(1, palette::SUBTEXT)));
            painter.line(close.origin(), Point::new(close.right() - 1, close.bottom() - 1));
            painter.line(Point::new(close.right() - 1, close.y), Point::new(close.x, close.bottom() - 1));
            painter.restore();
        }
    }
}

/// Step function moving `view` from `from` to `to`, easing out
fn slide_step(view: ViewId, from: Point, to: Point) -> impl FnMut(&mut ViewTree, u32, u32) {
    move |tree: &mut ViewTree, step: u32, count: u32| {
        if !tree.contains(view) {
            return;
        }
        let t = ease_out(progress(step, count));
        let before = tree.absolute_rect(view);
        tree.view_mut(view)
            .set_position(lerp_i32(from.x, to.x, t), lerp_i32(from.y, to.y, t));
        let after = tree.absolute_rect(view);
        tree.invalidate(before.union(&after));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::DisplayList;
    use crate::timer::TimerOwner;
    use crate::view::View;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn no_translation(_: &str) -> Option<String> {
        None
    }

    struct Harness {
        tree: ViewTree,
        overlay: OverlayCoordinator,
        dispatcher: EventDispatcher,
        now: Instant,
    }

    impl Harness {
        fn new(config: EngineConfig) -> Self {
            let mut tree = ViewTree::new();
            tree.set_client_size(Size::new(200, 100));
            let now = tree.now();
            Self {
                tree,
                overlay: OverlayCoordinator::new(&config),
                dispatcher: EventDispatcher::new(&config),
                now,
            }
        }

        fn show(&mut self, view: ViewId, kind: OverlayKind, timeout: Duration) {
            self.overlay
                .show(&mut self.tree, view, kind, timeout, &mut no_translation);
        }

        /// Advance the clock, servicing the overlay and its animation timers
        fn advance(&mut self, by: Duration) {
            let end = self.now + by;
            while self.now < end {
                self.now += Duration::from_millis(1);
                self.tree.set_now(self.now);
                self.overlay.service(&mut self.tree, self.now);
                while let Some((handle, owner)) = self.tree.timers.pop_due(self.now) {
                    if owner == TimerOwner::Animation {
                        self.overlay.on_timer(&mut self.tree, handle);
                    }
                }
            }
        }
    }

    fn counted(text: &str, counter: &Rc<RefCell<u32>>) -> View {
        let counter = counter.clone();
        View::container()
            .with_text(text)
            .on_dismissed(move |_| *counter.borrow_mut() += 1)
    }

    #[test]
    fn test_toast_settles_above_bottom_edge() {
        let mut h = Harness::new(EngineConfig::default());
        let toast = h.tree.insert(View::container().with_text("hi"));
        h.show(toast, OverlayKind::Toast, Duration::ZERO);

        assert_eq!(h.tree.view(toast).position(), Point::new(92, 60 + 16));
        h.advance(Duration::from_millis(500));
        assert_eq!(h.tree.view(toast).position(), Point::new(92, 60));
        assert_eq!(h.overlay.active(), Some(toast));
        assert_eq!(h.overlay.deadline(), None);
    }

    #[test]
    fn test_replacing_fires_dismissed_once() {
        let mut h = Harness::new(EngineConfig::default());
        let first_count = Rc::new(RefCell::new(0));
        let second_count = Rc::new(RefCell::new(0));
        let first = h.tree.insert(counted("one", &first_count));
        let second = h.tree.insert(counted("two", &second_count));

        h.show(first, OverlayKind::Toast, Duration::from_secs(1));
        h.show(second, OverlayKind::Toast, Duration::from_secs(1));
        h.advance(Duration::from_millis(200));

        assert_eq!(*first_count.borrow(), 1);
        assert_eq!(*second_count.borrow(), 0);
        assert_eq!(h.overlay.active(), Some(second));
    }

    #[test]
    fn test_timeout_plays_exit_then_releases() {
        let mut h = Harness::new(EngineConfig::default());
        let count = Rc::new(RefCell::new(0));
        let toast = h.tree.insert(counted("saved", &count));
        h.show(toast, OverlayKind::Toast, Duration::from_millis(300));

        h.advance(Duration::from_millis(299));
        assert!(!h.overlay.is_leaving());
        h.advance(Duration::from_millis(1));
        assert!(h.overlay.is_leaving());
        assert_eq!(*count.borrow(), 0);

        h.advance(Duration::from_millis(500));
        assert_eq!(h.overlay.active(), None);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_init_runs_once_per_view() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let inits = Rc::new(RefCell::new(0));
        let sink = inits.clone();
        let toast = h
            .tree
            .insert(View::container().with_text("x").on_init(move |_| *sink.borrow_mut() += 1));

        h.show(toast, OverlayKind::Toast, Duration::ZERO);
        h.overlay.cancel(&mut h.tree);
        h.show(toast, OverlayKind::Toast, Duration::ZERO);
        assert_eq!(*inits.borrow(), 1);
    }

    #[test]
    fn test_tooltip_is_clamped_to_client() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let tip = h.tree.insert(View::container().with_text("tooltip"));
        h.show(tip, OverlayKind::Tooltip { anchor: Point::new(190, 10) }, Duration::ZERO);

        // 7 cells wide, pushed back inside the 200px client
        assert_eq!(h.tree.view(tip).position(), Point::new(200 - 56, 26));
    }

    #[test]
    fn test_escape_dismisses_and_toast_swallows_keys() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let count = Rc::new(RefCell::new(0));
        let toast = h.tree.insert(counted("saved", &count));
        h.show(toast, OverlayKind::Toast, Duration::ZERO);

        let enter = KeyEvent::named(NamedKey::Enter);
        assert!(h.overlay.intercept_key(&mut h.tree, &mut h.dispatcher, &enter, true));
        let escape = KeyEvent::named(NamedKey::Escape);
        assert!(h.overlay.intercept_key(&mut h.tree, &mut h.dispatcher, &escape, true));

        assert_eq!(h.overlay.active(), None);
        assert_eq!(*count.borrow(), 1);
        assert!(!h.overlay.intercept_key(&mut h.tree, &mut h.dispatcher, &enter, true));
    }

    #[test]
    fn test_tooltip_lets_pointer_through() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let tip = h.tree.insert(View::container().with_text("tip"));
        h.show(tip, OverlayKind::Tooltip { anchor: Point::new(10, 10) }, Duration::ZERO);

        let moved = MouseEvent::moved(Point::new(150, 80));
        assert!(!h.overlay.intercept_mouse(&mut h.tree, &mut h.dispatcher, &moved));
    }

    #[test]
    fn test_close_box_dismisses() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let toast = h
            .tree
            .insert(View::container().with_text("a long message").with_padding(Size::new(8, 8)));
        h.show(toast, OverlayKind::Toast, Duration::ZERO);

        let close = h.overlay.close_box(&h.tree).unwrap();
        let click = MouseEvent::down(MouseButton::Left, Point::new(close.x + 1, close.y + 1));
        assert!(h.overlay.intercept_mouse(&mut h.tree, &mut h.dispatcher, &click));
        assert_eq!(h.overlay.active(), None);
    }

    #[test]
    fn test_mouse_slot_makes_overlay_exclusive() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        let tip = h.tree.insert(
            View::container()
                .with_text("drag me")
                .on_mouse(move |_, _| *sink.borrow_mut() += 1),
        );
        h.show(tip, OverlayKind::Tooltip { anchor: Point::zero() }, Duration::ZERO);

        let moved = MouseEvent::moved(Point::new(190, 90));
        assert!(h.overlay.intercept_mouse(&mut h.tree, &mut h.dispatcher, &moved));
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(h.overlay.close_box(&h.tree), None);
    }

    #[test]
    fn test_overlay_paints_with_close_box() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let toast = h.tree.insert(View::container().with_text("hello").on_paint(|cx, p| {
            p.rect(cx.bounds());
        }));
        h.show(toast, OverlayKind::Toast, Duration::ZERO);

        let mut list = DisplayList::new();
        h.overlay.paint(&mut h.tree, &mut list);
        assert_eq!(list.len(), 3);
        assert!(list.is_balanced());
    }

    #[test]
    fn test_localize_rewrites_texts() {
        let mut h = Harness::new(EngineConfig::default().with_animation_steps(0));
        let toast = h.tree.insert(View::container().with_text("greeting"));
        let mut translate = |key: &str| (key == "greeting").then(|| "hej".to_owned());
        h.overlay
            .show(&mut h.tree, toast, OverlayKind::Toast, Duration::ZERO, &mut translate);

        assert_eq!(h.tree.view(toast).text(), Some("hej"));
        assert_eq!(h.tree.view(toast).w(), 24);
    }
}
