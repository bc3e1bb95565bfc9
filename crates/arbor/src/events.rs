//! Tree-walking event dispatch.
//!
//! Each kind of message has its own routing rule:
//!
//! - characters and keys go, parents first, to every view with the matching
//!   slot outside hidden or disabled subtrees; a focusable view only while it
//!   holds focus
//! - mouse events first update hover state, then reach every visible, enabled
//!   view with a mouse slot
//! - gestures go to views under the pointer, children before parents, until
//!   one consumes them
//! - timer ticks reach the whole tree, hidden and disabled views included
//!
//! The dispatcher is backend-agnostic; walks start from an explicit root so
//! the same rules serve the main tree and a detached overlay.

use crate::config::EngineConfig;
use crate::gesture::Gesture;
use crate::input::{KeyEvent, MouseEvent, MouseEventKind};
use crate::primitives::Point;
use crate::timer::Tick;
use crate::tree::ViewTree;
use crate::view::{slot, GestureFn, ViewId};
use std::time::{Duration, Instant};

/// Key press or release, for walks shared by both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyPhase {
    Down,
    Up,
}

#[derive(Debug, Clone)]
pub struct EventDispatcher {
    last_pointer: Option<Point>,
    hover_padding: i32,
    hover_delay: Duration,
}

impl EventDispatcher {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            last_pointer: None,
            hover_padding: config.hover_padding,
            hover_delay: config.hover_delay,
        }
    }

    /// Last known pointer position, `None` once it left the window
    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    // ========== Keyboard ==========

    fn key_targets(tree: &ViewTree, root: ViewId, has_slot: fn(&crate::view::View) -> bool) -> Vec<ViewId> {
        let mut targets = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let view = tree.view(id);
            if view.is_hidden() || view.is_disabled() {
                continue;
            }
            if has_slot(view) && (!view.is_focusable() || tree.focused() == Some(id)) {
                targets.push(id);
            }
            stack.extend(view.children().iter().rev().copied());
        }
        targets
    }

    /// Deliver a typed character
    pub fn dispatch_char(&mut self, tree: &mut ViewTree, root: ViewId, ch: char) {
        for id in Self::key_targets(tree, root, |v| v.behavior.char.is_some()) {
            tree.with_slot(id, slot::char, |f, cx| f(cx, ch));
        }
    }

    pub fn dispatch_key_down(&mut self, tree: &mut ViewTree, root: ViewId, event: &KeyEvent) {
        self.dispatch_key(tree, root, event, KeyPhase::Down);
    }

    pub fn dispatch_key_up(&mut self, tree: &mut ViewTree, root: ViewId, event: &KeyEvent) {
        self.dispatch_key(tree, root, event, KeyPhase::Up);
    }

    fn dispatch_key(&mut self, tree: &mut ViewTree, root: ViewId, event: &KeyEvent, phase: KeyPhase) {
        match phase {
            KeyPhase::Down => {
                for id in Self::key_targets(tree, root, |v| v.behavior.key_down.is_some()) {
                    tree.with_slot(id, slot::key_down, |f, cx| f(cx, event));
                }
            }
            KeyPhase::Up => {
                for id in Self::key_targets(tree, root, |v| v.behavior.key_up.is_some()) {
                    tree.with_slot(id, slot::key_up, |f, cx| f(cx, event));
                }
            }
        }
    }

    // ========== Mouse ==========

    /// Update hover state, then deliver the raw event to every mouse slot
    pub fn dispatch_mouse(&mut self, tree: &mut ViewTree, root: ViewId, event: &MouseEvent) {
        let pointer = match event.kind {
            MouseEventKind::Leave => None,
            _ => Some(event.position),
        };
        self.last_pointer = pointer;
        self.update_hover(tree, root, pointer);

        let mut targets = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let view = tree.view(id);
            if view.is_hidden() || view.is_disabled() {
                continue;
            }
            if view.has_mouse() {
                targets.push(id);
            }
            stack.extend(view.children().iter().rev().copied());
        }
        for id in targets {
            tree.with_slot(id, slot::mouse, |f, cx| f(cx, event));
        }
    }

    /// Recompute hover flags against `pointer` (`None`: outside the window)
    pub fn update_hover(&mut self, tree: &mut ViewTree, root: ViewId, pointer: Option<Point>) {
        let origin = match tree.parent(root) {
            Some(parent) => tree.absolute_origin(parent),
            None => Point::zero(),
        };
        self.hover_view(tree, root, origin, pointer, true);
    }

    fn hover_view(&self, tree: &mut ViewTree, id: ViewId, parent_origin: Point, pointer: Option<Point>, reachable: bool) {
        let view = tree.view(id);
        let reachable = reachable && !view.is_hidden() && !view.is_disabled();
        let rect = view.rect().translate(parent_origin);
        let inside = reachable && pointer.is_some_and(|p| rect.contains(p));

        if inside != view.is_hovered() {
            tree.view_mut(id).set_hovered(inside);
            tree.invalidate(rect.inflate(self.hover_padding));
            if inside {
                self.hover_started(tree, id);
            } else {
                Self::hover_ended(tree, id);
            }
        }

        let children = tree.children(id).to_vec();
        for child in children {
            self.hover_view(tree, child, rect.origin(), pointer, reachable);
        }
    }

    fn hover_started(&self, tree: &mut ViewTree, id: ViewId) {
        let view = tree.view(id);
        if view.behavior.hovering.is_none() {
            return;
        }
        let delay = view.hover_delay().unwrap_or(self.hover_delay);
        if delay.is_zero() {
            tree.view_mut(id).hover_active = true;
            tree.with_slot(id, slot::hovering, |f, cx| f(cx, true));
        } else {
            let at = tree.now() + delay;
            tree.view_mut(id).hover_at = Some(at);
        }
    }

    fn hover_ended(tree: &mut ViewTree, id: ViewId) {
        let view = tree.view_mut(id);
        view.hover_at = None;
        if view.hover_active {
            view.hover_active = false;
            tree.with_slot(id, slot::hovering, |f, cx| f(cx, false));
        }
    }

    /// Deliver deferred `hovering(true)` calls that came due by `now`
    pub fn service_hover(&mut self, tree: &mut ViewTree, root: ViewId, now: Instant) {
        for id in tree.pre_order(root) {
            let view = tree.view(id);
            let Some(at) = view.hover_at() else {
                continue;
            };
            if !view.is_hovered() || tree.is_effectively_hidden(id) || tree.is_effectively_disabled(id) {
                tree.view_mut(id).hover_at = None;
                continue;
            }
            if at <= now {
                let view = tree.view_mut(id);
                view.hover_at = None;
                view.hover_active = true;
                tree.with_slot(id, slot::hovering, |f, cx| f(cx, true));
            }
        }
    }

    /// Earliest pending hover-start deadline under `root`
    pub fn hover_deadline(&self, tree: &ViewTree, root: ViewId) -> Option<Instant> {
        tree.pre_order(root)
            .into_iter()
            .filter_map(|id| tree.view(id).hover_at())
            .min()
    }

    // ========== Gestures ==========

    /// Offer a gesture to the views under it, children before parents.
    ///
    /// Returns the view that consumed it.
    pub fn dispatch_gesture(&mut self, tree: &mut ViewTree, root: ViewId, gesture: &Gesture) -> Option<ViewId> {
        let origin = match tree.parent(root) {
            Some(parent) => tree.absolute_origin(parent),
            None => Point::zero(),
        };
        let consumer = Self::offer_gesture(tree, root, origin, gesture);
        if let Some(id) = consumer {
            log::trace!("{:?} consumed by {:?}", gesture.kind, id);
        }
        consumer
    }

    fn offer_gesture(tree: &mut ViewTree, id: ViewId, parent_origin: Point, gesture: &Gesture) -> Option<ViewId> {
        let view = tree.view(id);
        if view.is_hidden() || view.is_disabled() {
            return None;
        }
        let rect = view.rect().translate(parent_origin);
        if !rect.contains(gesture.position) {
            return None;
        }

        let children = view.children().to_vec();
        for child in children {
            if let Some(consumer) = Self::offer_gesture(tree, child, rect.origin(), gesture) {
                return Some(consumer);
            }
        }

        // Tap and double tap go to the tap slot; long presses to the press slot
        let accessor: fn(&mut crate::view::Behavior) -> &mut Option<GestureFn> = if gesture.is_press() {
            slot::press
        } else {
            slot::tap
        };
        let consumed = tree
            .with_slot(id, accessor, |f, cx| f(cx, gesture))
            .unwrap_or(false);
        consumed.then_some(id)
    }

    // ========== Timers ==========

    /// Deliver a cadence tick to every view under `root`, hidden ones included
    pub fn dispatch_tick(&mut self, tree: &mut ViewTree, root: ViewId, tick: Tick) {
        for id in tree.pre_order(root) {
            tree.with_slot(id, slot::timer, |f, cx| f(cx, tick));
        }
    }

    /// Deliver a timer a view armed for itself
    pub fn dispatch_view_timer(&mut self, tree: &mut ViewTree, id: ViewId, tick: Tick) {
        if tree.contains(id) {
            tree.with_slot(id, slot::timer, |f, cx| f(cx, tick));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureKind;
    use crate::input::{Key, MouseButton, NamedKey};
    use crate::primitives::{Rect, Size};
    use crate::view::View;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn dispatcher() -> EventDispatcher {
        EventDispatcher::new(&EngineConfig::default())
    }

    fn tap_at(x: i32, y: i32) -> Gesture {
        Gesture {
            kind: GestureKind::Tap,
            button: MouseButton::Left,
            position: Point::new(x, y),
            time: Instant::now(),
        }
    }

    fn tapper(name: &str, consume: bool, log: &Log) -> View {
        let log = log.clone();
        let owned = name.to_owned();
        View::container().with_name(name).on_tap(move |_, _| {
            log.borrow_mut().push(owned.clone());
            consume
        })
    }

    fn place(tree: &mut ViewTree, name: &str, rect: Rect) -> ViewId {
        let id = tree.find(name).unwrap();
        tree.view_mut(id).set_rect(rect);
        id
    }

    #[test]
    fn test_tap_goes_to_children_first_and_stops_at_consumer() {
        let log: Log = Rc::default();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                tapper("root", true, &log)
                    .with_child(tapper("passive", false, &log))
                    .with_child(tapper("eager", true, &log))
                    .with_child(tapper("late", true, &log)),
            )
            .unwrap();
        tree.view_mut(root).set_size(100, 100);
        place(&mut tree, "passive", Rect::new(0, 0, 50, 50));
        let eager = place(&mut tree, "eager", Rect::new(0, 0, 50, 50));
        place(&mut tree, "late", Rect::new(0, 0, 50, 50));

        let consumer = dispatcher().dispatch_gesture(&mut tree, root, &tap_at(10, 10));
        assert_eq!(consumer, Some(eager));
        assert_eq!(*log.borrow(), vec!["passive", "eager"]);
    }

    #[test]
    fn test_tap_outside_children_reaches_parent() {
        let log: Log = Rc::default();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(tapper("root", true, &log).with_child(tapper("child", true, &log)))
            .unwrap();
        tree.view_mut(root).set_size(100, 100);
        place(&mut tree, "child", Rect::new(0, 0, 10, 10));

        assert_eq!(dispatcher().dispatch_gesture(&mut tree, root, &tap_at(50, 50)), Some(root));
    }

    #[test]
    fn test_long_press_goes_to_press_slot_and_double_tap_to_tap_slot() {
        let log: Log = Rc::default();
        let (taps, presses) = (log.clone(), log.clone());
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                View::container()
                    .on_tap(move |_, g| {
                        taps.borrow_mut().push(format!("tap {:?}", g.kind));
                        true
                    })
                    .on_press(move |_, g| {
                        presses.borrow_mut().push(format!("press {:?}", g.kind));
                        true
                    }),
            )
            .unwrap();
        tree.view_mut(root).set_size(100, 100);

        let mut dispatcher = dispatcher();
        for kind in [GestureKind::Press, GestureKind::DoubleTap] {
            let gesture = Gesture { kind, ..tap_at(5, 5) };
            assert_eq!(dispatcher.dispatch_gesture(&mut tree, root, &gesture), Some(root));
        }
        assert_eq!(*log.borrow(), vec!["press Press", "tap DoubleTap"]);
    }

    #[test]
    fn test_disabled_subtree_gets_no_gestures() {
        let log: Log = Rc::default();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(View::container().with_child(tapper("child", true, &log).with_disabled(true)))
            .unwrap();
        tree.view_mut(root).set_size(100, 100);
        place(&mut tree, "child", Rect::new(0, 0, 100, 100));

        assert_eq!(dispatcher().dispatch_gesture(&mut tree, root, &tap_at(5, 5)), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_keys_follow_focus() {
        let log: Log = Rc::default();
        let key_view = |name: &str, focusable: bool| {
            let log = log.clone();
            let owned = name.to_owned();
            View::container()
                .with_name(name)
                .with_focusable(focusable)
                .on_focus(|_, _| true)
                .on_key_down(move |_, _| log.borrow_mut().push(owned.clone()))
        };
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                View::container()
                    .with_child(key_view("global", false))
                    .with_child(key_view("edit", true))
                    .with_child(key_view("other", true)),
            )
            .unwrap();
        let edit = tree.find("edit").unwrap();
        crate::focus::request_focus(&mut tree, edit);

        let mut d = dispatcher();
        d.dispatch_key_down(&mut tree, root, &KeyEvent::named(NamedKey::Enter));
        assert_eq!(*log.borrow(), vec!["global", "edit"]);

        tree.view_mut(root).set_hidden(true);
        d.dispatch_key_down(&mut tree, root, &KeyEvent::new(Key::Character("x".into())));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_chars_skip_disabled_views() {
        let typed = Rc::new(RefCell::new(String::new()));
        let sink = typed.clone();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                View::container()
                    .with_child(View::container().with_name("field").on_char(move |_, ch| sink.borrow_mut().push(ch))),
            )
            .unwrap();
        let mut d = dispatcher();
        d.dispatch_char(&mut tree, root, 'a');
        let field = tree.find("field").unwrap();
        tree.view_mut(field).set_disabled(true);
        d.dispatch_char(&mut tree, root, 'b');

        assert_eq!(*typed.borrow(), "a");
    }

    #[test]
    fn test_hover_is_immediate_without_delay() {
        let log: Log = Rc::default();
        let sink = log.clone();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(View::container().with_child(
                View::container()
                    .with_name("target")
                    .on_hovering(move |_, on| sink.borrow_mut().push(format!("hover {}", on))),
            ))
            .unwrap();
        tree.view_mut(root).set_size(100, 100);
        let target = place(&mut tree, "target", Rect::new(10, 10, 20, 20));

        let mut d = dispatcher();
        d.dispatch_mouse(&mut tree, root, &MouseEvent::moved(Point::new(15, 15)));
        assert!(tree.view(target).is_hovered());
        assert!(tree.view(root).is_hovered());
        // Padded damage around both views whose hover state changed
        assert_eq!(tree.take_damage(), Some(Rect::new(-2, -2, 104, 104)));

        d.dispatch_mouse(&mut tree, root, &MouseEvent::new(MouseEventKind::Leave, Point::zero()));
        assert!(!tree.view(target).is_hovered());
        assert_eq!(*log.borrow(), vec!["hover true", "hover false"]);
    }

    #[test]
    fn test_hover_delay_is_serviced_later() {
        let log: Log = Rc::default();
        let sink = log.clone();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(View::container().with_child(
                View::container()
                    .with_name("target")
                    .with_hover_delay(Duration::from_millis(300))
                    .on_hovering(move |_, on| sink.borrow_mut().push(format!("hover {}", on))),
            ))
            .unwrap();
        tree.view_mut(root).set_size(100, 100);
        let target = place(&mut tree, "target", Rect::new(0, 0, 20, 20));
        let t0 = tree.now();

        let mut d = dispatcher();
        d.dispatch_mouse(&mut tree, root, &MouseEvent::moved(Point::new(5, 5)));
        assert!(log.borrow().is_empty());
        assert_eq!(d.hover_deadline(&tree, root), Some(t0 + Duration::from_millis(300)));

        d.service_hover(&mut tree, root, t0 + Duration::from_millis(100));
        assert!(log.borrow().is_empty());
        d.service_hover(&mut tree, root, t0 + Duration::from_millis(300));
        assert_eq!(*log.borrow(), vec!["hover true"]);
        assert_eq!(tree.view(target).hover_at(), None);
    }

    #[test]
    fn test_leaving_before_delay_cancels_hover() {
        let log: Log = Rc::default();
        let sink = log.clone();
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(View::container().with_child(
                View::container()
                    .with_name("target")
                    .with_hover_delay(Duration::from_millis(300))
                    .on_hovering(move |_, on| sink.borrow_mut().push(format!("hover {}", on))),
            ))
            .unwrap();
        tree.view_mut(root).set_size(100, 100);
        place(&mut tree, "target", Rect::new(0, 0, 20, 20));
        let t0 = tree.now();

        let mut d = dispatcher();
        d.dispatch_mouse(&mut tree, root, &MouseEvent::moved(Point::new(5, 5)));
        d.dispatch_mouse(&mut tree, root, &MouseEvent::moved(Point::new(50, 50)));
        d.service_hover(&mut tree, root, t0 + Duration::from_secs(1));

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_mouse_reaches_every_enabled_view() {
        let log: Log = Rc::default();
        let mouse_view = |name: &str| {
            let log = log.clone();
            let owned = name.to_owned();
            View::container()
                .with_name(name)
                .on_mouse(move |_, _| log.borrow_mut().push(owned.clone()))
        };
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                mouse_view("root")
                    .with_child(mouse_view("a"))
                    .with_child(mouse_view("hidden").with_hidden(true))
                    .with_child(mouse_view("disabled").with_disabled(true)),
            )
            .unwrap();
        tree.set_client_size(Size::new(10, 10));

        dispatcher().dispatch_mouse(&mut tree, root, &MouseEvent::down(MouseButton::Left, Point::new(500, 500)));
        assert_eq!(*log.borrow(), vec!["root", "a"]);
    }

    #[test]
    fn test_ticks_reach_hidden_views() {
        let count = Rc::new(RefCell::new(0));
        let counter = |c: &Rc<RefCell<i32>>| {
            let c = c.clone();
            move |_: &mut crate::context::Cx<'_>, tick: Tick| {
                if tick == Tick::Slow {
                    *c.borrow_mut() += 1;
                }
            }
        };
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                View::container()
                    .on_timer(counter(&count))
                    .with_child(View::container().with_hidden(true).on_timer(counter(&count)))
                    .with_child(View::container().with_disabled(true).on_timer(counter(&count))),
            )
            .unwrap();

        dispatcher().dispatch_tick(&mut tree, root, Tick::Slow);
        assert_eq!(*count.borrow(), 3);
    }
}
