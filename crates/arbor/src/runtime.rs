//! The per-window engine state and message pump.
//!
//! [`Runtime`] owns the view tree together with the singletons that work
//! across it: the dispatcher, the click detector, the overlay coordinator and
//! the timer service. A platform shell feeds it [`RawEvent`]s, calls
//! [`Runtime::advance`] when [`Runtime::next_deadline`] passes, and asks it to
//! [`Runtime::paint`] when damage is pending.
//!
//! Every message first runs the every-message hook (overlay timeout, deferred
//! hover), then its own dispatch. Gestures and view requests posted during a
//! message are handled after it, in order.

use crate::config::EngineConfig;
use crate::context::{Posted, Request};
use crate::events::EventDispatcher;
use crate::focus;
use crate::gesture::{ClickDetector, Gesture};
use crate::input::{Key, KeyEvent, Modifiers, MouseEvent, MouseEventKind, NamedKey, RawEvent};
use crate::layout::layout_tree;
use crate::overlay::{OverlayCoordinator, OverlayKind};
use crate::paint::{paint_tree, Painter};
use crate::primitives::{Point, Rect};
use crate::signal::InvalidateSignal;
use crate::timer::{Cadence, Tick, TimerHandle, TimerOwner};
use crate::tree::ViewTree;
use crate::view::{View, ViewId};
use std::time::{Duration, Instant};

/// Application callbacks. Every method has a do-nothing default.
pub trait AppHooks {
    /// The window opened and the views were initialized
    fn opened(&mut self, _tree: &mut ViewTree) {}

    /// Right before layout and paint
    fn before_paint(&mut self, _tree: &mut ViewTree) {}

    /// Slow cadence
    fn every_second(&mut self, _tree: &mut ViewTree) {}

    /// Fast cadence
    fn every_tick(&mut self, _tree: &mut ViewTree) {}

    /// The user asked to close the window. Return false to veto.
    fn close_requested(&mut self, _tree: &mut ViewTree) -> bool {
        true
    }

    /// The window is about to go away
    fn closed(&mut self, _tree: &mut ViewTree) {}

    /// Translation of a user-visible text, `None` to keep it
    fn localize(&mut self, _text: &str) -> Option<String> {
        None
    }
}

pub struct Runtime {
    tree: ViewTree,
    config: EngineConfig,
    dispatcher: EventDispatcher,
    clicks: ClickDetector,
    overlay: OverlayCoordinator,
    hooks: Option<Box<dyn AppHooks>>,
    signal: InvalidateSignal,
    cadences: Vec<TimerHandle>,
    opened: bool,
    closed: bool,
}

impl Runtime {
    pub fn new(tree: ViewTree, config: EngineConfig) -> Self {
        Self {
            dispatcher: EventDispatcher::new(&config),
            clicks: ClickDetector::new(&config),
            overlay: OverlayCoordinator::new(&config),
            tree,
            config,
            hooks: None,
            signal: InvalidateSignal::new(),
            cadences: Vec::new(),
            opened: false,
            closed: false,
        }
    }

    pub fn with_hooks(mut self, hooks: impl AppHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn overlay(&self) -> &OverlayCoordinator {
        &self.overlay
    }

    pub fn focused(&self) -> Option<ViewId> {
        self.tree.focused()
    }

    pub fn is_open(&self) -> bool {
        self.opened && !self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Handle to raise repaint requests from other threads
    pub fn invalidate_signal(&self) -> InvalidateSignal {
        self.signal.clone()
    }

    /// Insert a detached view to be shown later as an overlay
    pub fn insert_overlay(&mut self, view: View) -> ViewId {
        self.tree.insert(view)
    }

    /// Seal the tree, start the cadences and initialize every view
    pub fn open(&mut self, now: Instant) {
        if self.opened {
            return;
        }
        self.opened = true;
        self.tree.set_now(now);
        self.tree.seal();

        for cadence in [Cadence::Slow, Cadence::Fast] {
            let period = match cadence {
                Cadence::Slow => self.config.slow_cadence,
                Cadence::Fast => self.config.fast_cadence,
            };
            let handle = self
                .tree
                .timers
                .arm_repeating(TimerOwner::Cadence(cadence), now, period);
            self.cadences.push(handle);
        }

        if let Some(root) = self.tree.root() {
            self.tree.init_subtree(root);
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.opened(&mut self.tree);
        }
        self.tree.invalidate_all();
        log::debug!("runtime opened with {} views", self.tree.len());
        self.drain_posted();
    }

    // ========== Message pump ==========

    /// Dispatch one platform message that arrived at `now`
    pub fn handle(&mut self, event: RawEvent, now: Instant) {
        self.tree.set_now(now);
        focus::purge_focus(&mut self.tree);
        self.every_message(now);

        match event {
            RawEvent::Mouse(mouse) => self.handle_mouse(&mouse, now),
            RawEvent::Char(ch) => {
                if !self
                    .overlay
                    .intercept_char(&mut self.tree, &mut self.dispatcher, ch)
                {
                    if let Some(root) = self.tree.root() {
                        self.dispatcher.dispatch_char(&mut self.tree, root, ch);
                    }
                }
            }
            RawEvent::KeyDown(key) => self.handle_key(&key, true),
            RawEvent::KeyUp(key) => self.handle_key(&key, false),
            RawEvent::Activate(true) => {
                focus::set_focus(&mut self.tree);
            }
            RawEvent::Activate(false) => focus::kill_focus(&mut self.tree, true),
            RawEvent::Resize(size) => {
                log::trace!("client area resized to {:?}", size);
                self.tree.set_client_size(size);
            }
            RawEvent::ScaleFactor(scale) => {
                self.tree.set_scale_factor(scale);
                self.tree.request_layout();
                self.tree.invalidate_all();
            }
            RawEvent::Timer(handle, owner) => self.handle_timer(handle, owner, now),
            RawEvent::Wake => {}
        }

        self.drain_posted();
    }

    /// Fire every timer due at `now`, then run the every-message hook once more
    pub fn advance(&mut self, now: Instant) {
        while let Some((handle, owner)) = self.tree.timers.pop_due(now) {
            self.handle(RawEvent::Timer(handle, owner), now);
        }
        self.handle(RawEvent::Wake, now);
    }

    /// When the shell should call [`Runtime::advance`] next
    pub fn next_deadline(&self) -> Option<Instant> {
        let mut deadlines = vec![self.tree.timers().next_deadline(), self.overlay.deadline()];
        if let Some(root) = self.tree.root() {
            deadlines.push(self.dispatcher.hover_deadline(&self.tree, root));
        }
        if let Some(view) = self.overlay.active() {
            deadlines.push(self.dispatcher.hover_deadline(&self.tree, view));
        }
        deadlines.into_iter().flatten().min()
    }

    fn every_message(&mut self, now: Instant) {
        self.overlay.service(&mut self.tree, now);
        if let Some(root) = self.tree.root() {
            self.dispatcher.service_hover(&mut self.tree, root, now);
        }
        self.overlay
            .service_hover(&mut self.tree, &mut self.dispatcher, now);
    }

    fn handle_mouse(&mut self, event: &MouseEvent, now: Instant) {
        let timers = &mut self.tree.timers;
        let gesture = match event.kind {
            MouseEventKind::Down(button) => self.clicks.button_down(button, event.position, now, timers),
            MouseEventKind::Up(button) => self.clicks.button_up(button, now, timers),
            MouseEventKind::DoubleClick(button) => self.clicks.double_click(button, event.position, now, timers),
            _ => None,
        };
        if let Some(gesture) = gesture {
            self.tree.post(Posted::Gesture(gesture));
        }

        if self
            .overlay
            .intercept_mouse(&mut self.tree, &mut self.dispatcher, event)
        {
            return;
        }
        if let Some(root) = self.tree.root() {
            self.dispatcher.dispatch_mouse(&mut self.tree, root, event);
        }
    }

    fn handle_key(&mut self, event: &KeyEvent, down: bool) {
        if self
            .overlay
            .intercept_key(&mut self.tree, &mut self.dispatcher, event, down)
        {
            return;
        }
        if down && event.key == Key::Named(NamedKey::Tab) {
            let backwards = event.modifiers.contains(Modifiers::SHIFT);
            focus::focus_next(&mut self.tree, backwards);
            return;
        }
        let Some(root) = self.tree.root() else {
            return;
        };
        if down {
            self.dispatcher.dispatch_key_down(&mut self.tree, root, event);
        } else {
            self.dispatcher.dispatch_key_up(&mut self.tree, root, event);
        }
    }

    fn handle_timer(&mut self, handle: TimerHandle, owner: TimerOwner, now: Instant) {
        match owner {
            TimerOwner::Gesture(index) => {
                if let Some(gesture) = self
                    .clicks
                    .timer_fired(index, handle, now, &mut self.tree.timers)
                {
                    self.tree.post(Posted::Gesture(gesture));
                }
            }
            TimerOwner::Animation => self.overlay.on_timer(&mut self.tree, handle),
            TimerOwner::Cadence(cadence) => {
                let tick = Tick::from(cadence);
                if let Some(root) = self.tree.root() {
                    self.dispatcher.dispatch_tick(&mut self.tree, root, tick);
                }
                self.overlay
                    .dispatch_tick(&mut self.tree, &mut self.dispatcher, tick);
                if let Some(hooks) = self.hooks.as_mut() {
                    match cadence {
                        Cadence::Slow => hooks.every_second(&mut self.tree),
                        Cadence::Fast => hooks.every_tick(&mut self.tree),
                    }
                }
            }
            TimerOwner::View(id) => {
                self.dispatcher
                    .dispatch_view_timer(&mut self.tree, id, Tick::Timer(handle));
            }
        }
    }

    fn drain_posted(&mut self) {
        while let Some(posted) = self.tree.take_posted() {
            match posted {
                Posted::Gesture(gesture) => self.dispatch_gesture(&gesture),
                Posted::Request(request) => self.handle_request(request),
            }
        }
    }

    fn dispatch_gesture(&mut self, gesture: &Gesture) {
        if self
            .overlay
            .intercept_gesture(&mut self.tree, &mut self.dispatcher, gesture)
        {
            return;
        }
        if let Some(root) = self.tree.root() {
            self.dispatcher.dispatch_gesture(&mut self.tree, root, gesture);
        }
    }

    fn handle_request(&mut self, request: Request) {
        match request {
            Request::ShowToast { view, timeout } => self.show_toast(Some(view), timeout),
            Request::ShowTooltip { view, at, timeout } => self.show_tooltip(Some(view), at, timeout),
            Request::DismissOverlay => self.overlay.dismiss(&mut self.tree),
            Request::Close => {
                self.request_close();
            }
        }
    }

    // ========== Application surface ==========

    /// Show `view` as a toast; `None` cancels the active overlay
    pub fn show_toast(&mut self, view: Option<ViewId>, timeout: Duration) {
        self.show_overlay(view, OverlayKind::Toast, timeout);
    }

    /// Show `view` as a tooltip next to `at`; `None` cancels the active overlay
    pub fn show_tooltip(&mut self, view: Option<ViewId>, at: Point, timeout: Duration) {
        self.show_overlay(view, OverlayKind::Tooltip { anchor: at }, timeout);
    }

    fn show_overlay(&mut self, view: Option<ViewId>, kind: OverlayKind, timeout: Duration) {
        let Some(view) = view else {
            self.overlay.cancel(&mut self.tree);
            return;
        };
        let hooks = &mut self.hooks;
        let mut localize = |text: &str| hooks.as_mut().and_then(|h| h.localize(text));
        self.overlay
            .show(&mut self.tree, view, kind, timeout, &mut localize);
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay.dismiss(&mut self.tree);
    }

    /// Give keyboard focus to `id` if it accepts
    pub fn request_focus(&mut self, id: ViewId) -> bool {
        focus::request_focus(&mut self.tree, id)
    }

    /// Ask the application to close. Returns true if the window should go away.
    pub fn request_close(&mut self) -> bool {
        if self.closed {
            return true;
        }
        let allowed = match self.hooks.as_mut() {
            Some(hooks) => hooks.close_requested(&mut self.tree),
            None => true,
        };
        if !allowed {
            log::debug!("close vetoed");
            return false;
        }

        self.overlay.cancel(&mut self.tree);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.closed(&mut self.tree);
        }
        for handle in self.cadences.drain(..) {
            self.tree.timers.cancel(handle);
        }
        self.signal.close();
        self.closed = true;
        log::debug!("runtime closed");
        true
    }

    // ========== Painting ==========

    /// Measure and lay out if anything asked for it
    pub fn layout(&mut self) {
        if self.tree.needs_layout() {
            layout_tree(&mut self.tree);
        }
    }

    /// Lay out if needed, then paint the tree and the overlay above it
    pub fn paint(&mut self, painter: &mut dyn Painter) {
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.before_paint(&mut self.tree);
        }
        self.layout();
        paint_tree(&mut self.tree, painter);
        self.overlay.paint(&mut self.tree, painter);
    }

    /// Area that changed since the last call
    pub fn take_damage(&mut self) -> Option<Rect> {
        self.tree.take_damage()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("tree", &self.tree)
            .field("overlay", &self.overlay)
            .field("opened", &self.opened)
            .field("closed", &self.closed)
            .finish()
    }
}
