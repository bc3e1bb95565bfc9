//! Contexts handed to behavior slots.
//!
//! A slot receives a [`Cx`] naming the view it belongs to plus mutable access to
//! the whole tree, so it can read its children, resize itself, arm timers or
//! post requests that the runtime carries out after the current dispatch.

use crate::gesture::Gesture;
use crate::measure::TextMeasurer;
use crate::primitives::{Point, Rect, Size};
use crate::timer::{TimerHandle, TimerOwner};
use crate::tree::ViewTree;
use crate::view::{View, ViewId};
use std::any::Any;
use std::time::{Duration, Instant};

/// Work a view asks the runtime to do once the current message is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Show `view` as a toast near the bottom of the window
    ShowToast { view: ViewId, timeout: Duration },
    /// Show `view` as a tooltip at a window position
    ShowTooltip {
        view: ViewId,
        at: Point,
        timeout: Duration,
    },
    /// Dismiss the active overlay (with its exit transition)
    DismissOverlay,
    /// Ask the application to close
    Close,
}

/// Entry of the posted-message queue, drained on the next loop turn
#[derive(Debug, Clone, PartialEq)]
pub enum Posted {
    Gesture(Gesture),
    Request(Request),
}

/// Mutable context for every slot except `paint`
pub struct Cx<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl<'a> Cx<'a> {
    pub(crate) fn new(tree: &'a mut ViewTree, id: ViewId) -> Self {
        Self { tree, id }
    }

    /// The view this slot belongs to
    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn view(&self) -> &View {
        self.tree.view(self.id)
    }

    pub fn view_mut(&mut self) -> &mut View {
        self.tree.view_mut(self.id)
    }

    pub fn tree(&self) -> &ViewTree {
        self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ViewTree {
        self.tree
    }

    pub fn children(&self) -> &[ViewId] {
        self.tree.children(self.id)
    }

    pub fn em(&self) -> Size {
        self.view().em()
    }

    /// Time of the message being dispatched
    pub fn now(&self) -> Instant {
        self.tree.now()
    }

    pub fn measurer(&mut self) -> &mut dyn TextMeasurer {
        self.tree.measurer_mut()
    }

    pub fn client_size(&self) -> Size {
        self.tree.client_size()
    }

    /// Typed widget state attached with [`View::with_data`]
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.view_mut().data_mut::<T>()
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.view().data::<T>()
    }

    // ========== Geometry ==========

    pub fn absolute_rect(&self) -> Rect {
        self.tree.absolute_rect(self.id)
    }

    /// Convert a window position into this view's coordinates
    pub fn to_local(&self, point: Point) -> Point {
        point.relative_to(self.tree.absolute_origin(self.id))
    }

    /// True if a window position lies inside this view
    pub fn contains(&self, point: Point) -> bool {
        self.absolute_rect().contains(point)
    }

    pub fn is_effectively_hidden(&self) -> bool {
        self.tree.is_effectively_hidden(self.id)
    }

    pub fn is_effectively_disabled(&self) -> bool {
        self.tree.is_effectively_disabled(self.id)
    }

    /// Neither hidden nor disabled, counting ancestors
    pub fn is_interactive(&self) -> bool {
        !self.is_effectively_hidden() && !self.is_effectively_disabled()
    }

    // ========== Invalidation ==========

    /// Repaint this view
    pub fn invalidate(&mut self) {
        self.tree.invalidate_view(self.id);
    }

    pub fn request_layout(&mut self) {
        self.tree.request_layout();
        self.tree.invalidate_all();
    }

    // ========== Timers ==========

    /// Arm a one-shot timer; it arrives at this view's timer slot as `Tick::Timer(handle)`
    pub fn arm_timer(&mut self, delay: Duration) -> TimerHandle {
        let now = self.tree.now();
        self.tree.timers.arm(TimerOwner::View(self.id), now, delay)
    }

    pub fn cancel_timer(&mut self, handle: TimerHandle) -> bool {
        self.tree.timers.cancel(handle)
    }

    // ========== Focus ==========

    pub fn is_focused(&self) -> bool {
        self.tree.focused() == Some(self.id)
    }

    /// Try to take keyboard focus right away; returns whether this view holds it
    pub fn request_focus(&mut self) -> bool {
        crate::focus::request_focus(self.tree, self.id)
    }

    // ========== Requests ==========

    pub fn post(&mut self, request: Request) {
        self.tree.post(Posted::Request(request));
    }

    pub fn show_toast(&mut self, view: ViewId, timeout: Duration) {
        self.post(Request::ShowToast { view, timeout });
    }

    pub fn show_tooltip(&mut self, view: ViewId, at: Point, timeout: Duration) {
        self.post(Request::ShowTooltip { view, at, timeout });
    }

    pub fn dismiss_overlay(&mut self) {
        self.post(Request::DismissOverlay);
    }

    pub fn request_close(&mut self) {
        self.post(Request::Close);
    }
}

/// Read-only context for `paint`
pub struct PaintCx<'a> {
    tree: &'a ViewTree,
    id: ViewId,
}

impl<'a> PaintCx<'a> {
    pub(crate) fn new(tree: &'a ViewTree, id: ViewId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn view(&self) -> &View {
        self.tree.view(self.id)
    }

    pub fn tree(&self) -> &ViewTree {
        self.tree
    }

    /// The view's rectangle in its own coordinates (the painter is already translated)
    pub fn bounds(&self) -> Rect {
        self.view().bounds()
    }

    pub fn is_focused(&self) -> bool {
        self.tree.focused() == Some(self.id)
    }

    pub fn is_disabled(&self) -> bool {
        self.tree.is_effectively_disabled(self.id)
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.view().data::<T>()
    }
}
