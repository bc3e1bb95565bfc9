//! The view arena.
//!
//! [`ViewTree`] owns every view, keyed by [`ViewId`]. Children are ordered key
//! lists and the parent link is a key, so upward queries never hold a borrow.
//! The tree is assembled once (insert, attach, set the root) and then sealed;
//! after that only view state changes, never the shape of the tree.

use crate::context::{Cx, Posted, Request};
use crate::error::TreeError;
use crate::measure::{MonospaceMeasurer, TextMeasurer};
use crate::primitives::{Point, Rect, Size};
use crate::timer::Timers;
use crate::view::{Behavior, View, ViewId};
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::time::Instant;

pub struct ViewTree {
    views: SlotMap<ViewId, View>,
    root: Option<ViewId>,
    sealed: bool,
    pub(crate) timers: Timers,
    measurer: Box<dyn TextMeasurer>,
    pub(crate) focused: Option<ViewId>,
    damage: Option<Rect>,
    layout_dirty: bool,
    client: Size,
    scale: f32,
    now: Instant,
    pub(crate) posted: VecDeque<Posted>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    pub fn new() -> Self {
        Self::with_measurer(MonospaceMeasurer::default())
    }

    /// Create a tree that measures text with a backend measurer
    pub fn with_measurer(measurer: impl TextMeasurer + 'static) -> Self {
        Self {
            views: SlotMap::with_key(),
            root: None,
            sealed: false,
            timers: Timers::new(),
            measurer: Box::new(measurer),
            focused: None,
            damage: None,
            layout_dirty: true,
            client: Size::zero(),
            scale: 1.0,
            now: Instant::now(),
            posted: VecDeque::new(),
        }
    }

    // ========== Construction ==========

    /// Move a view and its builder children into the arena.
    ///
    /// The returned view is detached; give it a parent with [`ViewTree::attach`]
    /// or make it the root.
    pub fn insert(&mut self, mut view: View) -> ViewId {
        let pending = std::mem::take(&mut view.pending);
        let id = self.views.insert(view);
        for child in pending {
            let child_id = self.insert(child);
            self.views[child_id].parent = Some(id);
            self.views[id].children.push(child_id);
        }
        id
    }

    /// Append `child` to `parent`'s children
    pub fn attach(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        if self.sealed {
            return Err(TreeError::Sealed);
        }
        if !self.views.contains_key(parent) {
            return Err(TreeError::UnknownView(parent));
        }
        let Some(view) = self.views.get(child) else {
            return Err(TreeError::UnknownView(child));
        };
        if let Some(existing) = view.parent {
            return Err(TreeError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.root == Some(child) {
            return Err(TreeError::RootAsChild);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle { child, parent });
        }

        self.views[child].parent = Some(parent);
        self.views[parent].children.push(child);
        Ok(())
    }

    pub fn set_root(&mut self, id: ViewId) -> Result<(), TreeError> {
        if self.sealed {
            return Err(TreeError::Sealed);
        }
        if let Some(root) = self.root {
            return Err(TreeError::RootAlreadySet(root));
        }
        let Some(view) = self.views.get(id) else {
            return Err(TreeError::UnknownView(id));
        };
        if view.parent.is_some() {
            return Err(TreeError::RootAsChild);
        }
        self.root = Some(id);
        self.layout_dirty = true;
        Ok(())
    }

    /// Insert `view` and make it the root in one step
    pub fn set_root_view(&mut self, view: View) -> Result<ViewId, TreeError> {
        let id = self.insert(view);
        self.set_root(id)?;
        Ok(id)
    }

    /// Freeze the shape of the tree. Later `attach`/`set_root` calls fail.
    pub fn seal(&mut self) {
        if !self.sealed {
            log::debug!("view tree sealed with {} views", self.views.len());
        }
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn is_ancestor_or_self(&self, ancestor: ViewId, mut id: ViewId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.views.get(id).and_then(|v| v.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    // ========== Access ==========

    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(id)
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(id)
    }

    /// Borrow a view.
    ///
    /// # Panics
    /// If `id` does not belong to this tree.
    pub fn view(&self, id: ViewId) -> &View {
        match self.views.get(id) {
            Some(view) => view,
            None => panic!("unknown view {:?}", id),
        }
    }

    /// Mutably borrow a view.
    ///
    /// # Panics
    /// If `id` does not belong to this tree.
    pub fn view_mut(&mut self, id: ViewId) -> &mut View {
        match self.views.get_mut(id) {
            Some(view) => view,
            None => panic!("unknown view {:?}", id),
        }
    }

    pub fn children(&self, id: ViewId) -> &[ViewId] {
        &self.view(id).children
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.view(id).parent
    }

    /// First view with the given name
    pub fn find(&self, name: &str) -> Option<ViewId> {
        self.views
            .iter()
            .find(|(_, view)| view.name() == Some(name))
            .map(|(id, _)| id)
    }

    /// `id` followed by its descendants, parents before children
    pub fn pre_order(&self, id: ViewId) -> Vec<ViewId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.view(next).children.iter().rev().copied());
        }
        order
    }

    /// Hidden itself or below a hidden ancestor
    pub fn is_effectively_hidden(&self, id: ViewId) -> bool {
        self.any_ancestor_or_self(id, View::is_hidden)
    }

    /// Disabled itself or below a disabled ancestor
    pub fn is_effectively_disabled(&self, id: ViewId) -> bool {
        self.any_ancestor_or_self(id, View::is_disabled)
    }

    fn any_ancestor_or_self(&self, id: ViewId, test: fn(&View) -> bool) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            let view = self.view(next);
            if test(view) {
                return true;
            }
            current = view.parent;
        }
        false
    }

    /// Window-space origin of a view
    pub fn absolute_origin(&self, id: ViewId) -> Point {
        let mut origin = Point::zero();
        let mut current = Some(id);
        while let Some(next) = current {
            let view = self.view(next);
            origin = origin.offset(view.position());
            current = view.parent;
        }
        origin
    }

    /// Window-space rectangle of a view
    pub fn absolute_rect(&self, id: ViewId) -> Rect {
        Rect::from_origin_size(self.absolute_origin(id), self.view(id).size())
    }

    // ========== Window state ==========

    pub fn client_size(&self) -> Size {
        self.client
    }

    pub fn set_client_size(&mut self, size: Size) {
        if self.client != size {
            self.client = size;
            self.layout_dirty = true;
            self.invalidate(Rect::from_origin_size(Point::zero(), size));
        }
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    pub fn set_scale_factor(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Time of the message being dispatched
    pub fn now(&self) -> Instant {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    pub fn measurer_mut(&mut self) -> &mut dyn TextMeasurer {
        self.measurer.as_mut()
    }

    pub fn focused(&self) -> Option<ViewId> {
        self.focused
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    // ========== Invalidation ==========

    /// Add `rect` (window space) to the damaged area
    pub fn invalidate(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.damage = Some(match self.damage {
            Some(damage) => damage.union(&rect),
            None => rect,
        });
    }

    pub fn invalidate_view(&mut self, id: ViewId) {
        let rect = self.absolute_rect(id);
        self.invalidate(rect);
    }

    /// Repaint everything
    pub fn invalidate_all(&mut self) {
        self.invalidate(Rect::from_origin_size(Point::zero(), self.client));
    }

    pub fn damage(&self) -> Option<Rect> {
        self.damage
    }

    pub fn take_damage(&mut self) -> Option<Rect> {
        self.damage.take()
    }

    /// Measure and lay out again before the next paint
    pub fn request_layout(&mut self) {
        self.layout_dirty = true;
    }

    pub fn needs_layout(&self) -> bool {
        self.layout_dirty
    }

    pub(crate) fn clear_layout_dirty(&mut self) {
        self.layout_dirty = false;
    }

    // ========== Slot calls ==========

    /// Run a behavior slot of `id` with a context, if the slot is set.
    ///
    /// The slot is moved out for the duration of the call and put back
    /// afterwards unless the callback installed a replacement.
    pub(crate) fn with_slot<F: ?Sized, R>(
        &mut self,
        id: ViewId,
        slot: fn(&mut Behavior) -> &mut Option<Box<F>>,
        call: impl FnOnce(&mut F, &mut Cx<'_>) -> R,
    ) -> Option<R> {
        let mut callback = slot(&mut self.view_mut(id).behavior).take()?;
        let result = call(&mut *callback, &mut Cx::new(self, id));
        if let Some(view) = self.views.get_mut(id) {
            let restored = slot(&mut view.behavior);
            if restored.is_none() {
                *restored = Some(callback);
            }
        }
        Some(result)
    }

    /// Run `init` once for every view of the subtree at `id`
    pub fn init_subtree(&mut self, id: ViewId) {
        for next in self.pre_order(id) {
            if self.view(next).initialized {
                continue;
            }
            self.view_mut(next).initialized = true;
            self.with_slot(next, crate::view::slot::init, |f, cx| f(cx));
        }
    }

    /// Queue a request for the runtime, handled after the current message
    pub fn post_request(&mut self, request: Request) {
        self.post(Posted::Request(request));
    }

    pub(crate) fn post(&mut self, posted: Posted) {
        self.posted.push_back(posted);
    }

    pub(crate) fn take_posted(&mut self) -> Option<Posted> {
        self.posted.pop_front()
    }
}

impl std::fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewTree")
            .field("views", &self.views.len())
            .field("root", &self.root)
            .field("sealed", &self.sealed)
            .field("focused", &self.focused)
            .field("client", &self.client)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewKind;

    fn sample() -> (ViewTree, ViewId) {
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(
                View::container().with_name("root").with_child(
                    View::container()
                        .with_name("panel")
                        .with_child(View::new(ViewKind::Button).with_name("ok")),
                ),
            )
            .unwrap();
        (tree, root)
    }

    #[test]
    fn test_insert_flattens_builder_children() {
        let (tree, root) = sample();
        let panel = tree.find("panel").unwrap();
        let ok = tree.find("ok").unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(root), &[panel]);
        assert_eq!(tree.parent(ok), Some(panel));
        assert_eq!(tree.pre_order(root), vec![root, panel, ok]);
    }

    #[test]
    fn test_attach_rejects_reparenting_and_cycles() {
        let (mut tree, root) = sample();
        let panel = tree.find("panel").unwrap();
        let ok = tree.find("ok").unwrap();

        assert_eq!(
            tree.attach(root, ok),
            Err(TreeError::AlreadyAttached { child: ok, parent: panel })
        );
        assert_eq!(tree.attach(ok, root), Err(TreeError::RootAsChild));

        let loose = tree.insert(View::container());
        assert_eq!(tree.attach(loose, loose), Err(TreeError::Cycle { child: loose, parent: loose }));
        assert_eq!(tree.attach(ok, loose), Ok(()));

        tree.seal();
        let late = tree.insert(View::container());
        assert_eq!(tree.attach(root, late), Err(TreeError::Sealed));
    }

    #[test]
    fn test_root_can_only_be_set_once() {
        let (mut tree, root) = sample();
        let other = tree.insert(View::container());
        assert_eq!(tree.set_root(other), Err(TreeError::RootAlreadySet(root)));
    }

    #[test]
    fn test_hidden_and_disabled_are_inherited() {
        let (mut tree, root) = sample();
        let panel = tree.find("panel").unwrap();
        let ok = tree.find("ok").unwrap();

        tree.view_mut(panel).set_hidden(true);
        assert!(tree.is_effectively_hidden(ok));
        assert!(!tree.is_effectively_hidden(root));

        tree.view_mut(root).set_disabled(true);
        assert!(tree.is_effectively_disabled(ok));
        assert!(!tree.view(ok).is_disabled());
    }

    #[test]
    fn test_absolute_rect_sums_parent_offsets() {
        let (mut tree, _) = sample();
        let panel = tree.find("panel").unwrap();
        let ok = tree.find("ok").unwrap();
        tree.view_mut(panel).set_rect(Rect::new(10, 20, 100, 100));
        tree.view_mut(ok).set_rect(Rect::new(5, 5, 30, 12));

        assert_eq!(tree.absolute_rect(ok), Rect::new(15, 25, 30, 12));
    }

    #[test]
    fn test_damage_accumulates() {
        let mut tree = ViewTree::new();
        tree.invalidate(Rect::new(0, 0, 10, 10));
        tree.invalidate(Rect::new(20, 0, 10, 10));
        assert_eq!(tree.take_damage(), Some(Rect::new(0, 0, 30, 10)));
        assert_eq!(tree.take_damage(), None);
    }

    #[test]
    fn test_slot_is_absent_while_running() {
        let (mut tree, root) = sample();
        tree.view_mut(root).behavior.init = Some(Box::new(|cx: &mut Cx<'_>| {
            let id = cx.id();
            assert!(cx.tree().view(id).behavior.init.is_none());
        }));
        tree.init_subtree(root);
        assert!(tree.view(root).behavior.init.is_some());
    }

    #[test]
    #[should_panic(expected = "unknown view")]
    fn test_unknown_id_panics() {
        let (tree, _) = sample();
        let _ = tree.view(ViewId::default());
    }
}
