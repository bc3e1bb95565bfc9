use crate::context::{Cx, PaintCx};
use crate::gesture::Gesture;
use crate::input::{KeyEvent, MouseEvent};
use crate::measure::FontId;
use crate::paint::Painter;
use crate::primitives::{Point, Rect, Size};
use crate::timer::Tick;
use bitflags::bitflags;
use std::any::Any;
use std::fmt;
use std::time::{Duration, Instant};

slotmap::new_key_type! {
    /// Arena key of a view. Doubles as the non-owning parent/focus reference.
    pub struct ViewId;
}

/// Type tag of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Plain grouping view
    Container,
    Button,
    Checkbox,
    Slider,
    Text,
    MessageBox,
    TextEdit,
    /// Application-defined view
    Custom(&'static str),
}

bitflags! {
    /// State flags of a view
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewFlags: u8 {
        /// Not painted, not measured, receives no input (inherited)
        const HIDDEN = 1 << 0;
        /// Painted but receives no input (inherited)
        const DISABLED = 1 << 1;
        /// Pointer is held down on the view
        const ARMED = 1 << 2;
        /// Sticky toggled state (checkbox ticked, toggle button down)
        const PRESSED = 1 << 3;
        /// Can hold keyboard focus
        const FOCUSABLE = 1 << 4;
        /// Pointer is over the view
        const HOVER = 1 << 5;
    }
}

pub type MeasureFn = Box<dyn FnMut(&mut Cx<'_>)>;
pub type LayoutFn = Box<dyn FnMut(&mut Cx<'_>)>;
pub type PaintFn = Box<dyn FnMut(&PaintCx<'_>, &mut dyn Painter)>;
/// Returns true when the gesture was consumed
pub type GestureFn = Box<dyn FnMut(&mut Cx<'_>, &Gesture) -> bool>;
pub type MouseFn = Box<dyn FnMut(&mut Cx<'_>, &MouseEvent)>;
pub type CharFn = Box<dyn FnMut(&mut Cx<'_>, char)>;
pub type KeyFn = Box<dyn FnMut(&mut Cx<'_>, &KeyEvent)>;
pub type TimerFn = Box<dyn FnMut(&mut Cx<'_>, Tick)>;
/// Called with `true` to offer focus (return true to accept) and `false` on loss
pub type FocusFn = Box<dyn FnMut(&mut Cx<'_>, bool) -> bool>;
pub type HoverFn = Box<dyn FnMut(&mut Cx<'_>, bool)>;
pub type NotifyFn = Box<dyn FnMut(&mut Cx<'_>)>;

/// The optional behavior slots of a view.
///
/// A slot is moved out while it runs, so a callback never observes its own
/// slot as present.
#[derive(Default)]
pub struct Behavior {
    pub(crate) measure: Option<MeasureFn>,
    pub(crate) layout: Option<LayoutFn>,
    pub(crate) paint: Option<PaintFn>,
    pub(crate) tap: Option<GestureFn>,
    pub(crate) press: Option<GestureFn>,
    pub(crate) mouse: Option<MouseFn>,
    pub(crate) char: Option<CharFn>,
    pub(crate) key_down: Option<KeyFn>,
    pub(crate) key_up: Option<KeyFn>,
    pub(crate) timer: Option<TimerFn>,
    pub(crate) focus: Option<FocusFn>,
    pub(crate) hovering: Option<HoverFn>,
    pub(crate) init: Option<NotifyFn>,
    pub(crate) dismissed: Option<NotifyFn>,
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut present = Vec::new();
        let slots = [
            ("measure", self.measure.is_some()),
            ("layout", self.layout.is_some()),
            ("paint", self.paint.is_some()),
            ("tap", self.tap.is_some()),
            ("press", self.press.is_some()),
            ("mouse", self.mouse.is_some()),
            ("char", self.char.is_some()),
            ("key_down", self.key_down.is_some()),
            ("key_up", self.key_up.is_some()),
            ("timer", self.timer.is_some()),
            ("focus", self.focus.is_some()),
            ("hovering", self.hovering.is_some()),
            ("init", self.init.is_some()),
            ("dismissed", self.dismissed.is_some()),
        ];
        for (name, set) in slots {
            if set {
                present.push(name);
            }
        }
        f.debug_tuple("Behavior").field(&present).finish()
    }
}

/// Slot accessors for [`crate::ViewTree::with_slot`]
pub(crate) mod slot {
    use super::*;

    pub fn measure(b: &mut Behavior) -> &mut Option<MeasureFn> {
        &mut b.measure
    }

    pub fn layout(b: &mut Behavior) -> &mut Option<LayoutFn> {
        &mut b.layout
    }

    pub fn tap(b: &mut Behavior) -> &mut Option<GestureFn> {
        &mut b.tap
    }

    pub fn press(b: &mut Behavior) -> &mut Option<GestureFn> {
        &mut b.press
    }

    pub fn mouse(b: &mut Behavior) -> &mut Option<MouseFn> {
        &mut b.mouse
    }

    pub fn char(b: &mut Behavior) -> &mut Option<CharFn> {
        &mut b.char
    }

    pub fn key_down(b: &mut Behavior) -> &mut Option<KeyFn> {
        &mut b.key_down
    }

    pub fn key_up(b: &mut Behavior) -> &mut Option<KeyFn> {
        &mut b.key_up
    }

    pub fn timer(b: &mut Behavior) -> &mut Option<TimerFn> {
        &mut b.timer
    }

    pub fn focus(b: &mut Behavior) -> &mut Option<FocusFn> {
        &mut b.focus
    }

    pub fn hovering(b: &mut Behavior) -> &mut Option<HoverFn> {
        &mut b.hovering
    }

    pub fn init(b: &mut Behavior) -> &mut Option<NotifyFn> {
        &mut b.init
    }

    pub fn dismissed(b: &mut Behavior) -> &mut Option<NotifyFn> {
        &mut b.dismissed
    }
}

/// One element of the view tree.
///
/// Geometry is relative to the parent's origin and only meaningful after a
/// measure and layout pass. Views are assembled with the `with_*`/`on_*`
/// builders and handed to a [`crate::ViewTree`], which takes ownership.
pub struct View {
    kind: ViewKind,
    name: Option<String>,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    /// Glyph cell of `font`, refreshed on every measure pass
    em: Size,
    /// Requested width in ems (0 = size to text)
    width: f32,
    padding: Size,
    text: Option<String>,
    font: FontId,
    wrap: bool,
    /// Vertical shift applied by grid arrangement to line up text baselines
    baseline_offset: i32,
    flags: ViewFlags,
    hover_delay: Option<Duration>,
    pub(crate) hover_at: Option<Instant>,
    /// `hovering(true)` has been delivered and not yet balanced
    pub(crate) hover_active: bool,
    pub(crate) initialized: bool,
    pub(crate) parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
    /// Children added through the builder, moved into the arena on insert
    pub(crate) pending: Vec<View>,
    pub(crate) behavior: Behavior,
    data: Option<Box<dyn Any>>,
}

impl View {
    /// Create a new view with default settings
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            name: None,
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            em: Size::zero(),
            width: 0.0,
            padding: Size::zero(),
            text: None,
            font: FontId::DEFAULT,
            wrap: false,
            baseline_offset: 0,
            flags: ViewFlags::empty(),
            hover_delay: None,
            hover_at: None,
            hover_active: false,
            initialized: false,
            parent: None,
            children: Vec::new(),
            pending: Vec::new(),
            behavior: Behavior::default(),
            data: None,
        }
    }

    /// Plain grouping view
    pub fn container() -> Self {
        Self::new(ViewKind::Container)
    }

    // ========== Builders ==========

    /// Name used by [`crate::ViewTree::find`]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font(mut self, font: FontId) -> Self {
        self.font = font;
        self
    }

    /// Requested width in ems
    pub fn with_width(mut self, ems: f32) -> Self {
        self.width = ems;
        self
    }

    /// Horizontal and vertical padding added on each side by the default measure
    pub fn with_padding(mut self, padding: Size) -> Self {
        self.padding = padding;
        self
    }

    /// Word-wrap the text at the requested width
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Initial size; a measure slot or the default measure overrides it
    pub fn with_size(mut self, w: i32, h: i32) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.flags.set(ViewFlags::HIDDEN, hidden);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.flags.set(ViewFlags::DISABLED, disabled);
        self
    }

    pub fn with_pressed(mut self, pressed: bool) -> Self {
        self.flags.set(ViewFlags::PRESSED, pressed);
        self
    }

    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.flags.set(ViewFlags::FOCUSABLE, focusable);
        self
    }

    /// Delay before `hovering(true)` is delivered
    pub fn with_hover_delay(mut self, delay: Duration) -> Self {
        self.hover_delay = Some(delay);
        self
    }

    /// Attach widget state, reachable through [`View::data`] / [`Cx::data_mut`]
    pub fn with_data<T: Any>(mut self, data: T) -> Self {
        self.data = Some(Box::new(data));
        self
    }

    pub fn with_child(mut self, child: View) -> Self {
        self.pending.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        self.pending.extend(children);
        self
    }

    // ========== Behavior slots ==========

    pub fn on_measure(mut self, f: impl FnMut(&mut Cx<'_>) + 'static) -> Self {
        self.behavior.measure = Some(Box::new(f));
        self
    }

    pub fn on_layout(mut self, f: impl FnMut(&mut Cx<'_>) + 'static) -> Self {
        self.behavior.layout = Some(Box::new(f));
        self
    }

    pub fn on_paint(mut self, f: impl FnMut(&PaintCx<'_>, &mut dyn Painter) + 'static) -> Self {
        self.behavior.paint = Some(Box::new(f));
        self
    }

    pub fn on_tap(mut self, f: impl FnMut(&mut Cx<'_>, &Gesture) -> bool + 'static) -> Self {
        self.behavior.tap = Some(Box::new(f));
        self
    }

    pub fn on_press(mut self, f: impl FnMut(&mut Cx<'_>, &Gesture) -> bool + 'static) -> Self {
        self.behavior.press = Some(Box::new(f));
        self
    }

    pub fn on_mouse(mut self, f: impl FnMut(&mut Cx<'_>, &MouseEvent) + 'static) -> Self {
        self.behavior.mouse = Some(Box::new(f));
        self
    }

    pub fn on_char(mut self, f: impl FnMut(&mut Cx<'_>, char) + 'static) -> Self {
        self.behavior.char = Some(Box::new(f));
        self
    }

    pub fn on_key_down(mut self, f: impl FnMut(&mut Cx<'_>, &KeyEvent) + 'static) -> Self {
        self.behavior.key_down = Some(Box::new(f));
        self
    }

    pub fn on_key_up(mut self, f: impl FnMut(&mut Cx<'_>, &KeyEvent) + 'static) -> Self {
        self.behavior.key_up = Some(Box::new(f));
        self
    }

    pub fn on_timer(mut self, f: impl FnMut(&mut Cx<'_>, Tick) + 'static) -> Self {
        self.behavior.timer = Some(Box::new(f));
        self
    }

    pub fn on_focus(mut self, f: impl FnMut(&mut Cx<'_>, bool) -> bool + 'static) -> Self {
        self.behavior.focus = Some(Box::new(f));
        self
    }

    pub fn on_hovering(mut self, f: impl FnMut(&mut Cx<'_>, bool) + 'static) -> Self {
        self.behavior.hovering = Some(Box::new(f));
        self
    }

    /// Runs once, the first time the view is opened or shown as an overlay
    pub fn on_init(mut self, f: impl FnMut(&mut Cx<'_>) + 'static) -> Self {
        self.behavior.init = Some(Box::new(f));
        self
    }

    /// Runs when the view stops being the active overlay
    pub fn on_dismissed(mut self, f: impl FnMut(&mut Cx<'_>) + 'static) -> Self {
        self.behavior.dismissed = Some(Box::new(f));
        self
    }

    // ========== Accessors ==========

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn w(&self) -> i32 {
        self.w
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Rectangle relative to the parent
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Rectangle in the view's own coordinates
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.w, self.h)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_size(&mut self, w: i32, h: i32) {
        self.w = w;
        self.h = h;
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.set_position(rect.x, rect.y);
        self.set_size(rect.w, rect.h);
    }

    pub fn em(&self) -> Size {
        self.em
    }

    pub(crate) fn set_em(&mut self, em: Size) {
        self.em = em;
    }

    /// Requested width in ems
    pub fn width_ratio(&self) -> f32 {
        self.width
    }

    pub fn padding(&self) -> Size {
        self.padding
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn font(&self) -> FontId {
        self.font
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Distance from the top edge to the first text baseline, for views with text
    pub fn baseline(&self) -> Option<i32> {
        self.text.as_ref().map(|_| self.padding.h + self.em.h)
    }

    pub fn baseline_offset(&self) -> i32 {
        self.baseline_offset
    }

    pub(crate) fn set_baseline_offset(&mut self, offset: i32) {
        self.baseline_offset = offset;
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ViewFlags::HIDDEN)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.flags.set(ViewFlags::HIDDEN, hidden);
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(ViewFlags::DISABLED)
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.flags.set(ViewFlags::DISABLED, disabled);
    }

    pub fn is_armed(&self) -> bool {
        self.flags.contains(ViewFlags::ARMED)
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.flags.set(ViewFlags::ARMED, armed);
    }

    pub fn is_pressed(&self) -> bool {
        self.flags.contains(ViewFlags::PRESSED)
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.flags.set(ViewFlags::PRESSED, pressed);
    }

    pub fn is_focusable(&self) -> bool {
        self.flags.contains(ViewFlags::FOCUSABLE)
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.flags.set(ViewFlags::FOCUSABLE, focusable);
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.contains(ViewFlags::HOVER)
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.flags.set(ViewFlags::HOVER, hovered);
    }

    pub fn hover_delay(&self) -> Option<Duration> {
        self.hover_delay
    }

    /// Pending hover-start deadline, if any
    pub fn hover_at(&self) -> Option<Instant> {
        self.hover_at
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref().and_then(|d| d.downcast_ref::<T>())
    }

    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_mut().and_then(|d| d.downcast_mut::<T>())
    }

    pub fn has_mouse(&self) -> bool {
        self.behavior.mouse.is_some()
    }

    pub fn has_focus_slot(&self) -> bool {
        self.behavior.focus.is_some()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("rect", &self.rect())
            .field("flags", &self.flags)
            .field("text", &self.text)
            .field("children", &self.children.len())
            .field("behavior", &self.behavior)
            .finish()
    }
}
