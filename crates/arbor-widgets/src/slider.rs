//! Slider component
//!
//! A horizontal track with a draggable thumb. Pressing the track away from
//! the thumb pages toward the pointer and keeps paging on the fast cadence
//! while the button is held. Arrow keys, Page Up/Down, Home and End work
//! while the slider is focused.

use crate::common::with_callback;
use arbor::{
    palette, Color, Component, Cx, Key, KeyEvent, MouseButton, MouseEvent, MouseEventKind,
    NamedKey, PaintCx, Painter, Rect, Stroke, Tick, View, ViewKind,
};
use arbor_macros::WithBuilders;
use std::ops::RangeInclusive;

pub type ChangeFn = Box<dyn FnMut(&mut Cx<'_>, f32)>;

/// Visual styling for a slider
#[derive(Debug, Clone, WithBuilders)]
pub struct SliderStyle {
    /// Color of the track (unfilled portion)
    pub track_color: Color,
    /// Color of the filled portion of the track
    pub filled_color: Color,
    /// Color of the draggable thumb
    pub thumb_color: Color,
    /// Color of the thumb when hovered or dragged
    pub thumb_active_color: Color,
    /// Thumb outline while focused
    pub focus_color: Color,
    /// Length of the slider track
    pub track_width: i32,
    /// Thickness of the slider track
    pub track_height: i32,
    /// Side of the square thumb
    pub thumb_size: i32,
}

impl Default for SliderStyle {
    fn default() -> Self {
        Self {
            track_color: palette::SURFACE0,
            filled_color: palette::LAVENDER,
            thumb_color: palette::BASE,
            thumb_active_color: palette::SURFACE1,
            focus_color: palette::BLUE,
            track_width: 200,
            track_height: 6,
            thumb_size: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    /// Thumb follows the pointer
    Thumb,
    /// Track held away from the thumb; page toward `target` (local x)
    Repeat { target: i32 },
}

struct SliderState {
    value: f32,
    range: RangeInclusive<f32>,
    step: Option<f32>,
    thumb_size: i32,
    drag: Option<Drag>,
    on_change: Option<ChangeFn>,
}

impl SliderState {
    fn span(&self) -> f32 {
        self.range.end() - self.range.start()
    }

    fn fraction(&self) -> f32 {
        if self.span() <= 0.0 {
            0.0
        } else {
            ((self.value - self.range.start()) / self.span()).clamp(0.0, 1.0)
        }
    }

    /// Clamp to the range and snap to the step
    fn constrain(&self, value: f32) -> f32 {
        let (start, end) = (*self.range.start(), *self.range.end());
        let mut value = value.clamp(start, end);
        if let Some(step) = self.step.filter(|s| *s > 0.0) {
            value = (start + ((value - start) / step).round() * step).clamp(start, end);
        }
        value
    }

    fn key_step(&self) -> f32 {
        self.step.unwrap_or(self.span() / 100.0)
    }

    fn page_step(&self) -> f32 {
        self.step.map(|s| s * 10.0).unwrap_or(self.span() / 10.0)
    }

    /// Thumb rectangle in the slider's coordinates
    fn thumb_rect(&self, width: i32, height: i32) -> Rect {
        let usable = (width - self.thumb_size).max(0);
        let x = (usable as f32 * self.fraction()).round() as i32;
        Rect::new(x, (height - self.thumb_size) / 2, self.thumb_size, self.thumb_size)
    }

    /// Value under a local x coordinate, aiming the thumb's center at it
    fn value_at(&self, x: i32, width: i32) -> f32 {
        let usable = (width - self.thumb_size).max(1);
        let fraction = ((x - self.thumb_size / 2) as f32 / usable as f32).clamp(0.0, 1.0);
        self.range.start() + self.span() * fraction
    }
}

/// A slider component for selecting values within a range
///
/// # Example
///
/// ```ignore
/// Slider::new(50.0, 0.0..=100.0)
///     .step(5.0)
///     .on_change(|_, value| println!("Value: {}", value))
///     .view()
/// ```
pub struct Slider {
    value: f32,
    range: RangeInclusive<f32>,
    step: Option<f32>,
    disabled: bool,
    style: SliderStyle,
    on_change: Option<ChangeFn>,
}

impl Slider {
    /// Create a new slider with the given value and range.
    ///
    /// A reversed range is flipped; a NaN bound collapses onto the other one.
    pub fn new(value: f32, range: RangeInclusive<f32>) -> Self {
        Slider {
            value,
            range: normalize(range),
            step: None,
            disabled: false,
            style: SliderStyle::default(),
            on_change: None,
        }
    }

    /// Set the step size for value snapping
    pub fn step(mut self, step: f32) -> Self {
        self.step = Some(step);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_style(mut self, style: SliderStyle) -> Self {
        self.style = style;
        self
    }

    /// Set a callback to be called when the slider value changes
    pub fn on_change(mut self, f: impl FnMut(&mut Cx<'_>, f32) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Current value of a slider view
    pub fn value_of(view: &View) -> Option<f32> {
        view.data::<SliderState>().map(|s| s.value)
    }
}

fn normalize(range: RangeInclusive<f32>) -> RangeInclusive<f32> {
    let (start, end) = range.into_inner();
    let (start, end) = match (start.is_nan(), end.is_nan()) {
        (true, true) => (0.0, 0.0),
        (true, false) => (end, end),
        (false, true) => (start, start),
        (false, false) => (start, end),
    };
    start.min(end)..=start.max(end)
}

fn set_value(cx: &mut Cx<'_>, value: f32) {
    let Some(state) = cx.data_mut::<SliderState>() else {
        return;
    };
    let value = state.constrain(value);
    if value == state.value {
        return;
    }
    state.value = value;
    cx.invalidate();
    with_callback(cx, |s: &mut SliderState| &mut s.on_change, |f, cx| f(cx, value));
}

/// Move one page toward local x `target`; false once the thumb covers it
fn page_toward(cx: &mut Cx<'_>, target: i32) -> bool {
    let (w, h) = (cx.view().w(), cx.view().h());
    let Some(state) = cx.data::<SliderState>() else {
        return false;
    };
    let thumb = state.thumb_rect(w, h);
    let value = if target < thumb.x {
        state.value - state.page_step()
    } else if target >= thumb.right() {
        state.value + state.page_step()
    } else {
        return false;
    };
    set_value(cx, value);
    true
}

fn on_mouse(cx: &mut Cx<'_>, event: &MouseEvent) {
    let local = cx.to_local(event.position);
    let (w, h) = (cx.view().w(), cx.view().h());
    let Some(drag) = cx.data::<SliderState>().map(|s| s.drag) else {
        return;
    };

    match (event.kind, drag) {
        (MouseEventKind::Down(MouseButton::Left), _) if cx.contains(event.position) => {
            cx.request_focus();
            let on_thumb = cx
                .data::<SliderState>()
                .is_some_and(|s| s.thumb_rect(w, h).contains(local));
            let drag = if on_thumb {
                Drag::Thumb
            } else {
                page_toward(cx, local.x);
                Drag::Repeat { target: local.x }
            };
            set_drag(cx, Some(drag));
        }
        (MouseEventKind::Move, Some(Drag::Thumb)) => {
            let value = cx.data::<SliderState>().map(|s| s.value_at(local.x, w));
            if let Some(value) = value {
                set_value(cx, value);
            }
        }
        (MouseEventKind::Move, Some(Drag::Repeat { .. })) => {
            set_drag(cx, Some(Drag::Repeat { target: local.x }));
        }
        (MouseEventKind::Up(MouseButton::Left) | MouseEventKind::Leave, Some(_)) => {
            set_drag(cx, None);
        }
        _ => {}
    }
}

fn set_drag(cx: &mut Cx<'_>, drag: Option<Drag>) {
    if let Some(state) = cx.data_mut::<SliderState>() {
        state.drag = drag;
    }
    cx.view_mut().set_armed(drag.is_some());
    cx.invalidate();
}

fn on_key(cx: &mut Cx<'_>, event: &KeyEvent) {
    let Some(state) = cx.data::<SliderState>() else {
        return;
    };
    let value = match event.key {
        Key::Named(NamedKey::ArrowLeft | NamedKey::ArrowDown) => state.value - state.key_step(),
        Key::Named(NamedKey::ArrowRight | NamedKey::ArrowUp) => state.value + state.key_step(),
        Key::Named(NamedKey::PageDown) => state.value - state.page_step(),
        Key::Named(NamedKey::PageUp) => state.value + state.page_step(),
        Key::Named(NamedKey::Home) => *state.range.start(),
        Key::Named(NamedKey::End) => *state.range.end(),
        _ => return,
    };
    set_value(cx, value);
}

fn paint_slider(style: &SliderStyle, cx: &PaintCx<'_>, painter: &mut dyn Painter) {
    let Some(state) = cx.data::<SliderState>() else {
        return;
    };
    let view = cx.view();
    let (w, h) = (view.w(), view.h());
    let thumb = state.thumb_rect(w, h);
    let track = Rect::new(0, (h - style.track_height) / 2, w, style.track_height);

    painter.set_pen(None);
    painter.set_brush(Some(style.track_color));
    painter.rounded_rect(track, style.track_height / 2);
    painter.set_brush(Some(style.filled_color));
    painter.rounded_rect(
        Rect::new(0, track.y, thumb.x + thumb.w / 2, track.h),
        style.track_height / 2,
    );

    let fill = if view.is_armed() || view.is_hovered() {
        style.thumb_active_color
    } else {
        style.thumb_color
    };
    let outline = if cx.is_focused() {
        style.focus_color
    } else {
        style.track_color
    };
    painter.set_brush(Some(fill));
    painter.set_pen(Some(Stroke::new(1, outline)));
    painter.rounded_rect(thumb, style.thumb_size / 4);
}

impl Component for Slider {
    fn view(self) -> View {
        let style = self.style;
        let mut state = SliderState {
            value: self.value,
            range: self.range,
            step: self.step,
            thumb_size: style.thumb_size,
            drag: None,
            on_change: self.on_change,
        };
        state.value = state.constrain(state.value);
        let (width, height) = (style.track_width, style.thumb_size);

        View::new(ViewKind::Slider)
            .with_focusable(true)
            .with_disabled(self.disabled)
            .with_data(state)
            .on_measure(move |cx| cx.view_mut().set_size(width, height))
            .on_focus(|cx, _| {
                cx.invalidate();
                true
            })
            .on_hovering(|cx, _| cx.invalidate())
            .on_mouse(on_mouse)
            .on_key_down(on_key)
            .on_timer(|cx, tick| {
                if tick != Tick::Fast || !cx.is_interactive() {
                    return;
                }
                if let Some(Drag::Repeat { target }) = cx.data::<SliderState>().and_then(|s| s.drag) {
                    page_toward(cx, target);
                }
            })
            .on_paint(move |cx, painter| paint_slider(&style, cx, painter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::{key, mount};
    use crate::containers::column;
    use arbor::{Point, RawEvent, Runtime};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    fn mount_slider(slider: Slider) -> (Runtime, Instant, arbor::ViewId) {
        let (runtime, now) = mount(column(0, [slider.view().with_name("s")]));
        let id = runtime.tree().find("s").unwrap();
        (runtime, now, id)
    }

    fn value(runtime: &Runtime, id: arbor::ViewId) -> f32 {
        Slider::value_of(runtime.tree().view(id)).unwrap()
    }

    fn mouse(runtime: &mut Runtime, now: Instant, event: MouseEvent) {
        runtime.handle(RawEvent::Mouse(event), now);
    }

    #[test]
    fn test_initial_value_is_clamped_and_snapped() {
        let (runtime, _, id) = mount_slider(Slider::new(123.0, 0.0..=100.0));
        assert_eq!(value(&runtime, id), 100.0);
        let (runtime, _, id) = mount_slider(Slider::new(12.0, 0.0..=100.0).step(5.0));
        assert_eq!(value(&runtime, id), 10.0);
    }

    #[test]
    fn test_reversed_or_nan_range_is_normalized() {
        let (runtime, _, id) = mount_slider(Slider::new(20.0, 10.0..=0.0));
        assert_eq!(value(&runtime, id), 10.0);
        let (runtime, _, id) = mount_slider(Slider::new(5.0, f32::NAN..=3.0));
        assert_eq!(value(&runtime, id), 3.0);
    }

    #[test]
    fn test_dragging_thumb_follows_pointer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let (mut runtime, now, id) = mount_slider(
            Slider::new(0.0, 0.0..=184.0).on_change(move |_, v| sink.borrow_mut().push(v)),
        );

        // Thumb sits at x 0..16; usable track is 184px wide
        mouse(&mut runtime, now, MouseEvent::down(MouseButton::Left, Point::new(8, 8)));
        mouse(&mut runtime, now, MouseEvent::moved(Point::new(100, 8)));
        mouse(&mut runtime, now, MouseEvent::up(MouseButton::Left, Point::new(100, 8)));
        mouse(&mut runtime, now, MouseEvent::moved(Point::new(150, 8)));

        assert_eq!(value(&runtime, id), 92.0);
        assert_eq!(*seen.borrow(), vec![92.0]);
        assert_eq!(runtime.focused(), Some(id));
    }

    #[test]
    fn test_holding_track_pages_on_fast_cadence() {
        let (mut runtime, now, id) = mount_slider(Slider::new(0.0, 0.0..=100.0));

        mouse(&mut runtime, now, MouseEvent::down(MouseButton::Left, Point::new(190, 8)));
        assert_eq!(value(&runtime, id), 10.0);

        runtime.advance(now + Duration::from_millis(300));
        assert_eq!(value(&runtime, id), 40.0);

        mouse(
            &mut runtime,
            now + Duration::from_millis(300),
            MouseEvent::up(MouseButton::Left, Point::new(190, 8)),
        );
        runtime.advance(now + Duration::from_millis(600));
        assert_eq!(value(&runtime, id), 40.0);
    }

    #[test]
    fn test_keys_step_and_jump() {
        let (mut runtime, now, id) = mount_slider(Slider::new(50.0, 0.0..=100.0).step(5.0));
        runtime.request_focus(id);

        key(&mut runtime, now, KeyEvent::named(NamedKey::ArrowRight));
        assert_eq!(value(&runtime, id), 55.0);
        key(&mut runtime, now, KeyEvent::named(NamedKey::PageDown));
        assert_eq!(value(&runtime, id), 5.0);
        key(&mut runtime, now, KeyEvent::named(NamedKey::End));
        assert_eq!(value(&runtime, id), 100.0);
        key(&mut runtime, now, KeyEvent::named(NamedKey::ArrowUp));
        assert_eq!(value(&runtime, id), 100.0);
    }

    #[test]
    fn test_disabled_slider_ignores_input() {
        let (mut runtime, now, id) = mount_slider(Slider::new(0.0, 0.0..=100.0).disabled(true));
        mouse(&mut runtime, now, MouseEvent::down(MouseButton::Left, Point::new(190, 8)));
        runtime.advance(now + Duration::from_millis(300));
        assert_eq!(value(&runtime, id), 0.0);
    }
}
