//! Button component
//!
//! A push button with hover, armed and focus states. Activated by a tap or
//! double tap, or by Enter / Space while it holds keyboard focus.

use crate::common::{content_rect, is_activation_key, track_armed, with_callback};
use arbor::{
    palette, Color, Component, Cx, FontId, HorizontalAlign, PaintCx, Painter, Size, Stroke, View,
    ViewKind,
};
use arbor_macros::WithBuilders;

pub type ClickFn = Box<dyn FnMut(&mut Cx<'_>)>;

/// Visual styling for a button
#[derive(Debug, Clone, WithBuilders)]
pub struct ButtonStyle {
    /// Background color when idle
    pub idle_color: Color,
    /// Background color when hovered
    pub hover_color: Color,
    /// Background color while held down or toggled on
    pub pressed_color: Color,
    /// Background color when disabled
    pub disabled_color: Color,

    /// Outline color
    pub stroke_color: Color,
    /// Outline color while focused
    pub focus_color: Color,

    /// Text color
    pub text_color: Color,
    /// Disabled text color
    pub disabled_text_color: Color,

    /// Space between the label and the edge
    pub padding: Size,
    /// Corner radius for rounded corners
    pub border_radius: i32,
    pub font: FontId,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            // Fill Colors
            idle_color: palette::BASE,
            hover_color: palette::MANTLE,
            pressed_color: palette::CRUST,
            disabled_color: palette::BASE.with_alpha(204),
            // Stroke Colors
            stroke_color: palette::SURFACE0,
            focus_color: palette::LAVENDER,
            // Text Colors
            text_color: palette::TEXT,
            disabled_text_color: palette::SUBTEXT,
            // Others
            padding: Size::new(12, 6),
            border_radius: 6,
            font: FontId::DEFAULT,
        }
    }
}

struct ButtonState {
    on_click: Option<ClickFn>,
}

/// A clickable button component
///
/// # Example
///
/// ```ignore
/// Button::new("Save")
///     .on_click(|cx| cx.request_close())
///     .view()
/// ```
pub struct Button {
    label: String,
    disabled: bool,
    style: ButtonStyle,
    on_click: Option<ClickFn>,
}

impl Button {
    /// Create a new button with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Button {
            label: label.into(),
            disabled: false,
            style: ButtonStyle::default(),
            on_click: None,
        }
    }

    /// Set whether the button is disabled
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set a custom style for the button
    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// Set a callback to be called when the button is activated
    pub fn on_click(mut self, f: impl FnMut(&mut Cx<'_>) + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }
}

fn click(cx: &mut Cx<'_>) {
    log::trace!("button {:?} clicked", cx.id());
    cx.invalidate();
    with_callback(cx, |s: &mut ButtonState| &mut s.on_click, |f, cx| f(cx));
}

fn paint_button(style: &ButtonStyle, cx: &PaintCx<'_>, painter: &mut dyn Painter) {
    let view = cx.view();
    let bounds = cx.bounds();
    let disabled = cx.is_disabled();

    let fill = if disabled {
        style.disabled_color
    } else if view.is_armed() || view.is_pressed() {
        style.pressed_color
    } else if view.is_hovered() {
        style.hover_color
    } else {
        style.idle_color
    };
    let outline = if cx.is_focused() {
        style.focus_color
    } else {
        style.stroke_color
    };
    painter.set_brush(Some(fill));
    painter.set_pen(Some(Stroke::new(1, outline)));
    painter.rounded_rect(bounds, style.border_radius);

    if let Some(label) = view.text() {
        let color = if disabled {
            style.disabled_text_color
        } else {
            style.text_color
        };
        painter.set_font(view.font());
        painter.set_pen(Some(Stroke::new(1, color)));
        painter.text(content_rect(view), label, HorizontalAlign::Center);
    }
}

impl Component for Button {
    fn view(self) -> View {
        let style = self.style;
        View::new(ViewKind::Button)
            .with_text(self.label)
            .with_font(style.font)
            .with_padding(style.padding)
            .with_focusable(true)
            .with_disabled(self.disabled)
            .with_data(ButtonState {
                on_click: self.on_click,
            })
            .on_focus(|cx, _| {
                cx.invalidate();
                true
            })
            .on_hovering(|cx, _| cx.invalidate())
            .on_mouse(track_armed)
            .on_tap(|cx, _| {
                click(cx);
                true
            })
            .on_key_down(|cx, event| {
                if is_activation_key(event) && !event.repeat {
                    click(cx);
                }
            })
            .on_paint(move |cx, painter| paint_button(&style, cx, painter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::{click_at, key, mount};
    use crate::containers::column;
    use arbor::{DisplayList, DrawCommand, KeyEvent, NamedKey, Point};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_button(count: &Rc<Cell<u32>>) -> View {
        let count = count.clone();
        Button::new("OK")
            .on_click(move |_| count.set(count.get() + 1))
            .view()
            .with_name("ok")
    }

    #[test]
    fn test_tap_clicks_once() {
        let count = Rc::new(Cell::new(0));
        let (mut runtime, now) = mount(column(0, [counting_button(&count)]));

        click_at(&mut runtime, now, Point::new(5, 5));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_tap_outside_is_ignored() {
        let count = Rc::new(Cell::new(0));
        let (mut runtime, now) = mount(column(0, [counting_button(&count)]));

        click_at(&mut runtime, now, Point::new(300, 190));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_disabled_button_does_not_click() {
        let count = Rc::new(Cell::new(0));
        let sink = count.clone();
        let button = Button::new("OK")
            .disabled(true)
            .on_click(move |_| sink.set(sink.get() + 1))
            .view();
        let (mut runtime, now) = mount(column(0, [button]));

        click_at(&mut runtime, now, Point::new(5, 5));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_enter_clicks_only_when_focused() {
        let count = Rc::new(Cell::new(0));
        let (mut runtime, now) = mount(column(0, [counting_button(&count)]));

        key(&mut runtime, now, KeyEvent::named(NamedKey::Enter));
        assert_eq!(count.get(), 0);

        let ok = runtime.tree().find("ok").unwrap();
        assert!(runtime.request_focus(ok));
        key(&mut runtime, now, KeyEvent::named(NamedKey::Enter));
        key(&mut runtime, now, KeyEvent::named(NamedKey::Space));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_measures_label_plus_padding() {
        let (runtime, _) = mount(column(0, [Button::new("Hello").view().with_name("b")]));
        let b = runtime.tree().find("b").unwrap();
        // 5 glyphs of 8x16 plus 12x6 padding on each side
        assert_eq!(runtime.tree().view(b).size(), Size::new(64, 28));
    }

    #[test]
    fn test_paints_background_and_label() {
        let (mut runtime, _) = mount(column(0, [Button::new("Go").view()]));
        let mut list = DisplayList::new();
        runtime.paint(&mut list);

        assert!(list.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Rect { radius: 6, fill: Some(fill), .. } if *fill == palette::BASE
        )));
        assert!(list
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "Go")));
        assert!(list.is_balanced());
    }
}
