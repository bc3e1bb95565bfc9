//! Checkbox component
//!
//! A tick box followed by a label. The view's pressed flag holds the checked
//! state; a tap or Space while focused flips it.

use crate::common::{is_activation_key, track_armed, with_callback};
use arbor::{
    default_measure, palette, Color, Component, Cx, FontId, HorizontalAlign, PaintCx, Painter,
    Point, Rect, Size, Stroke, View, ViewKind,
};
use arbor_macros::WithBuilders;

pub type ToggleFn = Box<dyn FnMut(&mut Cx<'_>, bool)>;

/// Visual styling for a checkbox
#[derive(Debug, Clone, WithBuilders)]
pub struct CheckboxStyle {
    /// Box fill
    pub box_color: Color,
    /// Box fill while hovered or held
    pub box_hover_color: Color,
    /// Box outline
    pub stroke_color: Color,
    /// Box outline while focused
    pub focus_color: Color,
    /// Tick mark
    pub check_color: Color,
    pub text_color: Color,
    pub disabled_text_color: Color,
    /// Space between box and label
    pub gap: i32,
    pub padding: Size,
    pub font: FontId,
}

impl Default for CheckboxStyle {
    fn default() -> Self {
        Self {
            box_color: palette::BASE,
            box_hover_color: palette::SURFACE0,
            stroke_color: palette::SURFACE1,
            focus_color: palette::LAVENDER,
            check_color: palette::BLUE,
            text_color: palette::TEXT,
            disabled_text_color: palette::SUBTEXT,
            gap: 6,
            padding: Size::new(2, 2),
            font: FontId::DEFAULT,
        }
    }
}

struct CheckboxState {
    on_toggle: Option<ToggleFn>,
}

/// A labelled two-state checkbox
pub struct Checkbox {
    label: String,
    checked: bool,
    disabled: bool,
    style: CheckboxStyle,
    on_toggle: Option<ToggleFn>,
}

impl Checkbox {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
            disabled: false,
            style: CheckboxStyle::default(),
            on_toggle: None,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_style(mut self, style: CheckboxStyle) -> Self {
        self.style = style;
        self
    }

    /// Called with the new state after every flip
    pub fn on_toggle(mut self, f: impl FnMut(&mut Cx<'_>, bool) + 'static) -> Self {
        self.on_toggle = Some(Box::new(f));
        self
    }

    /// Checked state of a checkbox view
    pub fn is_checked(view: &View) -> bool {
        view.is_pressed()
    }
}

fn toggle(cx: &mut Cx<'_>) {
    let checked = !cx.view().is_pressed();
    cx.view_mut().set_pressed(checked);
    cx.invalidate();
    log::trace!("checkbox {:?} -> {}", cx.id(), checked);
    with_callback(cx, |s: &mut CheckboxState| &mut s.on_toggle, |f, cx| f(cx, checked));
}

/// Tick box square, one em high, at the left of the content area
fn box_rect(view: &View) -> Rect {
    let side = view.em().h;
    let padding = view.padding();
    Rect::new(padding.w, (view.h() - side) / 2, side, side)
}

fn paint_checkbox(style: &CheckboxStyle, cx: &PaintCx<'_>, painter: &mut dyn Painter) {
    let view = cx.view();
    let square = box_rect(view);

    let fill = if view.is_armed() || view.is_hovered() {
        style.box_hover_color
    } else {
        style.box_color
    };
    let outline = if cx.is_focused() {
        style.focus_color
    } else {
        style.stroke_color
    };
    painter.set_brush(Some(fill));
    painter.set_pen(Some(Stroke::new(1, outline)));
    painter.rect(square);

    if view.is_pressed() {
        let inset = square.inflate(-square.w / 4);
        painter.set_pen(Some(Stroke::new(2, style.check_color)));
        painter.line(
            Point::new(inset.x, inset.y + inset.h / 2),
            Point::new(inset.x + inset.w / 3, inset.bottom()),
        );
        painter.line(
            Point::new(inset.x + inset.w / 3, inset.bottom()),
            Point::new(inset.right(), inset.y),
        );
    }

    if let Some(label) = view.text() {
        let color = if cx.is_disabled() {
            style.disabled_text_color
        } else {
            style.text_color
        };
        let x = square.right() + style.gap;
        let text_rect = Rect::new(x, view.padding().h, view.w() - x - view.padding().w, view.h() - 2 * view.padding().h);
        painter.set_font(view.font());
        painter.set_pen(Some(Stroke::new(1, color)));
        painter.text(text_rect, label, HorizontalAlign::Left);
    }
}

impl Component for Checkbox {
    fn view(self) -> View {
        let style = self.style;
        let gap = style.gap;
        View::new(ViewKind::Checkbox)
            .with_text(self.label)
            .with_font(style.font)
            .with_padding(style.padding)
            .with_pressed(self.checked)
            .with_focusable(true)
            .with_disabled(self.disabled)
            .with_data(CheckboxState {
                on_toggle: self.on_toggle,
            })
            .on_measure(move |cx| {
                default_measure(cx);
                let side = cx.em().h;
                let size = cx.view().size();
                cx.view_mut().set_size(size.w + side + gap, size.h);
            })
            .on_focus(|cx, _| {
                cx.invalidate();
                true
            })
            .on_hovering(|cx, _| cx.invalidate())
            .on_mouse(track_armed)
            .on_tap(|cx, _| {
                toggle(cx);
                true
            })
            .on_key_down(|cx, event| {
                if is_activation_key(event) && !event.repeat {
                    toggle(cx);
                }
            })
            .on_paint(move |cx, painter| paint_checkbox(&style, cx, painter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::{click_at, key, mount};
    use crate::containers::column;
    use arbor::{DisplayList, DrawCommand, KeyEvent, NamedKey};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_tap_toggles_and_reports() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let checkbox = Checkbox::new("Wrap", false)
            .on_toggle(move |_, checked| sink.borrow_mut().push(checked))
            .view()
            .with_name("wrap");
        let (mut runtime, now) = mount(column(0, [checkbox]));
        let id = runtime.tree().find("wrap").unwrap();

        let now = click_at(&mut runtime, now, Point::new(4, 4));
        assert!(Checkbox::is_checked(runtime.tree().view(id)));
        click_at(&mut runtime, now, Point::new(4, 4));
        assert!(!Checkbox::is_checked(runtime.tree().view(id)));
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_space_toggles_when_focused() {
        let (mut runtime, now) = mount(column(0, [Checkbox::new("a", true).view().with_name("a")]));
        let id = runtime.tree().find("a").unwrap();
        runtime.request_focus(id);

        key(&mut runtime, now, KeyEvent::named(NamedKey::Space));
        assert!(!runtime.tree().view(id).is_pressed());
    }

    #[test]
    fn test_measure_adds_box_and_gap() {
        let (runtime, _) = mount(column(0, [Checkbox::new("abc", false).view().with_name("c")]));
        let id = runtime.tree().find("c").unwrap();
        // 24 text + 2*2 padding + 16 box + 6 gap
        assert_eq!(runtime.tree().view(id).size(), Size::new(50, 20));
    }

    #[test]
    fn test_tick_painted_only_when_checked() {
        let lines = |checked: bool| {
            let (mut runtime, _) = mount(column(0, [Checkbox::new("x", checked).view()]));
            let mut list = DisplayList::new();
            runtime.paint(&mut list);
            list.commands()
                .iter()
                .filter(|c| matches!(c, DrawCommand::Line { .. }))
                .count()
        };
        assert_eq!(lines(true), 2);
        assert_eq!(lines(false), 0);
    }
}
