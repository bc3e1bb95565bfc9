//! Single-line text editor shell
//!
//! Holds its text in the view's text field and a caret as a char index.
//! Typed characters insert at the caret; Backspace, Delete, the arrows,
//! Home and End edit and move it; Enter submits. The caret blinks on the slow
//! cadence while the editor has focus. A press inside the editor takes focus
//! and places the caret at once, without waiting for the gesture recognizer.

use crate::common::{content_rect, with_callback};
use arbor::{
    palette, Color, Component, Cx, FontId, HorizontalAlign, Key, KeyEvent, MouseButton,
    MouseEvent, MouseEventKind, NamedKey, PaintCx, Painter, Point, Size, Stroke, Tick, View,
    ViewKind,
};
use arbor_macros::WithBuilders;

pub type TextFn = Box<dyn FnMut(&mut Cx<'_>, &str)>;

/// Visual styling for a text editor
#[derive(Debug, Clone, WithBuilders)]
pub struct TextEditStyle {
    pub background: Color,
    pub stroke_color: Color,
    /// Outline while focused
    pub focus_color: Color,
    pub text_color: Color,
    pub disabled_text_color: Color,
    pub caret_color: Color,
    pub padding: Size,
    /// Width of the text area in ems
    pub width: f32,
    pub border_radius: i32,
    pub font: FontId,
}

impl Default for TextEditStyle {
    fn default() -> Self {
        Self {
            background: palette::MANTLE,
            stroke_color: palette::SURFACE1,
            focus_color: palette::LAVENDER,
            text_color: palette::TEXT,
            disabled_text_color: palette::OVERLAY,
            caret_color: palette::TEXT,
            padding: Size::new(6, 4),
            width: 20.0,
            border_radius: 4,
            font: FontId::DEFAULT,
        }
    }
}

/// Caret and callbacks, kept in the view's data
struct EditState {
    /// Char index of the caret
    caret: usize,
    /// Caret offset from the text's left edge, in pixels
    caret_x: i32,
    caret_visible: bool,
    on_change: Option<TextFn>,
    on_submit: Option<TextFn>,
}

/// A single-line text editor
///
/// # Example
///
/// ```ignore
/// TextEdit::new("draft")
///     .on_submit(|cx, text| log::info!("submitted {text}"))
///     .view()
/// ```
pub struct TextEdit {
    text: String,
    disabled: bool,
    style: TextEditStyle,
    on_change: Option<TextFn>,
    on_submit: Option<TextFn>,
}

impl TextEdit {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: false,
            style: TextEditStyle::default(),
            on_change: None,
            on_submit: None,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_style(mut self, style: TextEditStyle) -> Self {
        self.style = style;
        self
    }

    /// Called with the new text after every edit
    pub fn on_change(mut self, f: impl FnMut(&mut Cx<'_>, &str) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Called with the text when Enter is pressed
    pub fn on_submit(mut self, f: impl FnMut(&mut Cx<'_>, &str) + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    /// Caret position (char index) of a text editor view
    pub fn caret_of(view: &View) -> Option<usize> {
        view.data::<EditState>().map(|s| s.caret)
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn current_text(cx: &Cx<'_>) -> String {
    cx.view().text().unwrap_or_default().to_owned()
}

/// Move the caret, show it and recompute its pixel offset
fn set_caret(cx: &mut Cx<'_>, caret: usize) {
    let text = current_text(cx);
    let caret = caret.min(text.chars().count());
    let font = cx.view().font();
    let caret_x = cx
        .measurer()
        .text_extent(font, &text[..byte_offset(&text, caret)])
        .w;
    if let Some(state) = cx.data_mut::<EditState>() {
        state.caret = caret;
        state.caret_x = caret_x;
        state.caret_visible = true;
    }
    cx.invalidate();
}

fn caret(cx: &Cx<'_>) -> usize {
    cx.data::<EditState>().map(|s| s.caret).unwrap_or(0)
}

fn replace_text(cx: &mut Cx<'_>, text: String, caret: usize) {
    cx.view_mut().set_text(text.clone());
    set_caret(cx, caret);
    with_callback(cx, |s: &mut EditState| &mut s.on_change, |f, cx| f(cx, &text));
}

fn insert(cx: &mut Cx<'_>, ch: char) {
    if ch.is_control() {
        return;
    }
    let mut text = current_text(cx);
    let at = caret(cx);
    text.insert(byte_offset(&text, at), ch);
    replace_text(cx, text, at + 1);
}

fn on_key(cx: &mut Cx<'_>, event: &KeyEvent) {
    let Key::Named(named) = event.key else {
        return;
    };
    let mut text = current_text(cx);
    let len = text.chars().count();
    let at = caret(cx);

    match named {
        NamedKey::Backspace if at > 0 => {
            text.remove(byte_offset(&text, at - 1));
            replace_text(cx, text, at - 1);
        }
        NamedKey::Delete if at < len => {
            text.remove(byte_offset(&text, at));
            replace_text(cx, text, at);
        }
        NamedKey::ArrowLeft => set_caret(cx, at.saturating_sub(1)),
        NamedKey::ArrowRight => set_caret(cx, at + 1),
        NamedKey::Home => set_caret(cx, 0),
        NamedKey::End => set_caret(cx, len),
        NamedKey::Enter => {
            log::debug!("text edit {:?} submitted", cx.id());
            with_callback(cx, |s: &mut EditState| &mut s.on_submit, |f, cx| f(cx, &text));
        }
        _ => {}
    }
}

/// Char index whose boundary is nearest to local x `x` in the text area
fn caret_at(cx: &mut Cx<'_>, x: i32) -> usize {
    let text = current_text(cx);
    let font = cx.view().font();
    let mut best = (0, x.abs());
    for (index, (offset, ch)) in text.char_indices().enumerate() {
        let end = offset + ch.len_utf8();
        let width = cx.measurer().text_extent(font, &text[..end]).w;
        let distance = (width - x).abs();
        if distance < best.1 {
            best = (index + 1, distance);
        }
    }
    best.0
}

fn on_mouse(cx: &mut Cx<'_>, event: &MouseEvent) {
    if event.kind != MouseEventKind::Down(MouseButton::Left) || !cx.contains(event.position) {
        return;
    }
    cx.request_focus();
    let local = cx.to_local(event.position);
    let x = local.x - cx.view().padding().w;
    let index = caret_at(cx, x);
    set_caret(cx, index);
}

fn paint_edit(style: &TextEditStyle, cx: &PaintCx<'_>, painter: &mut dyn Painter) {
    let view = cx.view();
    let focused = cx.is_focused();
    let disabled = cx.is_disabled();

    painter.set_brush(Some(style.background));
    painter.set_pen(Some(Stroke::new(
        1,
        if focused {
            style.focus_color
        } else {
            style.stroke_color
        },
    )));
    painter.rounded_rect(cx.bounds(), style.border_radius);

    let area = content_rect(view);
    painter.set_clip(area);
    if let Some(text) = view.text() {
        painter.set_font(view.font());
        painter.set_pen(Some(Stroke::new(
            1,
            if disabled {
                style.disabled_text_color
            } else {
                style.text_color
            },
        )));
        painter.text(area, text, HorizontalAlign::Left);
    }

    let Some(state) = cx.data::<EditState>() else {
        return;
    };
    if focused && !disabled && state.caret_visible {
        let x = area.x + state.caret_x;
        painter.set_pen(Some(Stroke::new(1, style.caret_color)));
        painter.line(Point::new(x, area.y), Point::new(x, area.bottom() - 1));
    }
}

impl Component for TextEdit {
    fn view(self) -> View {
        let style = self.style;
        let initial = self.text.chars().count();
        View::new(ViewKind::TextEdit)
            .with_text(self.text)
            .with_font(style.font)
            .with_width(style.width)
            .with_padding(style.padding)
            .with_focusable(true)
            .with_disabled(self.disabled)
            .with_data(EditState {
                caret: initial,
                caret_x: 0,
                caret_visible: true,
                on_change: self.on_change,
                on_submit: self.on_submit,
            })
            .on_init(move |cx| set_caret(cx, initial))
            .on_focus(|cx, gained| {
                if gained {
                    let at = caret(cx);
                    set_caret(cx, at);
                } else {
                    cx.invalidate();
                }
                true
            })
            .on_mouse(on_mouse)
            .on_char(insert)
            .on_key_down(on_key)
            .on_timer(|cx, tick| {
                if tick != Tick::Slow || !cx.is_focused() {
                    return;
                }
                if let Some(state) = cx.data_mut::<EditState>() {
                    state.caret_visible = !state.caret_visible;
                }
                cx.invalidate();
            })
            .on_paint(move |cx, painter| paint_edit(&style, cx, painter))
    }
}
