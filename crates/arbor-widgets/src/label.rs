//! Static text.

use crate::common::content_rect;
use arbor::{palette, Color, Component, FontId, HorizontalAlign, Size, Stroke, View, ViewKind};

/// A block of text, optionally word-wrapped at a fixed width
pub struct Label {
    text: String,
    color: Color,
    align: HorizontalAlign,
    font: FontId,
    wrap_width: Option<f32>,
    padding: Size,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: palette::TEXT,
            align: HorizontalAlign::Left,
            font: FontId::DEFAULT,
            wrap_width: None,
            padding: Size::zero(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_align(mut self, align: HorizontalAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_font(mut self, font: FontId) -> Self {
        self.font = font;
        self
    }

    pub fn with_padding(mut self, padding: Size) -> Self {
        self.padding = padding;
        self
    }

    /// Wrap at `ems` glyph widths; the label grows downward
    pub fn wrapped(mut self, ems: f32) -> Self {
        self.wrap_width = Some(ems);
        self
    }
}

impl Component for Label {
    fn view(self) -> View {
        let Label {
            text,
            color,
            align,
            font,
            wrap_width,
            padding,
        } = self;
        let view = View::new(ViewKind::Text)
            .with_text(text)
            .with_font(font)
            .with_padding(padding)
            .on_paint(move |cx, painter| {
                let view = cx.view();
                if let Some(text) = view.text() {
                    painter.set_font(view.font());
                    painter.set_pen(Some(Stroke::new(1, color)));
                    painter.text(content_rect(view), text, align);
                }
            });
        match wrap_width {
            Some(ems) => view.with_wrap(true).with_width(ems),
            None => view,
        }
    }
}
