//! Text metrics used by the measure pass.
//!
//! Font rasterization belongs to the painting backend; the engine only needs
//! the em cell of a font and the extent of a string. Backends implement
//! [`TextMeasurer`]; [`MonospaceMeasurer`] is a fixed-cell implementation used
//! when no backend is attached and in tests.

use crate::primitives::Size;

/// Opaque handle to a backend font
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontId(pub u16);

impl FontId {
    pub const DEFAULT: FontId = FontId(0);
}

/// Backend-agnostic text measurement.
pub trait TextMeasurer {
    /// Pixel size of a reference glyph cell in `font`.
    fn em(&mut self, font: FontId) -> Size;

    /// Bounding box of `text` on a single line (newlines start new lines).
    fn text_extent(&mut self, font: FontId, text: &str) -> Size;

    /// Bounding box of `text` word-wrapped at `max_width`.
    fn wrapped_extent(&mut self, font: FontId, text: &str, max_width: i32) -> Size;
}

/// Every glyph occupies the same cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonospaceMeasurer {
    pub cell: Size,
}

impl MonospaceMeasurer {
    pub const fn new(cell: Size) -> Self {
        Self { cell }
    }

    fn wrapped_lines(&self, text: &str, max_width: i32) -> Vec<usize> {
        let max_chars = (max_width / self.cell.w.max(1)).max(1) as usize;
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = 0usize;
            for word in paragraph.split_whitespace() {
                let len = word.chars().count();
                if current == 0 {
                    current = len;
                } else if current + 1 + len <= max_chars {
                    current += 1 + len;
                } else {
                    lines.push(current);
                    current = len;
                }
                // Break words longer than a whole line
                while current > max_chars {
                    lines.push(max_chars);
                    current -= max_chars;
                }
            }
            lines.push(current);
        }
        lines
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new(Size::new(8, 16))
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn em(&mut self, _font: FontId) -> Size {
        self.cell
    }

    fn text_extent(&mut self, _font: FontId, text: &str) -> Size {
        if text.is_empty() {
            return Size::zero();
        }
        let widest = text.split('\n').map(|line| line.chars().count()).max().unwrap_or(0);
        let lines = text.split('\n').count();
        Size::new(widest as i32 * self.cell.w, lines as i32 * self.cell.h)
    }

    fn wrapped_extent(&mut self, _font: FontId, text: &str, max_width: i32) -> Size {
        if text.is_empty() {
            return Size::zero();
        }
        let lines = self.wrapped_lines(text, max_width);
        let widest = lines.iter().copied().max().unwrap_or(0);
        Size::new(widest as i32 * self.cell.w, lines.len() as i32 * self.cell.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_extent() {
        let mut m = MonospaceMeasurer::default();
        assert_eq!(m.text_extent(FontId::DEFAULT, "hello"), Size::new(40, 16));
        assert_eq!(m.text_extent(FontId::DEFAULT, "ab\nabcd"), Size::new(32, 32));
        assert_eq!(m.text_extent(FontId::DEFAULT, ""), Size::zero());
    }

    #[test]
    fn test_wrapped_extent_breaks_on_words() {
        let mut m = MonospaceMeasurer::default();
        // 10 chars per line
        let size = m.wrapped_extent(FontId::DEFAULT, "one two three four", 80);
        assert_eq!(size, Size::new(10 * 8, 2 * 16));
    }

    #[test]
    fn test_wrapped_extent_splits_long_words() {
        let mut m = MonospaceMeasurer::default();
        let size = m.wrapped_extent(FontId::DEFAULT, "abcdefghijkl", 40);
        assert_eq!(size, Size::new(40, 3 * 16));
    }
}
