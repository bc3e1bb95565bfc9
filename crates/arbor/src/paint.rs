//! Painting surface and the paint walk.
//!
//! The engine never rasterizes. Views draw through the [`Painter`] trait, which a
//! backend implements; [`DisplayList`] is a backend-agnostic implementation
//! that records draw commands in window coordinates for a renderer (or a
//! test) to consume.

use crate::context::PaintCx;
use crate::measure::FontId;
use crate::primitives::{Color, Point, Rect};
use crate::tree::ViewTree;
use crate::view::ViewId;

/// Outline style
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stroke {
    pub width: i32,
    pub color: Color,
}

impl Stroke {
    pub const fn new(width: i32, color: Color) -> Self {
        Self { width, color }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Opaque handle to a backend bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Drawing operations a view may use from its `paint` slot.
///
/// Coordinates are relative to the current translation. `save`/`restore`
/// bracket the full drawing state: translation, clip, pen, brush and font.
pub trait Painter {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, by: Point);
    /// Intersect the clip with `rect`
    fn set_clip(&mut self, rect: Rect);
    /// Outline for shapes and color for text; `None` draws no outline
    fn set_pen(&mut self, pen: Option<Stroke>);
    /// Fill for shapes; `None` leaves them hollow
    fn set_brush(&mut self, brush: Option<Color>);
    fn set_font(&mut self, font: FontId);
    fn rect(&mut self, rect: Rect);
    fn rounded_rect(&mut self, rect: Rect, radius: i32);
    fn line(&mut self, from: Point, to: Point);
    fn text(&mut self, rect: Rect, text: &str, align: HorizontalAlign);
    fn image(&mut self, rect: Rect, image: ImageId);
}

/// One recorded draw call, in window coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        radius: i32,
        stroke: Option<Stroke>,
        fill: Option<Color>,
        clip: Option<Rect>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Option<Stroke>,
        clip: Option<Rect>,
    },
    Text {
        rect: Rect,
        text: String,
        font: FontId,
        color: Color,
        align: HorizontalAlign,
        clip: Option<Rect>,
    },
    Image {
        rect: Rect,
        image: ImageId,
        clip: Option<Rect>,
    },
}

impl DrawCommand {
    /// Bounding rectangle of the command
    pub fn bounds(&self) -> Rect {
        match self {
            DrawCommand::Rect { rect, .. }
            | DrawCommand::Text { rect, .. }
            | DrawCommand::Image { rect, .. } => *rect,
            DrawCommand::Line { from, to, .. } => {
                let x = from.x.min(to.x);
                let y = from.y.min(to.y);
                Rect::new(x, y, (from.x - to.x).abs() + 1, (from.y - to.y).abs() + 1)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PaintState {
    origin: Point,
    clip: Option<Rect>,
    pen: Option<Stroke>,
    brush: Option<Color>,
    font: FontId,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            origin: Point::zero(),
            clip: None,
            pen: Some(Stroke::new(1, crate::primitives::palette::TEXT)),
            brush: None,
            font: FontId::DEFAULT,
        }
    }
}

/// A [`Painter`] that records commands instead of drawing
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    state: PaintState,
    saved: Vec<PaintState>,
    underflows: usize,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of `save` calls not yet matched by `restore`
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Every `save` was restored and no `restore` came without a `save`
    pub fn is_balanced(&self) -> bool {
        self.saved.is_empty() && self.underflows == 0
    }

    /// Drop the recorded commands and reset the drawing state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_window(&self, rect: Rect) -> Rect {
        rect.translate(self.state.origin)
    }

    /// Shapes entirely outside the clip are dropped
    fn push(&mut self, command: DrawCommand) {
        if let Some(clip) = self.state.clip {
            if clip.intersect(&command.bounds()).is_none() {
                return;
            }
        }
        self.commands.push(command);
    }
}

impl Painter for DisplayList {
    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.state = state,
            None => {
                log::warn!("painter restore without matching save");
                self.underflows += 1;
            }
        }
    }

    fn translate(&mut self, by: Point) {
        self.state.origin = self.state.origin.offset(by);
    }

    fn set_clip(&mut self, rect: Rect) {
        let rect = self.to_window(rect);
        self.state.clip = Some(match self.state.clip {
            Some(clip) => clip.intersect(&rect).unwrap_or_default(),
            None => rect,
        });
    }

    fn set_pen(&mut self, pen: Option<Stroke>) {
        self.state.pen = pen;
    }

    fn set_brush(&mut self, brush: Option<Color>) {
        self.state.brush = brush;
    }

    fn set_font(&mut self, font: FontId) {
        self.state.font = font;
    }

    fn rect(&mut self, rect: Rect) {
        self.rounded_rect(rect, 0);
    }

    fn rounded_rect(&mut self, rect: Rect, radius: i32) {
        let command = DrawCommand::Rect {
            rect: self.to_window(rect),
            radius,
            stroke: self.state.pen,
            fill: self.state.brush,
            clip: self.state.clip,
        };
        self.push(command);
    }

    fn line(&mut self, from: Point, to: Point) {
        let command = DrawCommand::Line {
            from: from.offset(self.state.origin),
            to: to.offset(self.state.origin),
            stroke: self.state.pen,
            clip: self.state.clip,
        };
        self.push(command);
    }

    fn text(&mut self, rect: Rect, text: &str, align: HorizontalAlign) {
        let command = DrawCommand::Text {
            rect: self.to_window(rect),
            text: text.to_owned(),
            font: self.state.font,
            color: self.state.pen.map(|p| p.color).unwrap_or(crate::primitives::palette::TEXT),
            align,
            clip: self.state.clip,
        };
        self.push(command);
    }

    fn image(&mut self, rect: Rect, image: ImageId) {
        let command = DrawCommand::Image {
            rect: self.to_window(rect),
            image,
            clip: self.state.clip,
        };
        self.push(command);
    }
}

/// Paint the tree from the root, parents below children.
///
/// Hidden subtrees are skipped and nothing is painted while the client area
/// is empty. Each view draws translated to its own origin and clipped to its
/// bounds; the state is restored afterwards whatever the slot did.
pub fn paint_tree(tree: &mut ViewTree, painter: &mut dyn Painter) {
    if tree.client_size().is_empty() {
        return;
    }
    if let Some(root) = tree.root() {
        paint_view(tree, root, painter);
    }
}

/// Paint a detached subtree (an overlay) at its absolute position
pub fn paint_subtree(tree: &mut ViewTree, id: ViewId, painter: &mut dyn Painter) {
    if tree.client_size().is_empty() {
        return;
    }
    paint_view(tree, id, painter);
}

fn paint_view(tree: &mut ViewTree, id: ViewId, painter: &mut dyn Painter) {
    let view = tree.view(id);
    if view.is_hidden() {
        return;
    }
    let position = view.position();
    let bounds = view.bounds();

    painter.save();
    painter.translate(position);
    painter.set_clip(bounds);

    if let Some(mut paint) = tree.view_mut(id).behavior.paint.take() {
        painter.save();
        paint(&PaintCx::new(tree, id), painter);
        painter.restore();
        let slot = &mut tree.view_mut(id).behavior.paint;
        if slot.is_none() {
            *slot = Some(paint);
        }
    }

    let children = tree.children(id).to_vec();
    for child in children {
        paint_view(tree, child, painter);
    }
    painter.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{palette, Size};
    use crate::view::View;

    fn filled() -> View {
        View::container().on_paint(|cx, painter| {
            painter.set_brush(Some(palette::BLUE));
            painter.rect(cx.bounds());
        })
    }

    #[test]
    fn test_commands_are_recorded_in_window_space() {
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(View::container().with_child(filled().with_name("child")))
            .unwrap();
        let child = tree.find("child").unwrap();
        tree.set_client_size(Size::new(200, 100));
        tree.view_mut(root).set_size(200, 100);
        tree.view_mut(child).set_rect(Rect::new(10, 20, 30, 40));

        let mut list = DisplayList::new();
        paint_tree(&mut tree, &mut list);

        assert!(list.is_balanced());
        assert_eq!(list.commands().len(), 1);
        assert_eq!(list.commands()[0].bounds(), Rect::new(10, 20, 30, 40));
    }

    #[test]
    fn test_hidden_views_are_not_painted() {
        let mut tree = ViewTree::new();
        tree.set_root_view(
            filled()
                .with_child(filled().with_hidden(true).with_child(filled()))
                .with_child(filled().with_disabled(true)),
        )
        .unwrap();
        tree.set_client_size(Size::new(50, 50));
        let root = tree.root().unwrap();
        tree.view_mut(root).set_size(50, 50);
        for child in tree.pre_order(root) {
            if child != root {
                tree.view_mut(child).set_size(5, 5);
            }
        }

        let mut list = DisplayList::new();
        paint_tree(&mut tree, &mut list);
        // Root and the disabled child paint; the hidden branch does not
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_unbalanced_paint_code_is_detected() {
        let mut tree = ViewTree::new();
        let root = tree
            .set_root_view(View::container().on_paint(|_, painter| {
                painter.save();
                painter.translate(Point::new(1000, 1000));
            }))
            .unwrap();
        tree.set_client_size(Size::new(10, 10));
        tree.view_mut(root).set_size(10, 10);

        let mut list = DisplayList::new();
        paint_tree(&mut tree, &mut list);
        assert_eq!(list.depth(), 1);
    }

    #[test]
    fn test_clip_drops_invisible_shapes() {
        let mut list = DisplayList::new();
        list.save();
        list.set_clip(Rect::new(0, 0, 10, 10));
        list.rect(Rect::new(20, 20, 5, 5));
        list.rect(Rect::new(5, 5, 10, 10));
        list.restore();
        list.restore();

        assert_eq!(list.len(), 1);
        assert!(!list.is_balanced());
    }

    #[test]
    fn test_empty_client_paints_nothing() {
        let mut tree = ViewTree::new();
        tree.set_root_view(filled()).unwrap();
        let mut list = DisplayList::new();
        paint_tree(&mut tree, &mut list);
        assert!(list.is_empty());
    }
}
