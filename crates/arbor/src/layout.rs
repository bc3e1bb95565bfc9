//! Two-pass layout: measure bottom-up, then lay out top-down.
//!
//! The measure walk visits children before their parent so a container can
//! size itself from its children's sizes. The layout walk visits a parent before
//! its children so positions flow downward. Hidden subtrees take part in
//! neither pass.

use crate::context::Cx;
use crate::primitives::{Point, Size};
use crate::tree::ViewTree;
use crate::view::{slot, ViewId};

/// Measure and lay out the whole tree against the current client area.
///
/// The root is seeded with the client size and keeps it: the root's
/// rectangle is the window. Nothing happens while the client area is empty.
pub fn layout_tree(tree: &mut ViewTree) {
    let Some(root) = tree.root() else {
        return;
    };
    let client = tree.client_size();
    if client.is_empty() {
        log::trace!("skipping layout for degenerate client area {:?}", client);
        return;
    }

    {
        let view = tree.view_mut(root);
        view.set_position(0, 0);
        view.set_size(client.w, client.h);
    }
    measure_view(tree, root, true);
    tree.view_mut(root).set_size(client.w, client.h);
    layout_view(tree, root);

    tree.clear_layout_dirty();
    log::trace!("layout pass done for {:?}", client);
}

/// Measure and lay out a detached subtree (overlays) with its current origin.
pub fn layout_subtree(tree: &mut ViewTree, id: ViewId) {
    if tree.view(id).is_hidden() {
        return;
    }
    measure_view(tree, id, false);
    layout_view(tree, id);
}

fn measure_view(tree: &mut ViewTree, id: ViewId, is_root: bool) {
    if tree.view(id).is_hidden() {
        return;
    }
    let children = tree.children(id).to_vec();
    for child in children {
        measure_view(tree, child, false);
    }

    let font = tree.view(id).font();
    let em = tree.measurer_mut().em(font);
    tree.view_mut(id).set_em(em);

    let measured = tree.with_slot(id, slot::measure, |f, cx| f(cx));
    if measured.is_none() && !is_root {
        default_measure(&mut Cx::new(tree, id));
    }
}

fn layout_view(tree: &mut ViewTree, id: ViewId) {
    if tree.view(id).is_hidden() {
        return;
    }
    tree.with_slot(id, slot::layout, |f, cx| f(cx));

    let children = tree.children(id).to_vec();
    for child in children {
        layout_view(tree, child);
    }
}

/// Size of the view's text plus padding on each side.
///
/// Width is the larger of the requested width (in ems) and the text extent;
/// height the larger of one em and the text height. With wrapping on and a
/// requested width, the text is wrapped at that width. A view without text
/// and without a requested width has no content and measures as its padding.
pub fn default_measure(cx: &mut Cx<'_>) {
    let size = content_size(cx);
    let padding = cx.view().padding();
    cx.view_mut()
        .set_size(size.w + 2 * padding.w, size.h + 2 * padding.h);
}

/// Content extent used by [`default_measure`], without padding
pub fn content_size(cx: &mut Cx<'_>) -> Size {
    let view = cx.view();
    let em = view.em();
    let font = view.font();
    let wrap = view.wraps();
    let ratio = view.width_ratio();
    let text = view.text().map(str::to_owned);
    let requested = (em.w as f32 * ratio).round() as i32;

    let extent = match text.as_deref() {
        None | Some("") => Size::zero(),
        Some(text) if wrap && requested > 0 => cx.measurer().wrapped_extent(font, text, requested),
        Some(text) => cx.measurer().text_extent(font, text),
    };

    if text.is_none() && requested <= 0 {
        return Size::zero();
    }
    Size::new(requested.max(extent.w), em.h.max(extent.h))
}

/// Convert a point relative to `id` into window coordinates
pub fn to_window(tree: &ViewTree, id: ViewId, point: Point) -> Point {
    point.offset(tree.absolute_origin(id))
}
