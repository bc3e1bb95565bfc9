//! Keyboard focus.
//!
//! The tree holds at most one focused view, as a plain key. Views take part by
//! being focusable and having a `focus` slot: the slot is offered focus with
//! `true` and may refuse, and is told about losing it with `false`.

use crate::tree::ViewTree;
use crate::view::{slot, ViewId};

fn can_hold_focus(tree: &ViewTree, id: ViewId) -> bool {
    let view = tree.view(id);
    view.is_focusable()
        && view.has_focus_slot()
        && !tree.is_effectively_hidden(id)
        && !tree.is_effectively_disabled(id)
}

fn offer(tree: &mut ViewTree, id: ViewId) -> bool {
    tree.with_slot(id, slot::focus, |f, cx| f(cx, true))
        .unwrap_or(false)
}

fn notify_lost(tree: &mut ViewTree, id: ViewId) {
    tree.with_slot(id, slot::focus, |f, cx| f(cx, false));
}

fn post_order(tree: &ViewTree, id: ViewId, out: &mut Vec<ViewId>) {
    for &child in tree.children(id) {
        post_order(tree, child, out);
    }
    out.push(id);
}

/// Hand focus to the first view, children before parents, that can hold it.
///
/// A candidate claims focus only if it already holds it or nothing does, so
/// an existing holder elsewhere in the tree keeps it. Returns the holder.
pub fn set_focus(tree: &mut ViewTree) -> Option<ViewId> {
    let root = tree.root()?;
    let mut order = Vec::new();
    post_order(tree, root, &mut order);

    for id in order {
        if !can_hold_focus(tree, id) {
            continue;
        }
        let focused = tree.focused();
        if focused.is_some() && focused != Some(id) {
            continue;
        }
        if offer(tree, id) {
            if focused != Some(id) {
                log::debug!("focus set to {:?}", id);
            }
            tree.focused = Some(id);
            tree.invalidate_view(id);
            return Some(id);
        }
    }
    tree.focused()
}

/// Tell every focusable view with a focus slot that focus is gone.
///
/// With `deactivate` the focus reference is cleared too (the window lost
/// activation).
pub fn kill_focus(tree: &mut ViewTree, deactivate: bool) {
    let Some(root) = tree.root() else {
        return;
    };
    for id in tree.pre_order(root) {
        let view = tree.view(id);
        if view.is_focusable() && view.has_focus_slot() {
            notify_lost(tree, id);
        }
    }
    if deactivate {
        if let Some(id) = tree.focused.take() {
            log::debug!("focus cleared from {:?}", id);
            tree.invalidate_view(id);
        }
    }
}

/// Drop focus held by a view that became hidden or disabled
pub fn purge_focus(tree: &mut ViewTree) {
    let Some(id) = tree.focused() else {
        return;
    };
    if !tree.contains(id) {
        tree.focused = None;
        return;
    }
    if tree.is_effectively_hidden(id) || tree.is_effectively_disabled(id) {
        log::debug!("purging focus from {:?}", id);
        tree.focused = None;
        notify_lost(tree, id);
        tree.invalidate_view(id);
    }
}

/// Move focus to `id` if it can hold focus and accepts it
pub fn request_focus(tree: &mut ViewTree, id: ViewId) -> bool {
    let previous = tree.focused();
    if previous == Some(id) {
        return true;
    }
    if !can_hold_focus(tree, id) || !offer(tree, id) {
        return false;
    }

    tree.focused = Some(id);
    if let Some(previous) = previous.filter(|&p| tree.contains(p)) {
        notify_lost(tree, previous);
        tree.invalidate_view(previous);
    }
    tree.invalidate_view(id);
    log::debug!("focus moved from {:?} to {:?}", previous, id);
    true
}

/// Move focus to the next (or previous) view in pre-order that accepts it,
/// wrapping around.
pub fn focus_next(tree: &mut ViewTree, backwards: bool) -> Option<ViewId> {
    let root = tree.root()?;
    let mut candidates: Vec<ViewId> = tree
        .pre_order(root)
        .into_iter()
        .filter(|&id| can_hold_focus(tree, id))
        .collect();
    if candidates.is_empty() {
        return tree.focused();
    }
    if backwards {
        candidates.reverse();
    }

    let start = tree
        .focused()
        .and_then(|f| candidates.iter().position(|&c| c == f))
        .map(|i| i + 1)
        .unwrap_or(0);
    for offset in 0..candidates.len() {
        let id = candidates[(start + offset) % candidates.len()];
        if Some(id) == tree.focused() {
            break;
        }
        if request_focus(tree, id) {
            return Some(id);
        }
    }
    tree.focused()
}
