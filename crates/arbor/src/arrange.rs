//! Reusable measure/arrange algorithms for containers.
//!
//! None of these run on their own: a container calls them from its `measure`
//! and `layout` slots. They only look at immediate children (grid: children
//! and grandchildren) and skip hidden ones. The view's padding surrounds the
//! arranged content.

use crate::primitives::{Rect, Size};
use crate::tree::ViewTree;
use crate::view::ViewId;

fn visible_children(tree: &ViewTree, id: ViewId) -> Vec<ViewId> {
    tree.children(id)
        .iter()
        .copied()
        .filter(|&child| !tree.view(child).is_hidden())
        .collect()
}

fn set_padded_size(tree: &mut ViewTree, id: ViewId, content: Size) {
    let padding = tree.view(id).padding();
    tree.view_mut(id)
        .set_size(content.w + 2 * padding.w, content.h + 2 * padding.h);
}

// ========== Center ==========

/// Give the single visible child this view's size, less padding.
///
/// A view that has no size yet wraps its child instead.
pub fn measure_center(tree: &mut ViewTree, id: ViewId) {
    let Some(&child) = visible_children(tree, id).first() else {
        return;
    };
    let size = tree.view(id).size();
    let padding = tree.view(id).padding();
    if size.is_empty() {
        let child_size = tree.view(child).size();
        set_padded_size(tree, id, child_size);
    } else {
        tree.view_mut(child)
            .set_size(size.w - 2 * padding.w, size.h - 2 * padding.h);
    }
}

/// Center every visible child inside the padded area
pub fn arrange_center(tree: &mut ViewTree, id: ViewId) {
    let size = tree.view(id).size();
    for child in visible_children(tree, id) {
        let child_size = tree.view(child).size();
        tree.view_mut(child)
            .set_position((size.w - child_size.w) / 2, (size.h - child_size.h) / 2);
    }
}

// ========== Stacks ==========

/// Children side by side: widths summed with `gap` between, height of the tallest
pub fn measure_horizontal(tree: &mut ViewTree, id: ViewId, gap: i32) {
    let children = visible_children(tree, id);
    let mut content = Size::zero();
    for (i, &child) in children.iter().enumerate() {
        let size = tree.view(child).size();
        content.w += size.w + if i > 0 { gap } else { 0 };
        content.h = content.h.max(size.h);
    }
    set_padded_size(tree, id, content);
}

/// Children stacked top to bottom: heights summed with `gap` between, width of the widest
pub fn measure_vertical(tree: &mut ViewTree, id: ViewId, gap: i32) {
    let children = visible_children(tree, id);
    let mut content = Size::zero();
    for (i, &child) in children.iter().enumerate() {
        let size = tree.view(child).size();
        content.h += size.h + if i > 0 { gap } else { 0 };
        content.w = content.w.max(size.w);
    }
    set_padded_size(tree, id, content);
}

pub fn arrange_horizontal(tree: &mut ViewTree, id: ViewId, gap: i32) {
    let padding = tree.view(id).padding();
    let mut x = padding.w;
    for child in visible_children(tree, id) {
        let w = tree.view(child).w();
        tree.view_mut(child).set_position(x, padding.h);
        x += w + gap;
    }
}

pub fn arrange_vertical(tree: &mut ViewTree, id: ViewId, gap: i32) {
    let padding = tree.view(id).padding();
    let mut y = padding.h;
    for child in visible_children(tree, id) {
        let h = tree.view(child).h();
        tree.view_mut(child).set_position(padding.w, y);
        y += h + gap;
    }
}

// ========== Grid ==========

/// Column widths, row heights and content size of a grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridMetrics {
    /// Widest cell per column
    pub columns: Vec<i32>,
    /// Tallest cell per visible row
    pub rows: Vec<i32>,
    /// Sum of columns and rows plus gaps, without padding
    pub size: Size,
}

/// Measure a grid whose children are rows and grandchildren are cells.
///
/// A cell's column is its position in the row, hidden cells included. Cells
/// with text get a baseline offset so text in one row lines up.
pub fn grid_metrics(tree: &mut ViewTree, id: ViewId, gap: Size) -> GridMetrics {
    let mut metrics = GridMetrics::default();

    for row in visible_children(tree, id) {
        let cells = tree.children(row).to_vec();
        let max_baseline = cells
            .iter()
            .filter(|&&cell| !tree.view(cell).is_hidden())
            .filter_map(|&cell| tree.view(cell).baseline())
            .max()
            .unwrap_or(0);

        let mut row_height = 0;
        for (column, &cell) in cells.iter().enumerate() {
            if tree.view(cell).is_hidden() {
                continue;
            }
            let offset = tree
                .view(cell)
                .baseline()
                .map(|baseline| max_baseline - baseline)
                .unwrap_or(0);
            tree.view_mut(cell).set_baseline_offset(offset);

            let size = tree.view(cell).size();
            if metrics.columns.len() <= column {
                metrics.columns.resize(column + 1, 0);
            }
            metrics.columns[column] = metrics.columns[column].max(size.w);
            row_height = row_height.max(size.h + offset);
        }
        metrics.rows.push(row_height);
    }

    let gaps = |count: usize, gap: i32| count.saturating_sub(1) as i32 * gap;
    metrics.size = Size::new(
        metrics.columns.iter().sum::<i32>() + gaps(metrics.columns.len(), gap.w),
        metrics.rows.iter().sum::<i32>() + gaps(metrics.rows.len(), gap.h),
    );
    metrics
}

pub fn measure_grid(tree: &mut ViewTree, id: ViewId, gap: Size) -> GridMetrics {
    let metrics = grid_metrics(tree, id, gap);
    set_padded_size(tree, id, metrics.size);
    metrics
}

/// Place rows and cells; every row spans the full grid width
pub fn arrange_grid(tree: &mut ViewTree, id: ViewId, gap: Size) {
    let metrics = grid_metrics(tree, id, gap);
    let padding = tree.view(id).padding();

    let mut y = padding.h;
    for (row, height) in visible_children(tree, id).into_iter().zip(metrics.rows.iter().copied()) {
        tree.view_mut(row).set_rect(Rect::new(padding.w, y, metrics.size.w, height));

        let cells = tree.children(row).to_vec();
        let mut x = 0;
        for (column, cell) in cells.into_iter().enumerate() {
            let width = metrics.columns.get(column).copied().unwrap_or(0);
            if !tree.view(cell).is_hidden() {
                let offset = tree.view(cell).baseline_offset();
                tree.view_mut(cell).set_position(x, offset);
            }
            x += width + gap.w;
        }
        y += height + gap.h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point;
    use crate::view::View;

    fn sized(w: i32, h: i32) -> View {
        View::container().with_size(w, h)
    }

    fn grid_tree() -> (ViewTree, ViewId) {
        let mut tree = ViewTree::new();
        let grid = tree.insert(
            View::container()
                .with_child(View::container().with_child(sized(10, 5)).with_child(sized(20, 8)))
                .with_child(View::container().with_child(sized(15, 6)).with_child(sized(25, 9))),
        );
        (tree, grid)
    }

    #[test]
    fn test_grid_metrics() {
        let (mut tree, grid) = grid_tree();
        let metrics = measure_grid(&mut tree, grid, Size::new(2, 3));

        assert_eq!(metrics.columns, vec![15, 25]);
        assert_eq!(metrics.rows, vec![8, 9]);
        assert_eq!(metrics.size, Size::new(42, 20));
        assert_eq!(tree.view(grid).size(), Size::new(42, 20));
    }

    #[test]
    fn test_arrange_grid_positions_cells() {
        let (mut tree, grid) = grid_tree();
        measure_grid(&mut tree, grid, Size::new(2, 3));
        arrange_grid(&mut tree, grid, Size::new(2, 3));

        let rows = tree.children(grid).to_vec();
        assert_eq!(tree.view(rows[1]).rect(), Rect::new(0, 11, 42, 9));
        let cells = tree.children(rows[1]).to_vec();
        assert_eq!(tree.view(cells[0]).position(), Point::new(0, 0));
        assert_eq!(tree.view(cells[1]).position(), Point::new(17, 0));
    }

    #[test]
    fn test_grid_aligns_text_baselines() {
        let mut tree = ViewTree::new();
        let grid = tree.insert(
            View::container().with_child(
                View::container()
                    .with_child(View::container().with_text("a").with_padding(Size::new(0, 6)).with_size(8, 28).with_name("tall"))
                    .with_child(View::container().with_text("b").with_size(8, 16).with_name("short")),
            ),
        );
        let tall = tree.find("tall").unwrap();
        let short = tree.find("short").unwrap();
        for id in [tall, short] {
            tree.view_mut(id).set_em(Size::new(8, 16));
        }

        let metrics = grid_metrics(&mut tree, grid, Size::zero());
        assert_eq!(tree.view(tall).baseline_offset(), 0);
        assert_eq!(tree.view(short).baseline_offset(), 6);
        assert_eq!(metrics.rows, vec![28]);
    }

    #[test]
    fn test_stacks_skip_hidden_children() {
        let mut tree = ViewTree::new();
        let row = tree.insert(
            View::container()
                .with_padding(Size::new(1, 1))
                .with_child(sized(10, 4))
                .with_child(sized(50, 50).with_hidden(true))
                .with_child(sized(6, 8)),
        );
        measure_horizontal(&mut tree, row, 3);
        assert_eq!(tree.view(row).size(), Size::new(10 + 3 + 6 + 2, 8 + 2));

        arrange_horizontal(&mut tree, row, 3);
        let children = tree.children(row).to_vec();
        assert_eq!(tree.view(children[2]).position(), Point::new(14, 1));

        measure_vertical(&mut tree, row, 2);
        assert_eq!(tree.view(row).size(), Size::new(10 + 2, 4 + 2 + 8 + 2));
    }

    #[test]
    fn test_center() {
        let mut tree = ViewTree::new();
        let outer = tree.insert(View::container().with_child(sized(20, 10)));
        let child = tree.children(outer)[0];

        measure_center(&mut tree, outer);
        assert_eq!(tree.view(outer).size(), Size::new(20, 10));

        tree.view_mut(outer).set_size(100, 50);
        tree.view_mut(child).set_size(20, 10);
        arrange_center(&mut tree, outer);
        assert_eq!(tree.view(child).position(), Point::new(40, 20));

        measure_center(&mut tree, outer);
        assert_eq!(tree.view(child).size(), Size::new(100, 50));
    }
}
