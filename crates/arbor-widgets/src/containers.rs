//! Layout containers built on the `arbor::arrange` helpers.

use arbor::arrange::{
    arrange_center, arrange_grid, arrange_horizontal, arrange_vertical, measure_center,
    measure_grid, measure_horizontal, measure_vertical,
};
use arbor::{Size, View};

/// Wrap `child` and center it in whatever space the container is given
pub fn center(child: View) -> View {
    View::container()
        .with_child(child)
        .on_measure(|cx| {
            let content = cx
                .children()
                .iter()
                .map(|&id| cx.tree().view(id))
                .filter(|view| !view.is_hidden())
                .fold(Size::zero(), |size, view| size.max(view.size()));
            let padding = cx.view().padding();
            cx.view_mut()
                .set_size(content.w + 2 * padding.w, content.h + 2 * padding.h);
        })
        .on_layout(|cx| {
            let id = cx.id();
            arrange_center(cx.tree_mut(), id);
        })
}

/// Stretch `child` over the container, less padding
pub fn fill(child: View) -> View {
    View::container()
        .with_child(child)
        .on_measure(|cx| {
            let id = cx.id();
            measure_center(cx.tree_mut(), id);
        })
        .on_layout(|cx| {
            let id = cx.id();
            arrange_center(cx.tree_mut(), id);
        })
}

/// Children side by side, `gap` pixels apart
pub fn row(gap: i32, children: impl IntoIterator<Item = View>) -> View {
    View::container()
        .with_children(children)
        .on_measure(move |cx| {
            let id = cx.id();
            measure_horizontal(cx.tree_mut(), id, gap);
        })
        .on_layout(move |cx| {
            let id = cx.id();
            arrange_horizontal(cx.tree_mut(), id, gap);
        })
}

/// Children stacked top to bottom, `gap` pixels apart
pub fn column(gap: i32, children: impl IntoIterator<Item = View>) -> View {
    View::container()
        .with_children(children)
        .on_measure(move |cx| {
            let id = cx.id();
            measure_vertical(cx.tree_mut(), id, gap);
        })
        .on_layout(move |cx| {
            let id = cx.id();
            arrange_vertical(cx.tree_mut(), id, gap);
        })
}

/// Rows of cells aligned in columns.
///
/// Each column is as wide as its widest cell and each row as tall as its
/// tallest; text cells in a row share a baseline.
pub fn grid<R>(gap: Size, rows: impl IntoIterator<Item = R>) -> View
where
    R: IntoIterator<Item = View>,
{
    View::container()
        .with_children(rows.into_iter().map(|cells| View::container().with_children(cells)))
        .on_measure(move |cx| {
            let id = cx.id();
            measure_grid(cx.tree_mut(), id, gap);
        })
        .on_layout(move |cx| {
            let id = cx.id();
            arrange_grid(cx.tree_mut(), id, gap);
        })
}
