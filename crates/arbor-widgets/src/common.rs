//! Helpers shared by the stock widgets.

use arbor::{Cx, Key, KeyEvent, MouseButton, MouseEvent, MouseEventKind, NamedKey, Rect, View};

/// Run a callback kept in the view's data record of type `S`.
///
/// The callback is taken out while it runs, so it may freely use `cx`, and
/// put back afterwards unless it was replaced meanwhile.
pub(crate) fn with_callback<S: 'static, F: ?Sized, R>(
    cx: &mut Cx<'_>,
    slot: fn(&mut S) -> &mut Option<Box<F>>,
    call: impl FnOnce(&mut F, &mut Cx<'_>) -> R,
) -> Option<R> {
    let mut f = slot(cx.data_mut::<S>()?).take()?;
    let result = call(&mut *f, cx);
    if let Some(state) = cx.data_mut::<S>() {
        let slot = slot(state);
        if slot.is_none() {
            *slot = Some(f);
        }
    }
    Some(result)
}

/// The view's bounds less its padding
pub(crate) fn content_rect(view: &View) -> Rect {
    let padding = view.padding();
    Rect::new(
        padding.w,
        padding.h,
        view.w() - 2 * padding.w,
        view.h() - 2 * padding.h,
    )
}

/// Enter or Space
pub(crate) fn is_activation_key(event: &KeyEvent) -> bool {
    match &event.key {
        Key::Named(NamedKey::Enter | NamedKey::Space) => true,
        Key::Character(text) => text == " ",
        _ => false,
    }
}

/// Keep the armed flag in step with the left button held down inside the view
pub(crate) fn track_armed(cx: &mut Cx<'_>, event: &MouseEvent) {
    let armed = cx.view().is_armed();
    let next = match event.kind {
        MouseEventKind::Down(MouseButton::Left) => cx.contains(event.position),
        MouseEventKind::Move => armed && cx.contains(event.position),
        MouseEventKind::Up(MouseButton::Left) | MouseEventKind::Leave => false,
        _ => armed,
    };
    if next != armed {
        cx.view_mut().set_armed(next);
        cx.invalidate();
    }
}
