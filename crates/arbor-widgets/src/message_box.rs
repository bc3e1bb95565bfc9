//! Message box component
//!
//! A framed message with a group of buttons below it, laid out in a row or a
//! column. Choosing a button reports its index. Enter picks the default
//! button and Escape the cancel button, unless a button inside the box holds
//! focus and handles the key itself.

use crate::button::{Button, ButtonStyle};
use crate::label::Label;
use arbor::arrange::{arrange_horizontal, arrange_vertical, measure_horizontal, measure_vertical};
use arbor::{
    palette, Color, Component, Cx, Key, NamedKey, Size, Stroke, View, ViewId, ViewKind,
};
use arbor_macros::WithBuilders;
use std::cell::RefCell;
use std::rc::Rc;

pub type ChoiceFn = Box<dyn FnMut(&mut Cx<'_>, usize)>;

/// How the buttons are stacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Visual styling for a message box
#[derive(Debug, Clone, WithBuilders)]
pub struct MessageBoxStyle {
    pub background: Color,
    pub stroke_color: Color,
    pub text_color: Color,
    pub padding: Size,
    /// Space between the message and the buttons
    pub gap: i32,
    /// Space between buttons
    pub button_gap: i32,
    /// Message wrap width in ems
    pub wrap_width: f32,
    pub border_radius: i32,
    pub button: ButtonStyle,
}

impl Default for MessageBoxStyle {
    fn default() -> Self {
        Self {
            background: palette::MANTLE,
            stroke_color: palette::SURFACE1,
            text_color: palette::TEXT,
            padding: Size::new(12, 10),
            gap: 10,
            button_gap: 6,
            wrap_width: 30.0,
            border_radius: 8,
            button: ButtonStyle::default(),
        }
    }
}

type SharedChoice = Rc<RefCell<Option<ChoiceFn>>>;

fn choose(shared: &SharedChoice, cx: &mut Cx<'_>, index: usize) {
    log::debug!("message box choice {}", index);
    // A choice made from inside the callback is dropped
    let Ok(mut slot) = shared.try_borrow_mut() else {
        return;
    };
    if let Some(f) = slot.as_mut() {
        f(cx, index);
    }
}

/// True if the focused view is `id` or one of its descendants
fn focus_within(cx: &Cx<'_>, id: ViewId) -> bool {
    let tree = cx.tree();
    let mut current = tree.focused();
    while let Some(view) = current {
        if view == id {
            return true;
        }
        current = tree.parent(view);
    }
    false
}

/// A message with a set of buttons
///
/// # Example
///
/// ```ignore
/// MessageBox::new("Discard changes?", ["Discard", "Cancel"])
///     .on_choice(|cx, index| {
///         if index == 0 {
///             discard();
///         }
///         cx.dismiss_overlay();
///     })
///     .view()
/// ```
pub struct MessageBox {
    message: String,
    buttons: Vec<String>,
    orientation: Orientation,
    default_button: usize,
    cancel_button: Option<usize>,
    style: MessageBoxStyle,
    on_choice: Option<ChoiceFn>,
}

impl MessageBox {
    /// The first button is the default; the last one cancels
    pub fn new<S: Into<String>>(message: impl Into<String>, buttons: impl IntoIterator<Item = S>) -> Self {
        let buttons: Vec<String> = buttons.into_iter().map(Into::into).collect();
        let cancel_button = buttons.len().checked_sub(1);
        Self {
            message: message.into(),
            buttons,
            orientation: Orientation::default(),
            default_button: 0,
            cancel_button,
            style: MessageBoxStyle::default(),
            on_choice: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Button chosen by Enter
    pub fn with_default(mut self, index: usize) -> Self {
        self.default_button = index;
        self
    }

    /// Button chosen by Escape; `None` leaves Escape alone
    pub fn with_cancel(mut self, index: Option<usize>) -> Self {
        self.cancel_button = index;
        self
    }

    pub fn with_style(mut self, style: MessageBoxStyle) -> Self {
        self.style = style;
        self
    }

    /// Called with the index of the chosen button
    pub fn on_choice(mut self, f: impl FnMut(&mut Cx<'_>, usize) + 'static) -> Self {
        self.on_choice = Some(Box::new(f));
        self
    }
}

impl Component for MessageBox {
    fn view(self) -> View {
        let style = self.style;
        let shared: SharedChoice = Rc::new(RefCell::new(self.on_choice));
        let count = self.buttons.len();
        let default_button = (self.default_button < count).then_some(self.default_button);
        let cancel_button = self.cancel_button.filter(|&i| i < count);

        let buttons = self.buttons.into_iter().enumerate().map(|(index, label)| {
            let shared = shared.clone();
            Button::new(label)
                .with_style(style.button.clone())
                .on_click(move |cx| choose(&shared, cx, index))
                .view()
        });
        let button_gap = style.button_gap;
        let orientation = self.orientation;
        let group = View::container()
            .with_children(buttons)
            .on_measure(move |cx| {
                let id = cx.id();
                match orientation {
                    Orientation::Horizontal => measure_horizontal(cx.tree_mut(), id, button_gap),
                    Orientation::Vertical => measure_vertical(cx.tree_mut(), id, button_gap),
                }
            })
            .on_layout(move |cx| {
                let id = cx.id();
                match orientation {
                    Orientation::Horizontal => arrange_horizontal(cx.tree_mut(), id, button_gap),
                    Orientation::Vertical => arrange_vertical(cx.tree_mut(), id, button_gap),
                }
            });

        let message = Label::new(self.message)
            .with_color(style.text_color)
            .wrapped(style.wrap_width)
            .view();

        let gap = style.gap;
        let (background, stroke_color, border_radius) =
            (style.background, style.stroke_color, style.border_radius);
        View::new(ViewKind::MessageBox)
            .with_padding(style.padding)
            .with_child(message)
            .with_child(group)
            .on_measure(move |cx| {
                let id = cx.id();
                measure_vertical(cx.tree_mut(), id, gap);
            })
            .on_layout(move |cx| {
                let id = cx.id();
                arrange_vertical(cx.tree_mut(), id, gap);
                // Buttons hug the right edge
                let (w, padding) = (cx.view().w(), cx.view().padding());
                if let Some(&group) = cx.children().last() {
                    let view = cx.tree_mut().view_mut(group);
                    let y = view.y();
                    let x = w - padding.w - view.w();
                    view.set_position(x, y);
                }
            })
            .on_key_down(move |cx, event| {
                let id = cx.id();
                if focus_within(cx, id) {
                    return;
                }
                let index = match event.key {
                    Key::Named(NamedKey::Enter) => default_button,
                    Key::Named(NamedKey::Escape) => cancel_button,
                    _ => None,
                };
                if let Some(index) = index {
                    choose(&shared, cx, index);
                }
            })
            .on_paint(move |cx, painter| {
                painter.set_brush(Some(background));
                painter.set_pen(Some(Stroke::new(1, stroke_color)));
                painter.rounded_rect(cx.bounds(), border_radius);
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::{click_at, key, mount};
    use crate::containers::column;
    use arbor::{KeyEvent, Point, Rect, Runtime};
    use std::time::Duration;

    fn recorder() -> (Rc<RefCell<Vec<usize>>>, impl FnMut(&mut Cx<'_>, usize)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |_: &mut Cx<'_>, index: usize| sink.borrow_mut().push(index))
    }

    fn rect_of(runtime: &Runtime, id: ViewId) -> Rect {
        runtime.tree().absolute_rect(id)
    }

    #[test]
    fn test_layout_stacks_message_over_right_aligned_buttons() {
        let (runtime, _) = mount(column(
            0,
            [MessageBox::new("Save?", ["Yes", "No"]).view().with_name("box")],
        ));
        let tree = runtime.tree();
        let id = tree.find("box").unwrap();
        let [message, group] = tree.children(id) else {
            panic!("expected message and button group");
        };

        // Message wraps at 30 ems: 240x16. Buttons are 48x28 and 40x28, 6 apart.
        assert_eq!(rect_of(&runtime, *message), Rect::new(12, 10, 240, 16));
        assert_eq!(rect_of(&runtime, *group), Rect::new(158, 36, 94, 28));
        assert_eq!(tree.view(id).size(), Size::new(264, 74));
    }

    #[test]
    fn test_clicking_a_button_reports_its_index() {
        let (seen, on_choice) = recorder();
        let (mut runtime, now) = mount(column(
            0,
            [MessageBox::new("Save?", ["Yes", "No"]).on_choice(on_choice).view()],
        ));

        // Second button: 158 + 48 + 6 = 212..252 wide, 36..64 high
        click_at(&mut runtime, now, Point::new(220, 40));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_enter_and_escape_pick_default_and_cancel() {
        let (seen, on_choice) = recorder();
        let (mut runtime, now) = mount(column(
            0,
            [MessageBox::new("Quit?", ["Quit", "Stay", "Cancel"])
                .with_orientation(Orientation::Vertical)
                .with_default(1)
                .on_choice(on_choice)
                .view()],
        ));

        key(&mut runtime, now, KeyEvent::named(NamedKey::Enter));
        key(&mut runtime, now, KeyEvent::named(NamedKey::Escape));
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_focused_button_handles_enter_alone() {
        let (seen, on_choice) = recorder();
        let (mut runtime, now) = mount(column(
            0,
            [MessageBox::new("Save?", ["Yes", "No"]).on_choice(on_choice).view().with_name("box")],
        ));
        let id = runtime.tree().find("box").unwrap();
        let group = runtime.tree().children(id)[1];
        let no = runtime.tree().children(group)[1];
        runtime.request_focus(no);

        key(&mut runtime, now, KeyEvent::named(NamedKey::Enter));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_escape_in_toast_dismisses_without_choice() {
        let (seen, on_choice) = recorder();
        let (mut runtime, now) = mount(column(0, []));
        let toast = runtime.insert_overlay(MessageBox::new("Done", ["OK"]).on_choice(on_choice).view());
        runtime.show_toast(Some(toast), Duration::ZERO);

        key(&mut runtime, now, KeyEvent::named(NamedKey::Escape));
        assert!(runtime.overlay().is_leaving());
        assert!(seen.borrow().is_empty());
    }
}
