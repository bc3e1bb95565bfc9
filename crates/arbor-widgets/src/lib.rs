//! # arbor-widgets
//!
//! Stock widgets for arbor.
//!
//! Every widget is a builder implementing [`arbor::Component`]; calling
//! `view()` turns it into a [`arbor::View`] whose behavior slots implement
//! the widget. Widget state lives in the view's data record, so it can be read
//! back from the tree (`Slider::value_of`, `Checkbox::is_checked`,
//! `TextEdit::caret_of`).

mod button;
mod checkbox;
mod common;
mod containers;
mod label;
mod message_box;
mod slider;
mod text_edit;

pub use button::*;
pub use checkbox::*;
pub use containers::*;
pub use label::*;
pub use message_box::*;
pub use slider::*;
pub use text_edit::*;
