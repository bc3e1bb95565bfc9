//! # arbor-winit
//!
//! winit 0.30 shell for arbor. [`InputTranslator`] turns window events into
//! [`arbor::RawEvent`]s and [`run`] drives a [`arbor::Runtime`] in a window,
//! including timer wake-ups, the cross-thread repaint relay and close vetoes.

mod input;
mod shell;

pub use input::*;
pub use shell::*;
