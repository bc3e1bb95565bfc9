//! # arbor
//!
//! Retained-mode view tree engine.
//!
//! Views live in an arena owned by a [`ViewTree`]. Each view carries its
//! geometry, state flags and a [`Behavior`] record of optional closures
//! (measure, layout, paint, gestures, keys, timers, focus, hover). The engine
//! measures bottom-up and lays out top-down, routes raw platform input through
//! the tree, turns button presses into tap / double-tap / press gestures, keeps
//! track of keyboard focus and shows one transient overlay (toast or tooltip)
//! at a time. Rendering goes through the [`Painter`] trait, so the core has no
//! graphics dependency.
//!
//! ## Core Types
//!
//! - [`View`] / [`ViewId`] - A node and its arena key
//! - [`ViewTree`] - Arena, root, damage and timers
//! - [`Runtime`] - Message pump owning the tree and the engine singletons
//! - [`Component`] - Trait for reusable widgets
//!
//! ## Input & Events
//!
//! - [`RawEvent`] - Platform messages fed to [`Runtime::handle`]
//! - [`EventDispatcher`] - Routes input, hover and timer ticks through the tree
//! - [`ClickDetector`] - Gesture recognizer
//! - [`focus`] - Keyboard focus protocol
//!
//! ## Layout & Painting
//!
//! - [`layout_tree`] - Measure and layout passes
//! - [`arrange`] - Center, row, column and grid helpers
//! - [`Painter`] / [`DisplayList`] - Drawing surface and its recording implementation
//! - [`TextMeasurer`] - Trait for text measurement

pub mod animation;
pub mod arrange;
mod component;
mod config;
mod context;
mod error;
mod events;
pub mod focus;
mod gesture;
mod input;
mod layout;
mod measure;
mod overlay;
mod paint;
mod primitives;
mod runtime;
mod signal;
mod timer;
mod tree;
mod view;

// Core types
pub use component::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use primitives::*;
pub use runtime::*;
pub use tree::*;
pub use view::*;

// Input & Events
pub use events::*;
pub use gesture::*;
pub use input::*;
pub use signal::*;
pub use timer::*;

// Layout & Painting
pub use layout::*;
pub use measure::*;
pub use overlay::*;
pub use paint::*;

pub use arbor_macros::WithBuilders;
