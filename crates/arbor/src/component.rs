//! Component trait for building reusable widgets
//!
//! A component is a plain builder that owns its configuration and callbacks
//! and turns into a [`View`] once it is placed in a tree.
//!
//! # Example
//!
//! ```ignore
//! use arbor::{Component, View};
//!
//! struct Badge {
//!     label: String,
//! }
//!
//! impl Component for Badge {
//!     fn view(self) -> View {
//!         View::container().with_text(self.label)
//!     }
//! }
//! ```

use crate::view::View;

/// A builder that produces a view subtree
///
/// The trait takes `self` by value so callbacks and styles move into the
/// view's behavior slots.
pub trait Component {
    fn view(self) -> View;
}

/// Extension trait for conditionally shown components
pub trait ComponentExt: Component + Sized {
    /// Build the view, hidden unless `condition` holds
    fn when(self, condition: bool) -> View {
        self.view().with_hidden(!condition)
    }
}

impl<T: Component> ComponentExt for T {}

impl Component for View {
    fn view(self) -> View {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestComponent {
        label: String,
    }

    impl TestComponent {
        fn new(label: impl Into<String>) -> Self {
            Self {
                label: label.into(),
            }
        }
    }

    impl Component for TestComponent {
        fn view(self) -> View {
            View::container().with_text(self.label)
        }
    }

    #[test]
    fn test_component_view() {
        let view = TestComponent::new("test").view();
        assert_eq!(view.text(), Some("test"));
    }

    #[test]
    fn test_component_when() {
        assert!(!TestComponent::new("visible").when(true).is_hidden());
        assert!(TestComponent::new("hidden").when(false).is_hidden());
    }
}
