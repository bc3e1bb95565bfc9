//! Engine tuning knobs.

use crate::primitives::Point;
use arbor_macros::WithBuilders;
use std::time::Duration;

/// Timing and geometry constants used by the dispatcher, click detector and
/// overlay coordinator.
///
/// ```ignore
/// let config = EngineConfig::default()
///     .with_double_click(Duration::from_millis(400))
///     .with_hover_delay(Duration::from_millis(600));
/// ```
#[derive(Debug, Clone, PartialEq, WithBuilders)]
pub struct EngineConfig {
    /// Window in which a second press counts as a double tap
    pub double_click: Duration,
    /// Hold time after which a press becomes a long press
    pub long_press: Duration,
    /// Maximum pointer travel (per axis) between the presses of a double tap
    pub click_tolerance: i32,
    /// Hover delay for views that do not set their own
    pub hover_delay: Duration,
    /// Extra pixels invalidated around a view whose hover state changes
    pub hover_padding: i32,
    /// Interval between animation steps
    pub animation_interval: Duration,
    /// Number of steps in overlay entrance/exit transitions
    pub animation_steps: u32,
    /// Period of the slow polling cadence (caret blink, clocks)
    pub slow_cadence: Duration,
    /// Period of the fast polling cadence (auto-repeat)
    pub fast_cadence: Duration,
    /// Gap between a toast and the bottom of the client area
    pub toast_margin: i32,
    /// Side of the square close box in an overlay's top-right corner
    pub close_box: i32,
    /// Distance from the close box to the overlay edges
    pub close_box_inset: i32,
    /// Tooltip position relative to the requested anchor
    pub tooltip_offset: Point,
    /// Vertical travel of the overlay entrance transition
    pub overlay_slide: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            double_click: Duration::from_millis(500),
            long_press: Duration::from_millis(250),
            click_tolerance: 4,
            hover_delay: Duration::ZERO,
            hover_padding: 2,
            animation_interval: Duration::from_millis(16),
            animation_steps: 8,
            slow_cadence: Duration::from_secs(1),
            fast_cadence: Duration::from_millis(100),
            toast_margin: 24,
            close_box: 12,
            close_box_inset: 4,
            tooltip_offset: Point::new(12, 16),
            overlay_slide: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_single_fields() {
        let config = EngineConfig::default()
            .with_double_click(Duration::from_millis(300))
            .with_click_tolerance(8);
        assert_eq!(config.double_click, Duration::from_millis(300));
        assert_eq!(config.click_tolerance, 8);
        assert_eq!(config.long_press, EngineConfig::default().long_press);
    }
}
