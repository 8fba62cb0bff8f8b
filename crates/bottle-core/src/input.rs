//! Pointer input and the mapping from touch height to quantity.

use crate::constants::{bottom_y, usable_height};

/// Phase-tagged pointer sample in widget-local coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Begin { y: f32 },
    Move { y: f32 },
    End,
}

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub active: bool,
    pub last_mapped_value: f32,
}

/// Map a vertical touch position to a quantity in `[0, max]`.
///
/// Positions at or below the liquid floor map to 0, positions at or above the
/// top of the usable region map to `max`.
#[inline]
pub fn touch_to_quantity(touch_y: f32, max: f32) -> f32 {
    fill_for_touch(touch_y) * max
}

/// Fill fraction in `[0, 1]` for a vertical touch position.
#[inline]
pub fn fill_for_touch(touch_y: f32) -> f32 {
    let relative_y = bottom_y() - touch_y;
    let percentage = relative_y / usable_height();
    // NaN input collapses to empty rather than poisoning the quantity
    if percentage.is_nan() {
        return 0.0;
    }
    percentage.clamp(0.0, 1.0)
}

/// Inverse of [`fill_for_touch`]: local y of the liquid surface for a fill.
#[inline]
pub fn surface_y_for_fill(fill: f32) -> f32 {
    bottom_y() - usable_height() * fill.clamp(0.0, 1.0)
}
