//! Shared tuning constants for the bottle control and its native host.

use std::time::Duration;

// Quantity
pub const DEFAULT_MAX_QUANTITY: f32 = 300.0; // ml
pub const STEP_SIZE: f32 = 30.0; // crossing a multiple of this triggers a light pulse
pub const BUTTON_INCREMENT: f32 = 10.0; // +/- control delta

// Bottle geometry in widget-local units (origin top-left, y grows downward)
pub const BOTTLE_HEIGHT: f32 = 320.0;
pub const BOTTLE_WIDTH: f32 = 160.0;
pub const USABLE_HEIGHT_RATIO: f32 = 0.74; // share of the height the liquid can occupy
pub const BOTTOM_RATIO: f32 = 0.82; // liquid floor as a share of the height
pub const NECK_HEIGHT_RATIO: f32 = 0.08;
pub const NECK_WIDTH_RATIO: f32 = 0.3;
pub const BODY_WIDTH_RATIO: f32 = 0.85;

// Glow pulse (ease-in-out, auto-reversing)
pub const GLOW_SCALE_MIN: f32 = 1.0;
pub const GLOW_SCALE_MAX: f32 = 1.15;
pub const GLOW_HALF_PERIOD: Duration = Duration::from_secs(2);
pub const GLOW_OPACITY_FILLED: f32 = 0.8;
pub const GLOW_OPACITY_EMPTY: f32 = 0.3;

// Wave travel (linear sawtooth)
pub const WAVE_TRAVEL: f32 = 140.0;
pub const WAVE_PERIOD: Duration = Duration::from_secs(3);
pub const WAVE_HEIGHT: f32 = 8.0; // crest height at full fill
pub const WAVE_CYCLES: f32 = 2.0; // full sine cycles across the liquid width

// Hue rotation (linear sawtooth)
pub const HUE_FULL_TURN: f32 = 360.0;
pub const HUE_PERIOD: Duration = Duration::from_secs(8);

// Sparkles
pub const SPARKLE_CAP: usize = 15;
pub const SPARKLE_INTERVAL: Duration = Duration::from_millis(300);
pub const SPARKLE_LIFETIME: Duration = Duration::from_millis(1500);
pub const SPARKLE_MIN_FILL: f32 = 0.1; // no spawning (or drawing) at or below this fill
pub const SPARKLE_X_RANGE: (f32, f32) = (20.0, 100.0);
pub const SPARKLE_Y_SPAN: f32 = 300.0; // scaled by fill fraction
pub const SPARKLE_OPACITY_RANGE: (f32, f32) = (0.3, 0.8);
pub const SPARKLE_SCALE_RANGE: (f32, f32) = (0.5, 1.5);
pub const SPARKLE_REGION_WIDTH: f32 = 120.0; // width of the sparkle layer inside the bottle
pub const SPARKLE_DOT_SIZE: f32 = 3.0; // base diameter before scale

#[inline]
pub fn usable_height() -> f32 {
    BOTTLE_HEIGHT * USABLE_HEIGHT_RATIO
}

#[inline]
pub fn bottom_y() -> f32 {
    BOTTLE_HEIGHT * BOTTOM_RATIO
}
