// Host-side tests for tuning constants and their relationships.

use bottle_core::*;
use std::time::Duration;

#[test]
#[allow(clippy::assertions_on_constants)]
fn geometry_keeps_the_liquid_inside_the_bottle() {
    assert!(USABLE_HEIGHT_RATIO > 0.0 && USABLE_HEIGHT_RATIO < 1.0);
    assert!(BOTTOM_RATIO > USABLE_HEIGHT_RATIO && BOTTOM_RATIO < 1.0);
    // the top of the usable region sits below the neck
    assert!(bottom_y() - usable_height() >= BOTTLE_HEIGHT * NECK_HEIGHT_RATIO - 1e-3);
    assert!(SPARKLE_REGION_WIDTH <= BOTTLE_WIDTH * BODY_WIDTH_RATIO);
    assert!(SPARKLE_X_RANGE.1 <= SPARKLE_REGION_WIDTH);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn quantity_constants_are_consistent() {
    assert!(DEFAULT_MAX_QUANTITY > 0.0);
    assert!(STEP_SIZE > 0.0 && STEP_SIZE < DEFAULT_MAX_QUANTITY);
    assert!(BUTTON_INCREMENT > 0.0 && BUTTON_INCREMENT < STEP_SIZE);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn sparkle_ranges_are_ordered() {
    assert!(SPARKLE_X_RANGE.0 < SPARKLE_X_RANGE.1);
    assert!(SPARKLE_OPACITY_RANGE.0 < SPARKLE_OPACITY_RANGE.1);
    assert!(SPARKLE_OPACITY_RANGE.1 <= 1.0);
    assert!(SPARKLE_SCALE_RANGE.0 < SPARKLE_SCALE_RANGE.1);
    assert!(SPARKLE_MIN_FILL > 0.0 && SPARKLE_MIN_FILL < 1.0);
}

#[test]
fn sparkle_timing_reaches_cap_no_sooner_than_cap_ticks() {
    assert!(SPARKLE_LIFETIME > SPARKLE_INTERVAL);
    assert_eq!(SPARKLE_INTERVAL * SPARKLE_CAP as u32, Duration::from_millis(4_500));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn animation_ranges_are_sane() {
    assert!(GLOW_SCALE_MAX > GLOW_SCALE_MIN);
    assert!(GLOW_OPACITY_FILLED > GLOW_OPACITY_EMPTY);
    assert!(WAVE_TRAVEL > 0.0 && HUE_FULL_TURN == 360.0);
    assert!(HUE_PERIOD > WAVE_PERIOD && WAVE_PERIOD > GLOW_HALF_PERIOD);
}
