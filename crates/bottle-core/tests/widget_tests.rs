// Host-side tests for the composed bottle widget: pointer stream, haptics,
// sparkle cadence, frame publishing and teardown.

use bottle_core::{
    bottom_y, usable_height, BottleConfig, BottleWidget, ConfigError, FeedbackIntensity, Frame,
    ManualClock, Clock, PointerEvent, RecordingHaptics, SceneUniforms, SparkleInstance,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use FeedbackIntensity::{Heavy, Light};

fn make_widget() -> BottleWidget<RecordingHaptics> {
    BottleWidget::new(BottleConfig::default().with_seed(42), RecordingHaptics::new())
        .expect("default config is valid")
}

fn y_for(value: f32, max: f32) -> f32 {
    bottom_y() - usable_height() * (value / max)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Drag to `value` in a single begin/end gesture and clear the haptic log.
fn set_by_drag(w: &mut BottleWidget<RecordingHaptics>, value: f32) {
    w.handle_pointer(PointerEvent::Begin { y: y_for(value, 300.0) });
    w.handle_pointer(PointerEvent::End);
    w.haptics().take();
}

#[test]
fn drag_to_half_height_sets_half_quantity() {
    let mut w = make_widget();
    w.handle_pointer(PointerEvent::Begin { y: y_for(150.0, 300.0) });
    assert!((w.value() - 150.0).abs() < 1e-2, "value {}", w.value());
    assert!(w.is_dragging());
}

#[test]
fn drag_above_the_bottle_clamps_to_max() {
    let mut w = make_widget();
    w.handle_pointer(PointerEvent::Begin { y: -30.0 });
    assert_eq!(w.value(), 300.0);
    assert!(!w.can_increment());
}

#[test]
fn every_drag_sample_fires_a_heavy_pulse() {
    let mut w = make_widget();
    w.handle_pointer(PointerEvent::Begin { y: y_for(100.0, 300.0) });
    for v in [101.0, 102.0, 103.0] {
        w.handle_pointer(PointerEvent::Move { y: y_for(v, 300.0) });
    }
    w.handle_pointer(PointerEvent::End);
    assert_eq!(w.haptics().count(Heavy), 4);
}

#[test]
fn crossing_a_step_while_dragging_adds_one_light_pulse() {
    let mut w = make_widget();
    w.handle_pointer(PointerEvent::Begin { y: y_for(25.0, 300.0) });
    w.handle_pointer(PointerEvent::Move { y: y_for(35.0, 300.0) });
    assert_eq!(w.haptics().take(), vec![Heavy, Light, Heavy]);
}

#[test]
fn move_without_begin_is_ignored() {
    let mut w = make_widget();
    w.handle_pointer(PointerEvent::Move { y: y_for(200.0, 300.0) });
    assert_eq!(w.value(), 0.0);
    assert!(w.haptics().is_empty());
}

#[test]
fn end_closes_the_drag_session() {
    let mut w = make_widget();
    w.handle_pointer(PointerEvent::Begin { y: y_for(60.0, 300.0) });
    let session = w.drag_session().expect("session open");
    assert!(session.active);
    assert!((session.last_mapped_value - 60.0).abs() < 1e-2);

    w.handle_pointer(PointerEvent::End);
    assert!(w.drag_session().is_none());
    w.handle_pointer(PointerEvent::Move { y: y_for(250.0, 300.0) });
    assert!((w.value() - 60.0).abs() < 1e-2);
}

#[test]
fn buttons_step_by_ten_with_light_pulses() {
    let mut w = make_widget();
    set_by_drag(&mut w, 295.0);
    w.increment();
    assert_eq!(w.value(), 300.0);
    w.increment();
    assert_eq!(w.value(), 300.0);
    assert_eq!(w.haptics().take(), vec![Light, Light]);

    w.decrement();
    assert_eq!(w.value(), 290.0);
    assert!(w.can_increment());
}

#[test]
fn configured_max_bounds_the_quantity() {
    let config = BottleConfig::default().with_max_quantity(500.0).with_seed(1);
    let mut w = BottleWidget::new(config, RecordingHaptics::new()).expect("valid");
    w.handle_pointer(PointerEvent::Begin { y: 0.0 });
    assert_eq!(w.value(), 500.0);
}

#[test]
fn invalid_max_is_rejected() {
    let zero = BottleWidget::new(
        BottleConfig::default().with_max_quantity(0.0),
        RecordingHaptics::new(),
    );
    assert!(matches!(zero, Err(ConfigError::NonPositiveMax(_))));

    let nan = BottleWidget::new(
        BottleConfig::default().with_max_quantity(f32::NAN),
        RecordingHaptics::new(),
    );
    assert!(matches!(nan, Err(ConfigError::NonFiniteMax(_))));
}

#[test]
fn sparkles_spawn_once_per_tick_at_half_fill() {
    let mut w = make_widget();
    set_by_drag(&mut w, 150.0);
    w.appear(Duration::ZERO);

    for k in 1..=11u64 {
        w.tick(ms(300 * k));
        assert_eq!(w.sparkles().spawned_total(), k, "after tick {k}");
        assert!(w.sparkles().len() <= 15);
    }
    // 1.5s lifetime at a 0.3s cadence keeps five alive at once
    assert_eq!(w.sparkles().len(), 5);
}

#[test]
fn one_coarse_tick_catches_up_on_missed_spawns() {
    let mut w = make_widget();
    set_by_drag(&mut w, 150.0);
    w.appear(Duration::ZERO);
    w.tick(ms(3_300));
    assert_eq!(w.sparkles().spawned_total(), 11);
    assert_eq!(w.sparkles().len(), 5);
}

#[test]
fn population_is_bounded_over_a_long_run() {
    let mut w = make_widget();
    set_by_drag(&mut w, 280.0);
    w.appear(Duration::ZERO);
    for step in 1..=2_000u64 {
        w.tick(ms(step * 17));
        assert!(w.sparkles().len() <= 15);
    }
}

#[test]
fn each_sparkle_lives_exactly_its_lifetime() {
    let mut w = make_widget();
    set_by_drag(&mut w, 150.0);
    w.appear(Duration::ZERO);

    w.tick(ms(300));
    let first = w.sparkles().particles()[0].id;
    assert_eq!(w.sparkles().particles()[0].spawned_at, ms(300));

    w.tick(ms(1_799));
    assert!(w.sparkles().get(first).is_some());
    w.tick(ms(1_800));
    assert!(w.sparkles().get(first).is_none());
}

#[test]
fn no_sparkles_at_or_below_minimum_fill() {
    let mut w = make_widget();
    set_by_drag(&mut w, 300.0);
    for _ in 0..27 {
        w.decrement();
    }
    assert_eq!(w.value(), 30.0);
    w.appear(Duration::ZERO);
    w.tick(ms(3_000));
    assert_eq!(w.sparkles().spawned_total(), 0);

    w.increment();
    w.tick(ms(3_300));
    assert_eq!(w.sparkles().spawned_total(), 1);
}

#[test]
fn nothing_spawns_before_appear() {
    let mut w = make_widget();
    set_by_drag(&mut w, 200.0);
    w.tick(ms(5_000));
    assert_eq!(w.sparkles().spawned_total(), 0);
    assert!(w.spawn_timer().is_none());
}

#[test]
fn appear_twice_keeps_a_single_cadence() {
    let mut w = make_widget();
    set_by_drag(&mut w, 200.0);
    w.appear(Duration::ZERO);
    w.appear(ms(100));
    w.tick(ms(300));
    assert_eq!(w.sparkles().spawned_total(), 1);
}

#[test]
fn teardown_cancels_everything() {
    let mut w = make_widget();
    set_by_drag(&mut w, 150.0);
    w.appear(Duration::ZERO);
    w.tick(ms(900));
    assert!(w.scheduler().pending() > 1);

    w.teardown();
    assert!(!w.is_alive());
    assert_eq!(w.scheduler().pending(), 0);
    assert!(w.sparkles().is_empty());

    let spawned = w.sparkles().spawned_total();
    w.tick(ms(10_000));
    w.handle_pointer(PointerEvent::Begin { y: 0.0 });
    w.increment();
    assert_eq!(w.sparkles().spawned_total(), spawned);
    assert!(w.haptics().is_empty());
    assert!((w.value() - 150.0).abs() < 1e-2);
}

#[test]
fn observers_receive_frames_until_unsubscribed() {
    let mut w = make_widget();
    let seen: Rc<RefCell<Vec<f32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let id = w.subscribe(move |frame: &Frame| sink.borrow_mut().push(frame.quantity));

    w.increment();
    w.tick(ms(16));
    assert_eq!(*seen.borrow(), vec![10.0, 10.0]);

    assert!(w.unsubscribe(id));
    w.increment();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn teardown_drops_observers() {
    let mut w = make_widget();
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    w.subscribe(move |_: &Frame| *sink.borrow_mut() += 1);
    w.teardown();
    w.tick(ms(16));
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn frame_reflects_state_and_animation() {
    let clock = ManualClock::new();
    let mut w = make_widget();
    assert_eq!(w.frame(clock.now()).glow_opacity, 0.3);

    set_by_drag(&mut w, 150.0);
    w.appear(clock.now());
    let now = clock.advance(ms(1_500));
    w.tick(now);

    let frame = w.frame(now);
    assert!((frame.fill - 0.5).abs() < 1e-4);
    assert_eq!(frame.glow_opacity, 0.8);
    assert!((frame.phases.wave_offset - 70.0).abs() < 1e-3);
    assert_eq!(frame.stats.goal, 300);
    assert!(frame.can_increment && frame.can_decrement);
    assert_eq!(frame.sparkles.len(), w.sparkles().len());
    let crest = (0..=160)
        .map(|x| frame.surface_offset_at(x as f32).abs())
        .fold(0.0_f32, f32::max);
    assert!(crest <= 8.0 * frame.fill + 1e-4);
    assert!(crest > 3.9, "crest {crest}");
    for s in &frame.sparkles {
        // sparkles sit inside the liquid
        assert!(s.position.y >= frame.surface_y() - 1e-3);
        assert!(s.position.y <= bottom_y() + 1e-3);
        assert!((0.0..=0.8).contains(&s.opacity));
    }
}

#[test]
fn sparkles_are_hidden_when_fill_drops_low() {
    let mut w = make_widget();
    set_by_drag(&mut w, 150.0);
    w.appear(Duration::ZERO);
    w.tick(ms(600));
    assert_eq!(w.sparkles().len(), 2);

    set_by_drag(&mut w, 20.0);
    let frame = w.frame(ms(600));
    assert!(frame.sparkles.is_empty());
    assert_eq!(w.sparkles().len(), 2);
}

#[test]
fn gpu_types_have_expected_layout() {
    assert_eq!(std::mem::size_of::<SceneUniforms>(), 48);
    assert_eq!(std::mem::size_of::<SparkleInstance>(), 16);

    let mut w = make_widget();
    set_by_drag(&mut w, 300.0);
    w.appear(Duration::ZERO);
    w.tick(ms(300));
    let frame = w.frame(ms(300));
    let u = frame.uniforms([10.0, 20.0], 2.0, [640.0, 480.0]);
    assert_eq!(u.fill, 1.0);
    assert_eq!(u.wave_amplitude, 8.0);
    assert_eq!(u.origin, [10.0, 20.0]);
    assert_eq!(frame.sparkle_instances().len(), 1);
}
