//! Time-driven decorative oscillators.
//!
//! Every value here is a pure function of the time elapsed since the driver
//! was started; there is no per-frame integration state, so sampling at any
//! rate (or out of order) gives the same answer.

use crate::constants::*;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map a linear fraction in `[0, 1]` through the curve.
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::Linear => fraction.clamp(0.0, 1.0),
            Easing::EaseOut => CubicBezier::new(0.0, 0.0, 0.58, 1.0).solve(fraction),
            Easing::EaseInOut => CubicBezier::new(0.42, 0.0, 0.58, 1.0).solve(fraction),
        }
    }
}

/// CSS-style timing curve through (0,0), (x1,y1), (x2,y2), (1,1), kept as
/// polynomial coefficients for each axis.
#[derive(Debug, Clone, Copy)]
struct CubicBezier {
    x: [f32; 3],
    y: [f32; 3],
}

impl CubicBezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: Self::coefficients(x1, x2),
            y: Self::coefficients(y1, y2),
        }
    }

    fn coefficients(p1: f32, p2: f32) -> [f32; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        [1.0 - c - b, b, c]
    }

    fn eval([a, b, c]: [f32; 3], t: f32) -> f32 {
        ((a * t + b) * t + c) * t
    }

    fn slope_x(&self, t: f32) -> f32 {
        let [a, b, c] = self.x;
        (3.0 * a * t + 2.0 * b) * t + c
    }

    /// Curve parameter whose x equals `x`: a few Newton steps, then bisection.
    fn param_for(&self, x: f32) -> f32 {
        let mut t = x;
        for _ in 0..8 {
            let err = Self::eval(self.x, t) - x;
            if err.abs() < 1e-6 {
                return t;
            }
            let slope = self.slope_x(t);
            if slope.abs() < 1e-6 {
                break;
            }
            t = (t - err / slope).clamp(0.0, 1.0);
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        t = x;
        for _ in 0..24 {
            let err = Self::eval(self.x, t) - x;
            if err.abs() < 1e-6 {
                break;
            }
            if err > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }

    fn solve(&self, fraction: f32) -> f32 {
        if fraction <= 0.0 {
            return 0.0;
        }
        if fraction >= 1.0 {
            return 1.0;
        }
        Self::eval(self.y, self.param_for(fraction))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Jump back to the start value at each period boundary (sawtooth).
    Restart,
    /// Play forward, then backward over the same duration (triangle).
    Reverse,
}

/// Infinitely repeating tween between two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub from: f32,
    pub to: f32,
    /// Duration of one forward pass.
    pub duration: Duration,
    pub easing: Easing,
    pub repeat: Repeat,
}

impl Oscillator {
    pub fn glow() -> Self {
        Self {
            from: GLOW_SCALE_MIN,
            to: GLOW_SCALE_MAX,
            duration: GLOW_HALF_PERIOD,
            easing: Easing::EaseInOut,
            repeat: Repeat::Reverse,
        }
    }

    pub fn wave() -> Self {
        Self {
            from: 0.0,
            to: WAVE_TRAVEL,
            duration: WAVE_PERIOD,
            easing: Easing::Linear,
            repeat: Repeat::Restart,
        }
    }

    pub fn hue() -> Self {
        Self {
            from: 0.0,
            to: HUE_FULL_TURN,
            duration: HUE_PERIOD,
            easing: Easing::Linear,
            repeat: Repeat::Restart,
        }
    }

    /// Full cycle length: one pass for `Restart`, two for `Reverse`.
    pub fn period(&self) -> Duration {
        match self.repeat {
            Repeat::Restart => self.duration,
            Repeat::Reverse => self.duration * 2,
        }
    }

    pub fn sample(&self, elapsed: Duration) -> f32 {
        let pass = self.duration.as_nanos();
        if pass == 0 {
            return self.to;
        }
        let into_cycle = elapsed.as_nanos() % self.period().as_nanos();
        let linear = match self.repeat {
            Repeat::Restart => into_cycle as f64 / pass as f64,
            Repeat::Reverse if into_cycle < pass => into_cycle as f64 / pass as f64,
            Repeat::Reverse => 1.0 - (into_cycle - pass) as f64 / pass as f64,
        };
        let eased = self.easing.transform(linear as f32);
        let value = self.from + (self.to - self.from) * eased;
        // a sawtooth never shows its end value; f32 rounding near the
        // boundary would otherwise land on it
        if self.repeat == Repeat::Restart && value == self.to {
            return self.from;
        }
        value
    }
}

/// Snapshot of the three oscillators at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPhase {
    pub glow_scale: f32,
    pub wave_offset: f32,
    pub hue_degrees: f32,
}

impl Default for AnimationPhase {
    fn default() -> Self {
        Self {
            glow_scale: GLOW_SCALE_MIN,
            wave_offset: 0.0,
            hue_degrees: 0.0,
        }
    }
}

pub struct AnimationDriver {
    started_at: Option<Duration>,
    glow: Oscillator,
    wave: Oscillator,
    hue: Oscillator,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            started_at: None,
            glow: Oscillator::glow(),
            wave: Oscillator::wave(),
            hue: Oscillator::hue(),
        }
    }

    /// Record the start timestamp. Later calls keep the first one.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn phases(&self, now: Duration) -> AnimationPhase {
        match self.started_at {
            Some(start) => {
                let elapsed = now.saturating_sub(start);
                AnimationPhase {
                    glow_scale: self.glow.sample(elapsed),
                    wave_offset: self.wave.sample(elapsed),
                    hue_degrees: self.hue.sample(elapsed),
                }
            }
            None => AnimationPhase::default(),
        }
    }
}

/// Vertical displacement of the liquid surface at `x` across a surface of
/// `width`, for the current wave offset and fill fraction.
pub fn surface_offset(x: f32, width: f32, wave_offset: f32, fill: f32) -> f32 {
    if width <= 0.0 {
        return 0.0;
    }
    let relative_x = x / width;
    let phase = (relative_x + wave_offset / width) * std::f32::consts::PI * 2.0 * WAVE_CYCLES;
    phase.sin() * WAVE_HEIGHT * fill.clamp(0.0, 1.0)
}
