//! Bounded fill quantity and the feedback intents its mutations produce.

use crate::constants::{BUTTON_INCREMENT, STEP_SIZE};
use crate::haptics::FeedbackIntensity;
use smallvec::SmallVec;

/// Feedback intents produced by a single mutation, in emission order.
pub type Intents = SmallVec<[FeedbackIntensity; 2]>;

/// Bounded quantity in `[0, max]` with step-crossing detection.
#[derive(Clone, Debug)]
pub struct QuantityState {
    value: f32,
    max: f32,
    step: f32,
}

/// Numbers shown around the bottle: goal, remaining and progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub display_value: u32,
    pub goal: u32,
    pub remaining: u32,
    pub progress_percent: u32,
}

impl QuantityState {
    pub fn new(max: f32) -> Self {
        Self {
            value: 0.0,
            max,
            step: STEP_SIZE,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn fill_fraction(&self) -> f32 {
        self.value / self.max
    }

    /// Apply a mapped drag candidate.
    ///
    /// The step index of the candidate is taken before clamping, so a candidate
    /// past `max` can report a crossing into a step the value never reaches.
    pub fn set_from_drag(&mut self, candidate: f32) -> Intents {
        let previous_step = step_index(self.value, self.step);
        let current_step = step_index(candidate, self.step);
        self.value = self.clamp(candidate);

        let mut intents = Intents::new();
        if previous_step != current_step {
            log::debug!(
                "[quantity] step {} -> {} (value {:.1})",
                previous_step,
                current_step,
                self.value
            );
            intents.push(FeedbackIntensity::Light);
        }
        intents
    }

    pub fn increment(&mut self) -> Intents {
        self.value = self.clamp(self.value + BUTTON_INCREMENT);
        smallvec::smallvec![FeedbackIntensity::Light]
    }

    pub fn decrement(&mut self) -> Intents {
        self.value = self.clamp(self.value - BUTTON_INCREMENT);
        smallvec::smallvec![FeedbackIntensity::Light]
    }

    pub fn can_increment(&self) -> bool {
        self.value < self.max
    }

    pub fn can_decrement(&self) -> bool {
        self.value > 0.0
    }

    pub fn stats(&self) -> Stats {
        Stats {
            display_value: self.value as u32,
            goal: self.max as u32,
            remaining: (self.max - self.value).max(0.0) as u32,
            progress_percent: (self.fill_fraction() * 100.0) as u32,
        }
    }

    fn clamp(&self, v: f32) -> f32 {
        if v.is_nan() {
            return self.value;
        }
        v.clamp(0.0, self.max)
    }
}

/// Index of the step band containing `value`.
#[inline]
pub fn step_index(value: f32, step: f32) -> i64 {
    (value / step).floor() as i64
}

