//! Haptic feedback boundary.
//!
//! The core only decides when a pulse happens and how strong it is; producing
//! the physical pulse belongs to whatever implements [`HapticCapability`].

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackIntensity {
    Light,
    Heavy,
}

pub trait HapticCapability {
    fn impact(&self, intensity: FeedbackIntensity);
}

impl<H: HapticCapability + ?Sized> HapticCapability for Rc<H> {
    fn impact(&self, intensity: FeedbackIntensity) {
        (**self).impact(intensity)
    }
}

/// Forwards every intent straight to the capability, one pulse per intent.
pub struct FeedbackDispatcher<H> {
    haptics: H,
}

impl<H: HapticCapability> FeedbackDispatcher<H> {
    pub fn new(haptics: H) -> Self {
        Self { haptics }
    }

    pub fn dispatch(&self, intensity: FeedbackIntensity) {
        log::trace!("[haptics] {:?}", intensity);
        self.haptics.impact(intensity);
    }

    pub fn dispatch_all(&self, intents: impl IntoIterator<Item = FeedbackIntensity>) {
        for intensity in intents {
            self.dispatch(intensity);
        }
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }
}

/// Stand-in capability for hosts without haptic hardware.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogHaptics;

impl HapticCapability for LogHaptics {
    fn impact(&self, intensity: FeedbackIntensity) {
        log::debug!("[haptics] impact {:?}", intensity);
    }
}

/// Keeps every received intent in order; handy for headless hosts and tests.
#[derive(Default, Clone, Debug)]
pub struct RecordingHaptics {
    log: Rc<RefCell<Vec<FeedbackIntensity>>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<FeedbackIntensity> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn count(&self, intensity: FeedbackIntensity) -> usize {
        self.log.borrow().iter().filter(|i| **i == intensity).count()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

impl HapticCapability for RecordingHaptics {
    fn impact(&self, intensity: FeedbackIntensity) {
        self.log.borrow_mut().push(intensity);
    }
}
