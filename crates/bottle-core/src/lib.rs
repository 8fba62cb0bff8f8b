pub mod animation;
pub mod clock;
pub mod config;
pub mod constants;
pub mod frame;
pub mod haptics;
pub mod input;
pub mod particles;
pub mod quantity;
pub mod scheduler;
pub mod widget;

pub static BOTTLE_WGSL: &str = include_str!("../shaders/bottle.wgsl");

pub use animation::{AnimationDriver, AnimationPhase, Easing, Oscillator, Repeat};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BottleConfig, ConfigError};
pub use constants::*;
pub use frame::{Frame, FrameObserver, SceneUniforms, SparkleInstance, SparkleSample};
pub use haptics::{
    FeedbackDispatcher, FeedbackIntensity, HapticCapability, LogHaptics, RecordingHaptics,
};
pub use input::{touch_to_quantity, DragSession, PointerEvent};
pub use particles::{Particle, ParticleId, ParticleSystem};
pub use quantity::{QuantityState, Stats};
pub use scheduler::{Due, Scheduler, Task, TimerId};
pub use widget::{BottleWidget, ObserverId, QuantityStore};
