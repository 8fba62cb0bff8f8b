//! The bottle control: owns quantity, drag session, animations, sparkles,
//! timers and haptic dispatch, and publishes frames to observers.

use crate::animation::AnimationDriver;
use crate::config::{BottleConfig, ConfigError};
use crate::constants::{SPARKLE_INTERVAL, SPARKLE_LIFETIME, SPARKLE_MIN_FILL};
use crate::frame::{Frame, FrameObserver};
use crate::haptics::{FeedbackDispatcher, FeedbackIntensity, HapticCapability};
use crate::input::{touch_to_quantity, DragSession, PointerEvent};
use crate::particles::ParticleSystem;
use crate::quantity::{Intents, QuantityState};
use crate::scheduler::{Due, Scheduler, Task, TimerId};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Place to durably store a finalized quantity. The widget never calls it;
/// hosts that want to keep a value attach one themselves.
pub trait QuantityStore {
    fn record(&mut self, value: f32) -> anyhow::Result<()>;
}

pub struct BottleWidget<H: HapticCapability> {
    quantity: QuantityState,
    drag: Option<DragSession>,
    animations: AnimationDriver,
    sparkles: ParticleSystem,
    scheduler: Scheduler,
    feedback: FeedbackDispatcher<H>,
    observers: Vec<(ObserverId, Box<dyn FrameObserver>)>,
    next_observer: u64,
    spawn_timer: Option<TimerId>,
    last_tick: Duration,
    alive: bool,
}

impl<H: HapticCapability> BottleWidget<H> {
    pub fn new(config: BottleConfig, haptics: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.resolved_seed();
        log::info!(
            "[widget] created max={} seed={}",
            config.max_quantity,
            seed
        );
        Ok(Self {
            quantity: QuantityState::new(config.max_quantity),
            drag: None,
            animations: AnimationDriver::new(),
            sparkles: ParticleSystem::new(seed),
            scheduler: Scheduler::new(),
            feedback: FeedbackDispatcher::new(haptics),
            observers: Vec::new(),
            next_observer: 0,
            spawn_timer: None,
            last_tick: Duration::ZERO,
            alive: true,
        })
    }

    /// Start the oscillators and the sparkle cadence. Only the first call
    /// has an effect.
    pub fn appear(&mut self, now: Duration) {
        if !self.alive || !self.animations.start(now) {
            return;
        }
        self.last_tick = self.last_tick.max(now);
        let id = self.scheduler.schedule_repeating(
            now + SPARKLE_INTERVAL,
            SPARKLE_INTERVAL,
            Task::SpawnSparkle,
        );
        self.spawn_timer = Some(id);
        log::info!("[widget] appeared at {:.3}s", now.as_secs_f32());
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if !self.alive {
            return;
        }
        match event {
            PointerEvent::Begin { y } => {
                self.drag = Some(DragSession {
                    active: true,
                    last_mapped_value: self.quantity.value(),
                });
                self.apply_drag(y);
            }
            PointerEvent::Move { y } => {
                if self.is_dragging() {
                    self.apply_drag(y);
                }
            }
            PointerEvent::End => {
                self.drag = None;
                self.publish();
            }
        }
    }

    fn apply_drag(&mut self, touch_y: f32) {
        let candidate = touch_to_quantity(touch_y, self.quantity.max());
        let intents = self.quantity.set_from_drag(candidate);
        if let Some(session) = self.drag.as_mut() {
            session.last_mapped_value = candidate;
        }
        self.feedback.dispatch_all(intents);
        // continuous pulse on every drag sample
        self.feedback.dispatch(FeedbackIntensity::Heavy);
        self.publish();
    }

    pub fn increment(&mut self) {
        if self.alive {
            let intents = self.quantity.increment();
            self.after_button(intents);
        }
    }

    pub fn decrement(&mut self) {
        if self.alive {
            let intents = self.quantity.decrement();
            self.after_button(intents);
        }
    }

    fn after_button(&mut self, intents: Intents) {
        self.feedback.dispatch_all(intents);
        self.publish();
    }

    /// Run every timer due by `now`, then publish a frame.
    pub fn tick(&mut self, now: Duration) {
        if !self.alive {
            return;
        }
        while let Some(due) = self.scheduler.pop_due(now) {
            self.run_task(due);
        }
        self.last_tick = self.last_tick.max(now);
        self.publish();
    }

    fn run_task(&mut self, due: Due) {
        match due.task {
            Task::SpawnSparkle => {
                if self.quantity.fill_fraction() <= SPARKLE_MIN_FILL {
                    return;
                }
                let spawned = self
                    .sparkles
                    .try_spawn(due.deadline, self.quantity.fill_fraction());
                if let Some(id) = spawned {
                    self.scheduler
                        .schedule_once(due.deadline + SPARKLE_LIFETIME, Task::RetireSparkle(id));
                }
            }
            Task::RetireSparkle(id) => {
                self.sparkles.retire(id);
            }
        }
    }

    pub fn frame(&self, now: Duration) -> Frame {
        let fill = self.quantity.fill_fraction();
        Frame {
            time: now,
            quantity: self.quantity.value(),
            fill,
            stats: self.quantity.stats(),
            can_increment: self.quantity.can_increment(),
            can_decrement: self.quantity.can_decrement(),
            dragging: self.is_dragging(),
            phases: self.animations.phases(now),
            glow_opacity: Frame::glow_opacity_for(fill),
            sparkles: Frame::sparkles_from(self.sparkles.particles(), fill, now),
        }
    }

    pub fn subscribe(&mut self, observer: impl FrameObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        if self.alive {
            self.observers.push((id, Box::new(observer)));
        }
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let frame = self.frame(self.last_tick);
        for (_, observer) in self.observers.iter_mut() {
            observer.frame_ready(&frame);
        }
    }

    /// Cancel every timer and drop all transient state. The widget ignores
    /// all further input afterwards.
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        let cancelled = self.scheduler.cancel_all();
        self.spawn_timer = None;
        self.animations.stop();
        self.sparkles.clear();
        self.drag = None;
        self.observers.clear();
        log::info!("[widget] torn down, cancelled {} timers", cancelled);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.map(|d| d.active).unwrap_or(false)
    }

    pub fn drag_session(&self) -> Option<DragSession> {
        self.drag
    }

    pub fn quantity(&self) -> &QuantityState {
        &self.quantity
    }

    pub fn value(&self) -> f32 {
        self.quantity.value()
    }

    pub fn can_increment(&self) -> bool {
        self.quantity.can_increment()
    }

    pub fn can_decrement(&self) -> bool {
        self.quantity.can_decrement()
    }

    pub fn sparkles(&self) -> &ParticleSystem {
        &self.sparkles
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn spawn_timer(&self) -> Option<TimerId> {
        self.spawn_timer
    }

    pub fn haptics(&self) -> &H {
        self.feedback.haptics()
    }
}

impl<H: HapticCapability> Drop for BottleWidget<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
