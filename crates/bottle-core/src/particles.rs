//! Sparkle particles: seeded spawning, bounded population, fade-out.

use crate::animation::Easing;
use crate::constants::*;
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u64);

/// A sparkle. Position and scale are fixed at spawn; opacity fades from
/// `initial_opacity` to zero over the lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    /// `x` across the sparkle layer, `y` measured up from the liquid floor.
    pub position: Vec2,
    pub initial_opacity: f32,
    pub scale: f32,
    pub spawned_at: Duration,
}

impl Particle {
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.spawned_at)
    }

    pub fn opacity(&self, now: Duration) -> f32 {
        let t = self.age(now).as_secs_f32() / SPARKLE_LIFETIME.as_secs_f32();
        self.initial_opacity * (1.0 - Easing::EaseOut.transform(t))
    }

    pub fn retire_at(&self) -> Duration {
        self.spawned_at + SPARKLE_LIFETIME
    }
}

/// Bounded population of sparkles. Spawns at capacity are dropped.
pub struct ParticleSystem {
    particles: SmallVec<[Particle; SPARKLE_CAP]>,
    cap: usize,
    rng: StdRng,
    next_id: u64,
    spawned_total: u64,
    dropped_total: u64,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self::with_cap(SPARKLE_CAP, seed)
    }

    pub fn with_cap(cap: usize, seed: u64) -> Self {
        Self {
            particles: SmallVec::new(),
            cap,
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            spawned_total: 0,
            dropped_total: 0,
        }
    }

    /// Spawn one sparkle inside the current fill region, unless at capacity.
    pub fn try_spawn(&mut self, now: Duration, fill: f32) -> Option<ParticleId> {
        if self.particles.len() >= self.cap {
            self.dropped_total += 1;
            return None;
        }
        let fill = fill.clamp(0.0, 1.0);
        let id = ParticleId(self.next_id);
        self.next_id += 1;

        let x = self.rng.gen_range(SPARKLE_X_RANGE.0..=SPARKLE_X_RANGE.1);
        let y = self.rng.gen_range(0.0..=SPARKLE_Y_SPAN) * fill;
        let initial_opacity = self
            .rng
            .gen_range(SPARKLE_OPACITY_RANGE.0..=SPARKLE_OPACITY_RANGE.1);
        let scale = self
            .rng
            .gen_range(SPARKLE_SCALE_RANGE.0..=SPARKLE_SCALE_RANGE.1);

        self.particles.push(Particle {
            id,
            position: Vec2::new(x, y),
            initial_opacity,
            scale,
            spawned_at: now,
        });
        self.spawned_total += 1;
        log::debug!(
            "[sparkles] spawn {:?} at ({:.1},{:.1}) population={}",
            id,
            x,
            y,
            self.particles.len()
        );
        Some(id)
    }

    /// Remove a sparkle by id. Unknown ids are ignored.
    pub fn retire(&mut self, id: ParticleId) -> bool {
        let before = self.particles.len();
        self.particles.retain(|p| p.id != id);
        let removed = self.particles.len() != before;
        if removed {
            log::debug!(
                "[sparkles] retire {:?} population={}",
                id,
                self.particles.len()
            );
        }
        removed
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }
}
