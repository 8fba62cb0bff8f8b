//! Frame composition: everything the rendering surface needs for one draw.

use crate::animation::{surface_offset, AnimationPhase};
use crate::constants::*;
use crate::input::surface_y_for_fill;
use crate::particles::Particle;
use crate::quantity::Stats;
use glam::Vec2;
use smallvec::SmallVec;
use std::time::Duration;

/// One sparkle as it should be drawn, in bottle-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparkleSample {
    pub position: Vec2,
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub time: Duration,
    pub quantity: f32,
    pub fill: f32,
    pub stats: Stats,
    pub can_increment: bool,
    pub can_decrement: bool,
    pub dragging: bool,
    pub phases: AnimationPhase,
    pub glow_opacity: f32,
    pub sparkles: SmallVec<[SparkleSample; SPARKLE_CAP]>,
}

impl Frame {
    pub(crate) fn sparkles_from(
        particles: &[Particle],
        fill: f32,
        now: Duration,
    ) -> SmallVec<[SparkleSample; SPARKLE_CAP]> {
        // the sparkle layer only exists above the minimum fill
        if fill <= SPARKLE_MIN_FILL {
            return SmallVec::new();
        }
        particles
            .iter()
            .map(|p| SparkleSample {
                position: sparkle_to_bottle(p.position),
                opacity: p.opacity(now),
                scale: p.scale,
            })
            .collect()
    }

    pub fn glow_opacity_for(fill: f32) -> f32 {
        if fill > 0.0 {
            GLOW_OPACITY_FILLED
        } else {
            GLOW_OPACITY_EMPTY
        }
    }

    /// Local y of the liquid surface, before the wave is applied.
    pub fn surface_y(&self) -> f32 {
        surface_y_for_fill(self.fill)
    }

    /// Wave displacement of the surface at local `x`.
    pub fn surface_offset_at(&self, x: f32) -> f32 {
        surface_offset(x, BOTTLE_WIDTH, self.phases.wave_offset, self.fill)
    }

    pub fn uniforms(&self, origin_px: [f32; 2], scale: f32, viewport_px: [f32; 2]) -> SceneUniforms {
        SceneUniforms {
            viewport: viewport_px,
            origin: origin_px,
            scale,
            fill: self.fill,
            wave_offset: self.phases.wave_offset,
            wave_amplitude: WAVE_HEIGHT * self.fill,
            hue_degrees: self.phases.hue_degrees,
            glow_scale: self.phases.glow_scale,
            glow_opacity: self.glow_opacity,
            _pad: 0.0,
        }
    }

    pub fn sparkle_instances(&self) -> SmallVec<[SparkleInstance; SPARKLE_CAP]> {
        self.sparkles
            .iter()
            .map(|s| SparkleInstance {
                position: s.position.to_array(),
                size: SPARKLE_DOT_SIZE * s.scale,
                opacity: s.opacity,
            })
            .collect()
    }
}

/// Map a particle from sparkle-layer space (y up from the floor, spanning
/// `SPARKLE_Y_SPAN` at full fill) into bottle-local space.
pub fn sparkle_to_bottle(p: Vec2) -> Vec2 {
    let x_inset = (BOTTLE_WIDTH - SPARKLE_REGION_WIDTH) * 0.5;
    let y = bottom_y() - p.y * usable_height() / SPARKLE_Y_SPAN;
    Vec2::new(x_inset + p.x, y)
}

/// Receives every composed frame.
pub trait FrameObserver {
    fn frame_ready(&mut self, frame: &Frame);
}

impl<F: FnMut(&Frame)> FrameObserver for F {
    fn frame_ready(&mut self, frame: &Frame) {
        self(frame)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub viewport: [f32; 2],
    pub origin: [f32; 2],
    pub scale: f32,
    pub fill: f32,
    pub wave_offset: f32,
    pub wave_amplitude: f32,
    pub hue_degrees: f32,
    pub glow_scale: f32,
    pub glow_opacity: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SparkleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub opacity: f32,
}
