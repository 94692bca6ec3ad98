// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Simulator Strategy

use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::AnimationConfig;
use crate::geometry::{Point2, Viewport};
use crate::packet_flow::PacketFlow;
use crate::particle_field::ParticleField;
use crate::preferences::Palette;
use crate::surface::DrawSurface;
use crate::wireframe::Wireframe;

// ─── Frame input ─────────────────────────────────────────────────────────────

/// Host-provided inputs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame (0 on the first frame).
    pub dt: f64,
    pub viewport: Viewport,
    pub pointer: Option<Point2>,
}

impl FrameInput {
    pub fn new(dt: f64, viewport: Viewport) -> Self {
        Self { dt, viewport, pointer: None }
    }
}

// ─── Simulator trait ─────────────────────────────────────────────────────────

/// Capability set shared by every animation variant.
pub trait Simulator {
    fn step(&mut self, input: &FrameInput);
    fn render(&self, surface: &mut dyn DrawSurface);
    fn resize(&mut self, viewport: Viewport);
    fn apply_palette(&mut self, palette: &Palette);
}

impl Simulator for ParticleField {
    fn step(&mut self, input: &FrameInput) {
        ParticleField::step(self, input.pointer, input.viewport);
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        ParticleField::render(self, surface);
    }

    fn resize(&mut self, viewport: Viewport) {
        ParticleField::resize(self, viewport);
    }

    fn apply_palette(&mut self, palette: &Palette) {
        self.config_mut().apply_palette(palette);
    }
}

impl Simulator for PacketFlow {
    fn step(&mut self, input: &FrameInput) {
        PacketFlow::step(self, input.dt);
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        PacketFlow::render(self, surface);
    }

    fn resize(&mut self, viewport: Viewport) {
        PacketFlow::resize(self, viewport);
    }

    fn apply_palette(&mut self, palette: &Palette) {
        PacketFlow::apply_palette(self, palette);
    }
}

impl Simulator for Wireframe {
    fn step(&mut self, _input: &FrameInput) {
        Wireframe::step(self);
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        Wireframe::render(self, surface);
    }

    fn resize(&mut self, viewport: Viewport) {
        Wireframe::resize(self, viewport);
    }

    fn apply_palette(&mut self, palette: &Palette) {
        self.config_mut().apply_palette(palette);
    }
}

// ─── AnySimulator ────────────────────────────────────────────────────────────

/// The simulator chosen at mount time.
#[derive(Debug)]
pub enum AnySimulator {
    ParticleField(ParticleField),
    PacketFlow(PacketFlow),
    Wireframe(Wireframe),
}

impl AnySimulator {
    pub fn from_config(config: AnimationConfig, viewport: Viewport) -> Self {
        match config {
            AnimationConfig::ParticleField(c) => Self::ParticleField(ParticleField::new(c, viewport)),
            AnimationConfig::PacketFlow(c) => Self::PacketFlow(PacketFlow::new(c, viewport)),
            AnimationConfig::Wireframe(c) => Self::Wireframe(Wireframe::new(c, viewport)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParticleField(_) => "particle_field",
            Self::PacketFlow(_) => "packet_flow",
            Self::Wireframe(_) => "wireframe",
        }
    }

    fn inner(&self) -> &dyn Simulator {
        match self {
            Self::ParticleField(s) => s,
            Self::PacketFlow(s) => s,
            Self::Wireframe(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Simulator {
        match self {
            Self::ParticleField(s) => s,
            Self::PacketFlow(s) => s,
            Self::Wireframe(s) => s,
        }
    }
}

impl Simulator for AnySimulator {
    fn step(&mut self, input: &FrameInput) {
        self.inner_mut().step(input);
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        self.inner().render(surface);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.inner_mut().resize(viewport);
    }

    fn apply_palette(&mut self, palette: &Palette) {
        self.inner_mut().apply_palette(palette);
    }
}

// ─── Randomness ──────────────────────────────────────────────────────────────

static SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Simulator-owned RNG: fixed when a seed is configured, otherwise seeded
/// from the clock so concurrent mounts still differ.
pub(crate) fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    let seed = seed.unwrap_or_else(|| {
        let salt = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
        clock_seed() ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    });
    ChaCha8Rng::seed_from_u64(seed)
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    let r = js_sys::Math::random() * (u32::MAX as f64);
    (js_sys::Date::now() as u64) ^ ((r as u64) << 32)
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}
