// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Particle Field

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ParticleFieldConfig;
use crate::geometry::{distance, proximity_opacity, Point2, Viewport};
use crate::simulator::seeded_rng;
use crate::surface::DrawSurface;

const LINK_ALPHA: f64 = 0.4;
const POINTER_LINK_ALPHA: f64 = 0.6;
const PARTICLE_ALPHA: f64 = 0.8;
const PULSE_THRESHOLD: f64 = 0.95;
const PULSE_HALO_SCALE: f64 = 3.0;
const PULSE_HALO_ALPHA: f64 = 0.15;
const HIGHLIGHT_SCALE: f64 = 1.5;
const HIGHLIGHT_BLUR: f64 = 10.0;

// ─── Particle ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    /// Pulse phase in radians; only ever increases.
    pub pulse: f64,
}

impl Particle {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Whether the periodic highlight is showing this frame.
    pub fn is_pulsing(&self) -> bool {
        self.pulse.sin() > PULSE_THRESHOLD
    }

    fn integrate(&mut self, viewport: Viewport, pulse_speed: f64) {
        self.x += self.vx;
        self.y += self.vy;
        // Reflect toward the inside rather than blindly negating, so a particle
        // left outside by a resize cannot flip back and forth forever.
        if self.x < 0.0 {
            self.vx = self.vx.abs();
        } else if self.x > viewport.width {
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.vy = self.vy.abs();
        } else if self.y > viewport.height {
            self.vy = -self.vy.abs();
        }
        self.pulse += pulse_speed;
    }
}

// ─── ParticleField ───────────────────────────────────────────────────────────

/// Drifting point masses joined by proximity lines.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: ParticleFieldConfig,
    particles: Vec<Particle>,
    viewport: Viewport,
    pointer: Option<Point2>,
}

impl ParticleField {
    /// Scatter `config.node_count` particles uniformly over `viewport`.
    pub fn new(config: ParticleFieldConfig, viewport: Viewport) -> Self {
        let config = config.sanitized();
        let mut rng = seeded_rng(config.seed);
        let viewport = viewport.sanitized();
        let speed = config.max_speed;
        let particles = (0..config.node_count)
            .map(|_| Particle {
                x: rng.gen::<f64>() * viewport.width,
                y: rng.gen::<f64>() * viewport.height,
                vx: (rng.gen::<f64>() * 2.0 - 1.0) * speed,
                vy: (rng.gen::<f64>() * 2.0 - 1.0) * speed,
                size: rng.gen::<f64>() * 2.0 + 1.0,
                pulse: rng.gen::<f64>() * TAU,
            })
            .collect();
        Self { config, particles, viewport, pointer: None }
    }

    /// Build a field from explicit particles (deterministic playback).
    pub fn with_particles(
        config: ParticleFieldConfig,
        viewport: Viewport,
        particles: Vec<Particle>,
    ) -> Self {
        Self { config, particles, viewport: viewport.sanitized(), pointer: None }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &ParticleFieldConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ParticleFieldConfig {
        &mut self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> Option<Point2> {
        self.pointer
    }

    /// Advance one frame. The pointer is recorded for rendering only; it
    /// never alters velocities.
    pub fn step(&mut self, pointer: Option<Point2>, viewport: Viewport) {
        self.pointer = pointer;
        self.viewport = viewport.sanitized();
        let pulse_speed = self.config.pulse_speed;
        for p in &mut self.particles {
            p.integrate(self.viewport, pulse_speed);
        }
    }

    /// Adopt a new viewport, pulling stranded particles back inside.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        for p in &mut self.particles {
            p.x = p.x.clamp(0.0, self.viewport.width);
            p.y = p.y.clamp(0.0, self.viewport.height);
        }
    }

    /// Unordered pairs closer than `connection_distance`, with line opacity.
    /// Quadratic in the particle count.
    pub fn connections(&self) -> Vec<(usize, usize, f64)> {
        let max = self.config.connection_distance;
        let mut out = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
                if let Some(opacity) = proximity_opacity(distance(a.x, a.y, b.x, b.y), max) {
                    out.push((i, j, opacity));
                }
            }
        }
        out
    }

    /// Particles inside the pointer draw radius, with line opacity.
    pub fn pointer_links(&self) -> Vec<(usize, f64)> {
        let Some(pointer) = self.pointer else {
            return Vec::new();
        };
        let max = self.config.pointer_draw_radius;
        self.particles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                proximity_opacity(p.position().distance(pointer), max).map(|o| (i, o))
            })
            .collect()
    }

    fn is_highlighted(&self, p: &Particle) -> bool {
        match self.pointer {
            Some(pointer) => p.position().distance(pointer) < self.config.pointer_detect_radius,
            None => false,
        }
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        surface.set_line_width(1.0);
        surface.set_stroke_color(&self.config.line_color);
        for (i, j, opacity) in self.connections() {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            surface.set_global_alpha(LINK_ALPHA * opacity);
            surface.line(a.x, a.y, b.x, b.y);
        }

        if let Some(pointer) = self.pointer {
            surface.set_stroke_color(&self.config.pointer_color);
            for (i, opacity) in self.pointer_links() {
                let p = &self.particles[i];
                surface.set_global_alpha(POINTER_LINK_ALPHA * opacity);
                surface.line(p.x, p.y, pointer.x, pointer.y);
            }
        }

        surface.set_fill_color(&self.config.node_color);
        for p in &self.particles {
            if p.is_pulsing() {
                surface.set_global_alpha(PULSE_HALO_ALPHA);
                surface.circle(p.x, p.y, p.size * PULSE_HALO_SCALE);
            }
            if self.is_highlighted(p) {
                surface.set_shadow(HIGHLIGHT_BLUR, &self.config.pointer_color);
                surface.set_global_alpha(1.0);
                surface.circle(p.x, p.y, p.size * HIGHLIGHT_SCALE);
                surface.set_shadow(0.0, "transparent");
            } else {
                surface.set_global_alpha(PARTICLE_ALPHA);
                surface.circle(p.x, p.y, p.size);
            }
        }
        surface.set_global_alpha(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn still(x: f64, y: f64) -> Particle {
        Particle { x, y, vx: 0.0, vy: 0.0, size: 1.0, pulse: 0.0 }
    }

    fn cfg() -> ParticleFieldConfig {
        ParticleFieldConfig { seed: Some(7), ..Default::default() }
    }

    #[test]
    fn init_scatters_inside_viewport_with_small_velocity() {
        let vp = Viewport::new(640.0, 480.0);
        let field = ParticleField::new(ParticleFieldConfig { node_count: 100, ..cfg() }, vp);
        assert_eq!(field.particles().len(), 100);
        for p in field.particles() {
            assert!(vp.contains(p.position()));
            assert!(p.vx.abs() <= 0.15 && p.vy.abs() <= 0.15);
            assert!((0.0..TAU).contains(&p.pulse));
            assert!(p.size >= 1.0 && p.size < 3.0);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let vp = Viewport::new(300.0, 300.0);
        let a = ParticleField::new(cfg(), vp);
        let b = ParticleField::new(cfg(), vp);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn wall_reflects_velocity() {
        let vp = Viewport::new(100.0, 100.0);
        let p = Particle { x: 99.95, y: 0.05, vx: 0.1, vy: -0.1, size: 1.0, pulse: 0.0 };
        let mut field = ParticleField::with_particles(cfg(), vp, vec![p]);
        field.step(None, vp);
        let p = field.particles()[0];
        assert!(p.vx < 0.0 && p.vy > 0.0);
        field.step(None, vp);
        let p = field.particles()[0];
        assert!(vp.contains(p.position()), "{:?}", p);
    }

    #[test]
    fn particles_never_escape_past_one_step() {
        let vp = Viewport::new(200.0, 120.0);
        let mut field = ParticleField::new(
            ParticleFieldConfig { node_count: 60, max_speed: 3.0, ..cfg() },
            vp,
        );
        for _ in 0..5_000 {
            field.step(None, vp);
            for p in field.particles() {
                let ex = p.vx.abs() + 1e-9;
                let ey = p.vy.abs() + 1e-9;
                assert!(p.x >= -ex && p.x <= vp.width + ex, "{:?}", p);
                assert!(p.y >= -ey && p.y <= vp.height + ey, "{:?}", p);
            }
        }
    }

    #[test]
    fn pair_lines_drawn_iff_within_connection_distance() {
        let vp = Viewport::new(1000.0, 1000.0);
        let particles = vec![still(0.0, 0.0), still(100.0, 0.0), still(0.0, 149.0), still(400.0, 400.0)];
        let field = ParticleField::with_particles(cfg(), vp, particles);
        let links = field.connections();
        let pairs: Vec<(usize, usize)> = links.iter().map(|(i, j, _)| (*i, *j)).collect();
        // 0-1 at 100, 0-2 at 149, 1-2 at ~180 (out), 3 isolated.
        assert_eq!(pairs, vec![(0, 1), (0, 2)]);
        assert!(links[0].2 > links[1].2);

        let mut s = RecordingSurface::new();
        field.render(&mut s);
        assert_eq!(s.segments().len(), 2);
    }

    #[test]
    fn pair_opacity_falls_to_zero_at_threshold() {
        let vp = Viewport::new(1000.0, 1000.0);
        let mut last = f64::INFINITY;
        for d in [0.0, 30.0, 60.0, 90.0, 120.0, 149.0] {
            let field = ParticleField::with_particles(cfg(), vp, vec![still(0.0, 0.0), still(d, 0.0)]);
            let o = field.connections()[0].2;
            assert!(o < last);
            last = o;
        }
        let field = ParticleField::with_particles(cfg(), vp, vec![still(0.0, 0.0), still(150.0, 0.0)]);
        assert!(field.connections().is_empty());
    }

    #[test]
    fn pointer_draws_lines_but_applies_no_force() {
        let vp = Viewport::new(1000.0, 1000.0);
        let p = Particle { x: 500.0, y: 500.0, vx: 0.1, vy: 0.0, size: 1.0, pulse: 0.0 };
        let far = still(900.0, 900.0);
        let mut field = ParticleField::with_particles(cfg(), vp, vec![p, far]);
        field.step(Some(Point2::new(520.0, 500.0)), vp);
        assert_eq!(field.particles()[0].vx, 0.1);
        assert_eq!(field.particles()[0].vy, 0.0);
        let links = field.pointer_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, 0);
    }

    #[test]
    fn detect_zone_is_wider_than_draw_zone() {
        let vp = Viewport::new(1000.0, 1000.0);
        // 225 away: highlighted (detect 250) but no line (draw 200).
        let mut field = ParticleField::with_particles(cfg(), vp, vec![still(225.0, 0.0)]);
        field.step(Some(Point2::new(0.0, 0.0)), vp);
        assert!(field.pointer_links().is_empty());
        let mut s = RecordingSurface::new();
        field.render(&mut s);
        assert!(s.segments().is_empty());
        let highlighted = s.commands().iter().any(|c| match c {
            crate::surface::DrawCommand::Fill { style, .. } => style.shadow_blur > 0.0,
            _ => false,
        });
        assert!(highlighted);
    }

    #[test]
    fn pulse_halo_adds_extra_fill() {
        let vp = Viewport::new(100.0, 100.0);
        let mut p = still(50.0, 50.0);
        p.pulse = std::f64::consts::FRAC_PI_2;
        let field = ParticleField::with_particles(cfg(), vp, vec![p]);
        let mut s = RecordingSurface::new();
        field.render(&mut s);
        assert_eq!(s.fill_count(), 2);
    }

    #[test]
    fn empty_field_draws_nothing() {
        let field = ParticleField::new(
            ParticleFieldConfig { node_count: 0, ..cfg() },
            Viewport::new(100.0, 100.0),
        );
        let mut s = RecordingSurface::new();
        field.render(&mut s);
        assert!(s.segments().is_empty());
        assert_eq!(s.fill_count(), 0);
    }

    #[test]
    fn resize_pulls_particles_inside() {
        let field_vp = Viewport::new(500.0, 500.0);
        let mut field = ParticleField::with_particles(cfg(), field_vp, vec![still(450.0, 480.0)]);
        field.resize(Viewport::new(200.0, 100.0));
        let p = field.particles()[0];
        assert_eq!((p.x, p.y), (200.0, 100.0));
    }
}
