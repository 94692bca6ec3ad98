// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Rotating Wireframe Tower

use std::f64::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::WireframeConfig;
use crate::geometry::{project, rotate_x, rotate_y, Point2, Vec3, Viewport};
use crate::simulator::seeded_rng;
use crate::surface::DrawSurface;

/// Front face, back face, then the four connectors.
pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

const EDGE_WIDTH: f64 = 1.5;
const EDGE_GLOW: f64 = 12.0;
const VERTEX_RADIUS: f64 = 2.0;
const BACK_HALO_ALPHA: f64 = 0.35;
const FRONT_HALO_ALPHA: f64 = 0.9;
const BEAM_ALPHA: f64 = 0.3;

// ─── Solid ───────────────────────────────────────────────────────────────────

/// A vertical stack of cubes. Base geometry never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    vertices: Vec<Vec3>,
}

impl Solid {
    /// `count` cubes of side `size`, centres `spacing` apart, the stack
    /// centred on the origin.
    pub fn stacked(count: usize, size: f64, spacing: f64) -> Self {
        let h = size / 2.0;
        let span = count.saturating_sub(1) as f64 * spacing;
        let mut vertices = Vec::with_capacity(count * 8);
        for i in 0..count {
            let cy = i as f64 * spacing - span / 2.0;
            for z in [-h, h] {
                vertices.push(Vec3::new(-h, cy - h, z));
                vertices.push(Vec3::new(h, cy - h, z));
                vertices.push(Vec3::new(h, cy + h, z));
                vertices.push(Vec3::new(-h, cy + h, z));
            }
        }
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn cube_count(&self) -> usize {
        self.vertices.len() / 8
    }

    /// Every edge of every cube as vertex index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.cube_count())
            .flat_map(|c| CUBE_EDGES.iter().map(move |&(a, b)| (c * 8 + a, c * 8 + b)))
    }
}

// ─── Halo ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaloParticle {
    /// Angular offset around the Y axis, radians.
    pub offset: f64,
    pub radius: f64,
    pub height: f64,
    pub size: f64,
}

impl HaloParticle {
    /// Behind the solid when the orbit angle faces away from the viewer.
    pub fn is_behind(&self, angle: f64) -> bool {
        (self.offset + angle).cos() < 0.0
    }

    fn world(&self, angle: f64) -> Vec3 {
        rotate_y(Vec3::new(0.0, self.height, -self.radius), self.offset + angle)
    }
}

fn build_halo(config: &WireframeConfig, half_height: f64, rng: &mut ChaCha8Rng) -> Vec<HaloParticle> {
    let n = config.halo_count;
    (0..n)
        .map(|i| HaloParticle {
            offset: i as f64 / n as f64 * TAU,
            radius: config.halo_radius + rng.gen::<f64>() * config.halo_jitter,
            height: (rng.gen::<f64>() * 2.0 - 1.0) * half_height,
            size: rng.gen::<f64>() * 1.5 + 0.5,
        })
        .collect()
}

// ─── Projected frame ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaloDot {
    pub position: Point2,
    pub size: f64,
}

/// Screen-space scene for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedFrame {
    pub vertices: Vec<Point2>,
    pub center: Point2,
    pub back: Vec<HaloDot>,
    pub front: Vec<HaloDot>,
    /// Indices into `front` that fire a beam this frame.
    pub beams: Vec<usize>,
}

// ─── Wireframe ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Wireframe {
    config: WireframeConfig,
    solid: Solid,
    halo: Vec<HaloParticle>,
    angle: f64,
    viewport: Viewport,
    frame: ProjectedFrame,
    rng: ChaCha8Rng,
}

impl Wireframe {
    pub fn new(config: WireframeConfig, viewport: Viewport) -> Self {
        let config = config.sanitized();
        let mut rng = seeded_rng(config.seed);
        let solid = Solid::stacked(config.cube_count, config.cube_size, config.cube_spacing);
        let half_height =
            (config.cube_count.saturating_sub(1) as f64 * config.cube_spacing + config.cube_size) / 2.0;
        let halo = build_halo(&config, half_height, &mut rng);
        let mut wireframe = Self {
            config,
            solid,
            halo,
            angle: 0.0,
            viewport: viewport.sanitized(),
            frame: ProjectedFrame::default(),
            rng,
        };
        wireframe.frame = wireframe.project_at(0.0);
        wireframe
    }

    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn halo(&self) -> &[HaloParticle] {
        &self.halo
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn frame(&self) -> &ProjectedFrame {
        &self.frame
    }

    pub fn config(&self) -> &WireframeConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WireframeConfig {
        &mut self.config
    }

    /// Rotate by `angle` about Y, tilt about X, project. No beams.
    pub fn project_at(&self, angle: f64) -> ProjectedFrame {
        let center = self.viewport.center();
        let f = self.config.focal_length;
        let tilt = self.config.tilt;
        let to_screen = |p: Vec3| project(rotate_x(p, tilt), f, center);

        let vertices = self
            .solid
            .vertices()
            .iter()
            .map(|&v| to_screen(rotate_y(v, angle)))
            .collect();

        let mut back = Vec::new();
        let mut front = Vec::new();
        for particle in &self.halo {
            let dot = HaloDot { position: to_screen(particle.world(angle)), size: particle.size };
            if particle.is_behind(angle) {
                back.push(dot);
            } else {
                front.push(dot);
            }
        }

        ProjectedFrame {
            vertices,
            center: to_screen(Vec3::default()),
            back,
            front,
            beams: Vec::new(),
        }
    }

    /// Advance the global angle and rebuild the projected frame.
    pub fn step(&mut self) -> &ProjectedFrame {
        self.angle += self.config.angle_increment;
        let mut frame = self.project_at(self.angle);
        let p = self.config.beam_probability;
        frame.beams = (0..frame.front.len()).filter(|_| self.rng.gen_bool(p)).collect();
        self.frame = frame;
        &self.frame
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        let beams = std::mem::take(&mut self.frame.beams);
        self.frame = self.project_at(self.angle);
        self.frame.beams = beams.into_iter().filter(|&i| i < self.frame.front.len()).collect();
    }

    fn draw_halo(surface: &mut dyn DrawSurface, dots: &[HaloDot], alpha: f64) {
        surface.set_global_alpha(alpha);
        for dot in dots {
            surface.circle(dot.position.x, dot.position.y, dot.size);
        }
    }

    /// Back half of the halo, then the solid, then the front half and beams.
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        let frame = &self.frame;

        surface.set_fill_color(&self.config.halo_color);
        Self::draw_halo(surface, &frame.back, BACK_HALO_ALPHA);

        surface.set_global_alpha(0.9);
        surface.set_line_width(EDGE_WIDTH);
        surface.set_stroke_color(&self.config.solid_color);
        surface.set_shadow(EDGE_GLOW, &self.config.solid_color);
        for (a, b) in self.solid.edges() {
            let (pa, pb) = (frame.vertices[a], frame.vertices[b]);
            surface.line(pa.x, pa.y, pb.x, pb.y);
        }
        surface.set_fill_color(&self.config.solid_color);
        for v in &frame.vertices {
            surface.circle(v.x, v.y, VERTEX_RADIUS);
        }
        surface.set_shadow(0.0, "transparent");

        surface.set_fill_color(&self.config.halo_color);
        Self::draw_halo(surface, &frame.front, FRONT_HALO_ALPHA);

        if !frame.beams.is_empty() {
            surface.set_line_width(1.0);
            surface.set_stroke_color(&self.config.beam_color);
            surface.set_global_alpha(BEAM_ALPHA);
            for &i in &frame.beams {
                let from = frame.front[i].position;
                surface.line(from.x, from.y, frame.center.x, frame.center.y);
            }
        }
        surface.set_global_alpha(1.0);
    }
}
