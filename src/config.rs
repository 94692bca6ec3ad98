// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Mount Configuration

use serde::{Deserialize, Serialize};

use crate::preferences::Palette;

/// Replace a non-finite or negative value with `fallback`.
fn non_negative(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 { value } else { fallback }
}

fn probability(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { fallback }
}

// ─── AnimationConfig ─────────────────────────────────────────────────────────

/// Which simulator to mount, with its parameters.
///
/// Deserialises from `{"kind": "particle_field", ...}`; every other field is
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationConfig {
    ParticleField(ParticleFieldConfig),
    PacketFlow(PacketFlowConfig),
    Wireframe(WireframeConfig),
}

impl AnimationConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParticleField(_) => "particle_field",
            Self::PacketFlow(_) => "packet_flow",
            Self::Wireframe(_) => "wireframe",
        }
    }

    pub fn wants_pointer(&self) -> bool {
        matches!(self, Self::ParticleField(_))
    }
}

// ─── Particle field ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleFieldConfig {
    pub node_count: usize,
    /// Pairs closer than this are joined by a line.
    pub connection_distance: f64,
    /// Particles closer than this to the pointer get a pointer line.
    pub pointer_draw_radius: f64,
    /// Particles closer than this to the pointer are drawn highlighted.
    /// Kept distinct from `pointer_draw_radius`.
    pub pointer_detect_radius: f64,
    /// Per-axis velocity bound at initialisation.
    pub max_speed: f64,
    /// Radians added to each particle's pulse phase per step.
    pub pulse_speed: f64,
    pub node_color: String,
    pub line_color: String,
    pub pointer_color: String,
    pub seed: Option<u64>,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            node_count: 80,
            connection_distance: 150.0,
            pointer_draw_radius: 200.0,
            pointer_detect_radius: 250.0,
            max_speed: 0.15,
            pulse_speed: 0.02,
            node_color: "#00d4ff".to_string(),
            line_color: "#00d4ff".to_string(),
            pointer_color: "#00ff88".to_string(),
            seed: None,
        }
    }
}

impl ParticleFieldConfig {
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.connection_distance = non_negative(self.connection_distance, d.connection_distance);
        self.pointer_draw_radius = non_negative(self.pointer_draw_radius, d.pointer_draw_radius);
        self.pointer_detect_radius =
            non_negative(self.pointer_detect_radius, d.pointer_detect_radius);
        self.max_speed = non_negative(self.max_speed, d.max_speed);
        self.pulse_speed = non_negative(self.pulse_speed, d.pulse_speed);
        self
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.node_color = palette.primary.clone();
        self.line_color = palette.primary.clone();
        self.pointer_color = palette.accent.clone();
    }
}

// ─── Packet flow ─────────────────────────────────────────────────────────────

/// How per-frame progress along an edge is derived from the packet speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopTiming {
    /// `progress += speed * reference_distance / edge_length`: every packet
    /// covers the same screen distance per frame.
    #[default]
    ScreenSpeed,
    /// `progress += speed`: every hop takes the same number of frames.
    FixedDuration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketFlowConfig {
    pub packet_speed: f64,
    pub reference_distance: f64,
    pub hop_timing: HopTiming,
    /// Seconds between spawns, one entry per source node. Missing entries
    /// (or an empty list) leave that source idle.
    pub spawn_intervals: Vec<f64>,
    /// Per-packet speed is `packet_speed * (1 + speed_jitter * u)`, `u` in [0, 1).
    pub speed_jitter: f64,
    pub trail_length: f64,
    pub raw_color: String,
    pub analyzed_color: String,
    pub stored_color: String,
    pub node_color: String,
    pub link_color: String,
    pub label_color: String,
    pub seed: Option<u64>,
}

impl Default for PacketFlowConfig {
    fn default() -> Self {
        Self {
            packet_speed: 0.02,
            reference_distance: 100.0,
            hop_timing: HopTiming::ScreenSpeed,
            spawn_intervals: vec![2.0, 2.5, 3.0],
            speed_jitter: 0.5,
            trail_length: 12.0,
            raw_color: "#ff6b6b".to_string(),
            analyzed_color: "#ffd93d".to_string(),
            stored_color: "#6bcb77".to_string(),
            node_color: "#00d4ff".to_string(),
            link_color: "#1e3a5f".to_string(),
            label_color: "#8899aa".to_string(),
            seed: None,
        }
    }
}

impl PacketFlowConfig {
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.packet_speed = non_negative(self.packet_speed, d.packet_speed);
        self.reference_distance = non_negative(self.reference_distance, d.reference_distance);
        self.speed_jitter = non_negative(self.speed_jitter, d.speed_jitter);
        self.trail_length = non_negative(self.trail_length, d.trail_length);
        // A zero or negative interval would spawn every frame; treat it as idle.
        self.spawn_intervals = self
            .spawn_intervals
            .into_iter()
            .map(|s| if s.is_finite() && s > 0.0 { s } else { f64::INFINITY })
            .collect();
        self
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.node_color = palette.primary.clone();
        self.link_color = palette.muted.clone();
        self.label_color = palette.text.clone();
        self.raw_color = palette.raw.clone();
        self.analyzed_color = palette.analyzed.clone();
        self.stored_color = palette.stored.clone();
    }
}

// ─── Wireframe ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireframeConfig {
    pub cube_count: usize,
    pub cube_size: f64,
    /// Vertical distance between consecutive cube centres.
    pub cube_spacing: f64,
    pub angle_increment: f64,
    /// Fixed tilt about the X axis, radians.
    pub tilt: f64,
    pub focal_length: f64,
    pub halo_count: usize,
    pub halo_radius: f64,
    pub halo_jitter: f64,
    pub beam_probability: f64,
    pub solid_color: String,
    pub halo_color: String,
    pub beam_color: String,
    pub seed: Option<u64>,
}

impl Default for WireframeConfig {
    fn default() -> Self {
        Self {
            cube_count: 3,
            cube_size: 60.0,
            cube_spacing: 70.0,
            angle_increment: 0.01,
            tilt: 0.35,
            focal_length: 400.0,
            halo_count: 40,
            halo_radius: 120.0,
            halo_jitter: 20.0,
            beam_probability: 0.02,
            solid_color: "#00d4ff".to_string(),
            halo_color: "#00ff88".to_string(),
            beam_color: "#00d4ff".to_string(),
            seed: None,
        }
    }
}

impl WireframeConfig {
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.cube_size = non_negative(self.cube_size, d.cube_size);
        self.cube_spacing = non_negative(self.cube_spacing, d.cube_spacing);
        if !self.angle_increment.is_finite() {
            self.angle_increment = d.angle_increment;
        }
        if !self.tilt.is_finite() {
            self.tilt = d.tilt;
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            self.focal_length = d.focal_length;
        }
        self.halo_radius = non_negative(self.halo_radius, d.halo_radius);
        self.halo_jitter = non_negative(self.halo_jitter, d.halo_jitter);
        self.beam_probability = probability(self.beam_probability, d.beam_probability);
        self
    }

    pub fn apply_palette(&mut self, palette: &Palette) {
        self.solid_color = palette.primary.clone();
        self.halo_color = palette.accent.clone();
        self.beam_color = palette.primary.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_only_json_uses_defaults() {
        let cfg: AnimationConfig = serde_json::from_str(r#"{"kind":"particle_field"}"#).unwrap();
        assert_eq!(cfg, AnimationConfig::ParticleField(ParticleFieldConfig::default()));
        assert!(cfg.wants_pointer());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg: AnimationConfig = serde_json::from_str(
            r#"{"kind":"packet_flow","spawn_intervals":[],"hop_timing":"fixed_duration"}"#,
        )
        .unwrap();
        match cfg {
            AnimationConfig::PacketFlow(c) => {
                assert!(c.spawn_intervals.is_empty());
                assert_eq!(c.hop_timing, HopTiming::FixedDuration);
                assert_eq!(c.reference_distance, 100.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let res: Result<AnimationConfig, _> = serde_json::from_str(r#"{"kind":"fireworks"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn sanitize_replaces_bad_numbers() {
        let cfg = ParticleFieldConfig {
            connection_distance: f64::NAN,
            max_speed: -1.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(cfg.connection_distance, 150.0);
        assert_eq!(cfg.max_speed, 0.15);

        let flow = PacketFlowConfig { spawn_intervals: vec![0.0, 2.0], ..Default::default() }
            .sanitized();
        assert!(flow.spawn_intervals[0].is_infinite());
        assert_eq!(flow.spawn_intervals[1], 2.0);

        let wire = WireframeConfig { beam_probability: 3.0, focal_length: 0.0, ..Default::default() }
            .sanitized();
        assert_eq!(wire.beam_probability, 1.0);
        assert_eq!(wire.focal_length, 400.0);
    }

    #[test]
    fn detect_and_draw_radii_stay_distinct() {
        let cfg = ParticleFieldConfig::default();
        assert!(cfg.pointer_detect_radius > cfg.pointer_draw_radius);
    }
}
