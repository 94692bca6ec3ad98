// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Multi-Hop Packet Flow

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{HopTiming, PacketFlowConfig};
use crate::geometry::{Point2, Viewport};
use crate::preferences::Palette;
use crate::simulator::seeded_rng;
use crate::surface::DrawSurface;

/// Hard cap on live packets; spawns beyond it are dropped.
pub const MAX_ACTIVE_PACKETS: usize = 500;

/// Most spawns one source may catch up on in a single step.
pub const MAX_SPAWNS_PER_STEP: usize = 64;

pub const SOURCE_COUNT: usize = 3;
pub const GATEWAY: usize = 3;
pub const ANALYZER: usize = 4;
pub const CONSOLE: usize = 5;
pub const STORAGE: usize = 6;

const NODE_RADIUS: f64 = 18.0;
const NODE_GLOW: f64 = 15.0;
const PACKET_RADIUS: f64 = 4.0;
const PACKET_GLOW: f64 = 8.0;
const TRAIL_ALPHA: f64 = 0.4;
const LABEL_FONT: &str = "12px monospace";
const LABEL_OFFSET: f64 = NODE_RADIUS + 16.0;

// ─── Nodes ───────────────────────────────────────────────────────────────────

struct NodeSpec {
    id: &'static str,
    label: &'static str,
    fx: f64,
    fy: f64,
}

/// Node layout as viewport fractions, indexed by the constants above.
const NODE_SPECS: [NodeSpec; 7] = [
    NodeSpec { id: "endpoints", label: "Endpoints", fx: 0.10, fy: 0.20 },
    NodeSpec { id: "servers", label: "Servers", fx: 0.10, fy: 0.50 },
    NodeSpec { id: "cloud", label: "Cloud", fx: 0.10, fy: 0.80 },
    NodeSpec { id: "gateway", label: "Gateway", fx: 0.35, fy: 0.50 },
    NodeSpec { id: "analyzer", label: "Analyzer", fx: 0.60, fy: 0.50 },
    NodeSpec { id: "console", label: "Console", fx: 0.88, fy: 0.30 },
    NodeSpec { id: "storage", label: "Storage", fx: 0.88, fy: 0.75 },
];

/// Static links drawn under the packets.
const LINKS: [(usize, usize); 6] = [
    (0, GATEWAY),
    (1, GATEWAY),
    (2, GATEWAY),
    (GATEWAY, ANALYZER),
    (ANALYZER, CONSOLE),
    (ANALYZER, STORAGE),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub color: String,
    pub position: Point2,
}

fn layout_nodes(config: &PacketFlowConfig, viewport: Viewport) -> Vec<FlowNode> {
    NODE_SPECS
        .iter()
        .enumerate()
        .map(|(i, spec)| FlowNode {
            id: spec.id.to_string(),
            label: spec.label.to_string(),
            color: match i {
                ANALYZER => config.analyzed_color.clone(),
                STORAGE => config.stored_color.clone(),
                _ => config.node_color.clone(),
            },
            position: viewport.at_fraction(spec.fx, spec.fy),
        })
        .collect()
}

// ─── Packets ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Raw,
    Analyzed,
    Stored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    /// Directed edges as (from, to) node indices.
    pub path: Vec<(usize, usize)>,
    /// Index into `path` of the edge being travelled.
    pub leg: usize,
    /// Fraction of the current edge covered, in [0, 1).
    pub progress: f64,
    pub speed: f64,
    pub kind: PacketKind,
}

impl Packet {
    pub fn edge(&self) -> Option<(usize, usize)> {
        self.path.get(self.leg).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.leg >= self.path.len()
    }
}

/// Things that happened during a step, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    Spawned { packet: u64, source: usize },
    Arrived { packet: u64, node: usize },
    Forked { parent: u64, child: u64 },
    Removed { packet: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStats {
    pub spawned: u64,
    pub forked: u64,
    pub delivered: u64,
    pub stored: u64,
    pub dropped: u64,
    pub active: u32,
}

/// Progress added per frame on an edge of length `edge_length`.
pub fn progress_increment(timing: HopTiming, speed: f64, reference: f64, edge_length: f64) -> f64 {
    match timing {
        HopTiming::ScreenSpeed if edge_length <= f64::EPSILON => 1.0,
        HopTiming::ScreenSpeed => speed * reference / edge_length,
        HopTiming::FixedDuration => speed,
    }
}

// ─── PacketFlow ──────────────────────────────────────────────────────────────

/// Packets travelling source → gateway → analyzer → console, each forking a
/// stored copy toward storage when it reaches the analyzer.
#[derive(Debug)]
pub struct PacketFlow {
    config: PacketFlowConfig,
    viewport: Viewport,
    nodes: Vec<FlowNode>,
    packets: Vec<Packet>,
    spawn_timers: Vec<f64>,
    rng: ChaCha8Rng,
    next_id: u64,
    stats: FlowStats,
}

impl PacketFlow {
    pub fn new(config: PacketFlowConfig, viewport: Viewport) -> Self {
        let config = config.sanitized();
        let viewport = viewport.sanitized();
        let nodes = layout_nodes(&config, viewport);
        let rng = seeded_rng(config.seed);
        Self {
            spawn_timers: vec![0.0; SOURCE_COUNT],
            config,
            viewport,
            nodes,
            packets: Vec::new(),
            rng,
            next_id: 0,
            stats: FlowStats::default(),
        }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn config(&self) -> &PacketFlowConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PacketFlowConfig {
        &mut self.config
    }

    pub fn stats(&self) -> FlowStats {
        FlowStats { active: self.packets.len() as u32, ..self.stats }
    }

    /// Launch a raw packet from `source` along the fixed three-hop route.
    /// Returns `None` for an unknown source or when at capacity.
    pub fn spawn(&mut self, source: usize) -> Option<u64> {
        if source >= SOURCE_COUNT {
            return None;
        }
        let path = vec![(source, GATEWAY), (GATEWAY, ANALYZER), (ANALYZER, CONSOLE)];
        let speed = self.config.packet_speed * (1.0 + self.config.speed_jitter * self.rng.gen::<f64>());
        let id = self.launch(path, speed, PacketKind::Raw)?;
        trace!(packet = id, source, "packet spawned");
        Some(id)
    }

    fn launch(&mut self, path: Vec<(usize, usize)>, speed: f64, kind: PacketKind) -> Option<u64> {
        if self.packets.len() >= MAX_ACTIVE_PACKETS {
            self.stats.dropped += 1;
            return None;
        }
        let start = self.nodes[path[0].0].position;
        let id = self.next_id;
        self.next_id += 1;
        self.stats.spawned += 1;
        self.packets.push(Packet {
            id,
            x: start.x,
            y: start.y,
            path,
            leg: 0,
            progress: 0.0,
            speed,
            kind,
        });
        Some(id)
    }

    /// Advance spawn timers by `dt` seconds and every packet by one frame.
    ///
    /// Packet motion is per frame; `dt` only drives the spawn schedule.
    pub fn step(&mut self, dt: f64) -> Vec<FlowEvent> {
        let mut events = Vec::new();
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        for source in 0..SOURCE_COUNT {
            let Some(&interval) = self.config.spawn_intervals.get(source) else {
                continue;
            };
            self.spawn_timers[source] += dt;
            let mut due = 0;
            while self.spawn_timers[source] >= interval && due < MAX_SPAWNS_PER_STEP {
                self.spawn_timers[source] -= interval;
                due += 1;
                if let Some(packet) = self.spawn(source) {
                    events.push(FlowEvent::Spawned { packet, source });
                }
            }
            if due == MAX_SPAWNS_PER_STEP {
                // Backlog beyond the cap is forgotten, not deferred.
                self.spawn_timers[source] %= interval;
            }
        }

        let timing = self.config.hop_timing;
        let reference = self.config.reference_distance;
        let mut forks: Vec<(u64, f64)> = Vec::new();

        for packet in &mut self.packets {
            let Some((from, to)) = packet.edge() else {
                continue;
            };
            let a = self.nodes[from].position;
            let b = self.nodes[to].position;
            packet.progress += progress_increment(timing, packet.speed, reference, a.distance(b));

            if packet.progress < 1.0 {
                let p = a.lerp(b, packet.progress);
                packet.x = p.x;
                packet.y = p.y;
                continue;
            }

            packet.x = b.x;
            packet.y = b.y;
            packet.progress = 0.0;
            packet.leg += 1;
            events.push(FlowEvent::Arrived { packet: packet.id, node: to });

            match to {
                ANALYZER => {
                    packet.kind = PacketKind::Analyzed;
                    forks.push((packet.id, packet.speed));
                }
                CONSOLE if packet.is_finished() => self.stats.delivered += 1,
                STORAGE if packet.is_finished() => self.stats.stored += 1,
                _ => {}
            }
        }

        self.packets.retain(|p| {
            if p.is_finished() {
                trace!(packet = p.id, kind = ?p.kind, "packet removed");
                events.push(FlowEvent::Removed { packet: p.id });
                false
            } else {
                true
            }
        });

        // Children join after the sweep so they start moving next frame.
        for (parent, speed) in forks {
            if let Some(child) = self.launch(vec![(ANALYZER, STORAGE)], speed, PacketKind::Stored) {
                self.stats.forked += 1;
                debug!(parent, child, "packet forked toward storage");
                events.push(FlowEvent::Forked { parent, child });
            }
        }

        events
    }

    /// Re-layout nodes for a new viewport and re-place packets on their edges.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
        self.nodes = layout_nodes(&self.config, self.viewport);
        for packet in &mut self.packets {
            if let Some((from, to)) = packet.edge() {
                let p = self.nodes[from].position.lerp(self.nodes[to].position, packet.progress);
                packet.x = p.x;
                packet.y = p.y;
            }
        }
    }

    /// Recolor nodes and packets; node colors are baked in at layout.
    pub fn apply_palette(&mut self, palette: &Palette) {
        self.config.apply_palette(palette);
        self.nodes = layout_nodes(&self.config, self.viewport);
    }

    fn packet_color(&self, kind: PacketKind) -> &str {
        match kind {
            PacketKind::Raw => &self.config.raw_color,
            PacketKind::Analyzed => &self.config.analyzed_color,
            PacketKind::Stored => &self.config.stored_color,
        }
    }

    pub fn render(&self, surface: &mut dyn DrawSurface) {
        surface.set_global_alpha(1.0);
        surface.set_line_width(2.0);
        surface.set_stroke_color(&self.config.link_color);
        for (from, to) in LINKS {
            let (a, b) = (self.nodes[from].position, self.nodes[to].position);
            surface.line(a.x, a.y, b.x, b.y);
        }

        surface.set_font(LABEL_FONT);
        for node in &self.nodes {
            let p = node.position;
            surface.set_shadow(NODE_GLOW, &node.color);
            surface.set_fill_color(&node.color);
            surface.set_global_alpha(0.9);
            surface.circle(p.x, p.y, NODE_RADIUS);
            surface.set_shadow(0.0, "transparent");
            surface.set_global_alpha(1.0);
            surface.set_fill_color(&self.config.label_color);
            surface.fill_text(&node.label, p.x, p.y + LABEL_OFFSET);
        }

        for packet in &self.packets {
            let color = self.packet_color(packet.kind);
            if let Some((from, _)) = packet.edge() {
                let origin = self.nodes[from].position;
                let here = Point2::new(packet.x, packet.y);
                let travelled = origin.distance(here);
                if travelled > f64::EPSILON && self.config.trail_length > 0.0 {
                    let t = (self.config.trail_length / travelled).min(1.0);
                    let tail = here.lerp(origin, t);
                    surface.set_stroke_color(color);
                    surface.set_global_alpha(TRAIL_ALPHA);
                    surface.line(tail.x, tail.y, here.x, here.y);
                }
            }
            surface.set_global_alpha(1.0);
            surface.set_shadow(PACKET_GLOW, color);
            surface.set_fill_color(color);
            surface.circle(packet.x, packet.y, PACKET_RADIUS);
        }
        surface.set_shadow(0.0, "transparent");
    }
}
