// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Bench Scenarios

use canvas_engine::{
    AnimationConfig, HopTiming, PacketFlowConfig, ParticleFieldConfig, Viewport, WireframeConfig,
};

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub viewport: Viewport,
    pub pointer: bool,
    pub config: AnimationConfig,
}

impl Scenario {
    /// Same scenario with every simulator RNG pinned to `seed`.
    pub fn seeded(&self, seed: u64) -> AnimationConfig {
        match self.config.clone() {
            AnimationConfig::ParticleField(c) => {
                AnimationConfig::ParticleField(ParticleFieldConfig { seed: Some(seed), ..c })
            }
            AnimationConfig::PacketFlow(c) => {
                AnimationConfig::PacketFlow(PacketFlowConfig { seed: Some(seed), ..c })
            }
            AnimationConfig::Wireframe(c) => {
                AnimationConfig::Wireframe(WireframeConfig { seed: Some(seed), ..c })
            }
        }
    }
}

const DESKTOP: Viewport = Viewport::new(1920.0, 1080.0);
const LAPTOP: Viewport = Viewport::new(1280.0, 720.0);

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "FIELD_DEFAULT",
            label: "Particle field, 80 nodes",
            viewport: LAPTOP,
            pointer: false,
            config: AnimationConfig::ParticleField(ParticleFieldConfig::default()),
        },
        Scenario {
            name: "FIELD_POINTER",
            label: "Particle field, pointer sweep",
            viewport: LAPTOP,
            pointer: true,
            config: AnimationConfig::ParticleField(ParticleFieldConfig::default()),
        },
        Scenario {
            name: "FIELD_DENSE",
            label: "Particle field, 300 nodes",
            viewport: DESKTOP,
            pointer: true,
            config: AnimationConfig::ParticleField(ParticleFieldConfig {
                node_count: 300,
                ..Default::default()
            }),
        },
        Scenario {
            name: "FLOW_SCREEN_SPEED",
            label: "Packet flow, screen speed",
            viewport: DESKTOP,
            pointer: false,
            config: AnimationConfig::PacketFlow(PacketFlowConfig::default()),
        },
        Scenario {
            name: "FLOW_FIXED_DURATION",
            label: "Packet flow, fixed hop time",
            viewport: DESKTOP,
            pointer: false,
            config: AnimationConfig::PacketFlow(PacketFlowConfig {
                hop_timing: HopTiming::FixedDuration,
                ..Default::default()
            }),
        },
        Scenario {
            name: "FLOW_BURST",
            label: "Packet flow, 12 Hz spawns",
            viewport: DESKTOP,
            pointer: false,
            config: AnimationConfig::PacketFlow(PacketFlowConfig {
                spawn_intervals: vec![0.25, 0.25, 0.25],
                ..Default::default()
            }),
        },
        Scenario {
            name: "WIRE_DEFAULT",
            label: "Wireframe, 3 cubes",
            viewport: LAPTOP,
            pointer: false,
            config: AnimationConfig::Wireframe(WireframeConfig::default()),
        },
        Scenario {
            name: "WIRE_TOWER",
            label: "Wireframe, 8 cubes, dense halo",
            viewport: DESKTOP,
            pointer: false,
            config: AnimationConfig::Wireframe(WireframeConfig {
                cube_count: 8,
                halo_count: 400,
                ..Default::default()
            }),
        },
    ]
}
