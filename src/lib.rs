// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop")

pub mod geometry;
pub mod surface;
pub mod config;
pub mod preferences;
pub mod disposer;
pub mod error;

pub mod particle_field;
pub mod packet_flow;
pub mod wireframe;
pub mod simulator;
pub mod driver;

// Browser host: canvas surface, rAF loop and the JS exports.
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{AnimationConfig, HopTiming, PacketFlowConfig, ParticleFieldConfig, WireframeConfig};
pub use disposer::Disposer;
pub use driver::{FrameDriver, FrameHost, HeadlessHost};
pub use error::MountError;
pub use geometry::{Point2, Vec3, Viewport};
pub use packet_flow::{FlowEvent, FlowStats, Packet, PacketFlow, PacketKind};
pub use particle_field::{Particle, ParticleField};
pub use preferences::{Palette, PreferenceStore, Preferences, Theme};
pub use simulator::{AnySimulator, FrameInput, Simulator};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
pub use wireframe::{ProjectedFrame, Solid, Wireframe};
