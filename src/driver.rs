// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Frame Driver

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::config::AnimationConfig;
use crate::disposer::Disposer;
use crate::error::MountError;
use crate::geometry::{Point2, Viewport};
use crate::packet_flow::FlowStats;
use crate::preferences::{PreferenceStore, Preferences, Theme};
use crate::simulator::{AnySimulator, FrameInput, Simulator};
use crate::surface::{DrawSurface, RecordingSurface};

/// Longest frame gap fed to a simulator, in seconds. A background tab can
/// stall the display loop for minutes; spawn timers must not burst after it.
pub const MAX_FRAME_DT: f64 = 0.25;

// ─── FrameHost ───────────────────────────────────────────────────────────────

/// What a page (or a headless harness) provides to run an animation.
///
/// Every registration returns a [`Disposer`] that undoes it.
pub trait FrameHost {
    type Surface: DrawSurface + 'static;

    fn acquire_surface(&mut self) -> Result<Self::Surface, MountError>;

    /// Current size of the drawing area, resizing the surface to fit.
    fn viewport(&mut self) -> Viewport;

    fn on_resize(&mut self, callback: Box<dyn FnMut(Viewport)>) -> Result<Disposer, MountError>;

    /// Pointer position in surface-local coordinates.
    fn on_pointer_move(&mut self, callback: Box<dyn FnMut(Point2)>) -> Result<Disposer, MountError>;

    /// Call `callback` with the frame timestamp (ms) on every display frame
    /// until the disposer runs.
    fn start_frames(&mut self, callback: Box<dyn FnMut(f64)>) -> Result<Disposer, MountError>;
}

// ─── Driver state ────────────────────────────────────────────────────────────

struct DriverState {
    surface: Box<dyn DrawSurface>,
    simulator: AnySimulator,
    viewport: Viewport,
    pointer: Option<Point2>,
    last_timestamp: Option<f64>,
    reduced_motion: bool,
    /// Theme last seen from the bound store; the palette is only applied
    /// when it changes, so mount-time colours survive binding.
    theme: Option<Theme>,
    frames: u64,
}

impl DriverState {
    fn frame(&mut self, timestamp: f64) {
        let dt = match self.last_timestamp {
            Some(prev) => ((timestamp - prev) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp);

        self.surface.clear(self.viewport.width, self.viewport.height);
        if !self.reduced_motion {
            self.simulator.step(&FrameInput { dt, viewport: self.viewport, pointer: self.pointer });
        }
        self.simulator.render(self.surface.as_mut());
        self.frames += 1;
    }

    fn resize(&mut self, viewport: Viewport) {
        let viewport = viewport.sanitized();
        if viewport == self.viewport {
            return;
        }
        trace!(width = viewport.width, height = viewport.height, "animation resized");
        self.viewport = viewport;
        self.simulator.resize(viewport);
    }

    fn adopt_preferences(&mut self, prefs: &Preferences) {
        self.reduced_motion = prefs.reduced_motion;
        self.theme = Some(prefs.theme);
    }

    fn apply_preferences(&mut self, prefs: &Preferences) {
        self.reduced_motion = prefs.reduced_motion;
        if self.theme != Some(prefs.theme) {
            self.theme = Some(prefs.theme);
            self.simulator.apply_palette(&prefs.theme.palette());
        }
    }
}

// ─── FrameDriver ─────────────────────────────────────────────────────────────

/// A mounted animation. Unmounting (explicitly or by drop) tears down every
/// registration exactly once.
pub struct FrameDriver {
    kind: &'static str,
    state: Rc<RefCell<DriverState>>,
    registrations: Vec<Disposer>,
}

impl FrameDriver {
    /// Mount `config` on `host`.
    ///
    /// On error nothing stays registered: registrations made before the
    /// failure are disposed as the partial list drops.
    pub fn mount<H: FrameHost>(host: &mut H, config: AnimationConfig) -> Result<Self, MountError> {
        let surface = host.acquire_surface()?;
        let viewport = host.viewport().sanitized();
        let kind = config.kind();
        let wants_pointer = config.wants_pointer();

        let state = Rc::new(RefCell::new(DriverState {
            surface: Box::new(surface),
            simulator: AnySimulator::from_config(config, viewport),
            viewport,
            pointer: None,
            last_timestamp: None,
            reduced_motion: false,
            theme: None,
            frames: 0,
        }));

        let mut registrations = Vec::with_capacity(3);

        let s = Rc::downgrade(&state);
        registrations.push(host.on_resize(Box::new(move |vp| {
            if let Some(state) = s.upgrade() {
                state.borrow_mut().resize(vp);
            }
        }))?);

        if wants_pointer {
            let s = Rc::downgrade(&state);
            registrations.push(host.on_pointer_move(Box::new(move |p| {
                if let Some(state) = s.upgrade() {
                    state.borrow_mut().pointer = Some(p);
                }
            }))?);
        }

        let s = Rc::downgrade(&state);
        registrations.push(host.start_frames(Box::new(move |ts| {
            if let Some(state) = s.upgrade() {
                state.borrow_mut().frame(ts);
            }
        }))?);

        debug!(kind, width = viewport.width, height = viewport.height, "animation mounted");
        Ok(Self { kind, state, registrations })
    }

    /// Follow `store` until unmount. Reduced motion takes effect at once;
    /// the palette replaces the configured colours only once the theme
    /// changes.
    pub fn bind_preferences(&mut self, store: &PreferenceStore) {
        self.state.borrow_mut().adopt_preferences(&store.get());
        let weak: Weak<RefCell<DriverState>> = Rc::downgrade(&self.state);
        self.registrations.push(store.subscribe(move |prefs| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().apply_preferences(prefs);
            }
        }));
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_mounted(&self) -> bool {
        !self.registrations.is_empty()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.state.borrow().frames
    }

    pub fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    pub fn pointer(&self) -> Option<Point2> {
        self.state.borrow().pointer
    }

    /// Packet counters, for the packet-flow variant only.
    pub fn flow_stats(&self) -> Option<FlowStats> {
        match &self.state.borrow().simulator {
            AnySimulator::PacketFlow(flow) => Some(flow.stats()),
            _ => None,
        }
    }

    /// Drop every registration. Safe to call more than once.
    pub fn unmount(&mut self) {
        if self.registrations.is_empty() {
            return;
        }
        for registration in &mut self.registrations {
            registration.dispose();
        }
        self.registrations.clear();
        debug!(kind = self.kind, frames = self.frames_rendered(), "animation unmounted");
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.unmount();
    }
}

// ─── HeadlessHost ────────────────────────────────────────────────────────────

type Shared<T> = Rc<RefCell<T>>;

#[derive(Default)]
struct HeadlessInner {
    viewport: Viewport,
    surface_available: bool,
    reject_pointer: bool,
    next_id: u64,
    resize: Vec<(u64, Shared<dyn FnMut(Viewport)>)>,
    pointer: Vec<(u64, Shared<dyn FnMut(Point2)>)>,
    frames: Vec<(u64, Shared<dyn FnMut(f64)>)>,
    disposals: HashMap<u64, u32>,
}

impl HeadlessInner {
    fn register(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.disposals.insert(id, 0);
        id
    }

    fn release(&mut self, id: u64) {
        self.resize.retain(|(i, _)| *i != id);
        self.pointer.retain(|(i, _)| *i != id);
        self.frames.retain(|(i, _)| *i != id);
        *self.disposals.entry(id).or_insert(0) += 1;
    }
}

/// In-process host that records to a [`RecordingSurface`] and fires
/// resize, pointer and frame callbacks on demand.
#[derive(Clone)]
pub struct HeadlessHost {
    inner: Shared<HeadlessInner>,
    surface: Shared<RecordingSurface>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HeadlessInner {
                viewport,
                surface_available: true,
                ..Default::default()
            })),
            surface: Rc::new(RefCell::new(RecordingSurface::new())),
        }
    }

    /// A host whose drawing surface cannot be acquired.
    pub fn without_surface(viewport: Viewport) -> Self {
        let host = Self::new(viewport);
        host.inner.borrow_mut().surface_available = false;
        host
    }

    /// A host that refuses pointer listeners.
    pub fn rejecting_pointer(viewport: Viewport) -> Self {
        let host = Self::new(viewport);
        host.inner.borrow_mut().reject_pointer = true;
        host
    }

    pub fn surface(&self) -> Shared<RecordingSurface> {
        Rc::clone(&self.surface)
    }

    /// Fire every frame callback with `timestamp` (ms).
    pub fn advance(&self, timestamp: f64) {
        let callbacks: Vec<_> = self.inner.borrow().frames.iter().map(|(_, c)| c.clone()).collect();
        for callback in callbacks {
            (&mut *callback.borrow_mut())(timestamp);
        }
    }

    pub fn resize(&self, viewport: Viewport) {
        self.inner.borrow_mut().viewport = viewport;
        let callbacks: Vec<_> = self.inner.borrow().resize.iter().map(|(_, c)| c.clone()).collect();
        for callback in callbacks {
            (&mut *callback.borrow_mut())(viewport);
        }
    }

    pub fn move_pointer(&self, position: Point2) {
        let callbacks: Vec<_> = self.inner.borrow().pointer.iter().map(|(_, c)| c.clone()).collect();
        for callback in callbacks {
            (&mut *callback.borrow_mut())(position);
        }
    }

    /// Registrations not yet disposed.
    pub fn live_registrations(&self) -> usize {
        let inner = self.inner.borrow();
        inner.resize.len() + inner.pointer.len() + inner.frames.len()
    }

    pub fn total_registrations(&self) -> usize {
        self.inner.borrow().disposals.len()
    }

    /// How many times each registration's disposer ran, by registration order.
    pub fn disposal_counts(&self) -> Vec<u32> {
        let inner = self.inner.borrow();
        let mut counts: Vec<(u64, u32)> = inner.disposals.iter().map(|(k, v)| (*k, *v)).collect();
        counts.sort_unstable();
        counts.into_iter().map(|(_, v)| v).collect()
    }

    fn disposer(&self, id: u64) -> Disposer {
        let inner = Rc::downgrade(&self.inner);
        Disposer::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().release(id);
            }
        })
    }
}

impl FrameHost for HeadlessHost {
    type Surface = Shared<RecordingSurface>;

    fn acquire_surface(&mut self) -> Result<Self::Surface, MountError> {
        if self.inner.borrow().surface_available {
            Ok(self.surface())
        } else {
            Err(MountError::SurfaceUnavailable)
        }
    }

    fn viewport(&mut self) -> Viewport {
        self.inner.borrow().viewport
    }

    fn on_resize(&mut self, callback: Box<dyn FnMut(Viewport)>) -> Result<Disposer, MountError> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.register();
            let callback: Shared<dyn FnMut(Viewport)> = Rc::new(RefCell::new(callback));
            inner.resize.push((id, callback));
            id
        };
        Ok(self.disposer(id))
    }

    fn on_pointer_move(&mut self, callback: Box<dyn FnMut(Point2)>) -> Result<Disposer, MountError> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.reject_pointer {
                return Err(MountError::Host("pointer listeners unavailable".to_string()));
            }
            let id = inner.register();
            let callback: Shared<dyn FnMut(Point2)> = Rc::new(RefCell::new(callback));
            inner.pointer.push((id, callback));
            id
        };
        Ok(self.disposer(id))
    }

    fn start_frames(&mut self, callback: Box<dyn FnMut(f64)>) -> Result<Disposer, MountError> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.register();
            let callback: Shared<dyn FnMut(f64)> = Rc::new(RefCell::new(callback));
            inner.frames.push((id, callback));
            id
        };
        Ok(self.disposer(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParticleFieldConfig, WireframeConfig};
    use crate::surface::DrawCommand;

    fn vp() -> Viewport {
        Viewport::new(400.0, 300.0)
    }

    #[test]
    fn frame_clears_then_draws() {
        let mut host = HeadlessHost::new(vp());
        let driver =
            FrameDriver::mount(&mut host, AnimationConfig::Wireframe(WireframeConfig::default())).unwrap();
        host.advance(0.0);
        let surface = host.surface();
        let cmds = surface.borrow();
        assert_eq!(cmds.commands()[0], DrawCommand::Clear { width: 400.0, height: 300.0 });
        assert!(cmds.commands().len() > 1);
        assert_eq!(driver.frames_rendered(), 1);
    }

    #[test]
    fn pointer_listener_only_for_particle_field() {
        let mut host = HeadlessHost::new(vp());
        let _wire =
            FrameDriver::mount(&mut host, AnimationConfig::Wireframe(WireframeConfig::default())).unwrap();
        assert_eq!(host.live_registrations(), 2);

        let mut host = HeadlessHost::new(vp());
        let field = FrameDriver::mount(
            &mut host,
            AnimationConfig::ParticleField(ParticleFieldConfig::default()),
        )
        .unwrap();
        assert_eq!(host.live_registrations(), 3);
        host.move_pointer(Point2::new(10.0, 20.0));
        assert_eq!(field.pointer(), Some(Point2::new(10.0, 20.0)));
    }

    #[test]
    fn large_frame_gaps_are_clamped() {
        let mut state_host = HeadlessHost::new(vp());
        let driver = FrameDriver::mount(
            &mut state_host,
            AnimationConfig::PacketFlow(Default::default()),
        )
        .unwrap();
        state_host.advance(0.0);
        // A ten minute stall only moves the spawn timers by MAX_FRAME_DT.
        state_host.advance(600_000.0);
        let stats = driver.flow_stats().unwrap();
        assert_eq!(stats.spawned, 0);
    }

    #[test]
    fn drop_unmounts() {
        let mut host = HeadlessHost::new(vp());
        {
            let _driver =
                FrameDriver::mount(&mut host, AnimationConfig::Wireframe(WireframeConfig::default()))
                    .unwrap();
            assert_eq!(host.live_registrations(), 2);
        }
        assert_eq!(host.live_registrations(), 0);
        assert_eq!(host.disposal_counts(), vec![1, 1]);
    }
}
