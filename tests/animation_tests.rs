// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Integration Tests

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use canvas_engine::packet_flow::{ANALYZER, CONSOLE, GATEWAY, STORAGE};
    use canvas_engine::{
        AnimationConfig, FlowEvent, FrameDriver, HeadlessHost, HopTiming, MountError, PacketFlow,
        PacketFlowConfig, PacketKind, ParticleFieldConfig, PreferenceStore, Theme, Viewport,
        Wireframe, WireframeConfig,
    };
    use canvas_engine::surface::DrawCommand;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn manual_flow(timing: HopTiming) -> PacketFlow {
        let cfg = PacketFlowConfig {
            spawn_intervals: Vec::new(),
            speed_jitter: 0.0,
            hop_timing: timing,
            seed: Some(7),
            ..Default::default()
        };
        PacketFlow::new(cfg, viewport())
    }

    // ========== Packet Flow ==========

    #[test]
    fn test_packet_visits_route_in_order_and_drains() {
        let mut flow = manual_flow(HopTiming::ScreenSpeed);
        let id = flow.spawn(0).unwrap();

        let mut visited = vec![0];
        for _ in 0..2000 {
            for e in flow.step(1.0 / 60.0) {
                if let FlowEvent::Arrived { packet, node } = e {
                    if packet == id {
                        visited.push(node);
                    }
                }
            }
            if flow.packets().is_empty() {
                break;
            }
        }

        assert_eq!(visited, vec![0, GATEWAY, ANALYZER, CONSOLE], "Raw packet took the wrong route");
        assert!(flow.packets().is_empty(), "Packets left behind after the route finished");
        let stats = flow.stats();
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.forked, 1);
    }

    #[test]
    fn test_analyzer_arrival_forks_exactly_one_child() {
        let mut flow = manual_flow(HopTiming::FixedDuration);
        let parent = flow.spawn(1).unwrap();

        let mut forked = false;
        for _ in 0..500 {
            let before = flow.packets().len();
            let events = flow.step(1.0 / 60.0);
            let arrived = events
                .iter()
                .any(|e| *e == FlowEvent::Arrived { packet: parent, node: ANALYZER });
            if !arrived {
                continue;
            }

            assert_eq!(flow.packets().len(), before + 1, "Fork must add exactly one packet");
            let child = flow.packets().iter().find(|p| p.id != parent).unwrap();
            assert_eq!(child.path, vec![(ANALYZER, STORAGE)]);
            assert_eq!(child.kind, PacketKind::Stored);
            assert_eq!(child.progress, 0.0);

            let original = flow.packets().iter().find(|p| p.id == parent).unwrap();
            assert_eq!(original.kind, PacketKind::Analyzed);
            assert_eq!(original.edge(), Some((ANALYZER, CONSOLE)));
            assert!(events.contains(&FlowEvent::Forked { parent, child: child.id }));
            forked = true;
            break;
        }
        assert!(forked, "Packet never reached the analyzer");
    }

    #[test]
    fn test_screen_speed_moves_equal_pixels_on_every_edge() {
        let mut flow = manual_flow(HopTiming::ScreenSpeed);
        let id = flow.spawn(2).unwrap();
        let expected = flow.config().packet_speed * flow.config().reference_distance;

        let mut last = flow.packets()[0].clone();
        let mut checked = 0;
        for _ in 0..2000 {
            flow.step(1.0 / 60.0);
            let Some(now) = flow.packets().iter().find(|p| p.id == id).cloned() else {
                break;
            };
            // Arrival frames snap to the node; only compare in-edge motion.
            if now.leg == last.leg && now.progress > 0.0 {
                let moved = ((now.x - last.x).powi(2) + (now.y - last.y).powi(2)).sqrt();
                assert!(
                    (moved - expected).abs() < 1e-6,
                    "Leg {} moved {} px, expected {}",
                    now.leg,
                    moved,
                    expected
                );
                checked += 1;
            }
            last = now;
        }
        assert!(checked > 100, "Too few frames observed: {}", checked);
    }

    #[test]
    fn test_fixed_duration_spends_equal_frames_per_hop() {
        let mut flow = manual_flow(HopTiming::FixedDuration);
        let id = flow.spawn(0).unwrap();

        let mut arrivals = Vec::new();
        for frame in 1..2000 {
            for e in flow.step(1.0 / 60.0) {
                if let FlowEvent::Arrived { packet, .. } = e {
                    if packet == id {
                        arrivals.push(frame);
                    }
                }
            }
        }

        assert_eq!(arrivals.len(), 3);
        let hops: Vec<i32> = std::iter::once(arrivals[0])
            .chain(arrivals.windows(2).map(|w| w[1] - w[0]))
            .collect();
        assert!(hops.iter().all(|&h| h == hops[0]), "Uneven hop durations: {:?}", hops);
    }

    #[test]
    fn test_scheduled_spawning_does_not_leak() {
        let cfg = PacketFlowConfig { seed: Some(11), ..Default::default() };
        let mut flow = PacketFlow::new(cfg, viewport());

        let mut peak = 0;
        // Two simulated minutes at 60 fps.
        for _ in 0..(60 * 120) {
            flow.step(1.0 / 60.0);
            peak = peak.max(flow.packets().len());
        }

        let stats = flow.stats();
        assert_eq!(stats.dropped, 0);
        assert!(stats.delivered > 100, "Only {} packets delivered", stats.delivered);
        assert!(peak < 60, "Active set grew to {}", peak);
        assert_eq!(
            stats.spawned,
            stats.delivered + stats.stored + stats.active as u64,
            "Every packet must finish or still be in flight"
        );
    }

    // ========== Wireframe ==========

    #[test]
    fn test_full_rotation_returns_to_start() {
        let cfg = WireframeConfig {
            angle_increment: TAU / 360.0,
            // Odd count keeps every halo offset away from the front/back seam.
            halo_count: 37,
            beam_probability: 0.0,
            seed: Some(5),
            ..Default::default()
        };
        let mut wire = Wireframe::new(cfg, viewport());
        let start = wire.frame().clone();

        for _ in 0..360 {
            wire.step();
        }
        let end = wire.frame();

        assert_eq!(start.vertices.len(), end.vertices.len());
        for (a, b) in start.vertices.iter().zip(&end.vertices) {
            assert!(a.distance(*b) < 1e-6, "Vertex drifted from {:?} to {:?}", a, b);
        }
        assert_eq!(start.back.len(), end.back.len());
        assert_eq!(start.front.len(), end.front.len());
    }

    #[test]
    fn test_halo_splits_into_back_and_front() {
        let cfg = WireframeConfig { halo_count: 200, seed: Some(9), ..Default::default() };
        let wire = Wireframe::new(cfg, viewport());
        let frame = wire.frame();
        assert_eq!(frame.back.len() + frame.front.len(), 200);
        assert!(!frame.back.is_empty() && !frame.front.is_empty());
    }

    // ========== Frame Driver ==========

    #[test]
    fn test_mount_then_unmount_disposes_everything_once() {
        let mut host = HeadlessHost::new(viewport());
        let mut driver =
            FrameDriver::mount(&mut host, AnimationConfig::ParticleField(ParticleFieldConfig::default()))
                .unwrap();
        assert!(driver.is_mounted());
        driver.unmount();
        driver.unmount();
        drop(driver);

        assert_eq!(host.live_registrations(), 0);
        assert_eq!(host.disposal_counts(), vec![1, 1, 1]);
    }

    #[test]
    fn test_unmounted_driver_stops_drawing() {
        let mut host = HeadlessHost::new(viewport());
        let mut driver =
            FrameDriver::mount(&mut host, AnimationConfig::Wireframe(WireframeConfig::default())).unwrap();
        host.advance(0.0);
        host.advance(16.0);
        assert_eq!(driver.frames_rendered(), 2);

        driver.unmount();
        host.surface().borrow_mut().reset();
        host.advance(32.0);
        assert_eq!(driver.frames_rendered(), 2);
        assert!(host.surface().borrow().commands().is_empty());
    }

    #[test]
    fn test_missing_surface_fails_without_registrations() {
        let mut host = HeadlessHost::without_surface(viewport());
        let result = FrameDriver::mount(&mut host, AnimationConfig::PacketFlow(Default::default()));
        assert!(matches!(result, Err(MountError::SurfaceUnavailable)));
        assert_eq!(host.total_registrations(), 0);
    }

    #[test]
    fn test_partial_mount_is_rolled_back() {
        let mut host = HeadlessHost::rejecting_pointer(viewport());
        let result =
            FrameDriver::mount(&mut host, AnimationConfig::ParticleField(ParticleFieldConfig::default()));
        assert!(matches!(result, Err(MountError::Host(_))));
        assert_eq!(host.live_registrations(), 0);
        assert_eq!(host.disposal_counts(), vec![1], "Resize listener must be released once");
    }

    #[test]
    fn test_resize_reaches_simulator() {
        let mut host = HeadlessHost::new(viewport());
        let driver =
            FrameDriver::mount(&mut host, AnimationConfig::PacketFlow(Default::default())).unwrap();
        host.resize(Viewport::new(1024.0, 768.0));
        assert_eq!(driver.viewport(), Viewport::new(1024.0, 768.0));

        host.advance(0.0);
        let surface = host.surface();
        let first = surface.borrow().commands()[0].clone();
        assert_eq!(first, DrawCommand::Clear { width: 1024.0, height: 768.0 });
    }

    #[test]
    fn test_theme_change_recolors_next_frame() {
        let store = PreferenceStore::default();
        let mut host = HeadlessHost::new(viewport());
        let mut driver =
            FrameDriver::mount(&mut host, AnimationConfig::Wireframe(WireframeConfig::default())).unwrap();
        driver.bind_preferences(&store);

        store.set_theme(Theme::Light);
        host.advance(0.0);

        let light = Theme::Light.palette().primary;
        let surface = host.surface();
        let strokes: Vec<_> = surface
            .borrow()
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke { style, .. } => Some(style.stroke.clone()),
                _ => None,
            })
            .collect();
        assert!(!strokes.is_empty());
        assert!(strokes.iter().all(|s| *s == light), "Strokes not recolored: {:?}", strokes);

        driver.unmount();
        assert_eq!(store.observer_count(), 0, "Unmount must drop the preference subscription");
    }

    fn stroke_colors(host: &HeadlessHost) -> Vec<String> {
        let surface = host.surface();
        let recorded = surface.borrow();
        let colors = recorded
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke { style, .. } => Some(style.stroke.clone()),
                _ => None,
            })
            .collect();
        colors
    }

    #[test]
    fn test_configured_colors_survive_preference_binding() {
        let cfg: AnimationConfig =
            serde_json::from_str(r##"{"kind":"wireframe","solid_color":"#ff0000","beam_probability":0,"seed":1}"##).unwrap();
        let store = PreferenceStore::default();
        let mut host = HeadlessHost::new(viewport());
        let mut driver = FrameDriver::mount(&mut host, cfg).unwrap();
        driver.bind_preferences(&store);

        host.advance(0.0);
        let colors = stroke_colors(&host);
        assert!(!colors.is_empty());
        assert!(colors.iter().all(|c| c == "#ff0000"), "Configured colour lost: {:?}", colors);

        // Toggling motion must not repaint with the theme palette.
        store.set_reduced_motion(true);
        store.set_reduced_motion(false);
        host.advance(16.0);
        assert!(stroke_colors(&host).iter().all(|c| c == "#ff0000"));

        store.set_theme(Theme::Light);
        host.advance(32.0);
        let light = Theme::Light.palette().primary;
        assert!(stroke_colors(&host).iter().all(|c| *c == light), "Theme change did not recolour");
    }

    #[test]
    fn test_reduced_motion_freezes_the_scene() {
        let store = PreferenceStore::default();
        store.set_reduced_motion(true);
        let mut host = HeadlessHost::new(viewport());
        let cfg = WireframeConfig { seed: Some(2), ..Default::default() };
        let mut driver = FrameDriver::mount(&mut host, AnimationConfig::Wireframe(cfg)).unwrap();
        driver.bind_preferences(&store);

        let surface = host.surface();
        host.advance(0.0);
        let first = surface.borrow_mut().take();
        host.advance(16.0);
        let second = surface.borrow_mut().take();
        assert_eq!(first, second, "Scene moved while motion is reduced");

        store.set_reduced_motion(false);
        host.advance(32.0);
        let third = surface.borrow_mut().take();
        assert_ne!(second, third, "Scene did not resume");
    }
}
