// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Headless Frame Bench
//
// Usage:
//   cargo run --release --bin bench                       # All scenarios, 3600 frames each
//   cargo run --release --bin bench -- --frames 600       # Quick mode
//   cargo run --release --bin bench -- flow               # Filter by name or label
//   cargo run --release --bin bench -- --seed 42          # Custom seed
//   RUST_LOG=canvas_engine=debug cargo run --bin bench    # Engine logs on stderr

mod report;
mod scenarios;

use std::f64::consts::TAU;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use canvas_engine::{FrameDriver, HeadlessHost, Point2};
use report::*;
use scenarios::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_MS: f64 = 1000.0 / 60.0;
const FRAME_BUDGET_US: f64 = 16_667.0;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    frames: u64,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs { frames: 3600, seed: 0, filter: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--frames" => {
                i += 1;
                if i < args.len() {
                    cli.frames = args[i].parse().unwrap_or(3600);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Runner ─────────────────────────────────────────────────────────────────

/// Pointer circling the viewport centre once every 600 frames.
fn pointer_at(scenario: &Scenario, frame: u64) -> Point2 {
    let c = scenario.viewport.center();
    let r = scenario.viewport.width.min(scenario.viewport.height) * 0.3;
    let a = frame as f64 / 600.0 * TAU;
    Point2::new(c.x + r * a.cos(), c.y + r * a.sin())
}

fn run_scenario(
    scenario: &Scenario,
    frames: u64,
    seed: u64,
) -> Result<ScenarioReport, canvas_engine::MountError> {
    let mut host = HeadlessHost::new(scenario.viewport);
    let mut driver = FrameDriver::mount(&mut host, scenario.seeded(seed))?;
    let surface = host.surface();

    let mut frame_us = Vec::with_capacity(frames as usize);
    let mut commands = Vec::with_capacity(frames as usize);
    for frame in 0..frames {
        if scenario.pointer {
            host.move_pointer(pointer_at(scenario, frame));
        }
        let start = Instant::now();
        host.advance(frame as f64 * FRAME_MS);
        frame_us.push(start.elapsed().as_secs_f64() * 1e6);

        let mut recorded = surface.borrow_mut();
        commands.push(recorded.commands().len() as f64);
        recorded.reset();
    }

    let flow = driver.flow_stats();
    driver.unmount();
    let flow_leak = flow
        .map(|s| s.dropped > 0 || s.spawned != s.delivered + s.stored + u64::from(s.active))
        .unwrap_or(false);

    Ok(ScenarioReport {
        scenario: scenario.name.to_string(),
        label: scenario.label.to_string(),
        kind: driver.kind().to_string(),
        seed,
        width: scenario.viewport.width,
        height: scenario.viewport.height,
        frames: driver.frames_rendered(),
        frame_us: Stats::from_samples(&frame_us),
        commands: Stats::from_samples(&commands),
        flow,
        leaked: flow_leak || host.live_registrations() != 0,
    })
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios
                .iter()
                .filter(|s| {
                    s.name.to_lowercase().contains(&f_lower) || s.label.to_lowercase().contains(&f_lower)
                })
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Backdrop Frame Bench v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Frames/scenario: {} | Seed: {}", cli.frames, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!(
        "  {:<22} {:<32} {:>9} {:>9} {:>9} {:>8} {:>7}",
        "Scenario", "Label", "Mean(us)", "P95(us)", "Max(us)", "Cmds", "Leak"
    );
    println!("  {}", "-".repeat(102));

    let suite_start = Instant::now();
    let mut reports = Vec::new();

    for scenario in &to_run {
        let report = run_scenario(scenario, cli.frames, cli.seed)?;
        info!(scenario = scenario.name, frames = report.frames, "scenario finished");

        println!(
            "  {:<22} {:<32} {:>9.1} {:>9.1} {:>9.1} {:>8.0} {:>7}",
            report.scenario,
            report.label,
            report.frame_us.mean,
            report.frame_us.p95,
            report.frame_us.max,
            report.commands.mean,
            if report.leaked { "LEAK" } else { "ok" },
        );
        if let Some(flow) = &report.flow {
            println!(
                "  {:<22} spawned {} | forked {} | delivered {} | stored {} | dropped {} | active {}",
                "", flow.spawned, flow.forked, flow.delivered, flow.stored, flow.dropped, flow.active
            );
        }

        reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = reports.len();
    let leaking = reports.iter().filter(|r| r.leaked).count();
    let over_budget = reports.iter().filter(|r| r.frame_us.p95 > FRAME_BUDGET_US).count();

    println!("  {}", "-".repeat(102));
    println!(
        "  Total: {}  Leaking: {}  Over 60fps budget: {}  Suite time: {:.1}s\n",
        total,
        leaking,
        over_budget,
        suite_elapsed.as_secs_f64()
    );

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        frames_per_scenario: cli.frames,
        frame_budget_us: FRAME_BUDGET_US,
        summary: Summary { total, leaking, over_budget },
        scenarios: reports,
    };

    let dir = std::path::Path::new("benchmark-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    if leaking > 0 {
        std::process::exit(1);
    }
    Ok(())
}
