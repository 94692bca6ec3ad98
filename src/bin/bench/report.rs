// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Bench Report Types

use canvas_engine::FlowStats;
use serde::Serialize;

// ─── Statistics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, p50: 0.0, p95: 0.0, max: 0.0, n: 0 };
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let rank = |q: f64| sorted[((n - 1) as f64 * q).round() as usize];
        Self {
            mean: samples.iter().sum::<f64>() / n as f64,
            p50: rank(0.50),
            p95: rank(0.95),
            max: sorted[n - 1],
            n,
        }
    }
}

// ─── Per-scenario result ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub label: String,
    pub kind: String,
    pub seed: u64,
    pub width: f64,
    pub height: f64,
    pub frames: u64,
    /// Wall time per frame, microseconds.
    pub frame_us: Stats,
    /// Display-list length per frame.
    pub commands: Stats,
    pub flow: Option<FlowStats>,
    pub leaked: bool,
}

// ─── Full report ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub leaking: usize,
    pub over_budget: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub frames_per_scenario: u64,
    pub frame_budget_us: f64,
    pub summary: Summary,
    pub scenarios: Vec<ScenarioReport>,
}
