use serde::{Deserialize, Serialize};

use crate::modules::session::{EndReason, SessionReport};
use crate::modules::strategy::Strategy;

/// Aggregate over a batch of autonomous sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchStats {
    pub strategy: Option<Strategy>,
    pub runs: u64,
    pub total_score: u64,
    pub max_score: u32,
    pub min_score: u32,
    pub total_ticks: u64,
    pub collisions: u64,
    pub grid_full: u64,
    /// Sessions cut off by the tick limit while still alive.
    pub unfinished: u64,
}

impl BenchStats {
    pub fn record(&mut self, report: &SessionReport) {
        if self.runs == 0 {
            self.min_score = report.score;
            self.strategy = Some(report.strategy);
        }
        self.runs = self.runs.saturating_add(1);
        self.total_score = self.total_score.saturating_add(report.score as u64);
        self.max_score = self.max_score.max(report.score);
        self.min_score = self.min_score.min(report.score);
        self.total_ticks = self.total_ticks.saturating_add(report.ticks);
        match report.end {
            Some(EndReason::Collision) => self.collisions = self.collisions.saturating_add(1),
            Some(EndReason::GridFull) => self.grid_full = self.grid_full.saturating_add(1),
            Some(EndReason::Quit) | None => self.unfinished = self.unfinished.saturating_add(1),
        }
    }

    pub fn mean_score(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.runs as f64
    }

    pub fn mean_ticks(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.runs as f64
    }
}

pub fn summarize<'a>(reports: impl IntoIterator<Item = &'a SessionReport>) -> BenchStats {
    let mut stats = BenchStats::default();
    for report in reports {
        stats.record(report);
    }
    stats
}
