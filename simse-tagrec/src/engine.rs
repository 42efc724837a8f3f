// ---------------------------------------------------------------------------
// StatsHandle -- shared, swappable statistics aggregate
// ---------------------------------------------------------------------------
//
// Readers take an `Arc<Statistics>` snapshot and score against it without
// holding any lock. A reload builds a complete new aggregate first and
// then swaps the pointer, so a reader never sees a partially built one.
// ---------------------------------------------------------------------------

use std::sync::{Arc, PoisonError, RwLock};

use crate::loader::LoadReport;
use crate::scorer::{self, ScoringConfig};
use crate::stats::Statistics;
use crate::types::{Recommendation, StatsSummary};

#[derive(Debug, Default)]
pub struct StatsHandle {
	current: RwLock<Arc<Statistics>>,
}

impl StatsHandle {
	/// A handle over an empty aggregate; every query returns nothing until
	/// the first `replace`.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_stats(stats: Statistics) -> Self {
		Self {
			current: RwLock::new(Arc::new(stats)),
		}
	}

	/// Snapshot of the current aggregate.
	pub fn current(&self) -> Arc<Statistics> {
		let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
		Arc::clone(&*guard)
	}

	/// Swap in `stats`, returning the aggregate it replaced.
	pub fn replace(&self, stats: Statistics) -> Arc<Statistics> {
		let next = Arc::new(stats);
		let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
		let previous = std::mem::replace(&mut *guard, next);
		tracing::info!(
			annotations = guard.annotation_count(),
			previous = previous.annotation_count(),
			"Statistics replaced"
		);
		previous
	}

	/// Build from a load report and swap it in.
	pub fn load(&self, report: &LoadReport) -> StatsSummary {
		let stats = Statistics::build(&report.annotations);
		let summary = stats.summary();
		self.replace(stats);
		summary
	}

	pub fn recommend(&self, user: &str, k: usize, config: &ScoringConfig) -> Vec<Recommendation> {
		scorer::recommend(&self.current(), user, k, config)
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
