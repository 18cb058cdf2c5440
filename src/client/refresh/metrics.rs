//! Per-client refresh counters.
//!
//! Every refresh request that actually reaches the exchange step counts once, whether it was
//! started by a single caller or shared by a whole flight of callers. Callers that join a
//! flight, or that find a fresh token already stored, do not move any counter.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Refresh flight counters, shared by all clones of one client.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	started: AtomicU64,
	refreshed: AtomicU64,
	failed: AtomicU64,
}
impl RefreshMetrics {
	/// Refresh exchanges started, including those still running.
	pub fn attempts(&self) -> u64 {
		self.started.load(Ordering::Relaxed)
	}

	/// Exchanges that stored a new access token.
	pub fn successes(&self) -> u64 {
		self.refreshed.load(Ordering::Relaxed)
	}

	/// Exchanges that ended without a token, for any reason.
	pub fn failures(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	/// Exchanges started but not yet finished.
	pub fn outstanding(&self) -> u64 {
		self.attempts().saturating_sub(self.successes() + self.failures())
	}

	pub(crate) fn record_started(&self) {
		self.started.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_finished(&self, refreshed: bool) {
		let counter = if refreshed { &self.refreshed } else { &self.failed };

		counter.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outstanding_tracks_unfinished_exchanges() {
		let metrics = RefreshMetrics::default();

		metrics.record_started();
		metrics.record_started();

		assert_eq!(metrics.outstanding(), 2);

		metrics.record_finished(true);
		metrics.record_finished(false);

		assert_eq!((metrics.attempts(), metrics.successes(), metrics.failures()), (2, 1, 1));
		assert_eq!(metrics.outstanding(), 0);
	}
}
