//! Per-client counters describing how `401` responses were resolved.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// How one run of the refresh sub-protocol ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// A token exchange issued a new access token.
	Exchanged,
	/// A concurrent exchange had already replaced the stale token, so the stored one was used.
	Reused,
	/// No usable access token was obtained; the session ends.
	Failed,
}
impl RefreshOutcome {
	/// Stable label for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Exchanged => "exchanged",
			Self::Reused => "reused",
			Self::Failed => "failed",
		}
	}
}

/// Counters shared by a client and its clones.
///
/// `attempts() == successes() + reuses() + failures()` once every run has finished, while
/// `exchanges()` counts requests actually sent to the token endpoint.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	exchanges: AtomicU64,
	successes: AtomicU64,
	reuses: AtomicU64,
	failures: AtomicU64,
}
impl RefreshMetrics {
	/// Runs of the refresh sub-protocol, one per `401` on a first send.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Requests sent to the token endpoint; short-circuits and reuses send none.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Runs that ended with a freshly exchanged access token.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Single-flight runs that reused a token exchanged by a concurrent run.
	pub fn reuses(&self) -> u64 {
		self.reuses.load(Ordering::Relaxed)
	}

	/// Runs that ended without a usable access token.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record(&self, outcome: RefreshOutcome) {
		let counter = match outcome {
			RefreshOutcome::Exchanged => &self.successes,
			RefreshOutcome::Reused => &self.reuses,
			RefreshOutcome::Failed => &self.failures,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
