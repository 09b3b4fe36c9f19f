// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for warden lifecycle activity.
#[derive(Debug, Default)]
pub struct WardenMetrics {
	refresh_attempts: AtomicU64,
	refresh_successes: AtomicU64,
	refresh_failures: AtomicU64,
	authorization_requests: AtomicU64,
	replayed_actions: AtomicU64,
}
impl WardenMetrics {
	/// Returns the total number of refresh exchanges started.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges that delivered fresh tokens.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_successes.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges that failed.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failures.load(Ordering::Relaxed)
	}

	/// Returns the number of interactive re-authorization announcements.
	pub fn authorization_requests(&self) -> u64 {
		self.authorization_requests.load(Ordering::Relaxed)
	}

	/// Returns the number of queued actions replayed with a fresh token.
	pub fn replayed_actions(&self) -> u64 {
		self.replayed_actions.load(Ordering::Relaxed)
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_authorization_request(&self) {
		self.authorization_requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_replayed_action(&self) {
		self.replayed_actions.fetch_add(1, Ordering::Relaxed);
	}
}
