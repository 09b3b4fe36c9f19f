//! Optional observability helpers for warden lifecycle activity.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `oauth2_warden_lifecycle_total` counter for every
//!   refresh/authorization attempt, success, and failure, labeled by `event` + `outcome`.

// self
use crate::_prelude::*;

/// Lifecycle events observed by the warden.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	/// Refresh token exchange through the delegate.
	Refresh,
	/// Interactive re-authorization resolved externally.
	Authorization,
}
impl LifecycleEvent {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LifecycleEvent::Refresh => "refresh",
			LifecycleEvent::Authorization => "authorization",
		}
	}
}
impl Display for LifecycleEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventOutcome {
	/// Entry into a lifecycle operation.
	Attempt,
	/// Successful resolution.
	Success,
	/// Failure resolution.
	Failure,
}
impl EventOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EventOutcome::Attempt => "attempt",
			EventOutcome::Success => "success",
			EventOutcome::Failure => "failure",
		}
	}
}
impl Display for EventOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a lifecycle outcome via the global metrics recorder (when enabled).
pub fn record_lifecycle_outcome(event: LifecycleEvent, outcome: EventOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_warden_lifecycle_total",
			"event" => event.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (event, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_lifecycle_outcome_noop_without_metrics() {
		record_lifecycle_outcome(LifecycleEvent::Refresh, EventOutcome::Failure);
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(LifecycleEvent::Refresh.to_string(), "refresh");
		assert_eq!(LifecycleEvent::Authorization.to_string(), "authorization");
		assert_eq!(EventOutcome::Attempt.to_string(), "attempt");
	}
}
