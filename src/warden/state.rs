//! Lifecycle states gating token-dependent work.

// self
use crate::_prelude::*;

/// Lifecycle state of the warden.
///
/// `Refreshing` and `Reauthorizing` are transient and always resolve back to `Authorized` or
/// `Unauthorized`; only one of them may be active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WardenState {
	/// No valid refresh token; any guarded action must first trigger re-authorization.
	Unauthorized,
	/// A refresh token (and usually an access token) is present; actions may proceed.
	Authorized,
	/// A refresh exchange is in flight; the access token has been cleared.
	Refreshing,
	/// Waiting for an external interactive login to resolve via `authorize` or
	/// `abort_authorization`.
	Reauthorizing,
}
impl WardenState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			WardenState::Unauthorized => "unauthorized",
			WardenState::Authorized => "authorized",
			WardenState::Refreshing => "refreshing",
			WardenState::Reauthorizing => "reauthorizing",
		}
	}

	/// Returns `true` while a refresh or re-authorization is in flight.
	pub const fn is_authenticating(self) -> bool {
		matches!(self, WardenState::Refreshing | WardenState::Reauthorizing)
	}

	/// Returns `true` unless credentials were never set or have been explicitly cleared.
	pub const fn is_logged_in(self) -> bool {
		!matches!(self, WardenState::Unauthorized)
	}
}
impl Display for WardenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(WardenState::Unauthorized.as_str(), "unauthorized");
		assert_eq!(WardenState::Authorized.as_str(), "authorized");
		assert_eq!(WardenState::Refreshing.as_str(), "refreshing");
		assert_eq!(WardenState::Reauthorizing.as_str(), "reauthorizing");
	}

	#[test]
	fn transient_states_report_authenticating() {
		assert!(WardenState::Refreshing.is_authenticating());
		assert!(WardenState::Reauthorizing.is_authenticating());
		assert!(!WardenState::Authorized.is_authenticating());
		assert!(!WardenState::Unauthorized.is_authenticating());
	}

	#[test]
	fn only_unauthorized_reports_logged_out() {
		assert!(WardenState::Authorized.is_logged_in());
		assert!(WardenState::Refreshing.is_logged_in());
		assert!(WardenState::Reauthorizing.is_logged_in());
		assert!(!WardenState::Unauthorized.is_logged_in());
	}

	#[test]
	fn state_serde_round_trips() {
		let payload = serde_json::to_string(&WardenState::Refreshing)
			.expect("Warden state should serialize to JSON.");

		assert_eq!(payload, "\"Refreshing\"");

		let round_trip: WardenState = serde_json::from_str(&payload)
			.expect("Serialized warden state should deserialize from JSON.");

		assert_eq!(round_trip, WardenState::Refreshing);
	}
}
