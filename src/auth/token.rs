//! Access and refresh token models plus the pair delivered by a resolution.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Bearer credential handed to guarded actions.
///
/// The warden never interprets the secret or the optional expiry instant itself; the expiry is
/// only offered to the delegate's `should_token_expire` predicate so proactive, clock-based
/// refreshes can complement reactive `Unauthorized` responses.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	secret: TokenSecret,
	expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Wraps a new access token with no expiry metadata attached.
	pub fn new(secret: impl Into<String>) -> Self {
		Self { secret: TokenSecret::new(secret), expires_at: None }
	}

	/// Attaches the instant at which the credential stops being valid.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Returns the expiry instant, if one was attached.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Returns `true` if the credential expires within `window` from now.
	///
	/// A token without expiry metadata never reports as expiring.
	pub fn expires_within(&self, window: Duration) -> bool {
		match self.expires_at {
			Some(instant) => OffsetDateTime::now_utc() + window >= instant,
			None => false,
		}
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.secret.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Renewal credential exchanged for a fresh token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken(TokenSecret);
impl RefreshToken {
	/// Wraps a new refresh token.
	pub fn new(secret: impl Into<String>) -> Self {
		Self(TokenSecret::new(secret))
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}
}

/// Fresh credentials delivered by a refresh exchange or an interactive login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Bearer credential for guarded actions.
	pub access: AccessToken,
	/// Renewal credential for the next refresh exchange.
	pub refresh: RefreshToken,
}
impl TokenPair {
	/// Pairs an access token with the refresh token that renews it.
	pub fn new(access: AccessToken, refresh: RefreshToken) -> Self {
		Self { access, refresh }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn access_token_debug_redacts_secret() {
		let token = AccessToken::new("bearer-secret");

		assert!(!format!("{token:?}").contains("bearer-secret"));
	}

	#[test]
	fn expires_within_requires_expiry_metadata() {
		let bare = AccessToken::new("no-expiry");

		assert!(!bare.expires_within(Duration::hours(1)));
	}

	#[test]
	fn expires_within_compares_against_window() {
		let soon = AccessToken::new("soon").with_expires_at(OffsetDateTime::now_utc() + Duration::seconds(30));
		let later =
			AccessToken::new("later").with_expires_at(OffsetDateTime::now_utc() + Duration::hours(2));

		assert!(soon.expires_within(Duration::minutes(5)));
		assert!(!later.expires_within(Duration::minutes(5)));
	}

	#[test]
	fn token_pair_serde_round_trips() {
		let pair = TokenPair::new(AccessToken::new("a-1"), RefreshToken::new("r-1"));
		let payload = serde_json::to_string(&pair).expect("Token pair should serialize to JSON.");
		let round_trip: TokenPair = serde_json::from_str(&payload)
			.expect("Serialized token pair should deserialize from JSON.");

		assert_eq!(round_trip, pair);
	}
}
