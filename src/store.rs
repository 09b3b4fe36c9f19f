//! Persistence contracts and built-in credential stores.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract passively mirroring the warden's current credentials.
///
/// The warden is the sole writer: it loads once at construction and then pushes every token
/// change, in write order, so credentials survive process restarts. No external writer may
/// mutate the snapshot while the warden is live; the in-memory state would silently diverge.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the persisted credential snapshot.
	fn load(&self) -> StoreFuture<'_, StoredTokens>;

	/// Persists the warden's current credentials, replacing the previous snapshot.
	fn persist<'a>(
		&'a self,
		access: Option<&'a AccessToken>,
		refresh: Option<&'a RefreshToken>,
	) -> StoreFuture<'a, ()>;
}

/// Credential snapshot held by a store: at most one access and one refresh token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
	/// Persisted access token, if any.
	pub access: Option<AccessToken>,
	/// Persisted refresh token, if any.
	pub refresh: Option<RefreshToken>,
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde/bincode) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stored_tokens_serde_round_trips() {
		let snapshot = StoredTokens {
			access: Some(AccessToken::new("a-1")),
			refresh: Some(RefreshToken::new("r-1")),
		};
		let payload =
			serde_json::to_string(&snapshot).expect("Stored tokens should serialize to JSON.");
		let round_trip: StoredTokens = serde_json::from_str(&payload)
			.expect("Serialized stored tokens should deserialize from JSON.");

		assert_eq!(round_trip, snapshot);
	}

	#[test]
	fn stored_tokens_debug_redacts_secrets() {
		let snapshot = StoredTokens {
			access: Some(AccessToken::new("a-secret")),
			refresh: Some(RefreshToken::new("r-secret")),
		};
		let rendered = format!("{snapshot:?}");

		assert!(!rendered.contains("a-secret"));
		assert!(!rendered.contains("r-secret"));
	}

	#[test]
	fn store_error_display_includes_payload() {
		let error = StoreError::Backend { message: "database unreachable".into() };

		assert!(error.to_string().contains("database unreachable"));
	}
}
