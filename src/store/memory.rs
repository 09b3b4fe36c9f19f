//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
	store::{CredentialStore, StoreError, StoreFuture, StoredTokens},
};

type StoreSlot = Arc<RwLock<StoredTokens>>;

/// Thread-safe store that keeps the credential snapshot in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreSlot);
impl MemoryStore {
	/// Returns the currently persisted snapshot.
	pub fn snapshot(&self) -> StoredTokens {
		self.0.read().clone()
	}

	fn load_now(slot: StoreSlot) -> StoredTokens {
		slot.read().clone()
	}

	fn persist_now(slot: StoreSlot, snapshot: StoredTokens) -> Result<(), StoreError> {
		*slot.write() = snapshot;

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, StoredTokens> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slot)) })
	}

	fn persist<'a>(
		&'a self,
		access: Option<&'a AccessToken>,
		refresh: Option<&'a RefreshToken>,
	) -> StoreFuture<'a, ()> {
		let slot = self.0.clone();
		let snapshot = StoredTokens { access: access.cloned(), refresh: refresh.cloned() };

		Box::pin(async move { Self::persist_now(slot, snapshot) })
	}
}
