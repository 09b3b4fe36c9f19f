//! Convenience re-exports and fixtures for integration tests; enabled via `cfg(test)` or the
//! `test` crate feature.

pub use crate::_prelude::*;

pub use crate::{
	auth::{AccessToken, RefreshToken, TokenPair},
	delegate::{DelegateFuture, WardenDelegate},
	store::{CredentialStore, MemoryStore, StoredTokens},
	warden::{ActionFuture, Warden, WardenState},
};

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use parking_lot::Mutex;

type RefreshScript = Box<dyn FnOnce(RefreshToken) -> Result<TokenPair> + Send>;
type ExpiryScript = Box<dyn FnOnce(&AccessToken) -> bool + Send>;

/// Scripted [`WardenDelegate`] double: FIFO queues of one-shot handlers plus recorded
/// notifications, so tests can assert exact call counts and payloads.
///
/// An unscripted refresh request panics; an unscripted expiry check answers `false`.
#[derive(Default)]
pub struct ScriptedDelegate {
	refresh_scripts: Mutex<VecDeque<RefreshScript>>,
	expiry_scripts: Mutex<VecDeque<ExpiryScript>>,
	authorization_requests: AtomicU64,
	refresh_calls: Mutex<Vec<String>>,
	token_updates: Mutex<Vec<(Option<String>, Option<String>)>>,
	state_updates: Mutex<Vec<WardenState>>,
}
impl ScriptedDelegate {
	/// Queues a one-shot handler for the next refresh exchange.
	pub fn script_refresh(
		&self,
		handler: impl 'static + FnOnce(RefreshToken) -> Result<TokenPair> + Send,
	) {
		self.refresh_scripts.lock().push_back(Box::new(handler));
	}

	/// Queues a one-shot handler for the next expiry check.
	pub fn script_expiry(&self, handler: impl 'static + FnOnce(&AccessToken) -> bool + Send) {
		self.expiry_scripts.lock().push_back(Box::new(handler));
	}

	/// Returns how many times interactive re-authorization was announced.
	pub fn authorization_requests(&self) -> u64 {
		self.authorization_requests.load(Ordering::SeqCst)
	}

	/// Returns the exposed refresh secrets handed to `requires_refresh`, in call order.
	pub fn refresh_calls(&self) -> Vec<String> {
		self.refresh_calls.lock().clone()
	}

	/// Returns every recorded `did_update_tokens` notification as exposed secrets.
	pub fn token_updates(&self) -> Vec<(Option<String>, Option<String>)> {
		self.token_updates.lock().clone()
	}

	/// Returns every recorded `did_update_state` notification, in order.
	pub fn state_updates(&self) -> Vec<WardenState> {
		self.state_updates.lock().clone()
	}
}
impl WardenDelegate for ScriptedDelegate {
	fn requires_refresh(
		&self,
		refresh_token: RefreshToken,
	) -> DelegateFuture<'_, Result<TokenPair>> {
		self.refresh_calls.lock().push(refresh_token.expose().to_owned());

		let script = self
			.refresh_scripts
			.lock()
			.pop_front()
			.expect("Unexpected refresh request: no scripted handler remains.");

		Box::pin(async move { script(refresh_token) })
	}

	fn requires_authorization(&self) {
		self.authorization_requests.fetch_add(1, Ordering::SeqCst);
	}

	fn should_token_expire(&self, access_token: &AccessToken) -> bool {
		match self.expiry_scripts.lock().pop_front() {
			Some(script) => script(access_token),
			None => false,
		}
	}

	fn did_update_tokens(&self, access: Option<&AccessToken>, refresh: Option<&RefreshToken>) {
		self.token_updates.lock().push((
			access.map(|token| token.expose().to_owned()),
			refresh.map(|token| token.expose().to_owned()),
		));
	}

	fn did_update_state(&self, state: WardenState) {
		self.state_updates.lock().push(state);
	}
}

/// Builds a token pair fixture from plain secrets.
pub fn token_pair(access: &str, refresh: &str) -> TokenPair {
	TokenPair::new(AccessToken::new(access), RefreshToken::new(refresh))
}
