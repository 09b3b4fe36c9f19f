//! The warden handle, its single-owner actor, and the pending-call queue.

pub mod state;

pub use metrics::WardenMetrics;
pub use state::WardenState;

mod actor;
mod metrics;
mod queue;

// crates.io
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
	delegate::WardenDelegate,
	error::WardenDropped,
	store::{CredentialStore, StoreError},
};
use actor::{Actor, Command};
use queue::GuardedCall;

/// Boxed future produced by a guarded action.
pub type ActionFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Cheap-to-clone handle onto the token lifecycle coordinator.
///
/// All mutations to state, stored tokens, and the pending queue happen serialized on one
/// spawned task; public entry points marshal onto it asynchronously, so guarded actions and
/// their completions never run on the caller's original context. This single-owner ordering is
/// what makes "only one refresh in flight" and "exactly-once resolution per queued entry"
/// sound without locks.
#[derive(Clone)]
pub struct Warden {
	commands: mpsc::UnboundedSender<Command>,
	state_rx: watch::Receiver<WardenState>,
	metrics: Arc<WardenMetrics>,
}
impl Warden {
	/// Creates an in-memory warden seeded with the provided credentials.
	///
	/// The initial state is [`WardenState::Unauthorized`] iff neither token is present; an
	/// access token alone still counts as [`WardenState::Authorized`]. Must be called within a
	/// Tokio runtime.
	pub fn new(access: Option<AccessToken>, refresh: Option<RefreshToken>) -> Self {
		Self::spawn(access, refresh, None)
	}

	/// Creates a warden resuming from the store's persisted snapshot, then mirrors every
	/// subsequent credential change back into the store in write order.
	///
	/// A load failure surfaces here; runtime mirror failures are only logged.
	pub async fn with_store(store: Arc<dyn CredentialStore>) -> Result<Self, StoreError> {
		let stored = store.load().await?;

		Ok(Self::spawn(stored.access, stored.refresh, Some(store)))
	}

	fn spawn(
		access: Option<AccessToken>,
		refresh: Option<RefreshToken>,
		store: Option<Arc<dyn CredentialStore>>,
	) -> Self {
		let metrics = Arc::new(WardenMetrics::default());
		let (commands, state_rx) = Actor::spawn(access, refresh, store, metrics.clone());

		Self { commands, state_rx, metrics }
	}

	/// Installs the delegate. Held weakly, so the warden never keeps its environment alive.
	pub fn set_delegate<D>(&self, delegate: &Arc<D>)
	where
		D: 'static + WardenDelegate,
	{
		let delegate = Arc::downgrade(delegate);

		self.send(Command::SetDelegate(delegate));
	}

	/// Runs `action` with a live access token, refreshing or re-authorizing as needed.
	///
	/// If authentication is already in progress the call is queued and replayed in arrival
	/// order once it resolves. An action reporting [`AuthError::Unauthorized`] on its first
	/// invocation is queued for one replay behind a refresh; every other error is delivered
	/// verbatim. The action is invoked at most twice, never concurrently with its own retry,
	/// and the returned future resolves with exactly one terminal outcome.
	pub async fn with_access_token<T, A>(&self, action: A) -> Result<T>
	where
		T: 'static + Send,
		A: 'static + FnMut(AccessToken) -> ActionFuture<T> + Send,
	{
		let (completion, resolved) = oneshot::channel();

		if self.commands.send(Command::Guarded(GuardedCall::new(action, completion))).is_err() {
			return Err(AuthError::other(WardenDropped));
		}

		resolved.await.unwrap_or_else(|_| Err(AuthError::other(WardenDropped)))
	}

	/// Resolves a pending re-authorization with fresh credentials, draining queued callers
	/// with the new access token.
	///
	/// Accepted from any state: this is the external source of credential truth and also
	/// serves to set initial tokens. An in-flight refresh is superseded; its late resolution
	/// is discarded.
	pub fn authorize(&self, access: AccessToken, refresh: RefreshToken) {
		self.send(Command::Authorize { access, refresh });
	}

	/// Aborts a pending re-authorization with [`AuthError::LoginCancelled`].
	pub fn abort_authorization(&self) {
		self.abort_authorization_with(AuthError::LoginCancelled);
	}

	/// Aborts a pending re-authorization with a caller-chosen error, draining queued callers
	/// with it.
	///
	/// Strict no-op unless the state is exactly [`WardenState::Reauthorizing`]; in particular
	/// it cannot cancel an in-flight refresh exchange.
	pub fn abort_authorization_with(&self, error: AuthError) {
		self.send(Command::AbortAuthorization { error });
	}

	/// Clears both credentials from any state and drains queued callers with
	/// [`AuthError::NoCredentials`].
	pub fn remove_tokens(&self) {
		self.send(Command::RemoveTokens);
	}

	/// Alias for [`Warden::remove_tokens`].
	pub fn logout(&self) {
		self.remove_tokens();
	}

	/// Returns the most recently published state.
	pub fn state(&self) -> WardenState {
		*self.state_rx.borrow()
	}

	/// Returns `false` only in [`WardenState::Unauthorized`].
	pub fn is_logged_in(&self) -> bool {
		self.state().is_logged_in()
	}

	/// Returns a state read ordered after every previously submitted command.
	pub async fn settled(&self) -> WardenState {
		let (reply, read) = oneshot::channel();

		if self.commands.send(Command::Settled(reply)).is_err() {
			return self.state();
		}

		read.await.unwrap_or_else(|_| self.state())
	}

	/// Returns the always-on lifecycle counters.
	pub fn metrics(&self) -> &WardenMetrics {
		&self.metrics
	}

	fn send(&self, command: Command) {
		if self.commands.send(command).is_err() {
			debug!("warden actor is gone; dropping command");
		}
	}
}
impl Debug for Warden {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Warden").field("state", &self.state()).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicU32, Ordering};
	// self
	use super::*;
	use crate::_preludet::*;

	#[tokio::test]
	async fn optimistic_call_runs_once_with_the_held_token() {
		let warden = Warden::new(Some(AccessToken::new("A1")), Some(RefreshToken::new("R1")));
		let delegate = Arc::new(ScriptedDelegate::default());

		warden.set_delegate(&delegate);

		let invocations = Arc::new(AtomicU32::new(0));
		let seen = invocations.clone();
		let value = warden
			.with_access_token(move |token: AccessToken| -> ActionFuture<String> {
				let seen = seen.clone();

				Box::pin(async move {
					seen.fetch_add(1, Ordering::SeqCst);

					Ok(token.expose().to_owned())
				})
			})
			.await
			.expect("Guarded call should succeed with the held token.");

		assert_eq!(value, "A1");
		assert_eq!(invocations.load(Ordering::SeqCst), 1);
		assert!(delegate.refresh_calls().is_empty());
		assert_eq!(warden.settled().await, WardenState::Authorized);
	}

	#[tokio::test]
	async fn unauthorized_first_attempt_refreshes_once_and_replays() {
		let warden = Warden::new(Some(AccessToken::new("A1")), Some(RefreshToken::new("R1")));
		let delegate = Arc::new(ScriptedDelegate::default());

		delegate.script_refresh(|refresh| {
			assert_eq!(refresh.expose(), "R1");

			Ok(token_pair("A2", "R2"))
		});
		warden.set_delegate(&delegate);

		let value = warden
			.with_access_token(|token: AccessToken| -> ActionFuture<String> {
				Box::pin(async move {
					if token.expose() == "A1" {
						Err(AuthError::Unauthorized)
					} else {
						Ok(token.expose().to_owned())
					}
				})
			})
			.await
			.expect("Replay with the refreshed token should succeed.");

		assert_eq!(value, "A2");
		assert_eq!(delegate.refresh_calls(), ["R1"]);
		assert_eq!(warden.settled().await, WardenState::Authorized);
		assert_eq!(
			delegate.token_updates().last(),
			Some(&(Some("A2".to_owned()), Some("R2".to_owned())))
		);
		assert_eq!(warden.metrics().refresh_attempts(), 1);
		assert_eq!(warden.metrics().refresh_successes(), 1);
	}

	#[tokio::test]
	async fn reauthorization_is_requested_once_for_concurrent_callers() {
		let warden = Warden::new(None, None);
		let delegate = Arc::new(ScriptedDelegate::default());

		warden.set_delegate(&delegate);

		let run = |tag: &'static str| {
			warden.with_access_token(move |token: AccessToken| -> ActionFuture<String> {
				Box::pin(async move { Ok(format!("{tag}:{}", token.expose())) })
			})
		};
		let resolver = warden.clone();
		let (first, second, _) = tokio::join!(run("first"), run("second"), async move {
			assert_eq!(resolver.settled().await, WardenState::Reauthorizing);

			resolver.authorize(AccessToken::new("A1"), RefreshToken::new("R1"));
		});

		assert_eq!(first.expect("First queued caller should be replayed."), "first:A1");
		assert_eq!(second.expect("Second queued caller should be replayed."), "second:A1");
		assert_eq!(delegate.authorization_requests(), 1);
		assert!(delegate.refresh_calls().is_empty());
	}

	#[tokio::test]
	async fn second_unauthorized_attempt_surfaces_to_the_caller() {
		let warden = Warden::new(Some(AccessToken::new("A1")), Some(RefreshToken::new("R1")));
		let delegate = Arc::new(ScriptedDelegate::default());

		delegate.script_refresh(|_| Ok(token_pair("A2", "R2")));
		warden.set_delegate(&delegate);

		let invocations = Arc::new(AtomicU32::new(0));
		let seen = invocations.clone();
		let outcome = warden
			.with_access_token(move |_token: AccessToken| -> ActionFuture<u8> {
				let seen = seen.clone();

				Box::pin(async move {
					seen.fetch_add(1, Ordering::SeqCst);

					Err(AuthError::Unauthorized)
				})
			})
			.await;

		assert!(matches!(outcome, Err(AuthError::Unauthorized)));
		assert_eq!(invocations.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn abort_is_a_noop_outside_reauthorizing() {
		let warden = Warden::new(Some(AccessToken::new("A1")), Some(RefreshToken::new("R1")));

		warden.abort_authorization();

		assert_eq!(warden.settled().await, WardenState::Authorized);
		assert!(warden.is_logged_in());
	}
}
