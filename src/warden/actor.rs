//! Single-owner task serializing every state, token, and queue mutation.
//!
//! Public entry points marshal commands onto this task instead of taking locks; the invariant
//! the warden needs is ordering, not just exclusion. Long-running work never blocks the task:
//! action futures and delegate refresh futures are spawned, and their resolutions are posted
//! back as commands, so synchronously-resolving test doubles and real network delegates take
//! the identical path and the queue can only drain once per state exit.

// crates.io
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken, TokenPair},
	delegate::WardenDelegate,
	error::WardenDropped,
	obs::{self, EventOutcome, LifecycleEvent},
	store::{CredentialStore, StoredTokens},
	warden::{
		WardenMetrics, WardenState,
		queue::{GuardedCall, PendingQueue},
	},
};

/// Messages marshalled onto the actor; processed strictly in arrival order.
pub(crate) enum Command {
	/// A guarded call submitted through `with_access_token`.
	Guarded(GuardedCall),
	/// External resolution delivering fresh credentials.
	Authorize {
		/// Fresh bearer credential.
		access: AccessToken,
		/// Fresh renewal credential.
		refresh: RefreshToken,
	},
	/// External resolution failing a pending re-authorization.
	AbortAuthorization {
		/// Error delivered to every queued completion.
		error: AuthError,
	},
	/// Clears both credentials and drains the queue with `NoCredentials`.
	RemoveTokens,
	/// Installs (or replaces) the weakly-held delegate.
	SetDelegate(Weak<dyn WardenDelegate>),
	/// A dispatched action reported `Unauthorized`; the call is handed back for replay.
	ActionUnauthorized(GuardedCall),
	/// A spawned refresh exchange resolved.
	RefreshResolved {
		/// Single-flight token; stale generations are discarded.
		generation: u64,
		/// Outcome of the delegate exchange.
		outcome: Result<TokenPair>,
	},
	/// State read ordered after every previously submitted command.
	Settled(oneshot::Sender<WardenState>),
}

pub(crate) struct Actor {
	state: WardenState,
	access: Option<AccessToken>,
	refresh: Option<RefreshToken>,
	queue: PendingQueue,
	delegate: Option<Weak<dyn WardenDelegate>>,
	// Bumped whenever an in-flight refresh must not be allowed to resolve: a new exchange,
	// an external `authorize`, or a logout.
	generation: u64,
	// Weak so the actor exits once every handle and in-flight operation is gone.
	command_tx: mpsc::WeakUnboundedSender<Command>,
	state_tx: watch::Sender<WardenState>,
	mirror_tx: Option<mpsc::UnboundedSender<StoredTokens>>,
	metrics: Arc<WardenMetrics>,
}
impl Actor {
	pub(crate) fn spawn(
		access: Option<AccessToken>,
		refresh: Option<RefreshToken>,
		store: Option<Arc<dyn CredentialStore>>,
		metrics: Arc<WardenMetrics>,
	) -> (mpsc::UnboundedSender<Command>, watch::Receiver<WardenState>) {
		let initial = if access.is_none() && refresh.is_none() {
			WardenState::Unauthorized
		} else {
			WardenState::Authorized
		};
		let (command_tx, command_rx) = mpsc::unbounded_channel();
		let (state_tx, state_rx) = watch::channel(initial);
		let actor = Self {
			state: initial,
			access,
			refresh,
			queue: PendingQueue::default(),
			delegate: None,
			generation: 0,
			command_tx: command_tx.downgrade(),
			state_tx,
			mirror_tx: store.map(spawn_mirror),
			metrics,
		};

		tokio::spawn(actor.run(command_rx));

		(command_tx, state_rx)
	}

	async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
		while let Some(command) = commands.recv().await {
			self.handle(command);
		}

		if !self.queue.is_empty() {
			debug!(pending = self.queue.len(), "warden went away with calls still queued");
			self.drain_with_error(AuthError::other(WardenDropped));
		}
	}

	fn handle(&mut self, command: Command) {
		match command {
			Command::Guarded(call) => self.on_guarded(call),
			Command::Authorize { access, refresh } => self.on_authorize(access, refresh),
			Command::AbortAuthorization { error } => self.on_abort_authorization(error),
			Command::RemoveTokens => self.on_remove_tokens(),
			Command::SetDelegate(delegate) => self.delegate = Some(delegate),
			Command::ActionUnauthorized(call) => self.on_action_unauthorized(call),
			Command::RefreshResolved { generation, outcome } =>
				self.on_refresh_resolved(generation, outcome),
			Command::Settled(reply) => {
				let _ = reply.send(self.state);
			},
		}
	}

	fn on_guarded(&mut self, call: GuardedCall) {
		if self.state.is_authenticating() {
			self.queue.push(call);

			return;
		}

		let Some(token) = self.access.clone() else {
			self.queue.push(call);
			self.begin_authentication();

			return;
		};

		if self.should_token_expire(&token) {
			self.queue.push(call);
			self.begin_authentication();

			return;
		}

		self.dispatch(call, token);
	}

	fn on_action_unauthorized(&mut self, call: GuardedCall) {
		if call.replayed() {
			// The single replay is exhausted; surface instead of cycling forever.
			call.fail(AuthError::Unauthorized);

			return;
		}

		self.clear_access();
		self.queue.push(call.into_replay());
		self.begin_authentication();
	}

	fn on_refresh_resolved(&mut self, generation: u64, outcome: Result<TokenPair>) {
		if generation != self.generation || self.state != WardenState::Refreshing {
			debug!(
				generation,
				current = self.generation,
				state = %self.state,
				"discarding stale refresh resolution"
			);

			return;
		}

		match outcome {
			Ok(pair) => {
				self.metrics.record_refresh_success();
				obs::record_lifecycle_outcome(LifecycleEvent::Refresh, EventOutcome::Success);
				self.set_tokens(Some(pair.access), Some(pair.refresh));
				self.set_state(WardenState::Authorized);
				self.drain_with_token();
			},
			Err(AuthError::Unauthorized) => {
				// The refresh token itself is no longer valid; do not retry the exchange.
				self.metrics.record_refresh_failure();
				obs::record_lifecycle_outcome(LifecycleEvent::Refresh, EventOutcome::Failure);
				self.set_tokens(None, None);
				self.begin_reauthorization();
			},
			Err(error) => {
				// Access stays cleared and the prior refresh token is retained; the next
				// guarded call starts a fresh exchange.
				self.metrics.record_refresh_failure();
				obs::record_lifecycle_outcome(LifecycleEvent::Refresh, EventOutcome::Failure);
				self.set_state(WardenState::Authorized);
				self.drain_with_error(error);
			},
		}
	}

	fn on_authorize(&mut self, access: AccessToken, refresh: RefreshToken) {
		if self.state == WardenState::Refreshing {
			debug!("external authorization supersedes the in-flight refresh");
		}

		self.generation += 1;
		self.set_tokens(Some(access), Some(refresh));
		self.set_state(WardenState::Authorized);
		obs::record_lifecycle_outcome(LifecycleEvent::Authorization, EventOutcome::Success);
		self.drain_with_token();
	}

	fn on_abort_authorization(&mut self, error: AuthError) {
		if self.state != WardenState::Reauthorizing {
			debug!(state = %self.state, "ignoring abort outside of re-authorization");

			return;
		}

		obs::record_lifecycle_outcome(LifecycleEvent::Authorization, EventOutcome::Failure);
		self.set_state(WardenState::Unauthorized);
		self.drain_with_error(error);
	}

	fn on_remove_tokens(&mut self) {
		self.generation += 1;
		self.set_tokens(None, None);
		self.set_state(WardenState::Unauthorized);
		self.drain_with_error(AuthError::NoCredentials);
	}

	fn begin_authentication(&mut self) {
		// Re-entrant triggers while already authenticating are no-ops.
		if self.state.is_authenticating() {
			return;
		}

		self.clear_access();

		match self.refresh.clone() {
			Some(refresh) => self.begin_refresh(refresh),
			None => self.begin_reauthorization(),
		}
	}

	fn begin_refresh(&mut self, refresh: RefreshToken) {
		self.set_state(WardenState::Refreshing);
		self.generation += 1;
		self.metrics.record_refresh_attempt();
		obs::record_lifecycle_outcome(LifecycleEvent::Refresh, EventOutcome::Attempt);

		// With no delegate the machine stays pending in `Refreshing`; resolution can still
		// arrive through `authorize` or `abort_authorization`.
		let Some(delegate) = self.required_delegate("refresh") else { return };
		let Some(resolver) = self.command_tx.upgrade() else { return };
		let generation = self.generation;

		tokio::spawn(async move {
			let outcome = delegate.requires_refresh(refresh).await;
			let _ = resolver.send(Command::RefreshResolved { generation, outcome });
		});
	}

	fn begin_reauthorization(&mut self) {
		self.set_state(WardenState::Reauthorizing);
		self.metrics.record_authorization_request();
		obs::record_lifecycle_outcome(LifecycleEvent::Authorization, EventOutcome::Attempt);

		if let Some(delegate) = self.required_delegate("re-authorization") {
			delegate.requires_authorization();
		}
	}

	fn dispatch(&self, call: GuardedCall, token: AccessToken) {
		let resolver = self.command_tx.upgrade();

		tokio::spawn(async move {
			let Some(call) = call.invoke(token).await else { return };
			let Some(resolver) = resolver else {
				call.fail(AuthError::other(WardenDropped));

				return;
			};

			if let Err(returned) = resolver.send(Command::ActionUnauthorized(call)) {
				if let Command::ActionUnauthorized(call) = returned.0 {
					call.fail(AuthError::other(WardenDropped));
				}
			}
		});
	}

	fn drain_with_token(&mut self) {
		let Some(token) = self.access.clone() else { return };

		for call in self.queue.take() {
			self.metrics.record_replayed_action();
			self.dispatch(call, token.clone());
		}
	}

	fn drain_with_error(&mut self, error: AuthError) {
		for call in self.queue.take() {
			call.fail(error.clone());
		}
	}

	fn set_tokens(&mut self, access: Option<AccessToken>, refresh: Option<RefreshToken>) {
		self.access = access;
		self.refresh = refresh;

		if let Some(delegate) = self.live_delegate() {
			delegate.did_update_tokens(self.access.as_ref(), self.refresh.as_ref());
		}
		if let Some(mirror) = &self.mirror_tx {
			let _ = mirror
				.send(StoredTokens { access: self.access.clone(), refresh: self.refresh.clone() });
		}
	}

	fn clear_access(&mut self) {
		if self.access.is_some() {
			let refresh = self.refresh.clone();

			self.set_tokens(None, refresh);
		}
	}

	fn set_state(&mut self, state: WardenState) {
		if self.state == state {
			return;
		}

		debug!(from = %self.state, to = %state, "state transition");

		self.state = state;

		let _ = self.state_tx.send(state);

		if let Some(delegate) = self.live_delegate() {
			delegate.did_update_state(state);
		}
	}

	fn should_token_expire(&self, token: &AccessToken) -> bool {
		match self.live_delegate() {
			Some(delegate) => delegate.should_token_expire(token),
			None => {
				debug!("no delegate is bound; treating the access token as not expired");

				false
			},
		}
	}

	fn live_delegate(&self) -> Option<Arc<dyn WardenDelegate>> {
		self.delegate.as_ref().and_then(Weak::upgrade)
	}

	fn required_delegate(&self, operation: &'static str) -> Option<Arc<dyn WardenDelegate>> {
		let delegate = self.live_delegate();

		if delegate.is_none() {
			warn!(operation, "no delegate is bound; the request cannot be delivered");
		}

		delegate
	}
}

// Mirrors token snapshots into the store sequentially so write order is preserved without
// blocking the actor. Persist failures are logged and never affect the machine.
fn spawn_mirror(store: Arc<dyn CredentialStore>) -> mpsc::UnboundedSender<StoredTokens> {
	let (mirror_tx, mut mirror_rx) = mpsc::unbounded_channel::<StoredTokens>();

	tokio::spawn(async move {
		while let Some(snapshot) = mirror_rx.recv().await {
			if let Err(error) =
				store.persist(snapshot.access.as_ref(), snapshot.refresh.as_ref()).await
			{
				warn!(%error, "failed to mirror credentials into the store");
			}
		}
	});

	mirror_tx
}
