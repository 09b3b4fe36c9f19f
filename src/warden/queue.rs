//! Type-erased pending-call queue drained once per authentication resolution.
//!
//! Guarded calls are heterogeneous over their success type, so each entry is erased into a
//! thunk capturing its concrete completion internally. The queue only ever stores one uniform
//! callable shape; no runtime type inspection is needed.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{_prelude::*, auth::AccessToken, warden::ActionFuture};

/// Outcome of one optimistic or replayed action invocation.
enum AttemptStatus {
	/// The completion has been delivered; the call is finished.
	Resolved,
	/// The action reported `Unauthorized`; the call may still be replayed once.
	Unauthorized,
}

trait ErasedCall
where
	Self: Send,
{
	fn invoke(&mut self, token: AccessToken)
	-> Pin<Box<dyn Future<Output = AttemptStatus> + Send + '_>>;

	fn fail(&mut self, error: AuthError);
}

struct CallSite<T, A> {
	action: A,
	completion: Option<oneshot::Sender<Result<T>>>,
}
impl<T, A> CallSite<T, A> {
	fn resolve(&mut self, outcome: Result<T>) {
		// Delivered exactly once; a dropped receiver means the caller gave up waiting.
		if let Some(completion) = self.completion.take() {
			let _ = completion.send(outcome);
		}
	}
}
impl<T, A> ErasedCall for CallSite<T, A>
where
	T: 'static + Send,
	A: 'static + FnMut(AccessToken) -> ActionFuture<T> + Send,
{
	fn invoke(
		&mut self,
		token: AccessToken,
	) -> Pin<Box<dyn Future<Output = AttemptStatus> + Send + '_>> {
		Box::pin(async move {
			match (self.action)(token).await {
				Ok(value) => {
					self.resolve(Ok(value));

					AttemptStatus::Resolved
				},
				Err(AuthError::Unauthorized) => AttemptStatus::Unauthorized,
				Err(error) => {
					self.resolve(Err(error));

					AttemptStatus::Resolved
				},
			}
		})
	}

	fn fail(&mut self, error: AuthError) {
		self.resolve(Err(error));
	}
}

/// A captured guarded call: the action plus its completion, erased to one uniform shape.
pub(crate) struct GuardedCall {
	inner: Box<dyn ErasedCall>,
	replayed: bool,
}
impl GuardedCall {
	pub(crate) fn new<T, A>(action: A, completion: oneshot::Sender<Result<T>>) -> Self
	where
		T: 'static + Send,
		A: 'static + FnMut(AccessToken) -> ActionFuture<T> + Send,
	{
		Self { inner: Box::new(CallSite { action, completion: Some(completion) }), replayed: false }
	}

	/// Marks the call as having consumed its one replay; a second `Unauthorized` must surface.
	pub(crate) fn into_replay(mut self) -> Self {
		self.replayed = true;

		self
	}

	pub(crate) fn replayed(&self) -> bool {
		self.replayed
	}

	/// Runs the action once with the provided token.
	///
	/// Hands the call back when the action reported `Unauthorized`, so the owner can queue it
	/// for replay or surface the failure; in every other case the completion has already fired.
	pub(crate) async fn invoke(mut self, token: AccessToken) -> Option<Self> {
		match self.inner.invoke(token).await {
			AttemptStatus::Resolved => None,
			AttemptStatus::Unauthorized => Some(self),
		}
	}

	/// Delivers a terminal error without running the action.
	pub(crate) fn fail(mut self, error: AuthError) {
		self.inner.fail(error);
	}
}

/// Strict FIFO of callers blocked behind an in-progress refresh or re-authorization.
#[derive(Default)]
pub(crate) struct PendingQueue(VecDeque<GuardedCall>);
impl PendingQueue {
	pub(crate) fn push(&mut self, call: GuardedCall) {
		self.0.push_back(call);
	}

	/// Takes the whole queue; entries pushed after this snapshot belong to the next cycle.
	pub(crate) fn take(&mut self) -> VecDeque<GuardedCall> {
		std::mem::take(&mut self.0)
	}

	pub(crate) fn len(&self) -> usize {
		self.0.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
