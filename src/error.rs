//! Warden-level error vocabulary shared across the coordinator and its collaborators.

// self
use crate::_prelude::*;

/// Warden-wide result type alias returning [`AuthError`] by default.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Closed error set produced and interpreted by the warden.
///
/// `Unauthorized` is recovered locally: it drives a refresh or re-authorization and only
/// surfaces to a caller once a post-refresh replay fails as well. Every other kind is delivered
/// verbatim to the originating completion and never retried automatically.
#[derive(Clone, Debug, ThisError)]
pub enum AuthError {
	/// Credential was rejected by the resource or the refresh endpoint.
	#[error("Credential was rejected.")]
	Unauthorized,
	/// No refresh token is available to recover with.
	#[error("No credentials are available.")]
	NoCredentials,
	/// Interactive login flow was aborted.
	#[error("Login was cancelled.")]
	LoginCancelled,
	/// Opaque caller- or delegate-defined failure passed through unchanged.
	#[error("{source}")]
	Other {
		/// Shared domain failure; reference-counted so one drain error reaches every queued
		/// completion.
		#[source]
		source: Arc<dyn StdError + Send + Sync>,
	},
}
impl AuthError {
	/// Wraps a domain-specific failure into the passthrough variant.
	pub fn other(source: impl 'static + Send + Sync + StdError) -> Self {
		Self::Other { source: Arc::new(source) }
	}
}

/// Raised through [`AuthError::other`] when the warden goes away with calls still unresolved.
#[derive(Clone, Copy, Debug, ThisError)]
#[error("Warden was dropped while calls were still pending.")]
pub struct WardenDropped;
