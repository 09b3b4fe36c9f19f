//! Outbound contract the warden uses to reach its environment.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken, TokenPair},
	warden::WardenState,
};

/// Boxed future returned by asynchronous delegate calls.
pub type DelegateFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Environment collaborator performing refresh exchanges and surfacing interactive logins.
///
/// The warden holds its delegate weakly, never keeps it alive, and never issues two refresh
/// exchanges concurrently. Interactive re-authorization is only *announced* through
/// [`WardenDelegate::requires_authorization`]; its resolution arrives out-of-band via
/// [`Warden::authorize`](crate::warden::Warden::authorize) and
/// [`Warden::abort_authorization`](crate::warden::Warden::abort_authorization), because login
/// UIs are driven outside the warden's control flow.
pub trait WardenDelegate
where
	Self: Send + Sync,
{
	/// Exchanges a refresh token for a fresh token pair.
	///
	/// Returning [`AuthError::Unauthorized`] means the refresh token itself is no longer valid;
	/// the warden then clears both credentials and requests re-authorization instead of
	/// retrying the exchange.
	fn requires_refresh(&self, refresh_token: RefreshToken)
	-> DelegateFuture<'_, Result<TokenPair>>;

	/// Announces that interactive re-authorization is needed. Fire-and-forget.
	fn requires_authorization(&self);

	/// Marks the held access token as expired ahead of a reactive `Unauthorized` response,
	/// e.g. inside a near-expiry window. Defaults to `false`.
	fn should_token_expire(&self, _access_token: &AccessToken) -> bool {
		false
	}

	/// Observes every credential change. Notification only; must not block.
	fn did_update_tokens(&self, _access: Option<&AccessToken>, _refresh: Option<&RefreshToken>) {}

	/// Observes every state transition. Notification only; must not block.
	fn did_update_state(&self, _state: WardenState) {}
}
