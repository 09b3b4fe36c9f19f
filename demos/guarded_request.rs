//! Demonstrates the guarded-call entry point: the first request is rejected as unauthorized,
//! the warden performs a single refresh through its delegate, and the queued caller is
//! replayed with the fresh token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use oauth2_warden::{
	auth::{AccessToken, RefreshToken, TokenPair},
	delegate::{DelegateFuture, WardenDelegate},
	error::AuthError,
	warden::{ActionFuture, Warden},
};

/// Delegate standing in for the token endpoint of an authorization server.
struct TokenEndpoint;
impl WardenDelegate for TokenEndpoint {
	fn requires_refresh(
		&self,
		refresh_token: RefreshToken,
	) -> DelegateFuture<'_, Result<TokenPair, AuthError>> {
		println!("delegate: exchanging {refresh_token:?} for a fresh pair");

		Box::pin(async {
			Ok(TokenPair::new(AccessToken::new("access-2"), RefreshToken::new("refresh-2")))
		})
	}

	fn requires_authorization(&self) {
		println!("delegate: interactive login required (not expected in this demo)");
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let warden =
		Warden::new(Some(AccessToken::new("access-1")), Some(RefreshToken::new("refresh-1")));
	let endpoint = Arc::new(TokenEndpoint);

	warden.set_delegate(&endpoint);

	let profile = warden
		.with_access_token(|token: AccessToken| -> ActionFuture<String> {
			Box::pin(async move {
				// The resource rejects the stale bearer token once; the replay succeeds.
				if token.expose() == "access-1" {
					println!("resource: 401 for the stale token");

					Err(AuthError::Unauthorized)
				} else {
					Ok(format!("profile fetched with {}", token.expose()))
				}
			})
		})
		.await?;

	println!("{profile}");
	println!(
		"refreshes: {} (succeeded: {})",
		warden.metrics().refresh_attempts(),
		warden.metrics().refresh_successes()
	);

	Ok(())
}
