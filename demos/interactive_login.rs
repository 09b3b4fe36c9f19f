//! Demonstrates externally driven re-authorization: a logged-out warden announces that login
//! is needed, a simulated UI resolves it through [`Warden::authorize`], and the queued caller
//! is replayed with the fresh token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use tokio::sync::mpsc;
// self
use oauth2_warden::{
	auth::{AccessToken, RefreshToken, TokenPair},
	delegate::{DelegateFuture, WardenDelegate},
	error::AuthError,
	warden::{ActionFuture, Warden},
};

/// Delegate that forwards login requests to an out-of-band UI task.
struct LoginPrompt {
	requests: mpsc::UnboundedSender<()>,
}
impl WardenDelegate for LoginPrompt {
	fn requires_refresh(
		&self,
		_refresh_token: RefreshToken,
	) -> DelegateFuture<'_, Result<TokenPair, AuthError>> {
		Box::pin(async { Err(AuthError::Unauthorized) })
	}

	fn requires_authorization(&self) {
		println!("delegate: presenting the login screen");

		let _ = self.requests.send(());
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let warden = Warden::new(None, None);
	let (requests, mut login_screen) = mpsc::unbounded_channel();
	let prompt = Arc::new(LoginPrompt { requests });

	warden.set_delegate(&prompt);

	// The "UI": waits for the login announcement, then resolves it out-of-band.
	let resolver = warden.clone();
	let ui = tokio::spawn(async move {
		if login_screen.recv().await.is_some() {
			println!("ui: user signed in");

			resolver.authorize(AccessToken::new("access-1"), RefreshToken::new("refresh-1"));
		}
	});
	let inbox = warden
		.with_access_token(|token: AccessToken| -> ActionFuture<String> {
			Box::pin(async move { Ok(format!("inbox fetched with {}", token.expose())) })
		})
		.await?;

	println!("{inbox}");
	println!("logged in: {}", warden.is_logged_in());

	ui.await?;

	Ok(())
}
