#![cfg(feature = "test")]

// std
use std::time::Duration;
// self
use oauth2_warden::_preludet::*;

async fn wait_for_snapshot(store: &MemoryStore, expected: &StoredTokens) {
	for _ in 0..200 {
		if store.snapshot() == *expected {
			return;
		}

		tokio::time::sleep(Duration::from_millis(5)).await;
	}

	panic!("Store never converged to the expected snapshot.");
}

fn snapshot(access: Option<&str>, refresh: Option<&str>) -> StoredTokens {
	StoredTokens { access: access.map(AccessToken::new), refresh: refresh.map(RefreshToken::new) }
}

#[tokio::test]
async fn store_contract_round_trips_a_snapshot() {
	let store = MemoryStore::default();
	let expected = snapshot(Some("A1"), Some("R1"));

	store
		.persist(expected.access.as_ref(), expected.refresh.as_ref())
		.await
		.expect("Memory store persist should succeed.");

	let loaded = store.load().await.expect("Memory store load should succeed.");

	assert_eq!(loaded, expected);
}

#[tokio::test]
async fn with_store_resumes_the_persisted_session() {
	let store = Arc::new(MemoryStore::default());
	let seeded = snapshot(Some("A1"), Some("R1"));

	store
		.persist(seeded.access.as_ref(), seeded.refresh.as_ref())
		.await
		.expect("Seeding the store should succeed.");

	let warden = Warden::with_store(store)
		.await
		.expect("Constructing from a seeded store should succeed.");

	assert_eq!(warden.state(), WardenState::Authorized);

	let value = warden
		.with_access_token(|token: AccessToken| -> ActionFuture<String> {
			Box::pin(async move { Ok(token.expose().to_owned()) })
		})
		.await
		.expect("Resumed session should serve the persisted token.");

	assert_eq!(value, "A1");
}

#[tokio::test]
async fn with_store_starts_unauthorized_when_empty() {
	let warden = Warden::with_store(Arc::new(MemoryStore::default()))
		.await
		.expect("Constructing from an empty store should succeed.");

	assert_eq!(warden.state(), WardenState::Unauthorized);
	assert!(!warden.is_logged_in());
}

#[tokio::test]
async fn credential_changes_are_mirrored_in_write_order() {
	let store = Arc::new(MemoryStore::default());
	let warden = Warden::with_store(store.clone())
		.await
		.expect("Constructing from an empty store should succeed.");

	warden.authorize(AccessToken::new("A1"), RefreshToken::new("R1"));
	warden.settled().await;
	wait_for_snapshot(&store, &snapshot(Some("A1"), Some("R1"))).await;

	warden.authorize(AccessToken::new("A2"), RefreshToken::new("R2"));
	warden.settled().await;
	wait_for_snapshot(&store, &snapshot(Some("A2"), Some("R2"))).await;

	warden.logout();
	warden.settled().await;
	wait_for_snapshot(&store, &StoredTokens::default()).await;
}

#[tokio::test]
async fn refresh_rotation_reaches_the_store() {
	let store = Arc::new(MemoryStore::default());

	store
		.persist(Some(&AccessToken::new("A1")), Some(&RefreshToken::new("R1")))
		.await
		.expect("Seeding the store should succeed.");

	let warden = Warden::with_store(store.clone())
		.await
		.expect("Constructing from a seeded store should succeed.");
	let delegate = Arc::new(ScriptedDelegate::default());

	delegate.script_refresh(|_| Ok(token_pair("A2", "R2")));
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
	wait_for_snapshot(&store, &snapshot(Some("A2"), Some("R2"))).await;
}
