// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use time::{Duration, OffsetDateTime};
// self
use session_guard::{
	adapter::SessionStoreAdapter,
	coordinator::RefreshCoordinator,
	error::RefreshError,
	session::{Session, TokenSecret},
	store::MemoryStore,
};

fn make_coordinator() -> RefreshCoordinator {
	RefreshCoordinator::new(SessionStoreAdapter::new(Arc::new(MemoryStore::default())))
}

fn make_session(access: &str) -> Session {
	Session::new(access, OffsetDateTime::now_utc() + Duration::hours(1))
		.with_refresh_token(format!("{access}-refresh"))
}

#[tokio::test]
async fn successful_refresh_persists_and_returns_the_session() {
	let coordinator = make_coordinator();
	let refreshed = coordinator
		.execute_refresh_with_lock(|| async { Ok(Some(make_session("access-new"))) })
		.await
		.expect("First refresh outside the cooldown should produce a session.");

	assert_eq!(refreshed.access_token.expose(), "access-new");

	let stored = coordinator
		.store()
		.get_stored_session()
		.await
		.expect("Refreshed session should be persisted.");

	assert_eq!(stored.access_token.expose(), "access-new");
	assert_eq!(stored.refresh_token.expose(), "access-new-refresh");
	assert_eq!(stored.expires_at, Some(refreshed.expires_at));
}

#[tokio::test]
async fn back_to_back_calls_invoke_the_operation_once() {
	let coordinator = make_coordinator();
	let invocations = Arc::new(AtomicUsize::new(0));
	let counter = invocations.clone();
	let first = coordinator
		.execute_refresh_with_lock(|| async move {
			counter.fetch_add(1, Ordering::SeqCst);

			Ok(Some(make_session("access-1")))
		})
		.await;

	assert!(first.is_some());

	let counter = invocations.clone();
	let second = coordinator
		.execute_refresh_with_lock(|| async move {
			counter.fetch_add(1, Ordering::SeqCst);

			Ok(Some(make_session("access-2")))
		})
		.await;

	assert!(second.is_none(), "second call within the cooldown must be rejected");
	assert_eq!(invocations.load(Ordering::SeqCst), 1);

	let stored = coordinator
		.store()
		.get_stored_session()
		.await
		.expect("First refresh result should remain persisted.");

	assert_eq!(stored.access_token.expose(), "access-1");
}

#[tokio::test]
async fn concurrent_callers_admit_a_single_refresh() {
	let coordinator = Arc::new(make_coordinator());
	let invocations = Arc::new(AtomicUsize::new(0));
	let tasks: Vec<_> = (0..16)
		.map(|i| {
			let coordinator = coordinator.clone();
			let counter = invocations.clone();

			tokio::spawn(async move {
				coordinator
					.execute_refresh_with_lock(|| async move {
						counter.fetch_add(1, Ordering::SeqCst);

						Ok(Some(make_session(&format!("access-{i}"))))
					})
					.await
			})
		})
		.collect();
	let mut winners = 0;

	for task in tasks {
		if task.await.expect("Refresh task should not panic.").is_some() {
			winners += 1;
		}
	}

	assert_eq!(invocations.load(Ordering::SeqCst), 1, "operation must run at most once");
	assert_eq!(winners, 1, "exactly one caller should receive the refreshed session");
}

#[tokio::test]
async fn failing_operation_stamps_the_cooldown_and_keeps_the_stored_session() {
	let coordinator = make_coordinator();
	let previous = make_session("access-old");

	coordinator.store().store_session(&previous).await;

	let invocations = Arc::new(AtomicUsize::new(0));
	let counter = invocations.clone();
	let outcome = coordinator
		.execute_refresh_with_lock(|| async move {
			counter.fetch_add(1, Ordering::SeqCst);

			Err(RefreshError::InvalidGrant { reason: "refresh token already used".into() })
		})
		.await;

	assert!(outcome.is_none(), "a failed refresh degrades to an absent result");

	let stored = coordinator
		.store()
		.get_stored_session()
		.await
		.expect("Failed refresh must not corrupt the previously stored session.");

	assert_eq!(stored.access_token.expose(), "access-old");

	// The failure started the cooldown clock; an immediate retry is rejected without running.
	let counter = invocations.clone();
	let retry = coordinator
		.execute_refresh_with_lock(|| async move {
			counter.fetch_add(1, Ordering::SeqCst);

			Ok(Some(make_session("access-new")))
		})
		.await;

	assert!(retry.is_none());
	assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_refresh_result_is_suppressed_without_persisting() {
	let coordinator = make_coordinator();
	let outcome = coordinator
		.execute_refresh_with_lock(|| async { Ok(None) })
		.await;

	assert!(outcome.is_none());
	assert!(coordinator.store().get_stored_session().await.is_none());
}

#[tokio::test]
async fn refresh_proceeds_again_after_the_cooldown_elapses() {
	let coordinator = make_coordinator().with_cooldown(Duration::milliseconds(50));
	let first = coordinator
		.execute_refresh_with_lock(|| async { Ok(Some(make_session("access-1"))) })
		.await;

	assert!(first.is_some());

	tokio::time::sleep(std::time::Duration::from_millis(120)).await;

	let second = coordinator
		.execute_refresh_with_lock(|| async { Ok(Some(make_session("access-2"))) })
		.await
		.expect("Refresh after the cooldown elapsed should proceed.");

	assert_eq!(second.access_token.expose(), "access-2");

	let stored = coordinator
		.store()
		.get_stored_session()
		.await
		.expect("Second refresh result should replace the persisted session.");

	assert_eq!(stored.access_token.expose(), "access-2");
	assert_eq!(stored.refresh_token.expose(), "access-2-refresh");
}

#[tokio::test]
async fn expiring_session_flows_from_check_to_guarded_refresh() {
	let coordinator = make_coordinator();
	let now = OffsetDateTime::now_utc();
	let near_expiry = Session::new("access-old", now + Duration::seconds(200))
		.with_refresh_token("refresh-old");

	coordinator.store().store_session(&near_expiry).await;

	let stored = coordinator
		.store()
		.get_stored_session()
		.await
		.expect("Seeded session should be readable.");

	assert!(!coordinator.should_refresh(Some(now + Duration::seconds(3600))));
	assert!(coordinator.should_refresh(stored.expires_at));

	let refreshed = coordinator
		.execute_refresh_with_lock(|| async { Ok(Some(make_session("access-new"))) })
		.await
		.expect("Due session should be refreshed on the first guarded call.");

	assert_eq!(refreshed.refresh_token.as_ref().map(TokenSecret::expose), Some("access-new-refresh"));
}
