//! Refresh coordination with cooldown gating and a single-holder async lock.
//!
//! The coordinator exposes [`RefreshCoordinator::execute_refresh_with_lock`] so callers can
//! request a session renewal without worrying about concurrent attempts. Each call evaluates a
//! lock-free cooldown pre-check, acquires the refresh lock, re-checks the cooldown, and either
//! skips or invokes the injected refresh operation exactly once. Successful refreshes are
//! persisted through the [`SessionStoreAdapter`] before being returned.

// self
use crate::{
	_prelude::*,
	adapter::SessionStoreAdapter,
	error::RefreshError,
	session::Session,
};

/// Coordinates session renewal for a single session scope.
///
/// The upstream identity provider invalidates a refresh token on first use and rejects rapid
/// reuse within its reuse-prevention interval. The coordinator approximates that interval with a
/// local cooldown and serializes every refresh attempt through an async lock, so at most one
/// invocation of the injected operation is in flight at any instant and no two invocations start
/// within one cooldown window of each other.
pub struct RefreshCoordinator {
	adapter: SessionStoreAdapter,
	refresh_lock: AsyncMutex<()>,
	// Written only while `refresh_lock` is held; the lock-free pre-check read is a best-effort
	// shortcut, not a correctness guarantee.
	last_attempt: Mutex<OffsetDateTime>,
	cooldown: Duration,
	proximity_threshold: Duration,
}
impl RefreshCoordinator {
	/// Cooldown between refresh attempts, matching the provider's reuse-prevention interval.
	pub const REFRESH_COOLDOWN: Duration = Duration::seconds(10);
	/// Window before absolute expiry at which a session is considered due for renewal.
	pub const EXPIRY_PROXIMITY_THRESHOLD: Duration = Duration::minutes(5);

	/// Creates a coordinator on top of the provided session store adapter.
	pub fn new(adapter: SessionStoreAdapter) -> Self {
		Self {
			adapter,
			refresh_lock: AsyncMutex::new(()),
			last_attempt: Mutex::new(OffsetDateTime::UNIX_EPOCH),
			cooldown: Self::REFRESH_COOLDOWN,
			proximity_threshold: Self::EXPIRY_PROXIMITY_THRESHOLD,
		}
	}

	/// Overrides the cooldown between refresh attempts (defaults to 10 seconds).
	pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
		self.cooldown = cooldown;

		self
	}

	/// Overrides the expiry-proximity threshold (defaults to 5 minutes).
	pub fn with_proximity_threshold(mut self, threshold: Duration) -> Self {
		self.proximity_threshold = threshold;

		self
	}

	/// Returns the session store adapter the coordinator persists through.
	pub fn store(&self) -> &SessionStoreAdapter {
		&self.adapter
	}

	/// Determines whether the cached session is due for renewal at the current instant.
	///
	/// Pure and lock-free; safe to call concurrently from any number of callers.
	pub fn should_refresh(&self, expires_at: Option<OffsetDateTime>) -> bool {
		self.should_refresh_at(expires_at, OffsetDateTime::now_utc())
	}

	/// Determines whether the cached session is due for renewal at the provided instant.
	///
	/// An unknown expiry is treated as "refresh now". A session whose remaining lifetime equals
	/// the threshold exactly is not yet due.
	pub fn should_refresh_at(&self, expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
		match expires_at {
			Some(expires_at) => expires_at - now < self.proximity_threshold,
			None => true,
		}
	}

	/// Executes the injected refresh operation under the cooldown and the refresh lock.
	///
	/// Returns `None` without invoking the operation when a refresh ran within the cooldown
	/// window (a normal "try again later" signal, not an error). A successful refresh is
	/// persisted before it is returned; an operation failure is logged and suppressed, leaving
	/// any previously stored session untouched but stamping the cooldown so failing attempts
	/// cannot pile up.
	pub async fn execute_refresh_with_lock<F, Fut>(&self, refresh_operation: F) -> Option<Session>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Option<Session>, RefreshError>>,
	{
		let elapsed = OffsetDateTime::now_utc() - *self.last_attempt.lock();

		if elapsed < self.cooldown {
			tracing::debug!(remaining = %(self.cooldown - elapsed), "refresh in cooldown; skipping");

			return None;
		}

		let _guard = self.refresh_lock.lock().await;
		let now = OffsetDateTime::now_utc();

		{
			let mut last_attempt = self.last_attempt.lock();

			// Another caller may have completed a refresh while this one was blocked waiting.
			if now - *last_attempt < self.cooldown {
				tracing::debug!("skipping refresh; another refresh just completed");

				return None;
			}

			// Stamped before the operation runs so a long-running or failing attempt starts the
			// cooldown clock immediately.
			*last_attempt = now;
		}

		tracing::info!("executing session refresh");

		match refresh_operation().await {
			Ok(Some(session)) => {
				self.adapter.store_session(&session).await;
				tracing::info!(expires_at = %session.expires_at, "session refreshed");

				Some(session)
			},
			Ok(None) => {
				tracing::warn!("refresh operation returned no session");

				None
			},
			Err(e) => {
				let e = Error::from(e);

				tracing::error!(error = %e, "session refresh failed");

				None
			},
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("cooldown", &self.cooldown)
			.field("proximity_threshold", &self.proximity_threshold)
			.finish_non_exhaustive()
	}
}
