//! Session store adapter translating between the session model and key-value persistence.

// self
use crate::{
	_prelude::*,
	session::{Session, StoredSession, TokenSecret},
	store::{KeyValueStore, StoreError},
};

const ACCESS_TOKEN_KEY: &str = "session.access_token";
const REFRESH_TOKEN_KEY: &str = "session.refresh_token";
const SESSION_EXPIRY_KEY: &str = "session.expires_at";

/// Reads, writes, and erases the persisted session triple through a [`KeyValueStore`].
///
/// Every public operation is a swallow-and-log boundary: storage failures degrade to "no
/// session" on reads and to "in-memory only" on writes, and never propagate to the caller. A
/// session the adapter cannot persist is still usable for the remainder of the process lifetime;
/// the next successful refresh retries the persist.
#[derive(Clone)]
pub struct SessionStoreAdapter {
	store: Arc<dyn KeyValueStore>,
}
impl SessionStoreAdapter {
	/// Creates an adapter on top of the provided persistence backend.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// Reads the stored session, if a usable one exists.
	///
	/// Returns `None` when either token is missing or empty, and when the backend fails. An
	/// expiry value that fails to parse degrades to `expires_at: None` rather than discarding
	/// the whole session.
	pub async fn get_stored_session(&self) -> Option<StoredSession> {
		match self.read_session().await {
			Ok(session) => session,
			Err(e) => {
				tracing::error!(error = %e, "failed to read stored session");

				None
			},
		}
	}

	/// Persists all three session fields, logging instead of propagating backend failures.
	pub async fn store_session(&self, session: &Session) {
		if let Err(e) = self.write_session(session).await {
			tracing::error!(error = %e, "failed to persist session; keeping in-memory copy");
		}
	}

	/// Removes all three persisted fields, logging instead of propagating backend failures.
	pub async fn clear_session(&self) {
		if let Err(e) = self.erase_session().await {
			tracing::error!(error = %e, "failed to clear stored session");
		} else {
			tracing::debug!("session cleared");
		}
	}

	async fn read_session(&self) -> Result<Option<StoredSession>> {
		let access_token = self.store.get(ACCESS_TOKEN_KEY).await?;
		let refresh_token = self.store.get(REFRESH_TOKEN_KEY).await?;
		let expiry = self.store.get(SESSION_EXPIRY_KEY).await?;
		let (Some(access_token), Some(refresh_token)) = (
			access_token.filter(|token| !token.is_empty()),
			refresh_token.filter(|token| !token.is_empty()),
		) else {
			tracing::debug!("no stored session found");

			return Ok(None);
		};
		// A present but malformed expiry means "needs refresh", not "no session".
		let expires_at = expiry
			.filter(|value| !value.is_empty())
			.and_then(|value| OffsetDateTime::parse(&value, &Rfc3339).ok());

		Ok(Some(StoredSession {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			expires_at,
		}))
	}

	async fn write_session(&self, session: &Session) -> Result<()> {
		let expiry = session.expires_at.format(&Rfc3339).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to format expiry: {e}") }
		})?;

		self.store.set(ACCESS_TOKEN_KEY, session.access_token.expose()).await?;
		self.store
			.set(
				REFRESH_TOKEN_KEY,
				session.refresh_token.as_ref().map(TokenSecret::expose).unwrap_or(""),
			)
			.await?;
		self.store.set(SESSION_EXPIRY_KEY, &expiry).await?;

		tracing::debug!(expires_at = %session.expires_at, "session stored");

		Ok(())
	}

	async fn erase_session(&self) -> Result<()> {
		self.store.remove(ACCESS_TOKEN_KEY).await?;
		self.store.remove(REFRESH_TOKEN_KEY).await?;
		self.store.remove(SESSION_EXPIRY_KEY).await?;

		Ok(())
	}
}
impl Debug for SessionStoreAdapter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStoreAdapter").finish_non_exhaustive()
	}
}
