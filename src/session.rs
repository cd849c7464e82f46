//! Session data model shared by the adapter and the coordinator.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::_prelude::*;

/// Renewed credential produced by a successful refresh operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, absent when the provider omits rotation.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant derived from the provider response.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}
impl Session {
	/// Creates a session from an access token and its absolute expiry.
	pub fn new(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), refresh_token: None, expires_at }
	}

	/// Attaches the rotated refresh token issued alongside the access token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}
}

/// Persisted projection of a [`Session`] as read back from storage.
///
/// The adapter only produces this type when both tokens are present and non-empty; a session
/// without a refresh token cannot self-renew and is treated as absent. The expiry is
/// independently optional and an unknown expiry is treated as "needs refresh".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredSession {
	/// Access token secret read back from storage.
	pub access_token: TokenSecret,
	/// Refresh token secret read back from storage.
	pub refresh_token: TokenSecret,
	/// Expiry instant, absent when the stored value is missing or unparseable.
	#[serde(with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}
