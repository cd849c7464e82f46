//! Crate-level error types shared by the adapter and the coordinator.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by internal fallible operations.
///
/// The public adapter and coordinator entry points never return this type; they catch it, log
/// it, and degrade to an absent result so an authentication hiccup cannot unwind past the
/// session layer.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Failure raised by the injected refresh operation.
	#[error("{0}")]
	Refresh(
		#[from]
		#[source]
		RefreshError,
	),
}

/// Failures the injected refresh operation may raise during the token exchange.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Provider rejected the refresh token (already used, rotated away, or revoked).
	#[error("Provider rejected the refresh token: {reason}.")]
	InvalidGrant {
		/// Provider- or caller-supplied reason string.
		reason: String,
	},
	/// Provider returned an unexpected but well-formed response.
	#[error("Provider returned an unexpected response: {message}.")]
	Provider {
		/// Human-readable summary of the response.
		message: String,
	},
	/// Underlying transport reported a network failure.
	#[error("Network error occurred while exchanging the refresh token.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl RefreshError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
