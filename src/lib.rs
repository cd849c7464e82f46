//! Serialized, cooldown-gated session token refresh coordination with pluggable key-value
//! persistence.
//!
//! Many independent call sites can discover an expiring token at roughly the same time. The
//! upstream identity provider invalidates a refresh token on first use and rejects rapid reuse,
//! so every renewal must funnel through a single, rate-limited critical section. The
//! [`coordinator::RefreshCoordinator`] provides exactly that: an expiry-proximity policy, a
//! cooldown matching the provider's reuse-prevention interval, and an async lock that admits at
//! most one refresh at a time.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod adapter;
pub mod coordinator;
pub mod error;
pub mod session;
pub mod store;

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use tokio as _;
