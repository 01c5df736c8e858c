//! Storage contracts and built-in store implementations for session credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding the session's credential pair and farm/coop selection.
///
/// Each slot is read and written independently; implementations must make every single-slot
/// operation atomic but are not required to offer cross-slot transactions. The client never
/// caches what it reads, so the store is the only source of truth for credentials.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the current access token, if any.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Fetches the current refresh token, if any.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Replaces the access token.
	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Replaces the refresh token.
	fn set_refresh_token(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes both tokens.
	fn clear_all(&self) -> StoreFuture<'_, ()>;

	/// Fetches the selected farm/coop identifiers.
	fn selection(&self) -> StoreFuture<'_, Selection>;

	/// Replaces the selected farm/coop identifiers.
	fn save_selection(&self, selection: Selection) -> StoreFuture<'_, ()>;

	/// Removes the selected farm/coop identifiers.
	fn clear_selection(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde_json) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Farm and coop the user is currently working in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
	/// Selected farm identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub farm_id: Option<String>,
	/// Selected coop identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub coop_id: Option<String>,
}

/// Everything a store keeps for one signed-in session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
	/// Access + refresh tokens.
	#[serde(default)]
	pub credentials: CredentialPair,
	/// Farm/coop selection.
	#[serde(default)]
	pub selection: Selection,
}
