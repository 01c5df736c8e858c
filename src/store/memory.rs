//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	store::{CredentialStore, Selection, SessionSnapshot, StoreFuture},
};

type SessionCell = Arc<RwLock<SessionSnapshot>>;

/// Thread-safe storage backend that keeps the session in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SessionCell);
impl MemoryStore {
	/// Creates a store seeded with `credentials`.
	pub fn with_credentials(credentials: CredentialPair) -> Self {
		Self(Arc::new(RwLock::new(SessionSnapshot { credentials, ..Default::default() })))
	}

	/// Returns a copy of everything currently stored.
	pub fn snapshot(&self) -> SessionSnapshot {
		self.0.read().clone()
	}

	fn read_now<T>(cell: SessionCell, f: impl FnOnce(&SessionSnapshot) -> T) -> T {
		f(&cell.read())
	}

	fn write_now(cell: SessionCell, f: impl FnOnce(&mut SessionSnapshot)) {
		f(&mut cell.write());
	}
}
impl CredentialStore for MemoryStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(Self::read_now(cell, |s| s.credentials.access_token.clone())) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(Self::read_now(cell, |s| s.credentials.refresh_token.clone())) })
	}

	fn set_access_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::write_now(cell, |s| s.credentials.access_token = Some(token));

			Ok(())
		})
	}

	fn set_refresh_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::write_now(cell, |s| s.credentials.refresh_token = Some(token));

			Ok(())
		})
	}

	fn clear_all(&self) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::write_now(cell, |s| s.credentials = CredentialPair::default());

			Ok(())
		})
	}

	fn selection(&self) -> StoreFuture<'_, Selection> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(Self::read_now(cell, |s| s.selection.clone())) })
	}

	fn save_selection(&self, selection: Selection) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::write_now(cell, |s| s.selection = selection);

			Ok(())
		})
	}

	fn clear_selection(&self) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::write_now(cell, |s| s.selection = Selection::default());

			Ok(())
		})
	}
}
