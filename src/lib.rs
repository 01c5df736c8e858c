//! Authenticated HTTP client for the Tokkatot farm API: bearer injection, one-shot token refresh,
//! and forced sign-out behind a single request chokepoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod navigation;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		http::ReqwestHttpClient,
		navigation::LoginRedirect,
		store::{CredentialStore, MemoryStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestHttpClient>;

	/// Redirect target that only counts how many times it was triggered.
	#[derive(Debug, Default)]
	pub struct RecordingRedirect(AtomicUsize);
	impl RecordingRedirect {
		/// Returns the number of redirects observed so far.
		pub fn count(&self) -> usize {
			self.0.load(Ordering::SeqCst)
		}
	}
	impl LoginRedirect for RecordingRedirect {
		fn redirect_to_login(&self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	/// Builds a [`ClientConfig`] pointed at `base_url` with default paths.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder(
			Url::parse(base_url).expect("Test base URL should parse successfully."),
		)
		.build()
		.expect("Test client configuration should build successfully.")
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store, a recording redirect, and the
	/// default reqwest transport.
	pub fn build_reqwest_test_client(
		config: ClientConfig,
	) -> (ReqwestTestClient, Arc<MemoryStore>, Arc<RecordingRedirect>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let redirect = Arc::new(RecordingRedirect::default());
		let client = ApiClient::with_http_client(
			config,
			store,
			redirect.clone(),
			ReqwestHttpClient::default(),
		);

		(client, store_backend, redirect)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
