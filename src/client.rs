//! The authenticated request client and its verb surface.
//!
//! [`ApiClient`] is the single chokepoint for API traffic: it injects the stored bearer token,
//! reacts to `401 Unauthorized` with one refresh exchange followed by at most one retry, and
//! when the session cannot be recovered clears the credentials and fires the login redirect.

pub mod refresh;
pub mod request;
pub mod session;

pub use refresh::*;
pub use request::*;

// self
use crate::{
	_prelude::*, config::ClientConfig, http::ApiHttpClient, navigation::LoginRedirect,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Authenticated HTTP client for the farm API.
///
/// The client owns no credential state of its own: every call reads the token it needs from
/// the injected [`CredentialStore`] and writes refreshed tokens back to it. Clones share the
/// transport, store, redirect, metrics, and single-flight guard.
pub struct ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Store holding the session's tokens and farm/coop selection.
	pub store: Arc<dyn CredentialStore>,
	/// Side effect fired when authentication is irrecoverably lost.
	pub redirect: Arc<dyn LoginRedirect>,
	/// Validated client configuration.
	pub config: ClientConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		redirect: Arc<dyn LoginRedirect>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			redirect,
			config,
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a new client backed by a default reqwest transport.
	///
	/// Use [`ApiClient::with_http_client`] with [`ReqwestHttpClient::with_client`] to supply a
	/// reqwest client carrying custom timeouts or TLS settings.
	pub fn new(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		redirect: Arc<dyn LoginRedirect>,
	) -> Self {
		Self::with_http_client(config, store, redirect, ReqwestHttpClient::default())
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			redirect: self.redirect.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
