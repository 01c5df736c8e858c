//! Client configuration: where the API lives and how the refresh exchange behaves.
//!
//! Build values through [`ClientConfig::builder`], which validates the base URL and endpoint
//! paths. Configurations deserialized from files should be checked with
//! [`ClientConfig::validate`] before use.

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Origin (and optional path prefix) every request path is appended to.
	pub base_url: Url,
	/// Token-exchange endpoint path.
	#[serde(default = "default_refresh_path")]
	pub refresh_path: String,
	/// Sign-in endpoint path.
	#[serde(default = "default_login_path")]
	pub login_path: String,
	/// User-facing message attached to transport failures.
	#[serde(default = "default_network_error_message")]
	pub network_error_message: String,
	/// Serializes refresh exchanges so concurrent 401s share one exchange.
	#[serde(default)]
	pub single_flight_refresh: bool,
}
impl ClientConfig {
	/// Default token-exchange path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/v1/auth/refresh";
	/// Default sign-in path.
	pub const DEFAULT_LOGIN_PATH: &'static str = "/v1/auth/login";
	/// Default message for transport failures.
	pub const DEFAULT_NETWORK_ERROR_MESSAGE: &'static str = "Network error. Check your connection.";

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a request path against the base URL.
	///
	/// Paths are appended verbatim (query strings included) after the base URL's own path, so a
	/// base of `https://farm.example.com/api` and a path of `/v1/farms` yield
	/// `https://farm.example.com/api/v1/farms`.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&joined).map_err(|source| ConfigError::InvalidPath { path: path.into(), source })
	}

	/// Fully-qualified token-exchange URL.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.refresh_path)
	}

	/// Fully-qualified sign-in URL.
	pub fn login_url(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.login_path)
	}
}

fn default_refresh_path() -> String {
	ClientConfig::DEFAULT_REFRESH_PATH.into()
}

fn default_login_path() -> String {
	ClientConfig::DEFAULT_LOGIN_PATH.into()
}

fn default_network_error_message() -> String {
	ClientConfig::DEFAULT_NETWORK_ERROR_MESSAGE.into()
}
