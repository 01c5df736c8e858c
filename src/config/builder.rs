// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every request path is appended to.
	pub base_url: Url,
	/// Token-exchange endpoint path.
	pub refresh_path: String,
	/// Sign-in endpoint path.
	pub login_path: String,
	/// User-facing message attached to transport failures.
	pub network_error_message: String,
	/// Whether concurrent refreshes share one exchange.
	pub single_flight_refresh: bool,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL and default paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: ClientConfig::DEFAULT_REFRESH_PATH.into(),
			login_path: ClientConfig::DEFAULT_LOGIN_PATH.into(),
			network_error_message: ClientConfig::DEFAULT_NETWORK_ERROR_MESSAGE.into(),
			single_flight_refresh: false,
		}
	}

	/// Overrides the token-exchange path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the sign-in path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the message reported for transport failures.
	pub fn network_error_message(mut self, message: impl Into<String>) -> Self {
		self.network_error_message = message.into();

		self
	}

	/// Enables or disables single-flight refresh.
	pub fn single_flight_refresh(mut self, enabled: bool) -> Self {
		self.single_flight_refresh = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			network_error_message: self.network_error_message,
			single_flight_refresh: self.single_flight_refresh,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_base_url(&self.base_url)?;
		validate_path("refresh", &self.refresh_path)?;
		validate_path("login", &self.login_path)?;

		Ok(())
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { url: url.to_string() });
	}

	match url.scheme() {
		"http" | "https" => Ok(()),
		scheme => Err(ConfigError::UnsupportedScheme { scheme: scheme.into() }),
	}
}

fn validate_path(field: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::RelativePath { field, path: path.into() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn builder_applies_defaults() {
		let config = ClientConfig::builder(url("https://farm.example.com"))
			.build()
			.expect("Default configuration should validate.");

		assert_eq!(config.refresh_path, "/v1/auth/refresh");
		assert_eq!(config.login_path, "/v1/auth/login");
		assert_eq!(config.network_error_message, "Network error. Check your connection.");
		assert!(!config.single_flight_refresh);
		assert_eq!(
			config.refresh_url().expect("Refresh URL should resolve.").as_str(),
			"https://farm.example.com/v1/auth/refresh",
		);
	}

	#[test]
	fn endpoint_appends_after_base_prefix() {
		let config = ClientConfig::builder(url("https://farm.example.com/api/"))
			.build()
			.expect("Prefixed base URL should validate.");
		let resolved = config
			.endpoint("/v1/farms/1/coops?page=2")
			.expect("Request path should resolve against the base URL.");

		assert_eq!(resolved.as_str(), "https://farm.example.com/api/v1/farms/1/coops?page=2");
		assert_eq!(
			config.endpoint("v1/alerts").expect("Relative path should resolve.").as_str(),
			"https://farm.example.com/api/v1/alerts",
		);
	}

	#[test]
	fn builder_rejects_bad_scheme_and_relative_paths() {
		let err = ClientConfig::builder(url("ftp://farm.example.com"))
			.build()
			.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { ref scheme } if scheme == "ftp"));

		let err = ClientConfig::builder(url("mailto:ops@farm.example.com"))
			.build()
			.expect_err("Opaque URLs should be rejected.");

		assert!(matches!(err, ConfigError::CannotBeABase { .. }));

		let err = ClientConfig::builder(url("https://farm.example.com"))
			.refresh_path("v1/auth/refresh")
			.build()
			.expect_err("Relative refresh paths should be rejected.");

		assert!(matches!(err, ConfigError::RelativePath { field: "refresh", .. }));
	}

	#[test]
	fn deserialized_config_fills_defaults() {
		let config: ClientConfig = serde_json::from_str(
			r#"{"base_url":"http://127.0.0.1:3000","single_flight_refresh":true}"#,
		)
		.expect("Minimal configuration should deserialize.");

		config.validate().expect("Deserialized configuration should validate.");

		assert!(config.single_flight_refresh);
		assert_eq!(config.login_path, ClientConfig::DEFAULT_LOGIN_PATH);
	}
}
