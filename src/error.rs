//! Client-level error types shared across the request flow, stores, and configuration.

// self
use crate::{_prelude::*, envelope::ResponseEnvelope};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); no HTTP response was received.
	#[error(transparent)]
	Network(#[from] NetworkError),

	/// Authentication expired and the refresh exchange could not restore it.
	///
	/// Credentials have already been cleared and the login redirect has fired when this value is
	/// returned; callers must treat it as terminal.
	#[error("Authentication expired and could not be refreshed.")]
	Unauthenticated,
	/// Envelope data does not match the requested type.
	#[error("Response data could not be decoded: {source}.")]
	Decode {
		/// Structured decoding failure including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL uses a scheme other than `http` or `https`.
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme found on the configured base URL.
		scheme: String,
	},
	/// Base URL cannot have paths joined onto it (e.g. `mailto:` or `data:` URLs).
	#[error("Base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Configured endpoint path is not absolute.
	#[error("The {field} path must start with `/`: {path}.")]
	RelativePath {
		/// Configuration field that failed validation.
		field: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Stored access token contains bytes that are not valid in an HTTP header.
	#[error("Stored access token cannot be encoded as an HTTP header value.")]
	InvalidToken,
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	BodySerialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Transport-level failure surfaced as a structured value so UI code can render it uniformly.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct NetworkError {
	message: String,
	#[source]
	source: BoxError,
}
impl NetworkError {
	/// Wraps a transport-specific failure with the user-facing message.
	pub fn new(
		message: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self { message: message.into(), source: Box::new(src) }
	}

	/// User-facing message describing the failure.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Renders the failure as a `{success: false, message}` envelope.
	pub fn to_envelope(&self) -> ResponseEnvelope {
		ResponseEnvelope::failure(self.message.clone())
	}
}
