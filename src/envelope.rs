//! Response envelope returned by every client call.
//!
//! The farm API wraps payloads as `{success, data, message}` on success and
//! `{success: false, error: {code, message}}` on failure, though some handlers reply with a bare
//! `{"error": "<message>"}` or an object without any envelope keys. Any JSON body is kept: unknown
//! top-level keys land in [`ResponseEnvelope::extra`] and non-object bodies land in
//! [`ResponseEnvelope::data`]. Only bodies that are not JSON at all are replaced by a minimal
//! envelope synthesized from the HTTP status.

// crates.io
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, http::ApiResponse};

/// Parsed result of an API call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
	/// Whether the call succeeded; taken from the HTTP status when the body does not say.
	#[serde(default)]
	pub success: bool,
	/// Response payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
	/// Human-readable message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Error reported by the server, either a bare string or a structured body.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ApiError>,
	/// HTTP status; only populated when the envelope was built by the client rather than parsed.
	#[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
	pub status: Option<u16>,
	/// Top-level keys outside the envelope shape.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl ResponseEnvelope {
	/// Parses the response body.
	///
	/// - JSON objects are read as envelopes; a missing `success` key is derived from the status.
	/// - Other JSON values become `data` of an envelope carrying the status.
	/// - Bodies that are not JSON fall back to [`ResponseEnvelope::synthesized`].
	pub fn from_response(response: &ApiResponse) -> Self {
		let Ok(value) = serde_json::from_slice::<Value>(&response.body) else {
			return Self::synthesized(response.status);
		};
		let Value::Object(object) = &value else {
			return Self::wrapping(response.status, value);
		};
		let reports_success = object.contains_key("success");

		match Self::deserialize(&value) {
			Ok(mut envelope) => {
				if !reports_success {
					envelope.success = response.status.is_success();
				}

				envelope
			},
			Err(_) => Self::wrapping(response.status, value),
		}
	}

	/// Minimal `{success: <2xx>, status}` envelope for unparsable bodies.
	pub fn synthesized(status: StatusCode) -> Self {
		Self { success: status.is_success(), status: Some(status.as_u16()), ..Default::default() }
	}

	/// `{success: false, message}` envelope used to render local failures.
	pub fn failure(message: impl Into<String>) -> Self {
		Self { success: false, message: Some(message.into()), ..Default::default() }
	}

	/// Deserializes `data` into `T`, reporting the JSON path of the first mismatch.
	///
	/// A missing `data` member is decoded as JSON `null`.
	pub fn data_as<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let value = self.data.clone().unwrap_or(Value::Null);

		serde_path_to_error::deserialize(value).map_err(|source| Error::Decode { source })
	}

	/// Best available human-readable message: the error first, then `message`.
	pub fn error_message(&self) -> Option<&str> {
		self.error
			.as_ref()
			.and_then(ApiError::message)
			.filter(|message| !message.is_empty())
			.or(self.message.as_deref())
	}

	fn wrapping(status: StatusCode, data: Value) -> Self {
		Self { data: Some(data), ..Self::synthesized(status) }
	}
}

/// Error member of an envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiError {
	/// `"error": "<message>"`.
	Message(String),
	/// `"error": {"code": ..., "message": ...}`.
	Body(ApiErrorBody),
	/// Any other JSON value.
	Other(Value),
}
impl ApiError {
	/// Machine-readable code, when the server sent one.
	pub fn code(&self) -> Option<&str> {
		match self {
			Self::Body(body) => Some(body.code.as_str()).filter(|code| !code.is_empty()),
			_ => None,
		}
	}

	/// Human-readable message, when the server sent one.
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::Message(message) => Some(message.as_str()),
			Self::Body(body) => Some(body.message.as_str()),
			Self::Other(_) => None,
		}
	}
}

/// Structured error body attached to failed envelopes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
	/// Machine-readable error code (e.g. `auth_failed`).
	#[serde(default)]
	pub code: String,
	/// Human-readable description.
	#[serde(default)]
	pub message: String,
}
