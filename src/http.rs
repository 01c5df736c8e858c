//! Transport primitives for API calls.
//!
//! The module exposes [`ApiHttpClient`] alongside the transient [`ApiRequest`] and
//! [`ApiResponse`] descriptors so downstream crates (and tests) can plug in their own HTTP
//! stack. The client hands every request to [`ApiHttpClient::execute`] exactly as it should go
//! on the wire; implementations must not add authentication or retry on their own.

// crates.io
use http::{
	HeaderMap, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
#[cfg(feature = "reqwest")] use reqwest::multipart::{Form, Part};
// self
use crate::_prelude::*;

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports used by [`ApiClient`](crate::client::ApiClient).
///
/// The trait is the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single transport can be shared behind an `Arc` by cloned clients.
/// An `Err` return means no HTTP response was received at all (DNS, connect, TLS, or body read
/// failure); every HTTP status, including 4xx and 5xx, must be returned as `Ok`.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and collects the full response body.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Request descriptor built per call and discarded after the response is handled.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Outgoing headers, including `Authorization` when a token is stored.
	pub headers: HeaderMap,
	/// Request payload.
	pub body: RequestBody,
}
impl ApiRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: RequestBody::Empty }
	}

	/// Returns the raw `Authorization` header value, if any.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
	}

	/// Returns the raw `Content-Type` header value, if any.
	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
	}
}

/// Payload attached to an [`ApiRequest`].
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Serialized JSON document.
	Json(Vec<u8>),
	/// Multipart form; the transport chooses the boundary and sets `Content-Type` itself.
	Multipart(MultipartForm),
}
impl RequestBody {
	/// Parses a JSON body back into a value; `None` for empty, multipart, or invalid bodies.
	pub fn as_json(&self) -> Option<serde_json::Value> {
		match self {
			Self::Json(bytes) => serde_json::from_slice(bytes).ok(),
			_ => None,
		}
	}
}

/// Owned multipart payload that can be resent verbatim when a request is retried.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
	parts: Vec<MultipartPart>,
}
impl MultipartForm {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a text field.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parts.push(MultipartPart { name: name.into(), value: PartValue::Text(value.into()) });

		self
	}

	/// Appends a file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		file_name: impl Into<String>,
		content_type: Option<&str>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		self.parts.push(MultipartPart {
			name: name.into(),
			value: PartValue::File {
				file_name: file_name.into(),
				content_type: content_type.map(str::to_owned),
				bytes: bytes.into(),
			},
		});

		self
	}

	/// Returns the parts in insertion order.
	pub fn parts(&self) -> &[MultipartPart] {
		&self.parts
	}

	#[cfg(feature = "reqwest")]
	fn into_reqwest(self) -> Result<Form, ReqwestError> {
		let mut form = Form::new();

		for MultipartPart { name, value } in self.parts {
			form = match value {
				PartValue::Text(text) => form.text(name, text),
				PartValue::File { file_name, content_type, bytes } => {
					let mut part = Part::bytes(bytes).file_name(file_name);

					if let Some(mime) = content_type {
						part = part.mime_str(&mime)?;
					}

					form.part(name, part)
				},
			};
		}

		Ok(form)
	}
}

/// Single named field of a [`MultipartForm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartPart {
	/// Field name.
	pub name: String,
	/// Field content.
	pub value: PartValue,
}

/// Content of a multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartValue {
	/// Plain text value.
	Text(String),
	/// File upload.
	File {
		/// File name reported to the server.
		file_name: String,
		/// MIME type of the file, if known.
		content_type: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}

/// Fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response without headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns `true` for exactly HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Timeouts, proxies, and TLS roots are whatever the wrapped client was built with; the API
/// client itself defines none.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, url, headers, body } = request;
			let builder = client.request(method, url).headers(headers);
			let builder = match body {
				RequestBody::Empty => builder,
				RequestBody::Json(bytes) => builder.body(bytes),
				RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()?),
			};
			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
