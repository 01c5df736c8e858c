//! Shared request flow plus the per-verb wrappers built on top of it.
//!
//! A call moves through `SENT` into one of three branches: a non-401 response is parsed and
//! returned, a transport failure becomes [`Error::Network`], and a 401 runs the refresh
//! sub-protocol. A successful refresh leads to exactly one retry whose response is returned as-is
//! (even another 401); a failed refresh clears the credentials, fires the login redirect, and
//! ends in [`Error::Unauthenticated`].

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::ApiClient,
	envelope::ResponseEnvelope,
	error::{ConfigError, NetworkError},
	http::{ApiHttpClient, ApiRequest, ApiResponse, MultipartForm, RequestBody},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Per-call options accepted by [`ApiClient::request`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// HTTP verb; defaults to `GET`.
	pub method: Method,
	/// Request payload.
	pub body: RequestBody,
	/// Extra headers; these replace the client's defaults of the same name.
	pub headers: HeaderMap,
}
impl RequestOptions {
	/// Creates options for the provided verb with no body or extra headers.
	pub fn new(method: Method) -> Self {
		Self { method, ..Default::default() }
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let bytes =
			serde_json::to_vec(body).map_err(|source| ConfigError::BodySerialize { source })?;

		self.body = RequestBody::Json(bytes);

		Ok(self)
	}

	/// Uses `form` as a multipart payload.
	pub fn multipart(mut self, form: MultipartForm) -> Self {
		self.body = RequestBody::Multipart(form);

		self
	}

	/// Adds an extra header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);

		self
	}
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Issues an authenticated request, refreshing the session once on `401 Unauthorized`.
	///
	/// Returns the parsed [`ResponseEnvelope`] of the original call, or of its single retry. Fails
	/// with [`Error::Network`] when no HTTP response was received and with
	/// [`Error::Unauthenticated`] after the credentials were cleared and the login redirect
	/// fired.
	pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, &options.method, path);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result: Result<ResponseEnvelope> = span
			.instrument(async {
				let url = self.config.endpoint(path)?;
				let token = self.store.access_token().await?;
				let response =
					self.send(self.build_request(&url, &options, token.as_ref())?).await?;

				span.record_status(response.status);
				obs::record_response_status(KIND, response.status);

				if !response.is_unauthorized() {
					return Ok(ResponseEnvelope::from_response(&response));
				}

				span.note("request rejected with 401; refreshing credentials");

				let Some(fresh) = self.refresh(token.as_ref()).await else {
					self.force_unauthenticated().await;

					return Err(Error::Unauthenticated);
				};
				span.mark_retried();

				let retried = self.send(self.build_request(&url, &options, Some(&fresh))?).await?;

				span.record_status(retried.status);
				obs::record_response_status(KIND, retried.status);

				if retried.is_unauthorized() {
					span.note("retry rejected with 401; returning response as-is");
				}

				Ok(ResponseEnvelope::from_response(&retried))
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(Error::Unauthenticated) =>
				obs::record_call_outcome(KIND, CallOutcome::Unauthenticated),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// `GET path`.
	pub async fn get(&self, path: &str) -> Result<ResponseEnvelope> {
		self.request(path, RequestOptions::new(Method::GET)).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<T>(&self, path: &str, body: &T) -> Result<ResponseEnvelope>
	where
		T: ?Sized + Serialize,
	{
		self.request(path, RequestOptions::new(Method::POST).json(body)?).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put<T>(&self, path: &str, body: &T) -> Result<ResponseEnvelope>
	where
		T: ?Sized + Serialize,
	{
		self.request(path, RequestOptions::new(Method::PUT).json(body)?).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch<T>(&self, path: &str, body: &T) -> Result<ResponseEnvelope>
	where
		T: ?Sized + Serialize,
	{
		self.request(path, RequestOptions::new(Method::PATCH).json(body)?).await
	}

	/// `DELETE path`.
	pub async fn delete(&self, path: &str) -> Result<ResponseEnvelope> {
		self.request(path, RequestOptions::new(Method::DELETE)).await
	}

	/// `POST path` with a multipart payload (e.g. an image for disease detection).
	///
	/// No `Content-Type` header is set so the transport can add the multipart boundary.
	pub async fn upload(&self, path: &str, form: MultipartForm) -> Result<ResponseEnvelope> {
		self.request(path, RequestOptions::new(Method::POST).multipart(form)).await
	}

	/// Builds the wire request: JSON content type unless multipart, bearer token when present,
	/// then caller headers on top.
	pub(crate) fn build_request(
		&self,
		url: &Url,
		options: &RequestOptions,
		token: Option<&TokenSecret>,
	) -> Result<ApiRequest> {
		let mut request = ApiRequest::new(options.method.clone(), url.clone());
		let multipart = matches!(options.body, RequestBody::Multipart(_));

		if !multipart {
			request.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		}
		if let Some(token) = token {
			let mut value =
				HeaderValue::from_str(&token.bearer()).map_err(|_| ConfigError::InvalidToken)?;

			value.set_sensitive(true);
			request.headers.insert(AUTHORIZATION, value);
		}

		for name in options.headers.keys() {
			request.headers.remove(name);
		}
		for (name, value) in &options.headers {
			request.headers.append(name, value.clone());
		}

		if multipart {
			request.headers.remove(CONTENT_TYPE);
		}

		request.body = options.body.clone();

		Ok(request)
	}

	/// Hands `request` to the transport, mapping transport failures to [`NetworkError`].
	pub(crate) async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		self.http_client.execute(request).await.map_err(|e| {
			NetworkError::new(self.config.network_error_message.as_str(), e).into()
		})
	}

	async fn force_unauthenticated(&self) {
		// The redirect fires even when the store cannot be cleared.
		let _ = self.store.clear_all().await;

		self.redirect.redirect_to_login();
	}
}
