// std
use std::{
	io::{Error as IoError, ErrorKind},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use http::{HeaderName, HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
use parking_lot::Mutex;
use serde_json::json;
// self
use tokkatot_client::{
	auth::{CredentialPair, TokenSecret},
	client::{ApiClient, RequestOptions},
	config::{ClientConfig, ClientConfigBuilder},
	error::Error,
	http::{ApiHttpClient, ApiRequest, ApiResponse, MultipartForm, RequestBody, TransportFuture},
	store::{CredentialStore, MemoryStore, Selection},
	url::Url,
};

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, IoError> + Send + Sync;

/// Transport that records every request and answers from a closure.
struct FakeHttpClient {
	responder: Box<Responder>,
	latency: Option<Duration>,
	requests: Mutex<Vec<ApiRequest>>,
}
impl FakeHttpClient {
	fn new(
		responder: impl Fn(&ApiRequest) -> Result<ApiResponse, IoError> + Send + Sync + 'static,
	) -> Self {
		Self { responder: Box::new(responder), latency: None, requests: Mutex::new(Vec::new()) }
	}

	fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);

		self
	}

	fn requests(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}

	fn calls_to(&self, path: &str) -> usize {
		self.requests.lock().iter().filter(|request| request.url.path() == path).count()
	}
}
impl ApiHttpClient for FakeHttpClient {
	type TransportError = IoError;

	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let response = (self.responder)(&request);

			self.requests.lock().push(request);

			if let Some(latency) = self.latency {
				tokio::time::sleep(latency).await;
			}

			response
		})
	}
}

struct Harness {
	client: ApiClient<FakeHttpClient>,
	transport: Arc<FakeHttpClient>,
	store: Arc<MemoryStore>,
	redirects: Arc<AtomicUsize>,
}
impl Harness {
	fn new(transport: FakeHttpClient, credentials: CredentialPair) -> Self {
		Self::with_config(transport, credentials, |builder| builder)
	}

	fn with_config(
		transport: FakeHttpClient,
		credentials: CredentialPair,
		configure: impl FnOnce(ClientConfigBuilder) -> ClientConfigBuilder,
	) -> Self {
		let base_url = Url::parse("https://api.tokkatot.test").expect("Base URL should parse.");
		let config = configure(ClientConfig::builder(base_url))
			.build()
			.expect("Client configuration should build successfully.");
		let transport = Arc::new(transport);
		let store = Arc::new(MemoryStore::with_credentials(credentials));
		let redirects = Arc::new(AtomicUsize::new(0));
		let counter = redirects.clone();
		let client: ApiClient<FakeHttpClient> = ApiClient::with_http_client(
			config,
			store.clone(),
			Arc::new(move || {
				counter.fetch_add(1, Ordering::SeqCst);
			}),
			transport.clone(),
		);

		Self { client, transport, store, redirects }
	}

	fn redirects(&self) -> usize {
		self.redirects.load(Ordering::SeqCst)
	}
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Result<ApiResponse, IoError> {
	Ok(ApiResponse::new(status, body.to_string()))
}

/// Protected endpoints accept only `Bearer fresh`; the exchange always issues `fresh`.
fn rotating_backend(request: &ApiRequest) -> Result<ApiResponse, IoError> {
	if request.url.path() == "/v1/auth/refresh" {
		return json_response(
			StatusCode::OK,
			json!({ "success": true, "data": { "access_token": "fresh", "refresh_token": "r2" } }),
		);
	}

	match request.authorization() {
		Some("Bearer fresh") => json_response(StatusCode::OK, json!({ "success": true })),
		_ => Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, "")),
	}
}

#[tokio::test]
async fn anonymous_request_carries_no_authorization_header() {
	let harness = Harness::new(
		FakeHttpClient::new(|_| json_response(StatusCode::OK, json!({ "success": true }))),
		CredentialPair::default(),
	);
	let envelope = harness.client.get("/v1/health").await.expect("Request should succeed.");
	let requests = harness.transport.requests();

	assert!(envelope.success);
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].authorization(), None);
	assert_eq!(requests[0].content_type(), Some("application/json"));
	assert_eq!(requests[0].url.as_str(), "https://api.tokkatot.test/v1/health");
}

#[tokio::test]
async fn refreshed_request_hits_the_transport_exactly_twice() {
	let harness =
		Harness::new(FakeHttpClient::new(rotating_backend), CredentialPair::new("stale", "r1"));
	let envelope = harness
		.client
		.patch("/v1/coops/7", &json!({ "name": "North coop" }))
		.await
		.expect("Request should succeed after a refresh.");
	let requests = harness.transport.requests();

	assert!(envelope.success);
	assert_eq!(harness.transport.calls_to("/v1/coops/7"), 2);
	assert_eq!(harness.transport.calls_to("/v1/auth/refresh"), 1);
	assert_eq!(requests[0].authorization(), Some("Bearer stale"));
	assert_eq!(requests[1].authorization(), None, "The exchange must not carry a bearer token.");
	assert_eq!(requests[1].body.as_json(), Some(json!({ "refresh_token": "r1" })));
	assert_eq!(requests[2].authorization(), Some("Bearer fresh"));
	assert_eq!(requests[2].method, Method::PATCH);
	assert_eq!(requests[2].body.as_json(), Some(json!({ "name": "North coop" })));
	assert_eq!(harness.store.snapshot().credentials, CredentialPair::new("fresh", "r2"));
}

#[tokio::test]
async fn upload_omits_content_type_and_resends_form_on_retry() {
	let harness =
		Harness::new(FakeHttpClient::new(rotating_backend), CredentialPair::new("stale", "r1"));
	let form = MultipartForm::new().text("coop_id", "7").file(
		"image",
		"droppings.jpg",
		Some("image/jpeg"),
		vec![0xFF, 0xD8, 0xFF],
	);
	let envelope = harness
		.client
		.upload("/v1/ai/predict-disease", form.clone())
		.await
		.expect("Upload should succeed after a refresh.");
	let uploads = harness
		.transport
		.requests()
		.into_iter()
		.filter(|request| request.url.path() == "/v1/ai/predict-disease")
		.collect::<Vec<_>>();

	assert!(envelope.success);
	assert_eq!(uploads.len(), 2);

	for upload in &uploads {
		assert_eq!(upload.content_type(), None);
		assert!(matches!(&upload.body, RequestBody::Multipart(sent) if *sent == form));
	}
}

#[tokio::test]
async fn caller_headers_override_defaults() {
	let harness = Harness::new(
		FakeHttpClient::new(|_| json_response(StatusCode::OK, json!({ "success": true }))),
		CredentialPair::new("abc", "r1"),
	);
	let options = RequestOptions::new(Method::PATCH)
		.json(&json!({ "enabled": false }))
		.expect("JSON body should serialize.")
		.header(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"))
		.header(HeaderName::from_static("x-farm-id"), HeaderValue::from_static("farm-1"));

	harness.client.request("/v1/schedules/4", options).await.expect("Request should succeed.");

	let requests = harness.transport.requests();
	let sent = &requests[0];

	assert_eq!(sent.content_type(), Some("application/merge-patch+json"));
	assert_eq!(sent.headers.get_all(CONTENT_TYPE).iter().count(), 1);
	assert_eq!(sent.headers.get("x-farm-id").and_then(|value| value.to_str().ok()), Some("farm-1"));
	assert_eq!(sent.authorization(), Some("Bearer abc"));
}

#[tokio::test]
async fn transport_failure_on_exchange_ends_session() {
	let harness = Harness::new(
		FakeHttpClient::new(|request| {
			if request.url.path() == "/v1/auth/refresh" {
				Err(IoError::new(ErrorKind::ConnectionReset, "connection reset"))
			} else {
				Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, ""))
			}
		}),
		CredentialPair::new("stale", "r1"),
	);
	let err = harness
		.client
		.get("/v1/farms")
		.await
		.expect_err("An unreachable refresh endpoint should end the session.");

	assert!(matches!(err, Error::Unauthenticated));
	assert!(harness.store.snapshot().credentials.is_empty());
	assert_eq!(harness.redirects(), 1);
}

#[tokio::test]
async fn refresh_without_access_token_ends_session() {
	let bodies = [
		r#"{"success":true,"data":{}}"#,
		r#"{"success":true,"data":{"access_token":""}}"#,
		r#"{"success":true}"#,
		"<html>Service Unavailable</html>",
	];

	for body in bodies {
		let harness = Harness::new(
			FakeHttpClient::new(move |request| {
				if request.url.path() == "/v1/auth/refresh" {
					Ok(ApiResponse::new(StatusCode::OK, body))
				} else {
					Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, ""))
				}
			}),
			CredentialPair::new("stale", "r1"),
		);
		let err = harness
			.client
			.get("/v1/farms")
			.await
			.expect_err("An exchange without a usable access token should end the session.");

		assert!(matches!(err, Error::Unauthenticated), "Unexpected error for body {body}: {err:?}.");
		assert!(harness.store.snapshot().credentials.is_empty(), "Tokens kept for body {body}.");
		assert_eq!(harness.redirects(), 1, "Redirect count for body {body}.");
		assert_eq!(harness.transport.calls_to("/v1/farms"), 1, "Retry issued for body {body}.");
		assert_eq!(harness.transport.calls_to("/v1/auth/refresh"), 1);
		assert_eq!(harness.client.refresh_metrics.failures(), 1);
	}
}

#[tokio::test]
async fn transport_failure_on_retry_surfaces_network_error() {
	let harness = Harness::new(
		FakeHttpClient::new(|request| match request.authorization() {
			Some("Bearer fresh") => Err(IoError::new(ErrorKind::TimedOut, "timed out")),
			_ => rotating_backend(request),
		}),
		CredentialPair::new("stale", "r1"),
	);
	let err = harness
		.client
		.get("/v1/farms")
		.await
		.expect_err("A failed retry should surface as a network error.");

	assert!(matches!(err, Error::Network(_)));
	assert_eq!(harness.store.snapshot().credentials, CredentialPair::new("fresh", "r2"));
	assert_eq!(harness.redirects(), 0);
}

#[tokio::test]
async fn custom_network_error_message_is_used() {
	let harness = Harness::with_config(
		FakeHttpClient::new(|_| Err(IoError::new(ErrorKind::ConnectionRefused, "refused"))),
		CredentialPair::new("abc", "r1"),
		|builder| builder.network_error_message("Offline."),
	);
	let err = harness.client.get("/v1/farms").await.expect_err("Request should fail.");
	let Error::Network(network) = err else {
		panic!("Expected Error::Network, got {err:?}.");
	};

	assert_eq!(network.message(), "Offline.");
	assert_eq!(harness.client.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_exchange_independently_by_default() {
	let harness = Harness::new(
		FakeHttpClient::new(rotating_backend).with_latency(Duration::from_millis(50)),
		CredentialPair::new("stale", "r1"),
	);
	let (first, second) =
		tokio::join!(harness.client.get("/v1/farms"), harness.client.get("/v1/coops"));

	assert!(first.expect("First request should succeed.").success);
	assert!(second.expect("Second request should succeed.").success);
	assert_eq!(harness.transport.calls_to("/v1/auth/refresh"), 2);
	assert_eq!(harness.client.refresh_metrics.attempts(), 2);
}

#[tokio::test]
async fn single_flight_refresh_shares_one_exchange() {
	let harness = Harness::with_config(
		FakeHttpClient::new(rotating_backend).with_latency(Duration::from_millis(50)),
		CredentialPair::new("stale", "r1"),
		|builder| builder.single_flight_refresh(true),
	);
	let (first, second) =
		tokio::join!(harness.client.get("/v1/farms"), harness.client.get("/v1/coops"));

	assert!(first.expect("First request should succeed.").success);
	assert!(second.expect("Second request should succeed.").success);
	assert_eq!(harness.transport.calls_to("/v1/auth/refresh"), 1);
	assert_eq!(harness.transport.calls_to("/v1/farms"), 2);
	assert_eq!(harness.transport.calls_to("/v1/coops"), 2);
	assert_eq!(harness.client.refresh_metrics.attempts(), 2);
	assert_eq!(harness.client.refresh_metrics.successes(), 1);
	assert_eq!(harness.client.refresh_metrics.reuses(), 1);
	assert_eq!(harness.client.refresh_metrics.exchanges(), 1);
}

#[tokio::test]
async fn logout_clears_tokens_and_selection() {
	let harness =
		Harness::new(FakeHttpClient::new(rotating_backend), CredentialPair::new("abc", "r1"));

	harness.client.set_selected_farm_id(42).await.expect("Farm selection should be stored.");
	harness.client.set_selected_coop_id("coop-7").await.expect("Coop selection should be stored.");

	assert_eq!(
		harness.client.selection().await.expect("Selection should load."),
		Selection { farm_id: Some("42".into()), coop_id: Some("coop-7".into()) }
	);

	harness.client.logout().await.expect("Logout should succeed.");

	assert!(harness.store.snapshot().credentials.is_empty());
	assert_eq!(harness.client.selected_farm_id().await.expect("Selection should load."), None);
	assert_eq!(harness.client.selected_coop_id().await.expect("Selection should load."), None);
	assert_eq!(harness.redirects(), 1);
	assert!(harness.transport.requests().is_empty());
}

#[tokio::test]
async fn require_auth_redirects_only_without_access_token() {
	let signed_in =
		Harness::new(FakeHttpClient::new(rotating_backend), CredentialPair::access_only("abc"));
	let signed_out = Harness::new(FakeHttpClient::new(rotating_backend), CredentialPair::default());

	assert!(signed_in.client.require_auth().await.expect("Store should be readable."));
	assert_eq!(signed_in.redirects(), 0);
	assert!(!signed_out.client.require_auth().await.expect("Store should be readable."));
	assert_eq!(signed_out.redirects(), 1);

	signed_out
		.store
		.set_access_token(TokenSecret::new("abc"))
		.await
		.expect("Access token should be stored.");

	assert!(signed_out.client.is_authenticated().await.expect("Store should be readable."));
}
