//! One-shot token refresh sub-protocol.
//!
//! The exchange posts the stored refresh token to the configured endpoint and accepts the result
//! only when the response is 2xx, reports `success: true`, and carries a non-empty
//! `data.access_token`. Every other outcome (no refresh token, transport failure, non-2xx,
//! malformed body, store failure) is folded into `None`; the refresh step never produces an
//! error of its own.
//!
//! Concurrent 401s each run their own exchange unless
//! [`ClientConfig::single_flight_refresh`](crate::config::ClientConfig::single_flight_refresh)
//! is set, in which case exchanges are serialized and a caller that finds the stale token already
//! replaced reuses the stored one.

mod metrics;

pub use self::metrics::{RefreshMetrics, RefreshOutcome};

// crates.io
use http::{HeaderValue, Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{RefreshRequest, TokenGrant, TokenSecret},
	client::ApiClient,
	envelope::ResponseEnvelope,
	http::{ApiHttpClient, ApiRequest, RequestBody},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Runs the refresh sub-protocol for a request that was rejected while carrying `stale`.
	///
	/// Returns the access token the retry must use.
	pub(crate) async fn refresh(&self, stale: Option<&TokenSecret>) -> Option<TokenSecret> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, &Method::POST, &self.config.refresh_path);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let resolved = span
			.instrument(async {
				if !self.config.single_flight_refresh {
					return self.exchange_refresh_token(&span).await.map(exchanged);
				}

				let _singleflight = self.refresh_guard.lock().await;

				match self.store.access_token().await {
					Ok(Some(current)) if Some(&current) != stale => {
						span.note("access token already replaced by a concurrent refresh");

						Some((current, RefreshOutcome::Reused))
					},
					Ok(_) => self.exchange_refresh_token(&span).await.map(exchanged),
					Err(_) => {
						span.note("credential store unavailable");

						None
					},
				}
			})
			.await;
		let outcome = resolved.as_ref().map_or(RefreshOutcome::Failed, |(_, outcome)| *outcome);

		self.refresh_metrics.record(outcome);
		obs::record_refresh_outcome(outcome);
		obs::record_call_outcome(KIND, match outcome {
			RefreshOutcome::Failed => CallOutcome::Failure,
			RefreshOutcome::Exchanged | RefreshOutcome::Reused => CallOutcome::Success,
		});

		resolved.map(|(token, _)| token)
	}

	async fn exchange_refresh_token(&self, span: &CallSpan) -> Option<TokenSecret> {
		let refresh_token = match self.store.refresh_token().await {
			Ok(Some(token)) => token,
			Ok(None) => {
				span.note("no refresh token stored; skipping exchange");

				return None;
			},
			Err(_) => {
				span.note("credential store unavailable");

				return None;
			},
		};
		let request = self.exchange_request(&refresh_token)?;

		self.refresh_metrics.record_exchange();

		let Ok(response) = self.http_client.execute(request).await else {
			span.note("token exchange failed at the transport layer");

			return None;
		};

		span.record_status(response.status);
		obs::record_response_status(CallKind::Refresh, response.status);

		if !response.status.is_success() {
			span.note("token exchange rejected");

			return None;
		}

		let grant = serde_json::from_slice::<ResponseEnvelope>(&response.body)
			.ok()
			.filter(|envelope| envelope.success)
			.and_then(|envelope| envelope.data_as::<TokenGrant>().ok())
			.filter(TokenGrant::has_access_token);
		let Some(grant) = grant else {
			span.note("token exchange returned no usable access token");

			return None;
		};

		if self.store.set_access_token(grant.access_token.clone()).await.is_err() {
			span.note("refreshed access token could not be stored");

			return None;
		}
		if let Some(rotated) = grant.issued_refresh_token() {
			// The new access token is already usable; a failed rotation keeps the old refresh
			// token in place.
			let _ = self.store.set_refresh_token(rotated.clone()).await;
		}

		Some(grant.access_token)
	}

	fn exchange_request(&self, refresh_token: &TokenSecret) -> Option<ApiRequest> {
		let url = self.config.refresh_url().ok()?;
		let body =
			serde_json::to_vec(&RefreshRequest { refresh_token: refresh_token.expose() }).ok()?;
		let mut request = ApiRequest::new(Method::POST, url);

		request.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		request.body = RequestBody::Json(body);

		Some(request)
	}
}

fn exchanged(token: TokenSecret) -> (TokenSecret, RefreshOutcome) {
	(token, RefreshOutcome::Exchanged)
}
