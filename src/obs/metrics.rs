// crates.io
use http::StatusCode;
// self
use crate::{
	client::RefreshOutcome,
	obs::{CallKind, CallOutcome},
};

/// Bucket label for an HTTP status (`2xx`, `4xx`, ...).
pub fn status_class(status: StatusCode) -> &'static str {
	match status.as_u16() {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}

/// Increments `tokkatot_client_call_total{call, outcome}`.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"tokkatot_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Increments `tokkatot_client_response_total{call, class}` for every HTTP response received.
pub fn record_response_status(kind: CallKind, status: StatusCode) {
	let class = status_class(status);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"tokkatot_client_response_total",
			"call" => kind.as_str(),
			"class" => class
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, class);
	}
}

/// Increments `tokkatot_client_refresh_total{outcome}`.
pub fn record_refresh_outcome(outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("tokkatot_client_refresh_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
