//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - `tracing` emits one `tokkatot_client.call` span per call with `call`, `method`, `path`,
//!   `status`, and `retried` fields.
//! - `metrics` maintains three counters:
//!   - `tokkatot_client_call_total{call, outcome}`
//!   - `tokkatot_client_response_total{call, class}` (HTTP status class of each response)
//!   - `tokkatot_client_refresh_total{outcome}` (`exchanged`, `reused`, `failed`)

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Authenticated API request (including its single retry).
	Request,
	/// Token-exchange sub-protocol.
	Refresh,
	/// Sign-in exchange.
	Login,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Authentication lost; credentials cleared and the login redirect fired.
	Unauthenticated,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Unauthenticated => "unauthenticated",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
