// crates.io
use http::{Method, StatusCode};
// self
use crate::{_prelude::*, obs::CallKind};

/// Future type returned by [`CallSpan::instrument`]; a passthrough when tracing is disabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future type returned by [`CallSpan::instrument`]; a passthrough when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span covering one client call, from the first send to the returned envelope.
///
/// Fields: `call`, `method`, `path`, plus `status` (last HTTP status seen) and `retried`
/// (whether the call was re-sent after a refresh), both recorded as the call progresses. Token
/// values never reach the span.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for a call of `kind` sending `method path`.
	pub fn new(kind: CallKind, method: &Method, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"tokkatot_client.call",
				call = kind.as_str(),
				method = %method,
				path,
				status = tracing::field::Empty,
				retried = false
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, method, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records the HTTP status of the latest response.
	pub fn record_status(&self, status: StatusCode) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("status", status.as_u16());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = status;
		}
	}

	/// Marks the call as re-sent with a refreshed token.
	pub fn mark_retried(&self) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("retried", true);
		}
	}

	/// Emits a debug-level event inside the span.
	pub fn note(&self, message: &'static str) {
		#[cfg(feature = "tracing")]
		{
			let _entered = self.span.enter();

			tracing::debug!("{message}");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = message;
		}
	}
}
