// crates.io
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, obs::Endpoint};

/// Future returned by [`EndpointSpan::instrument`].
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;

/// Filter applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "idp_proxy=info";

/// A span builder used by the endpoint handlers.
#[derive(Clone, Debug)]
pub struct EndpointSpan {
	span: tracing::Span,
}
impl EndpointSpan {
	/// Creates a new span tagged with the endpoint and provider label (`-` for shared routes).
	pub fn new(endpoint: Endpoint, provider: &'static str) -> Self {
		let span =
			tracing::info_span!("idp_proxy.request", endpoint = endpoint.as_str(), provider);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}

/// Installs the global fmt subscriber; repeated calls are ignored.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

	if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
		tracing::debug!(error = %e, "tracing subscriber already installed");
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = EndpointSpan::new(Endpoint::UserInfo, "github");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn init_tracing_is_idempotent() {
		init_tracing();
		init_tracing();
	}
}
