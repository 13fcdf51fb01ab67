//! Transport primitives for relaying requests to the upstream provider.
//!
//! The module exposes [`UpstreamHttpClient`] alongside the owned request/response shapes the
//! relays exchange with it, so deployments can swap the HTTP stack (or a test double) without
//! touching the adapter. The default [`ReqwestUpstreamClient`] lives behind the `reqwest` feature.

// crates.io
use axum::http::header::{self, HeaderName};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`UpstreamHttpClient::send`].
pub type UpstreamFuture<'a> =
	Pin<Box<dyn Future<Output = Result<UpstreamResponse, TransportError>> + 'a + Send>>;

/// Outbound request assembled by a relay.
#[derive(Clone, Debug)]
pub struct UpstreamRequest {
	/// Endpoint label used in diagnostics (`token`, `userinfo`).
	pub endpoint: &'static str,
	/// HTTP method.
	pub method: Method,
	/// Absolute upstream URL.
	pub url: Url,
	/// Headers sent upstream; nothing else from the caller leaks through.
	pub headers: HeaderMap,
	/// Request body, forwarded byte for byte.
	pub body: Bytes,
}
impl UpstreamRequest {
	/// Creates a request with no headers and an empty body.
	pub fn new(endpoint: &'static str, method: Method, url: Url) -> Self {
		Self { endpoint, method, url, headers: HeaderMap::new(), body: Bytes::new() }
	}

	/// Replaces the request body.
	pub fn with_body(mut self, body: Bytes) -> Self {
		self.body = body;

		self
	}

	/// Inserts (or overrides) a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}
}

/// Upstream answer, buffered so the relays can pass it through or reshape it.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
	/// Upstream status code, never remapped.
	pub status: StatusCode,
	/// Upstream response headers.
	pub headers: HeaderMap,
	/// Upstream response body.
	pub body: Bytes,
}
impl UpstreamResponse {
	/// Creates a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
		Self { status, headers, body: body.into() }
	}

	/// Returns the upstream `Content-Type`, if any.
	pub fn content_type(&self) -> Option<&HeaderValue> {
		self.headers.get(header::CONTENT_TYPE)
	}
}

/// Abstraction over HTTP transports capable of executing a single upstream call.
///
/// Implementations must not retry: one inbound request maps to at most one outbound call, and a
/// failure surfaces straight back to the caller. Timeouts belong to the transport itself.
pub trait UpstreamHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the full response.
	fn send(&self, request: UpstreamRequest) -> UpstreamFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are not followed: token and profile endpoints answer directly, and a redirect would
/// silently drop the overridden headers. GitHub's API rejects requests without a `User-Agent`,
/// so [`ReqwestUpstreamClient::new`] always sets one.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestUpstreamClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestUpstreamClient {
	/// `User-Agent` sent on every upstream call.
	pub const USER_AGENT: &'static str =
		concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

	/// Builds a client with the proxy's defaults and the provided timeout.
	pub fn new(timeout: Duration) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.user_agent(Self::USER_AGENT)
			.redirect(reqwest::redirect::Policy::none())
			.timeout(timeout)
			.build()
			.map_err(crate::error::ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl UpstreamHttpClient for ReqwestUpstreamClient {
	fn send(&self, request: UpstreamRequest) -> UpstreamFuture<'_> {
		Box::pin(async move {
			let UpstreamRequest { endpoint, method, url, headers, body } = request;
			let response = self
				.0
				.request(method, url)
				.headers(headers)
				.body(body)
				.send()
				.await
				.map_err(|e| TransportError::network(endpoint, e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(|e| TransportError::network(endpoint, e))?;

			Ok(UpstreamResponse { status, headers, body })
		})
	}
}
