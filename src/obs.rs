//! Observability helpers for the proxy endpoints.
//!
//! - Every handler runs inside a `tracing` span named `idp_proxy.request` carrying the `endpoint`
//!   and `provider` fields; [`init_tracing`] installs the fmt subscriber honoring `RUST_LOG`.
//! - Enable the `metrics` feature to increment the `idp_proxy_request_total` counter for every
//!   attempt/success/failure, labeled by `endpoint` + `outcome`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Endpoints served by the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Synthesized OIDC discovery document.
	Discovery,
	/// Static empty key set.
	Jwks,
	/// Token exchange relay.
	TokenExchange,
	/// User-info relay + profile reshaping.
	UserInfo,
}
impl Endpoint {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Discovery => "discovery",
			Endpoint::Jwks => "jwks",
			Endpoint::TokenExchange => "token_exchange",
			Endpoint::UserInfo => "user_info",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a handler.
	Attempt,
	/// Response produced (upstream errors relayed verbatim still count as success).
	Success,
	/// Proxy-generated error returned to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
