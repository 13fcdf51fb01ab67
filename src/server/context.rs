// crates.io
use axum::http::{Uri, header};
// self
use crate::{_prelude::*, config::ProxyConfig, error::RequestError};

/// Header set by reverse proxies to carry the host the caller used.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Rules for deciding the public host of a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostPolicy {
	/// Fixed host; wins over anything the request carries.
	pub public_host: Option<String>,
	/// Honor `X-Forwarded-Host` ahead of `Host`.
	pub trust_forwarded_host: bool,
}
impl HostPolicy {
	/// Extracts the host policy from the runtime configuration.
	pub fn from_config(config: &ProxyConfig) -> Self {
		Self {
			public_host: config.public_host.clone(),
			trust_forwarded_host: config.trust_forwarded_host,
		}
	}

	/// Resolves the public host: configured host, trusted `X-Forwarded-Host`, `Host`, then the
	/// request URI authority.
	pub fn resolve(&self, headers: &HeaderMap, uri: &Uri) -> Result<String, RequestError> {
		if let Some(host) = &self.public_host {
			return Ok(host.clone());
		}

		let forwarded =
			self.trust_forwarded_host.then(|| header_host(headers, X_FORWARDED_HOST)).flatten();

		forwarded
			.or_else(|| header_host(headers, header::HOST.as_str()))
			.or_else(|| uri.authority().map(|a| a.as_str().to_owned()))
			.ok_or(RequestError::MissingHost)
	}
}

fn header_host(headers: &HeaderMap, name: &str) -> Option<String> {
	let raw = headers.get(name)?.to_str().ok()?;
	// Proxies chain forwarded values; the first one is the client-facing host.
	let host = raw.split(',').next()?.trim();

	(!host.is_empty()).then(|| host.to_owned())
}
