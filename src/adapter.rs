//! The OIDC compatibility adapter: discovery synthesis, token relay, and user-info reshaping.
//!
//! [`OidcAdapter`] owns the upstream transport and one descriptor per attached provider. Each
//! operation serves one inbound request with at most one upstream call and no retries; the
//! request-building and response-shaping steps are exposed as free functions so they can be
//! exercised without a transport.
//!
//! The token relay performs no caller authentication. It forwards the body untouched and the
//! upstream authenticates the client credentials it carries; that is the accepted trust boundary.

// crates.io
use axum::http::header::{self, HeaderName};
// self
use crate::{
	_prelude::*,
	discovery::{DiscoveryDocument, IssuerContext},
	error::{ConfigError, RequestError, UpstreamError},
	http::{UpstreamHttpClient, UpstreamRequest, UpstreamResponse},
	provider::{ProviderDescriptor, ProviderKind, ProviderQuirks, normalize_profile},
};

/// Caller headers relayed to the token endpoint; everything else is dropped.
pub const TOKEN_FORWARDED_HEADERS: [HeaderName; 2] =
	[header::CONTENT_TYPE, header::AUTHORIZATION];

const BEARER_PREFIX: &str = "Bearer ";

/// Stateless adapter shared by every request.
#[derive(Clone)]
pub struct OidcAdapter {
	http_client: Arc<dyn UpstreamHttpClient>,
	descriptors: BTreeMap<ProviderKind, ProviderDescriptor>,
}
impl OidcAdapter {
	/// Creates an adapter with no providers attached.
	pub fn new(http_client: Arc<dyn UpstreamHttpClient>) -> Self {
		Self { http_client, descriptors: BTreeMap::new() }
	}

	/// Attaches (or replaces) the descriptor for its provider.
	pub fn with_descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
		self.descriptors.insert(descriptor.kind, descriptor);

		self
	}

	/// Returns the descriptor attached for `kind`.
	pub fn descriptor(&self, kind: ProviderKind) -> Result<&ProviderDescriptor> {
		self.descriptors.get(&kind).ok_or_else(|| {
			ConfigError::UnsupportedProvider { provider: kind.as_str().to_owned() }.into()
		})
	}

	/// Synthesizes the discovery document; never suspends and never calls upstream.
	pub fn discovery(&self, kind: ProviderKind, ctx: &IssuerContext) -> Result<DiscoveryDocument> {
		Ok(DiscoveryDocument::synthesize(self.descriptor(kind)?, ctx))
	}

	/// Relays a token exchange, returning the upstream status and body verbatim.
	pub async fn exchange_token(
		&self,
		kind: ProviderKind,
		caller_headers: &HeaderMap,
		body: Bytes,
	) -> Result<UpstreamResponse> {
		let request = token_request(self.descriptor(kind)?, caller_headers, body);
		let response = self.http_client.send(request).await?;

		tracing::debug!(
			provider = %kind,
			status = response.status.as_u16(),
			"token exchange relayed"
		);

		Ok(response)
	}

	/// Relays a profile lookup and reshapes successful responses into OIDC claims.
	pub async fn user_info(
		&self,
		kind: ProviderKind,
		authorization: Option<&HeaderValue>,
		host: &str,
	) -> Result<UpstreamResponse> {
		let descriptor = self.descriptor(kind)?;
		let request = user_info_request(descriptor, authorization)?;
		let response = self.http_client.send(request).await?;

		tracing::debug!(
			provider = %kind,
			status = response.status.as_u16(),
			"user-info relayed"
		);

		Ok(reshape_user_info(response, host, &descriptor.quirks)?)
	}
}
impl Debug for OidcAdapter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OidcAdapter")
			.field("providers", &self.descriptors.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

/// Builds the outbound token request: same body, selected caller headers, JSON forced.
pub fn token_request(
	descriptor: &ProviderDescriptor,
	caller_headers: &HeaderMap,
	body: Bytes,
) -> UpstreamRequest {
	let mut request =
		UpstreamRequest::new("token", Method::POST, descriptor.endpoints.token.clone())
			.with_body(body);

	for name in TOKEN_FORWARDED_HEADERS {
		if let Some(value) = caller_headers.get(&name) {
			request.headers.insert(name, value.clone());
		}
	}

	request.with_header(header::ACCEPT, HeaderValue::from_static("application/json"))
}

/// Builds the outbound profile request, rewriting the token scheme when the provider needs it.
pub fn user_info_request(
	descriptor: &ProviderDescriptor,
	authorization: Option<&HeaderValue>,
) -> Result<UpstreamRequest, RequestError> {
	let raw = authorization
		.ok_or(RequestError::MissingAuthorization)?
		.to_str()
		.map_err(|_| RequestError::InvalidAuthorization)?;
	let rewritten = rewrite_authorization(raw, descriptor.quirks.token_scheme.as_deref());
	let value =
		HeaderValue::from_str(&rewritten).map_err(|_| RequestError::InvalidAuthorization)?;

	Ok(UpstreamRequest::new("userinfo", Method::GET, descriptor.endpoints.userinfo.clone())
		.with_header(header::AUTHORIZATION, value))
}

/// Replaces a leading `Bearer ` keyword with `scheme`, leaving the token untouched.
///
/// The match is literal and case-sensitive; any other value is returned unchanged.
pub fn rewrite_authorization(value: &str, scheme: Option<&str>) -> String {
	match (scheme, value.strip_prefix(BEARER_PREFIX)) {
		(Some(scheme), Some(token)) => format!("{scheme} {token}"),
		_ => value.to_owned(),
	}
}

/// Reshapes a `200` profile response; any other status passes through untouched.
pub fn reshape_user_info(
	response: UpstreamResponse,
	host: &str,
	quirks: &ProviderQuirks,
) -> Result<UpstreamResponse, UpstreamError> {
	if response.status != StatusCode::OK {
		return Ok(response);
	}

	let body = normalize_profile(&response.body, host, quirks)?;
	let mut headers = HeaderMap::new();

	headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

	Ok(UpstreamResponse::new(StatusCode::OK, headers, body))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{error::TransportError, http::UpstreamFuture};

	fn github() -> ProviderDescriptor {
		ProviderDescriptor::github().expect("GitHub descriptor should build.")
	}

	#[test]
	fn bearer_scheme_is_rewritten_literally() {
		assert_eq!(rewrite_authorization("Bearer abc123", Some("token")), "token abc123");
		assert_eq!(rewrite_authorization("Bearer Bearer", Some("token")), "token Bearer");
		assert_eq!(rewrite_authorization("bearer abc123", Some("token")), "bearer abc123");
		assert_eq!(rewrite_authorization("token abc123", Some("token")), "token abc123");
		assert_eq!(rewrite_authorization("Basic dXNlcg==", Some("token")), "Basic dXNlcg==");
		assert_eq!(rewrite_authorization("Bearer abc123", None), "Bearer abc123");
	}

	#[test]
	fn token_request_forces_json_and_drops_other_headers() {
		let mut caller = HeaderMap::new();

		caller.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
		caller.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static("application/x-www-form-urlencoded"),
		);
		caller.insert(header::COOKIE, HeaderValue::from_static("session=1"));

		let request = token_request(&github(), &caller, Bytes::from_static(b"code=abc"));

		assert_eq!(request.method, Method::POST);
		assert_eq!(request.url.as_str(), "https://github.com/login/oauth/access_token");
		assert_eq!(request.headers[header::ACCEPT], "application/json");
		assert_eq!(request.headers[header::CONTENT_TYPE], "application/x-www-form-urlencoded");
		assert!(request.headers.get(header::COOKIE).is_none());
		assert_eq!(&request.body[..], b"code=abc");
	}

	#[test]
	fn user_info_request_requires_authorization() {
		let err = user_info_request(&github(), None).expect_err("Missing header must fail.");

		assert_eq!(err, RequestError::MissingAuthorization);

		let value = HeaderValue::from_static("Bearer abc123");
		let request =
			user_info_request(&github(), Some(&value)).expect("Bearer header should be accepted.");

		assert_eq!(request.url.as_str(), "https://api.github.com/user");
		assert_eq!(request.headers[header::AUTHORIZATION], "token abc123");
	}

	#[test]
	fn non_ok_profiles_pass_through() {
		let body = Bytes::from_static(b"{\"message\":\"Bad credentials\"}");
		let response =
			UpstreamResponse::new(StatusCode::UNAUTHORIZED, HeaderMap::new(), body.clone());
		let out = reshape_user_info(response, "h", &ProviderQuirks::github())
			.expect("Non-200 responses must not be parsed.");

		assert_eq!(out.status, StatusCode::UNAUTHORIZED);
		assert_eq!(out.body, body);
	}

	struct Unreachable;
	impl UpstreamHttpClient for Unreachable {
		fn send(&self, request: UpstreamRequest) -> UpstreamFuture<'_> {
			Box::pin(async move {
				let io = std::io::Error::other("The upstream must not be contacted.");

				Err(TransportError::network(request.endpoint, io))
			})
		}
	}

	#[tokio::test]
	async fn missing_authorization_short_circuits_upstream() {
		let adapter = OidcAdapter::new(Arc::new(Unreachable)).with_descriptor(github());
		let err = adapter
			.user_info(ProviderKind::Github, None, "h")
			.await
			.expect_err("Missing Authorization must be rejected.");

		assert!(matches!(err, Error::Request(RequestError::MissingAuthorization)));
	}

	#[test]
	fn unattached_provider_is_a_config_error() {
		let adapter = OidcAdapter::new(Arc::new(Unreachable));
		let ctx = IssuerContext::new("h", None, "/github/.well-known/openid-configuration");
		let err =
			adapter.discovery(ProviderKind::Github, &ctx).expect_err("No descriptor attached.");

		assert!(matches!(err, Error::Config(ConfigError::UnsupportedProvider { .. })));
	}
}
