//! Shared fixtures for the router integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use axum::{
	Router,
	body::{self, Body, Bytes},
	http::{HeaderMap, Request, StatusCode},
};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;
// self
use idp_proxy::{
	error::TransportError,
	http::{UpstreamFuture, UpstreamHttpClient, UpstreamRequest, UpstreamResponse},
	plan::ProxyPlan,
	provider::{ProviderDescriptor, ProviderKind, ProviderQuirks},
	server::{self, HostPolicy},
	url::Url,
};
#[cfg(feature = "reqwest")]
use idp_proxy::{
	http::ReqwestUpstreamClient,
	reqwest::{Client as ReqwestClient, redirect},
};

/// Buffered router answer.
pub struct Reply {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}
impl Reply {
	pub fn json(&self) -> Value {
		serde_json::from_slice(&self.body).expect("Response body should be JSON.")
	}
}

/// Transport double that records every request and answers with a canned response.
#[derive(Default)]
pub struct RecordingClient {
	pub requests: Mutex<Vec<UpstreamRequest>>,
	pub reply: Mutex<Option<UpstreamResponse>>,
}
impl RecordingClient {
	pub fn replying(response: UpstreamResponse) -> Self {
		Self { requests: Mutex::default(), reply: Mutex::new(Some(response)) }
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}
}
impl UpstreamHttpClient for RecordingClient {
	fn send(&self, request: UpstreamRequest) -> UpstreamFuture<'_> {
		let endpoint = request.endpoint;

		self.requests.lock().push(request);

		let reply = self.reply.lock().clone();

		Box::pin(async move {
			reply.ok_or_else(|| {
				TransportError::network(endpoint, std::io::Error::other("no canned reply"))
			})
		})
	}
}

/// Builds a GitHub descriptor whose upstream endpoints live under `base` (an `httpmock` URL).
pub fn github_descriptor(base: &str) -> ProviderDescriptor {
	let endpoint =
		|path: &str| Url::parse(&format!("{base}{path}")).expect("Mock endpoint should parse.");

	ProviderDescriptor::builder(ProviderKind::Github)
		.authorization_endpoint(endpoint("/login/oauth/authorize"))
		.token_endpoint(endpoint("/login/oauth/access_token"))
		.userinfo_endpoint(endpoint("/user"))
		.quirks(ProviderQuirks::github())
		.build()
		.expect("Mock GitHub descriptor should build.")
}

/// Builds a router for `descriptor` over `client`, optionally mounted under `stage`.
pub fn router_with(
	descriptor: ProviderDescriptor,
	stage: Option<&str>,
	client: Arc<dyn UpstreamHttpClient>,
	host_policy: HostPolicy,
) -> Router {
	let mut builder = ProxyPlan::builder().descriptor(descriptor);

	if let Some(stage) = stage {
		builder = builder.stage(stage);
	}

	let plan = builder.build().expect("Test plan should build.");

	server::router(&plan, plan.adapter(client), host_policy).expect("Test router should build.")
}

/// Reqwest transport that accepts the self-signed certificates `httpmock` serves.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_http_client() -> ReqwestUpstreamClient {
	let client = ReqwestClient::builder()
		.user_agent(ReqwestUpstreamClient::USER_AGENT)
		.redirect(redirect::Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.timeout(std::time::Duration::from_secs(5))
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestUpstreamClient::with_client(client)
}

/// Router backed by the reqwest transport, pointed at an `httpmock` provider.
#[cfg(feature = "reqwest")]
pub fn reqwest_router(descriptor: ProviderDescriptor, stage: Option<&str>) -> Router {
	router_with(descriptor, stage, Arc::new(test_reqwest_http_client()), HostPolicy::default())
}

/// Drives one request through the router in-process.
pub async fn call(app: Router, request: Request<Body>) -> Reply {
	let response = app.oneshot(request).await.expect("Router is infallible.");
	let status = response.status();
	let headers = response.headers().clone();
	let body =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Body should buffer.");

	Reply { status, headers, body }
}

/// `GET {uri}` carrying `Host: {host}`.
pub fn get(uri: &str, host: &str) -> Request<Body> {
	Request::get(uri).header("host", host).body(Body::empty()).expect("Request should build.")
}
