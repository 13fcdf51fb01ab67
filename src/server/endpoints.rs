// crates.io
use axum::{
	Json,
	http::{Uri, header},
	response::{IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	discovery::{IssuerContext, empty_jwks},
	obs::{self, Endpoint, EndpointSpan, RequestOutcome},
	provider::ProviderKind,
	server::SharedState,
};

pub(super) async fn jwks() -> Response {
	observe(Endpoint::Jwks, "-", static_jwks()).await
}

pub(super) async fn discovery(
	state: SharedState,
	kind: ProviderKind,
	uri: Uri,
	headers: HeaderMap,
) -> Response {
	observe(Endpoint::Discovery, kind.as_str(), discover(state, kind, uri, headers)).await
}

pub(super) async fn token_exchange(
	state: SharedState,
	kind: ProviderKind,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	observe(Endpoint::TokenExchange, kind.as_str(), relay_token(state, kind, headers, body)).await
}

pub(super) async fn user_info(
	state: SharedState,
	kind: ProviderKind,
	uri: Uri,
	headers: HeaderMap,
) -> Response {
	observe(Endpoint::UserInfo, kind.as_str(), relay_user_info(state, kind, uri, headers)).await
}

async fn static_jwks() -> Result<Response> {
	Ok(Json(empty_jwks()).into_response())
}

async fn discover(
	state: SharedState,
	kind: ProviderKind,
	uri: Uri,
	headers: HeaderMap,
) -> Result<Response> {
	let host = state.host_policy.resolve(&headers, &uri)?;
	let ctx = IssuerContext::new(&host, state.stage.as_deref(), uri.path());
	let document = state.adapter.discovery(kind, &ctx)?;

	Ok(Json(document).into_response())
}

async fn relay_token(
	state: SharedState,
	kind: ProviderKind,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response> {
	let response = state.adapter.exchange_token(kind, &headers, body).await?;

	Ok(response.into_response())
}

async fn relay_user_info(
	state: SharedState,
	kind: ProviderKind,
	uri: Uri,
	headers: HeaderMap,
) -> Result<Response> {
	let host = state.host_policy.resolve(&headers, &uri)?;
	let response = state.adapter.user_info(kind, headers.get(header::AUTHORIZATION), &host).await?;

	Ok(response.into_response())
}

async fn observe<Fut>(endpoint: Endpoint, provider: &'static str, fut: Fut) -> Response
where
	Fut: Future<Output = Result<Response>>,
{
	let span = EndpointSpan::new(endpoint, provider);

	span.instrument(async move {
		obs::record_request_outcome(endpoint, RequestOutcome::Attempt);

		match fut.await {
			Ok(response) => {
				obs::record_request_outcome(endpoint, RequestOutcome::Success);

				response
			},
			Err(e) => {
				obs::record_request_outcome(endpoint, RequestOutcome::Failure);

				if e.status().is_server_error() {
					tracing::error!(error = %e, status = e.status().as_u16(), "request failed");
				} else {
					tracing::warn!(error = %e, status = e.status().as_u16(), "request rejected");
				}

				e.into_response()
			},
		}
	})
	.await
}
