//! HTTP surface: executes a [`ProxyPlan`] with `axum`.
//!
//! The route table is mounted at `/` and, when the plan carries a stage, again under `/{stage}`.
//! Handlers read the original request path (stage prefix included) so discovery can apply the
//! stage-elision rule exactly as the caller reached the proxy.

mod context;
mod endpoints;
mod response;

pub use context::*;
pub use response::*;

// crates.io
use axum::{
	Router,
	extract::{OriginalUri, State},
	routing::{MethodFilter, MethodRouter, on},
};
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	adapter::OidcAdapter,
	config::ProxyConfig,
	error::ConfigError,
	http::UpstreamHttpClient,
	plan::{ProxyPlan, RouteAction, RouteSpec},
};

/// Router state shared by every handler.
pub type SharedState = Arc<ServerState>;

/// Immutable per-process state.
#[derive(Debug)]
pub struct ServerState {
	/// Adapter serving the plan's providers.
	pub adapter: OidcAdapter,
	/// Stage segment, if any.
	pub stage: Option<String>,
	/// How the public host is resolved.
	pub host_policy: HostPolicy,
}

/// Builds the router executing `plan` through `adapter`.
pub fn router(
	plan: &ProxyPlan,
	adapter: OidcAdapter,
	host_policy: HostPolicy,
) -> Result<Router, ConfigError> {
	let mut routes = Router::new();

	for route in plan.routes() {
		routes = routes.route(&route.path, method_router(route)?);
	}

	let stage = plan.stage().map(ToOwned::to_owned);
	let state = Arc::new(ServerState { adapter, stage, host_policy });
	let app = match plan.stage() {
		Some(stage) => routes.clone().nest(&format!("/{stage}"), routes),
		None => routes,
	};

	Ok(app.with_state(state))
}

/// Loads the plan described by `config`, logs the broker registrations, and serves until a
/// shutdown signal arrives.
pub async fn serve(config: &ProxyConfig, http_client: Arc<dyn UpstreamHttpClient>) -> Result<()> {
	let plan = config.plan()?;

	for registration in plan.registrations() {
		tracing::info!(
			name = registration.name,
			issuer_url = registration.issuer_url.as_deref().unwrap_or("<unset>"),
			scopes = ?registration.scopes,
			attribute_request_method = registration.attribute_request_method,
			client_id = registration.client_id.as_deref().unwrap_or("<unset>"),
			"broker registration"
		);
	}

	let app = router(&plan, plan.adapter(http_client), HostPolicy::from_config(config))?;
	let listener = TcpListener::bind(config.bind).await?;

	serve_with(listener, app).await
}

/// Serves `app` on an already bound listener until a shutdown signal arrives.
pub async fn serve_with(listener: TcpListener, app: Router) -> Result<()> {
	tracing::info!(addr = %listener.local_addr()?, "listening");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("shutdown complete");

	Ok(())
}

fn method_router(route: &RouteSpec) -> Result<MethodRouter<SharedState>, ConfigError> {
	let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| {
		ConfigError::UnsupportedMethod { path: route.path.clone(), method: route.method.to_string() }
	})?;
	let method_router = match route.action {
		RouteAction::Jwks => on(filter, endpoints::jwks),
		RouteAction::Discovery(kind) => on(
			filter,
			move |State(state): State<SharedState>,
			      OriginalUri(uri): OriginalUri,
			      headers: HeaderMap| endpoints::discovery(state, kind, uri, headers),
		),
		RouteAction::TokenExchange(kind) => on(
			filter,
			move |State(state): State<SharedState>, headers: HeaderMap, body: Bytes| {
				endpoints::token_exchange(state, kind, headers, body)
			},
		),
		RouteAction::UserInfo(kind) => on(
			filter,
			move |State(state): State<SharedState>,
			      OriginalUri(uri): OriginalUri,
			      headers: HeaderMap| endpoints::user_info(state, kind, uri, headers),
		),
	};

	Ok(method_router)
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for ctrl-c");
			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("shutdown requested");
}
