//! `idp-proxy` binary: serves the OIDC compatibility proxy configured through `IDP_PROXY_*`.

// std
use std::sync::Arc;
// self
use idp_proxy::{config::ProxyConfig, error::Result, http::ReqwestUpstreamClient, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	obs::init_tracing();

	let config = ProxyConfig::from_env()?;
	let http_client = ReqwestUpstreamClient::new(config.upstream_timeout)?;

	tracing::info!(
		bind = %config.bind,
		stage = config.stage.as_deref().unwrap_or("<none>"),
		providers = ?config.providers,
		"starting idp-proxy"
	);

	server::serve(&config, Arc::new(http_client)).await
}
