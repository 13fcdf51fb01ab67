//! Walks through the broker side of a GitHub sign-in against a local proxy mounted under a
//! `prod` stage, with `httpmock` standing in for github.com and api.github.com.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::Value;
use tokio::net::TcpListener;
use url::Url;
// self
use idp_proxy::{
	http::ReqwestUpstreamClient,
	obs,
	plan::ProxyPlan,
	provider::{ProviderDescriptor, ProviderKind, ProviderQuirks},
	reqwest::{Client, redirect},
	server::{self, HostPolicy},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_tracing();

	let github = MockServer::start_async().await;
	let token_mock = github
		.mock_async(|when, then| {
			when.method(POST)
				.path("/login/oauth/access_token")
				.header("accept", "application/json")
				.body("grant_type=authorization_code&code=demo-code&client_id=demo-client");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"gho_demo\",\"token_type\":\"bearer\",\"scope\":\"user\"}",
			);
		})
		.await;
	let user_mock = github
		.mock_async(|when, then| {
			when.method(GET).path("/user").header("authorization", "token gho_demo");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":583231,\"login\":\"octocat\",\"email\":null,\"company\":\"@github\"}",
			);
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderKind::Github)
		.authorization_endpoint(Url::parse(&github.url("/login/oauth/authorize"))?)
		.token_endpoint(Url::parse(&github.url("/login/oauth/access_token"))?)
		.userinfo_endpoint(Url::parse(&github.url("/user"))?)
		.quirks(ProviderQuirks::github())
		.build()?;
	let plan = ProxyPlan::builder().stage("prod").descriptor(descriptor).build()?;
	// The mock serves a self-signed certificate.
	let http_client = ReqwestUpstreamClient::with_client(
		Client::builder()
			.user_agent(ReqwestUpstreamClient::USER_AGENT)
			.redirect(redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.timeout(Duration::from_secs(5))
			.build()?,
	);
	let app = server::router(&plan, plan.adapter(Arc::new(http_client)), HostPolicy::default())?;
	let listener = TcpListener::bind("127.0.0.1:0").await?;
	let base = format!("http://{}/prod/github", listener.local_addr()?);
	let serving = tokio::spawn(server::serve_with(listener, app));
	let client = Client::new();
	let discovery = client
		.get(format!("{base}/.well-known/openid-configuration"))
		.send()
		.await?
		.text()
		.await?;
	let discovery = serde_json::from_str::<Value>(&discovery)?;

	println!("Issuer: {}.", discovery["issuer"]);
	println!("Users are sent to {}.", discovery["authorization_endpoint"]);

	let token = client
		.post(format!("{base}/access_token"))
		.header("content-type", "application/x-www-form-urlencoded")
		.header("accept", "text/html")
		.body("grant_type=authorization_code&code=demo-code&client_id=demo-client")
		.send()
		.await?
		.text()
		.await?;
	let token = serde_json::from_str::<Value>(&token)?;
	let access_token = token["access_token"].as_str().unwrap_or_default();

	println!("Exchanged the code for access token {access_token}.");

	let profile = client
		.get(format!("{base}/user"))
		.header("authorization", format!("Bearer {access_token}"))
		.send()
		.await?
		.text()
		.await?;
	let profile = serde_json::from_str::<Value>(&profile)?;

	println!("Subject {} signs in as {}.", profile["sub"], profile["email_or_fake"]);

	token_mock.assert_async().await;
	user_mock.assert_async().await;
	serving.abort();

	Ok(())
}
