//! Environment-driven runtime configuration.
//!
//! Every variable is prefixed with `IDP_PROXY_`; blank values count as unset. Parsing happens
//! once at startup and any unusable value fails with [`ConfigError::InvalidEnv`] naming the
//! variable.

// std
use std::net::SocketAddr;
// self
use crate::{_prelude::*, error::ConfigError, plan::ProxyPlan, provider::ProviderKind};

/// Listen address.
pub const ENV_BIND: &str = "IDP_PROXY_BIND";
/// Deployment stage segment.
pub const ENV_STAGE: &str = "IDP_PROXY_STAGE";
/// Comma-separated provider identifiers.
pub const ENV_PROVIDERS: &str = "IDP_PROXY_PROVIDERS";
/// Public host override.
pub const ENV_PUBLIC_HOST: &str = "IDP_PROXY_PUBLIC_HOST";
/// Whether `X-Forwarded-Host` is honored.
pub const ENV_TRUST_FORWARDED_HOST: &str = "IDP_PROXY_TRUST_FORWARDED_HOST";
/// Upstream timeout in seconds.
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "IDP_PROXY_UPSTREAM_TIMEOUT_SECS";
/// Public base URL used in registration descriptions.
pub const ENV_PUBLIC_BASE_URL: &str = "IDP_PROXY_PUBLIC_BASE_URL";

const DEFAULT_BIND: SocketAddr =
	SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration for the proxy binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
	/// Address the listener binds to.
	pub bind: SocketAddr,
	/// Stage segment the routes are additionally mounted under.
	pub stage: Option<String>,
	/// Providers to mount, in order.
	pub providers: Vec<ProviderKind>,
	/// Host advertised in issuers and synthetic emails instead of the request's `Host`.
	pub public_host: Option<String>,
	/// Whether `X-Forwarded-Host` may override `Host`.
	pub trust_forwarded_host: bool,
	/// Timeout applied to each upstream call.
	pub upstream_timeout: Duration,
	/// Public URL the broker reaches the proxy at.
	pub public_base_url: Option<Url>,
	/// OAuth app client ids keyed by provider.
	pub client_ids: BTreeMap<ProviderKind, String>,
}
impl ProxyConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|var| std::env::var(var).ok())
	}

	/// Reads the configuration through `lookup`, which returns the raw value of a variable.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |var: &str| lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
		let bind = match get(ENV_BIND) {
			Some(raw) => raw.parse().map_err(|e| invalid(ENV_BIND, e))?,
			None => DEFAULT_BIND,
		};
		let stage = get(ENV_STAGE).map(|s| s.trim_matches('/').to_owned());
		let providers = match get(ENV_PROVIDERS) {
			Some(raw) => parse_providers(&raw)?,
			None => vec![ProviderKind::Github],
		};
		let public_host = get(ENV_PUBLIC_HOST);
		let trust_forwarded_host = match get(ENV_TRUST_FORWARDED_HOST) {
			Some(raw) => parse_bool(ENV_TRUST_FORWARDED_HOST, &raw)?,
			None => false,
		};
		let upstream_timeout = match get(ENV_UPSTREAM_TIMEOUT_SECS) {
			Some(raw) => parse_timeout(&raw)?,
			None => DEFAULT_UPSTREAM_TIMEOUT,
		};
		let public_base_url = match get(ENV_PUBLIC_BASE_URL) {
			Some(raw) => Some(Url::parse(&raw).map_err(|e| invalid(ENV_PUBLIC_BASE_URL, e))?),
			None => None,
		};
		let client_ids = providers
			.iter()
			.filter_map(|&kind| get(client_id_var(kind).as_str()).map(|id| (kind, id)))
			.collect();

		Ok(Self {
			bind,
			stage,
			providers,
			public_host,
			trust_forwarded_host,
			upstream_timeout,
			public_base_url,
			client_ids,
		})
	}

	/// Builds the route plan this configuration describes.
	pub fn plan(&self) -> Result<ProxyPlan, ConfigError> {
		let mut builder = ProxyPlan::builder();

		if let Some(stage) = &self.stage {
			builder = builder.stage(stage.clone());
		}
		for &kind in &self.providers {
			builder = builder.provider(kind);
		}
		if let Some(url) = &self.public_base_url {
			builder = builder.public_base_url(url.clone());
		}
		for (&kind, id) in &self.client_ids {
			builder = builder.client_id(kind, id.clone());
		}

		builder.build()
	}
}
impl Default for ProxyConfig {
	fn default() -> Self {
		Self {
			bind: DEFAULT_BIND,
			stage: None,
			providers: vec![ProviderKind::Github],
			public_host: None,
			trust_forwarded_host: false,
			upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
			public_base_url: None,
			client_ids: BTreeMap::new(),
		}
	}
}

/// Variable holding the OAuth app client id of `kind` (`IDP_PROXY_GITHUB_CLIENT_ID`).
pub fn client_id_var(kind: ProviderKind) -> String {
	format!("IDP_PROXY_{}_CLIENT_ID", kind.as_str().to_ascii_uppercase())
}

fn parse_providers(raw: &str) -> Result<Vec<ProviderKind>, ConfigError> {
	let providers = raw
		.split(',')
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.map(str::parse)
		.collect::<Result<Vec<ProviderKind>, _>>()?;

	if providers.is_empty() {
		return Err(invalid(ENV_PROVIDERS, "at least one provider is required"));
	}

	Ok(providers)
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
	match raw.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(invalid(var, format!("expected a boolean, got '{raw}'"))),
	}
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
	let secs = raw.parse::<u64>().map_err(|e| invalid(ENV_UPSTREAM_TIMEOUT_SECS, e))?;

	if secs == 0 {
		return Err(invalid(ENV_UPSTREAM_TIMEOUT_SECS, "must be at least one second"));
	}

	Ok(Duration::from_secs(secs))
}

fn invalid(var: &str, reason: impl Display) -> ConfigError {
	ConfigError::InvalidEnv { var: var.to_owned(), reason: reason.to_string() }
}
