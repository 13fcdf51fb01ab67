//! Static description of what the proxy serves and what the identity broker must register.
//!
//! [`ProxyPlan`] is assembled once at startup through [`ProxyPlanBuilder`]. Unknown or duplicate
//! providers and unusable stage segments are rejected by [`ProxyPlanBuilder::build`], so a plan
//! that exists can always be mounted.

// self
use crate::{
	_prelude::*,
	adapter::OidcAdapter,
	discovery::{DISCOVERY_SUFFIX, JWKS_PATH},
	error::ConfigError,
	http::UpstreamHttpClient,
	provider::{ProviderDescriptor, ProviderKind},
};

/// Scopes requested by the broker from the upstream provider.
pub const REGISTRATION_SCOPES: [&str; 2] = ["user", "openid"];
/// Attribute request method the broker uses against the user-info relay.
pub const ATTRIBUTE_REQUEST_METHOD: &str = "GET";

/// Operation backing a mounted route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteAction {
	/// Static empty key set.
	Jwks,
	/// Synthesized discovery document.
	Discovery(ProviderKind),
	/// Token exchange relay.
	TokenExchange(ProviderKind),
	/// User-info relay.
	UserInfo(ProviderKind),
}

/// One row of the route table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteSpec {
	/// Accepted method.
	pub method: Method,
	/// Path relative to the mount point (root or `/{stage}`).
	pub path: String,
	/// Operation executed for matching requests.
	pub action: RouteAction,
}
impl RouteSpec {
	fn new(method: Method, path: String, action: RouteAction) -> Self {
		Self { method, path, action }
	}
}

/// Identity-provider registration the broker needs for one adapted provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OidcRegistration {
	/// Identity-provider name shown by the broker.
	pub name: &'static str,
	/// Adapted provider.
	pub provider: ProviderKind,
	/// `{public_base_url}/{provider}`; unknown until a public base URL is configured.
	pub issuer_url: Option<String>,
	/// Requested scopes.
	pub scopes: Vec<&'static str>,
	/// How the broker fetches user attributes.
	pub attribute_request_method: &'static str,
	/// OAuth app client id, when known.
	pub client_id: Option<String>,
	/// Where the upstream OAuth app must send users back to.
	pub authorization_callback_hint: String,
}

/// Immutable route table plus registration descriptions.
#[derive(Clone, Debug)]
pub struct ProxyPlan {
	stage: Option<String>,
	descriptors: Vec<ProviderDescriptor>,
	routes: Vec<RouteSpec>,
	registrations: Vec<OidcRegistration>,
}
impl ProxyPlan {
	/// Creates an empty builder.
	pub fn builder() -> ProxyPlanBuilder {
		ProxyPlanBuilder::default()
	}

	/// Stage segment the routes are additionally mounted under.
	pub fn stage(&self) -> Option<&str> {
		self.stage.as_deref()
	}

	/// Providers in mount order.
	pub fn providers(&self) -> impl Iterator<Item = ProviderKind> + '_ {
		self.descriptors.iter().map(|d| d.kind)
	}

	/// Route table, relative to each mount point.
	pub fn routes(&self) -> &[RouteSpec] {
		&self.routes
	}

	/// Broker registrations, one per provider.
	pub fn registrations(&self) -> &[OidcRegistration] {
		&self.registrations
	}

	/// Builds the adapter serving this plan's providers over `http_client`.
	pub fn adapter(&self, http_client: Arc<dyn UpstreamHttpClient>) -> OidcAdapter {
		self.descriptors
			.iter()
			.cloned()
			.fold(OidcAdapter::new(http_client), OidcAdapter::with_descriptor)
	}
}

/// Builder for [`ProxyPlan`].
#[derive(Debug, Default)]
pub struct ProxyPlanBuilder {
	stage: Option<String>,
	provider_ids: Vec<String>,
	descriptors: BTreeMap<ProviderKind, ProviderDescriptor>,
	public_base_url: Option<Url>,
	client_ids: BTreeMap<ProviderKind, String>,
}
impl ProxyPlanBuilder {
	/// Mounts every route again under `/{stage}`.
	pub fn stage(mut self, stage: impl Into<String>) -> Self {
		self.stage = Some(stage.into());

		self
	}

	/// Adds a provider.
	pub fn provider(self, kind: ProviderKind) -> Self {
		self.provider_id(kind.as_str())
	}

	/// Adds a provider by identifier; unknown identifiers fail in [`Self::build`].
	pub fn provider_id(mut self, id: impl Into<String>) -> Self {
		self.provider_ids.push(id.into());

		self
	}

	/// Replaces the built-in descriptor of a provider, adding the provider when absent.
	pub fn descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
		let id = descriptor.kind.as_str();

		if !self.provider_ids.iter().any(|p| p == id) {
			self.provider_ids.push(id.to_owned());
		}

		self.descriptors.insert(descriptor.kind, descriptor);

		self
	}

	/// Public URL the broker reaches the proxy at (including any stage segment).
	pub fn public_base_url(mut self, url: Url) -> Self {
		self.public_base_url = Some(url);

		self
	}

	/// Records the OAuth app client id of `kind` for its registration.
	pub fn client_id(mut self, kind: ProviderKind, client_id: impl Into<String>) -> Self {
		self.client_ids.insert(kind, client_id.into());

		self
	}

	/// Validates the inputs and assembles the plan.
	pub fn build(mut self) -> Result<ProxyPlan, ConfigError> {
		let mut kinds = Vec::with_capacity(self.provider_ids.len());

		for id in &self.provider_ids {
			let kind = id.parse::<ProviderKind>()?;

			if kinds.contains(&kind) {
				return Err(ConfigError::DuplicateProvider { provider: kind.as_str() });
			}

			kinds.push(kind);
		}

		if let Some(stage) = self.stage.as_deref() {
			validate_stage(stage, &kinds)?;
		}

		let mut descriptors = Vec::with_capacity(kinds.len());

		for kind in &kinds {
			let descriptor = match self.descriptors.remove(kind) {
				Some(descriptor) => descriptor,
				None => kind.descriptor()?,
			};

			descriptors.push(descriptor);
		}

		let mut routes = vec![RouteSpec::new(Method::GET, JWKS_PATH.to_owned(), RouteAction::Jwks)];

		for &kind in &kinds {
			routes.extend(provider_routes(kind));
		}

		let registrations = kinds
			.iter()
			.map(|&kind| {
				registration(kind, self.public_base_url.as_ref(), self.client_ids.remove(&kind))
			})
			.collect();

		Ok(ProxyPlan { stage: self.stage, descriptors, routes, registrations })
	}
}

/// The three routes mounted under `/{provider}`.
pub fn provider_routes(kind: ProviderKind) -> [RouteSpec; 3] {
	let discovery = format!("/{kind}{DISCOVERY_SUFFIX}");
	let token = format!("/{kind}/access_token");
	let user = format!("/{kind}/user");

	[
		RouteSpec::new(Method::GET, discovery, RouteAction::Discovery(kind)),
		RouteSpec::new(Method::POST, token, RouteAction::TokenExchange(kind)),
		RouteSpec::new(Method::GET, user, RouteAction::UserInfo(kind)),
	]
}

fn registration(
	kind: ProviderKind,
	public_base_url: Option<&Url>,
	client_id: Option<String>,
) -> OidcRegistration {
	let name = kind.display_name();

	OidcRegistration {
		name,
		provider: kind,
		issuer_url: public_base_url
			.map(|base| format!("{}/{kind}", base.as_str().trim_end_matches('/'))),
		scopes: REGISTRATION_SCOPES.to_vec(),
		attribute_request_method: ATTRIBUTE_REQUEST_METHOD,
		client_id,
		authorization_callback_hint: format!(
			"Set the {name} OAuth app's authorization callback URL to the broker's \
			 identity-provider response URL."
		),
	}
}

fn validate_stage(stage: &str, kinds: &[ProviderKind]) -> Result<(), ConfigError> {
	let reason = if stage.is_empty() {
		Some("must not be empty")
	} else if stage.contains('/') {
		Some("must be a single path segment")
	} else if !stage.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_')) {
		// Anything else is either reserved in URLs or a route pattern metacharacter.
		Some("may only contain ASCII letters, digits, '-' and '_'")
	} else if kinds.iter().any(|kind| kind.as_str() == stage) {
		Some("clashes with a provider mount")
	} else {
		None
	};

	match reason {
		Some(reason) => Err(ConfigError::InvalidStage { stage: stage.to_owned(), reason }),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn github_plan_mounts_four_routes() {
		let plan = ProxyPlan::builder()
			.provider(ProviderKind::Github)
			.build()
			.expect("GitHub plan should build.");
		let routes = plan
			.routes()
			.iter()
			.map(|r| (r.method.as_str(), r.path.as_str(), r.action))
			.collect::<Vec<_>>();

		assert_eq!(
			routes,
			[
				("GET", "/empty.json", RouteAction::Jwks),
				(
					"GET",
					"/github/.well-known/openid-configuration",
					RouteAction::Discovery(ProviderKind::Github)
				),
				("POST", "/github/access_token", RouteAction::TokenExchange(ProviderKind::Github)),
				("GET", "/github/user", RouteAction::UserInfo(ProviderKind::Github)),
			]
		);
		assert_eq!(plan.stage(), None);
		assert_eq!(plan.providers().collect::<Vec<_>>(), [ProviderKind::Github]);
	}

	#[test]
	fn unknown_provider_fails_fast() {
		let err = ProxyPlan::builder()
			.provider_id("gitlab")
			.build()
			.expect_err("Unknown providers must be rejected.");

		assert_eq!(err.to_string(), "Provider 'gitlab' is not implemented.");
	}

	#[test]
	fn duplicate_provider_is_rejected() {
		let err = ProxyPlan::builder()
			.provider(ProviderKind::Github)
			.provider_id("github")
			.build()
			.expect_err("Duplicates must be rejected.");

		assert!(matches!(err, ConfigError::DuplicateProvider { provider: "github" }));
	}

	#[test]
	fn stage_must_be_a_single_free_segment() {
		let rejected = [
			"", "a/b", "github", "pro d", "..", "v1?x", "v1.2", "{id}", "*rest", ":prod", "{*x}",
		];

		for stage in rejected {
			let err = ProxyPlan::builder()
				.stage(stage)
				.provider(ProviderKind::Github)
				.build()
				.expect_err("Invalid stage must be rejected.");

			assert!(matches!(err, ConfigError::InvalidStage { .. }), "stage {stage:?}: {err:?}");
		}

		for stage in ["prod", "v2_beta", "Stage-1"] {
			let plan = ProxyPlan::builder()
				.stage(stage)
				.provider(ProviderKind::Github)
				.build()
				.expect("Plain stage should be accepted.");

			assert_eq!(plan.stage(), Some(stage));
		}
	}

	#[test]
	fn registration_describes_the_broker_side() {
		let base = Url::parse("https://abc.example.com/prod/").expect("Fixture URL should parse.");
		let plan = ProxyPlan::builder()
			.provider(ProviderKind::Github)
			.public_base_url(base)
			.client_id(ProviderKind::Github, "Iv1.abc")
			.build()
			.expect("Plan should build.");
		let registration = &plan.registrations()[0];

		assert_eq!(registration.name, "Github");
		assert_eq!(registration.issuer_url.as_deref(), Some("https://abc.example.com/prod/github"));
		assert_eq!(registration.scopes, ["user", "openid"]);
		assert_eq!(registration.attribute_request_method, "GET");
		assert_eq!(registration.client_id.as_deref(), Some("Iv1.abc"));

		let encoded = serde_json::to_value(registration).expect("Registration should serialize.");

		assert_eq!(encoded["provider"], "github");
	}

	#[test]
	fn registration_without_base_url_has_no_issuer() {
		let plan = ProxyPlan::builder()
			.provider(ProviderKind::Github)
			.build()
			.expect("Plan should build.");

		assert_eq!(plan.registrations()[0].issuer_url, None);
		assert_eq!(plan.registrations()[0].client_id, None);
	}

	#[test]
	fn descriptor_override_attaches_provider() {
		let token = Url::parse("http://127.0.0.1:9/token").expect("Fixture URL should parse.");
		let descriptor = ProviderDescriptor::builder(ProviderKind::Github)
			.authorization_endpoint(token.clone())
			.token_endpoint(token.clone())
			.userinfo_endpoint(token)
			.build()
			.expect("Loopback descriptor should build.");
		let plan = ProxyPlan::builder()
			.descriptor(descriptor.clone())
			.build()
			.expect("Override plan should build.");

		assert_eq!(plan.providers().collect::<Vec<_>>(), [ProviderKind::Github]);
		assert_eq!(plan.descriptors, [descriptor]);
	}
}
