//! OIDC discovery synthesis.
//!
//! The issuer depends on how the proxy was reached. Through the stage URL
//! (`https://{host}/{stage}/github/...`) every advertised endpoint keeps the stage segment; through
//! a custom domain mapped straight onto the stage (`https://{host}/github/...`) the segment is
//! elided. The request path is the only signal that tells the two apart, so the rule keys on it:
//! a path that already starts with `/{provider}/` drops the stage.

// self
use crate::{
	_prelude::*,
	provider::{ProviderDescriptor, ProviderKind},
};

/// Path of the static key set advertised as `jwks_uri`.
pub const JWKS_PATH: &str = "/empty.json";
/// Path suffix of the discovery document under a provider mount.
pub const DISCOVERY_SUFFIX: &str = "/.well-known/openid-configuration";

/// Request facts that decide which base URL the proxy advertises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuerContext<'a> {
	/// Public host (`Host`/`X-Forwarded-Host` or the configured override).
	pub host: &'a str,
	/// Deployment stage segment, if the proxy is mounted under one.
	pub stage: Option<&'a str>,
	/// Inbound request path, before any stage prefix is stripped.
	pub path: &'a str,
}
impl<'a> IssuerContext<'a> {
	/// Creates a new context for a single request.
	pub fn new(host: &'a str, stage: Option<&'a str>, path: &'a str) -> Self {
		Self { host, stage, path }
	}

	/// Returns `https://{host}` or `https://{host}/{stage}` following the stage-elision rule.
	pub fn base_url(&self, provider: ProviderKind) -> String {
		match self.stage {
			Some(stage) if !self.path.starts_with(&provider.mount_prefix()) =>
				format!("https://{}/{stage}", self.host),
			_ => format!("https://{}", self.host),
		}
	}

	/// Returns the issuer advertised for `provider`.
	pub fn issuer(&self, provider: ProviderKind) -> String {
		format!("{}/{provider}", self.base_url(provider))
	}
}

/// Computes the issuer for a request reaching `path` on `host`.
pub fn issuer_url(host: &str, stage: Option<&str>, path: &str, provider: ProviderKind) -> String {
	IssuerContext::new(host, stage, path).issuer(provider)
}

/// OpenID Provider Metadata served at `/{provider}/.well-known/openid-configuration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
	/// Canonical issuer URL.
	pub issuer: String,
	/// Upstream authorization endpoint; users are sent straight to the provider.
	pub authorization_endpoint: String,
	/// Token relay mounted by this proxy.
	pub token_endpoint: String,
	/// User-info relay mounted by this proxy.
	pub userinfo_endpoint: String,
	/// Static, empty key set.
	pub jwks_uri: String,
	/// Always `["code"]`.
	pub response_types_supported: Vec<String>,
	/// Always `["public"]`.
	pub subject_types_supported: Vec<String>,
	/// Always `["RS256"]`.
	pub id_token_signing_alg_values_supported: Vec<String>,
}
impl DiscoveryDocument {
	/// Synthesizes the document for one request without contacting the upstream.
	pub fn synthesize(descriptor: &ProviderDescriptor, ctx: &IssuerContext) -> Self {
		let provider = descriptor.kind;
		let base = ctx.base_url(provider);

		Self {
			issuer: format!("{base}/{provider}"),
			authorization_endpoint: descriptor.endpoints.authorization.to_string(),
			token_endpoint: format!("{base}/{provider}/access_token"),
			userinfo_endpoint: format!("{base}/{provider}/user"),
			jwks_uri: format!("{base}{JWKS_PATH}"),
			response_types_supported: vec!["code".into()],
			subject_types_supported: vec!["public".into()],
			id_token_signing_alg_values_supported: vec!["RS256".into()],
		}
	}
}

/// Key set served at [`JWKS_PATH`]: no keys are published.
pub fn empty_jwks() -> JsonValue {
	JsonValue::Object(JsonMap::new())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const GH: ProviderKind = ProviderKind::Github;

	#[test]
	fn stage_url_keeps_stage_segment() {
		for (host, stage) in [("abc.execute-api.eu-west-1.amazonaws.com", "prod"), ("h", "dev")] {
			let path = format!("/{stage}/github/.well-known/openid-configuration");

			assert_eq!(
				issuer_url(host, Some(stage), &path, GH),
				format!("https://{host}/{stage}/github")
			);
		}
	}

	#[test]
	fn custom_domain_path_elides_stage() {
		let issuer =
			issuer_url("auth.example.com", Some("prod"), "/github/.well-known/openid-configuration", GH);

		assert_eq!(issuer, "https://auth.example.com/github");
	}

	#[test]
	fn prefix_match_requires_trailing_slash() {
		let issuer = issuer_url("h", Some("prod"), "/githubber/.well-known", GH);

		assert_eq!(issuer, "https://h/prod/github");
	}

	#[test]
	fn missing_stage_never_adds_segment() {
		assert_eq!(issuer_url("h", None, "/other/github/user", GH), "https://h/github");
	}

	#[test]
	fn document_endpoints_share_the_issuer_base() {
		let descriptor = ProviderDescriptor::github().expect("GitHub descriptor should build.");
		let ctx = IssuerContext::new("h.example", Some("prod"), "/prod/github/.well-known");
		let doc = DiscoveryDocument::synthesize(&descriptor, &ctx);

		assert_eq!(doc.issuer, "https://h.example/prod/github");
		assert_eq!(doc.authorization_endpoint, "https://github.com/login/oauth/authorize");
		assert_eq!(doc.token_endpoint, "https://h.example/prod/github/access_token");
		assert_eq!(doc.userinfo_endpoint, "https://h.example/prod/github/user");
		assert_eq!(doc.jwks_uri, "https://h.example/prod/empty.json");
		assert_eq!(doc.response_types_supported, ["code"]);
		assert_eq!(doc.subject_types_supported, ["public"]);
		assert_eq!(doc.id_token_signing_alg_values_supported, ["RS256"]);
	}

	#[test]
	fn empty_jwks_is_an_empty_object() {
		assert_eq!(serde_json::to_string(&empty_jwks()).expect("JWKS should encode."), "{}");
	}
}
