//! Provider descriptor data structures shared by the relays.
//!
//! The module exposes validated upstream endpoints, supporting builder utilities, and
//! provider quirks so the adapter can talk to a provider without hard-coding its URLs.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, provider::ProviderKind};

const GITHUB_AUTHORIZATION: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USERINFO: &str = "https://api.github.com/user";

/// Upstream endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint advertised verbatim in the discovery document.
	pub authorization: Url,
	/// Token endpoint that receives relayed code exchanges.
	pub token: Url,
	/// Profile endpoint that backs the user-info relay.
	pub userinfo: Url,
}

/// Immutable provider descriptor consumed by the adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Provider this descriptor belongs to.
	pub kind: ProviderKind,
	/// Upstream endpoint definitions.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided kind.
	pub fn builder(kind: ProviderKind) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(kind)
	}

	/// Descriptor for github.com.
	pub fn github() -> Result<Self, ProviderDescriptorError> {
		Self::builder(ProviderKind::Github)
			.authorization_endpoint(parse_endpoint("authorization", GITHUB_AUTHORIZATION)?)
			.token_endpoint(parse_endpoint("token", GITHUB_TOKEN)?)
			.userinfo_endpoint(parse_endpoint("userinfo", GITHUB_USERINFO)?)
			.quirks(ProviderQuirks::github())
			.build()
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw)
		.map_err(|e| ProviderDescriptorError::InvalidEndpoint { endpoint, reason: e.to_string() })
}
