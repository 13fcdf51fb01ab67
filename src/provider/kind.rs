//! Strongly typed provider identifiers.

// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderDescriptor};

/// Upstream providers the proxy knows how to adapt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	/// GitHub OAuth apps (`github.com/login/oauth` + `api.github.com/user`).
	Github,
}
impl ProviderKind {
	/// Every implemented provider, in mount order.
	pub const ALL: [ProviderKind; 1] = [ProviderKind::Github];

	/// Returns the identifier used in route paths and configuration.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Github => "github",
		}
	}

	/// Returns the identity-provider name registered on the broker.
	pub const fn display_name(self) -> &'static str {
		match self {
			ProviderKind::Github => "Github",
		}
	}

	/// Path prefix (`/{provider}/`) that marks a request reached without a stage segment.
	pub fn mount_prefix(self) -> String {
		format!("/{}/", self.as_str())
	}

	/// Builds the descriptor pointing at the provider's public endpoints.
	pub fn descriptor(self) -> Result<ProviderDescriptor, ConfigError> {
		match self {
			ProviderKind::Github => Ok(ProviderDescriptor::github()?),
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ProviderKind::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| ConfigError::UnsupportedProvider { provider: s.to_owned() })
	}
}
