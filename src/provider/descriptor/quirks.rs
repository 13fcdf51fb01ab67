// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how the relays reshape traffic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Scheme keyword that replaces `Bearer` on outbound user-info calls; `None` forwards the
	/// caller's header verbatim.
	pub token_scheme: Option<String>,
	/// Local part prefix of synthesized emails (`{prefix}_{id}@{host}`).
	pub synthetic_email_prefix: String,
}
impl ProviderQuirks {
	/// GitHub still documents the legacy `token` scheme and identifies OAuth users as
	/// `githubuser_{id}`.
	pub fn github() -> Self {
		Self { token_scheme: Some("token".into()), synthetic_email_prefix: "githubuser".into() }
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { token_scheme: None, synthetic_email_prefix: "user".into() }
	}
}
