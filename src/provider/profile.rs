//! User-profile reshaping applied to successful upstream user-info responses.
//!
//! Brokers expect a `sub` claim and an email to key accounts on. GitHub returns neither in that
//! shape: the subject lives in `id`, and `email`/`company` are `null` whenever the user keeps them
//! private. [`UserProfile::normalize`] adds:
//!
//! - `sub`: a copy of `id`, always, keeping its JSON type.
//! - `email_or_fake`: `email` when it carries a value, otherwise `{prefix}_{id}@{host}`.
//! - `company_or_fake`: `company` when it carries a value, otherwise the same synthetic identity.
//!
//! A value is missing when the field is absent, `null`, `false`, or the empty string. The
//! original `email` and `company` fields are never modified.

// self
use crate::{_prelude::*, error::UpstreamError, provider::ProviderQuirks};

/// Upstream subject identifier (`id`); numbers and strings are both accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileId {
	/// Numeric identifier (GitHub's native shape).
	Number(serde_json::Number),
	/// Opaque string identifier.
	Text(String),
}
impl Display for ProfileId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Number(n) => Display::fmt(n, f),
			Self::Text(s) => f.write_str(s),
		}
	}
}
impl From<ProfileId> for JsonValue {
	fn from(value: ProfileId) -> Self {
		match value {
			ProfileId::Number(n) => JsonValue::Number(n),
			ProfileId::Text(s) => JsonValue::String(s),
		}
	}
}

/// Upstream profile split into the subject and every other claim.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UserProfile {
	/// Upstream subject identifier.
	pub id: ProfileId,
	/// Remaining claims, carried through untouched.
	#[serde(flatten)]
	pub claims: JsonMap<String, JsonValue>,
}
impl UserProfile {
	/// Field that receives the resolved email.
	pub const EMAIL_CLAIM: &'static str = "email_or_fake";
	/// Field that receives the resolved company.
	pub const COMPANY_CLAIM: &'static str = "company_or_fake";

	/// Parses an upstream profile, reporting the JSON path of any mismatch.
	pub fn from_slice(body: &[u8]) -> Result<Self, UpstreamError> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| UpstreamError::ProfileParse { source })
	}

	/// Produces the claim set served to the broker.
	pub fn normalize(self, host: &str, quirks: &ProviderQuirks) -> JsonMap<String, JsonValue> {
		let Self { id, mut claims } = self;
		let synthetic = synthetic_email(&quirks.synthetic_email_prefix, &id, host);
		let email = resolve_or(claims.get("email"), &synthetic);
		let company = resolve_or(claims.get("company"), &synthetic);
		let id = JsonValue::from(id);

		claims.insert("id".into(), id.clone());
		claims.insert("sub".into(), id);
		claims.insert(Self::EMAIL_CLAIM.into(), email);
		claims.insert(Self::COMPANY_CLAIM.into(), company);

		claims
	}
}

/// Parses, normalizes, and re-encodes an upstream profile body.
pub fn normalize_profile(
	body: &[u8],
	host: &str,
	quirks: &ProviderQuirks,
) -> Result<Vec<u8>, UpstreamError> {
	let claims = UserProfile::from_slice(body)?.normalize(host, quirks);

	serde_json::to_vec(&claims).map_err(UpstreamError::ProfileEncode)
}

/// Builds the stand-in address used when the upstream withholds a value.
pub fn synthetic_email(prefix: &str, id: &ProfileId, host: &str) -> String {
	format!("{prefix}_{id}@{host}")
}

fn resolve_or(value: Option<&JsonValue>, fallback: &str) -> JsonValue {
	match value {
		Some(v) if is_present(v) => v.clone(),
		_ => JsonValue::String(fallback.to_owned()),
	}
}

fn is_present(value: &JsonValue) -> bool {
	match value {
		JsonValue::Null | JsonValue::Bool(false) => false,
		JsonValue::String(s) => !s.is_empty(),
		_ => true,
	}
}
