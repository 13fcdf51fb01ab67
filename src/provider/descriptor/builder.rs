// std
use std::net::IpAddr;
// self
use crate::{
	_prelude::*,
	provider::{ProviderDescriptor, ProviderEndpoints, ProviderKind, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is advertised by discovery and therefore required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for the token relay.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Profile endpoint is mandatory for the user-info relay.
	#[error("Missing userinfo endpoint.")]
	MissingUserinfoEndpoint,
	/// Endpoint literal could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL: {reason}.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Parser-supplied reason string.
		reason: String,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scheme keyword must be a single printable token.
	#[error("Token scheme `{scheme}` must be a non-empty token without whitespace.")]
	InvalidTokenScheme {
		/// Invalid keyword that was supplied.
		scheme: String,
	},
	/// Synthetic email prefix must fit in the local part of an address.
	#[error("Synthetic email prefix `{prefix}` must be non-empty and contain no '@' or whitespace.")]
	InvalidEmailPrefix {
		/// Invalid prefix that was supplied.
		prefix: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Provider the descriptor is built for.
	pub kind: ProviderKind,
	/// Authorization endpoint advertised in discovery.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used by the token relay.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint used by the user-info relay.
	pub userinfo_endpoint: Option<Url>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided kind.
	pub fn new(kind: ProviderKind) -> Self {
		Self {
			kind,
			authorization_endpoint: None,
			token_endpoint: None,
			userinfo_endpoint: None,
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn userinfo_endpoint(mut self, url: Url) -> Self {
		self.userinfo_endpoint = Some(url);

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let userinfo =
			self.userinfo_endpoint.ok_or(ProviderDescriptorError::MissingUserinfoEndpoint)?;
		let descriptor = ProviderDescriptor {
			kind: self.kind,
			endpoints: ProviderEndpoints { authorization, token, userinfo },
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("userinfo", &self.endpoints.userinfo)?;

		if let Some(scheme) = self.quirks.token_scheme.as_deref() {
			validate_token_scheme(scheme)?;
		}

		validate_email_prefix(&self.quirks.synthetic_email_prefix)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.map(|ip| ip.is_loopback())
			.unwrap_or(false),
		None => false,
	}
}

fn validate_token_scheme(scheme: &str) -> Result<(), ProviderDescriptorError> {
	if scheme.is_empty() || scheme.chars().any(|c| c.is_whitespace() || c.is_control()) {
		Err(ProviderDescriptorError::InvalidTokenScheme { scheme: scheme.to_owned() })
	} else {
		Ok(())
	}
}

fn validate_email_prefix(prefix: &str) -> Result<(), ProviderDescriptorError> {
	if prefix.is_empty() || prefix.contains('@') || prefix.chars().any(char::is_whitespace) {
		Err(ProviderDescriptorError::InvalidEmailPrefix { prefix: prefix.to_owned() })
	} else {
		Ok(())
	}
}
