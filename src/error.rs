//! Proxy-level error types shared across configuration, relays, and the HTTP surface.

// self
use crate::{_prelude::*, provider::ProviderDescriptorError};

/// Proxy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical proxy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before serving.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound request rejected before contacting the upstream provider.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Upstream provider could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream provider answered with a payload the adapter cannot reshape.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Listener or socket failure while serving.
	#[error("I/O error occurred while serving requests.")]
	Io(#[from] std::io::Error),
}
impl Error {
	/// HTTP status reported to callers when this error ends a request.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Request(_) => StatusCode::BAD_REQUEST,
			Self::Transport(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
			Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// OAuth-style error code reported alongside [`Error::status`].
	pub fn code(&self) -> &'static str {
		match self {
			Self::Request(_) => "invalid_request",
			Self::Transport(_) | Self::Upstream(_) => "upstream_error",
			Self::Config(_) | Self::Io(_) => "server_error",
		}
	}
}

/// Configuration and validation failures raised before any request is served.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Provider identifier has no adapter implementation.
	#[error("Provider '{provider}' is not implemented.")]
	UnsupportedProvider {
		/// Identifier exactly as it was supplied.
		provider: String,
	},
	/// The same provider was attached twice.
	#[error("Provider '{provider}' is attached more than once.")]
	DuplicateProvider {
		/// Provider label.
		provider: &'static str,
	},
	/// Stage segment cannot be mounted.
	#[error("Stage '{stage}' is invalid: {reason}.")]
	InvalidStage {
		/// Stage value that failed validation.
		stage: String,
		/// Why the stage was rejected.
		reason: &'static str,
	},
	/// Route method has no router equivalent.
	#[error("Route '{path}' uses unsupported method {method}.")]
	UnsupportedMethod {
		/// Route path.
		path: String,
		/// Offending method.
		method: String,
	},
	/// Environment variable holds an unusable value.
	#[error("Environment variable `{var}` is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		var: String,
		/// Parser-supplied reason string.
		reason: String,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] ProviderDescriptorError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Inbound request problems detected by the adapter itself.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum RequestError {
	/// User-info calls must carry the caller's access token.
	#[error("Missing required request header: Authorization.")]
	MissingAuthorization,
	/// The `Authorization` header is not representable as visible ASCII.
	#[error("The Authorization header is malformed.")]
	InvalidAuthorization,
	/// Neither configuration nor the request identifies the public host.
	#[error("Unable to determine the public host of the request.")]
	MissingHost,
}

/// Transport-level failures (network, TLS, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Upstream endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `endpoint`.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Upstream payloads that cannot be reshaped into OIDC claims.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// User profile JSON is malformed or lacks the `id` field.
	#[error("User-info endpoint returned an unusable profile.")]
	ProfileParse {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Normalized profile could not be serialized again.
	#[error("Normalized profile could not be encoded.")]
	ProfileEncode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_errors_map_to_client_status() {
		let err = Error::from(RequestError::MissingAuthorization);

		assert_eq!(err.status(), StatusCode::BAD_REQUEST);
		assert_eq!(err.code(), "invalid_request");
		assert_eq!(err.to_string(), "Missing required request header: Authorization.");
	}

	#[test]
	fn transport_errors_map_to_bad_gateway() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
		let err = Error::from(TransportError::network("user", io));

		assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
		assert_eq!(err.code(), "upstream_error");
		assert!(err.to_string().contains("user endpoint"));
	}

	#[test]
	fn unsupported_provider_names_the_identifier() {
		let err = ConfigError::UnsupportedProvider { provider: "gitlab".into() };

		assert_eq!(err.to_string(), "Provider 'gitlab' is not implemented.");
	}
}
