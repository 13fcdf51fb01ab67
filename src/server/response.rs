// crates.io
use axum::{
	Json,
	http::header,
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, http::UpstreamResponse};

/// OAuth-style body returned for errors raised by the proxy itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Machine-readable code (`invalid_request`, `upstream_error`, `server_error`).
	pub error: String,
	/// Human-readable description.
	pub error_description: String,
}
impl From<&Error> for ErrorBody {
	fn from(e: &Error) -> Self {
		Self { error: e.code().to_owned(), error_description: e.to_string() }
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		(self.status(), Json(ErrorBody::from(&self))).into_response()
	}
}

// Upstream answers are relayed as-is: status, content type, and body.
impl IntoResponse for UpstreamResponse {
	fn into_response(self) -> Response {
		let content_type = self.content_type().cloned();
		let mut response = (self.status, self.body).into_response();
		let headers = response.headers_mut();

		match content_type {
			Some(value) => headers.insert(header::CONTENT_TYPE, value),
			None => headers.remove(header::CONTENT_TYPE),
		};

		response
	}
}
