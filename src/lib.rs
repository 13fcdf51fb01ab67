//! OIDC compatibility proxy for OAuth 2.0 providers that stop short of OpenID Connect.
//!
//! The proxy serves a synthesized discovery document, relays token exchanges, and reshapes
//! user-info so managed identity brokers can treat GitHub as a standards-shaped OIDC provider.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod adapter;
pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod obs;
pub mod plan;
pub mod provider;
pub mod server;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use axum::{
		body::Bytes,
		http::{HeaderMap, HeaderValue, Method, StatusCode},
	};
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _, tower as _};
