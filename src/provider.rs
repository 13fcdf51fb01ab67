//! Provider-facing identifiers (what is implemented), descriptors (where upstream lives), and the
//! user-profile reshaping applied to upstream claims.
//!
//! `kind` exposes [`ProviderKind`], the closed set of providers the proxy can front; parsing any
//! other identifier fails at configuration time. `descriptor` exposes validated upstream endpoints
//! plus provider quirks (token scheme keyword, synthetic email prefix). `profile` turns an upstream
//! user profile into the claim set an OIDC broker expects.

pub mod descriptor;
pub mod kind;
pub mod profile;

pub use descriptor::*;
pub use kind::*;
pub use profile::*;
