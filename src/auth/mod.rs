//! Authentication module
//!
//! Supports: Bearer token, API key (header or query), Basic
//!
//! Credentials are opaque values handed in by the caller. There is no
//! token refresh or login flow: a credential is attached to the single
//! probe request as-is.

mod types;

pub use types::{Credential, Location};
