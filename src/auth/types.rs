//! Credential types
//!
//! A credential is supplied by the caller and attached to exactly one
//! probe request. Nothing here reads secret storage or the environment.

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// A pre-supplied credential
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    /// `Authorization: Bearer <token>`
    Bearer {
        /// The bearer token
        token: String,
    },

    /// API key in a header or query parameter
    ApiKey {
        /// Where to place the API key
        #[serde(default)]
        location: Location,
        /// Header or query parameter name
        name: String,
        /// The API key value
        value: String,
    },

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

impl Credential {
    /// Bearer token credential
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// API key sent as a query parameter (e.g. FRED's `api_key`)
    pub fn query_param(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            location: Location::Query,
            name: name.into(),
            value: value.into(),
        }
    }

    /// API key sent as a request header
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            location: Location::Header,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Basic auth credential
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Attach the credential to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer { token } => req.bearer_auth(token),
            Credential::ApiKey {
                location: Location::Header,
                name,
                value,
            } => req.header(name.as_str(), value.as_str()),
            Credential::ApiKey {
                location: Location::Query,
                name,
                value,
            } => req.query(&[(name.as_str(), value.as_str())]),
            Credential::Basic { username, password } => {
                req.basic_auth(username, Some(password))
            }
        }
    }

    /// Header this credential sets, if it travels in one
    pub fn header_name(&self) -> Option<&str> {
        match self {
            Credential::Bearer { .. } | Credential::Basic { .. } => Some("authorization"),
            Credential::ApiKey {
                location: Location::Header,
                name,
                ..
            } => Some(name.as_str()),
            Credential::ApiKey {
                location: Location::Query,
                ..
            } => None,
        }
    }

    /// Short description safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Bearer { .. } => "bearer",
            Credential::ApiKey {
                location: Location::Header,
                ..
            } => "api_key_header",
            Credential::ApiKey {
                location: Location::Query,
                ..
            } => "api_key_query",
            Credential::Basic { .. } => "basic",
        }
    }
}

// Secrets never reach logs or reports through Debug.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            Credential::ApiKey { location, name, .. } => f
                .debug_struct("ApiKey")
                .field("location", location)
                .field("name", name)
                .field("value", &"<redacted>")
                .finish(),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
