//! API-key to bearer-token exchange

use crate::transport::HttpTransport;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Response fields that may carry the token, checked in this order.
pub const TOKEN_FIELDS: [&str; 3] = ["token", "access_token", "jwt"];

pub const LOGIN_PATH: &str = "/login/api_key";

/// Credentials used for the platform's `Authorization` header.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub token: Option<String>,
}

impl Credentials {
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: None,
        }
    }

    /// The exchanged token when there is one, else the raw API key.
    pub fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or(&self.api_key)
    }

    pub fn uses_token(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Pull the token out of a login response body.
pub fn extract_token(body: &Value) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Exchange an API key for a bearer token with one call, no retry.
///
/// Only HTTP 200 counts. Any other status, a network error or a body without
/// a token field yields `None`; the caller then authenticates with the API
/// key itself.
pub async fn exchange_api_key(transport: &HttpTransport, api_key: &str) -> Option<String> {
    info!(url = %transport.url(LOGIN_PATH), "authenticating with API key");
    match transport
        .post_json_with_status(LOGIN_PATH, &json!({ "api_key": api_key }))
        .await
    {
        Ok((status, _)) if status != 200 => {
            warn!(status, "unexpected login status, using API key instead");
            None
        }
        Ok((_, body)) => match extract_token(&body) {
            Some(token) => {
                info!("token retrieved");
                Some(token)
            }
            None => {
                warn!("login response carried no token, using API key instead");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "authentication failed, using API key instead");
            None
        }
    }
}
