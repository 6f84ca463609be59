//! Client for the remote credential authority.
//!
//! Every authenticated request results in exactly one outbound `POST
//! {base}/check` carrying `{userid, token, app}`. The sole success condition
//! is HTTP 200 with `valid == true` in the decoded body; any other status,
//! an undecodable body, or `valid != true` all count as rejected
//! credentials. Verdicts are never cached.

use axum::http::{HeaderMap, header};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential authority request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Wire shape of a credential check request.
#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    userid: &'a str,
    token: &'a str,
    app: &'a str,
}

/// Wire shape of the authority's verdict.
#[derive(Debug, Deserialize)]
struct CheckVerdict {
    valid: bool,
}

/// Client for the credential authority, shared across all requests.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    app: String,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .field("app", &self.app)
            .finish()
    }
}

impl AuthClient {
    /// Build a client against the given authority base URL.
    ///
    /// The underlying HTTP client carries a 10s timeout so an unresponsive
    /// authority cannot pin request handlers indefinitely.
    pub fn new(base_url: impl Into<String>, app: impl Into<String>) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app: app.into(),
        })
    }

    /// Verify credentials, returning the authenticated identity (the userid).
    ///
    /// Rejected credentials surface as `AuthError::InvalidCredentials`; the
    /// authority's status code and body go to the log for operator diagnosis
    /// but are never forwarded to the caller.
    pub async fn authenticate(&self, userid: &str, token: &str) -> AuthResult<String> {
        if self.verify(userid, token).await? {
            info!(user = %userid, "credential check accepted");
            Ok(userid.to_string())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Boolean variant of the same check, for callers that branch rather
    /// than unwind. A definite verdict (either way) is `Ok`; only transport
    /// failures error.
    pub async fn check(&self, userid: &str, token: &str) -> AuthResult<bool> {
        let verdict = self.verify(userid, token).await?;
        if verdict {
            info!(user = %userid, "credential check accepted");
        }
        Ok(verdict)
    }

    /// One outbound check call. Applies the single success predicate.
    async fn verify(&self, userid: &str, token: &str) -> AuthResult<bool> {
        let body = CheckRequest {
            userid,
            token,
            app: &self.app,
        };
        let resp = self
            .http
            .post(format!("{}/check", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if status.is_success() {
            if let Ok(verdict) = serde_json::from_str::<CheckVerdict>(&text) {
                if verdict.valid {
                    return Ok(true);
                }
            }
        }

        warn!(
            user = %userid,
            status = status.as_u16(),
            body = %text,
            "credential check rejected"
        );
        Ok(false)
    }
}

/// Decode `Authorization: Basic <base64 user:pass>` into a credential pair.
///
/// The scheme token is matched case-insensitively (RFC 7617). Returns
/// `None` for a missing header, a non-Basic scheme, or a payload that is
/// not valid base64-encoded `user:pass`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }
    let decoded = general_purpose::STANDARD.decode(encoded.trim_start()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
