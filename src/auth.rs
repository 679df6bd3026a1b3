//! Caller identity and password hashing.

use hyper::header::{HeaderMap, HeaderName};
use serde::Deserialize;

use crate::prelude::*;


#[derive(Debug, Clone, confique::Config)]
pub(crate) struct AuthConfig {
    /// Name of the HTTP header that carries the ID of the requesting user.
    /// This header is expected to be set by a trusted reverse proxy in front
    /// of Evently; its value is the user's document ID. Requests without the
    /// header are treated as anonymous.
    #[config(default = "x-user-id")]
    pub(crate) user_id_header: UserIdHeader,
}

/// A valid HTTP header name. Parsed when the configuration is loaded: an
/// invalid name fails startup instead of silently never matching. Header
/// names are case insensitive, any capitalization in the config works.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub(crate) struct UserIdHeader(HeaderName);

impl TryFrom<String> for UserIdHeader {
    type Error = hyper::header::InvalidHeaderName;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        HeaderName::try_from(value).map(Self)
    }
}

/// Who is performing the current request. Mutations that attribute ownership
/// (e.g. `createEvent`) require `Caller::User`.
#[derive(Debug, Clone)]
pub(crate) enum Caller {
    /// An identified user, by document ID.
    User(String),
    Anonymous,
}

impl Caller {
    pub(crate) fn from_headers(headers: &HeaderMap, auth_config: &AuthConfig) -> Self {
        headers.get(&auth_config.user_id_header.0)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Self::User(v.to_owned()))
            .unwrap_or(Self::Anonymous)
    }
}

/// Cost factor for bcrypt. This is fixed: changing it would not invalidate
/// existing hashes, only newly created users are affected.
const HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashes a password for storage. The actual hashing runs on the blocking
/// thread pool as it is CPU-heavy on purpose.
pub(crate) async fn hash_password(password: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .context("password hashing task panicked")?
        .context("failed to hash password")?;

    Ok(hash)
}
