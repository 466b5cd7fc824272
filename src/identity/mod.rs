//! Identity provider seam.
//!
//! Account creation, password sign-in, refresh and ID-token verification all
//! belong to the provider; this crate only forwards requests and passes the
//! provider's token payloads back to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseIdentity;
pub use memory::MemoryIdentity;

/// Decoded ID token: the authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    /// Full decoded token payload
    pub claims: Value,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider refused the request (e.g. EMAIL_EXISTS)
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider is not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and returns its uid
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Password sign-in; returns the provider's token payload unchanged
    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, IdentityError>;

    /// Exchanges a refresh token; returns the provider's token payload unchanged
    async fn refresh(&self, refresh_token: &str) -> Result<Value, IdentityError>;

    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError>;
}
