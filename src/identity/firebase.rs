use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use url::Url;

use super::{Identity, IdentityError, IdentityProvider};
use crate::config::IdentityConfig;

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Firebase Authentication over its REST APIs.
///
/// Sign-up and sign-in go through the Identity Toolkit API, refresh through
/// the Secure Token API. ID tokens are RS256 JWTs checked against the
/// provider's published JWK set, which is cached for `jwks_cache_secs`.
pub struct FirebaseIdentity {
    client: reqwest::Client,
    project_id: String,
    api_key: String,
    identity_toolkit_url: String,
    secure_token_url: String,
    jwks_url: String,
    jwks_ttl: Duration,
    jwks: RwLock<Option<CachedKeys>>,
}

impl FirebaseIdentity {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(IdentityError::NotConfigured("FIREBASE_PROJECT_ID"))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(IdentityError::NotConfigured("FIREBASE_API_KEY"))?;

        Ok(Self {
            client: reqwest::Client::new(),
            project_id,
            api_key,
            identity_toolkit_url: config.identity_toolkit_url.trim_end_matches('/').to_string(),
            secure_token_url: config.secure_token_url.trim_end_matches('/').to_string(),
            jwks_url: config.jwks_url.clone(),
            jwks_ttl: Duration::from_secs(config.jwks_cache_secs),
            jwks: RwLock::new(None),
        })
    }

    fn endpoint(&self, base: &str, path: &str) -> Result<Url, IdentityError> {
        let mut url = Url::parse(&format!("{}/{}", base, path))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    async fn read_payload(response: reqwest::Response) -> Result<Value, IdentityError> {
        let status = response.status();
        let body: Value = response.json().await?;
        if status.is_success() {
            Ok(body)
        } else {
            tracing::debug!("Identity provider rejected request with {}: {}", status, body);
            Err(IdentityError::Rejected(provider_error_message(&body, status)))
        }
    }

    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        {
            let cached = self.jwks.read().await;
            if let Some(cached) = cached.as_ref() {
                if cached.fetched_at.elapsed() < self.jwks_ttl {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return Ok(DecodingKey::from_jwk(jwk)?);
                    }
                }
            }
        }

        // Stale, empty, or the key rotated since the last fetch
        let keys: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!("Fetched {} identity signing keys", keys.keys.len());

        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()?
            .ok_or_else(|| IdentityError::InvalidToken(format!("unknown signing key '{}'", kid)));

        *self.jwks.write().await = Some(CachedKeys { keys, fetched_at: Instant::now() });
        key
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let url = self.endpoint(&self.identity_toolkit_url, "accounts:signUp")?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "email": email, "password": password, "returnSecureToken": true }))
            .send()
            .await?;
        let payload = Self::read_payload(response).await?;

        payload
            .get("localId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| IdentityError::Rejected("sign-up response carried no localId".to_string()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, IdentityError> {
        let url = self.endpoint(&self.identity_toolkit_url, "accounts:signInWithPassword")?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "email": email, "password": password, "returnSecureToken": true }))
            .send()
            .await?;
        Self::read_payload(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Value, IdentityError> {
        let url = self.endpoint(&self.secure_token_url, "token")?;
        let response = self
            .client
            .post(url)
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;
        Self::read_payload(response).await
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!("unexpected algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("missing key id".to_string()))?;
        let key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "aud", "iss"]);

        let claims = decode::<Value>(token, &key, &validation)?.claims;
        identity_from_claims(claims)
    }
}

fn identity_from_claims(claims: Value) -> Result<Identity, IdentityError> {
    let uid = claims
        .get("sub")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| IdentityError::InvalidToken("empty subject".to_string()))?;
    let email = claims.get("email").and_then(Value::as_str).map(str::to_string);
    Ok(Identity { uid, email, claims })
}

/// Identity Toolkit errors look like `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`;
/// Secure Token errors like `{"error": "invalid_grant", "error_description": "..."}`.
fn provider_error_message(body: &Value, status: reqwest::StatusCode) -> String {
    let error = body.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| body.get("error_description").and_then(Value::as_str))
        .or_else(|| error.and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("identity provider returned {}", status))
}
