use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Identity, IdentityError, IdentityProvider};

const TOKEN_LIFETIME_SECS: &str = "3600";
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    email: String,
    password_hash: String,
}

#[derive(Default)]
struct Accounts {
    by_email: HashMap<String, Account>,
    // token -> uid
    id_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
}

impl Accounts {
    fn by_uid(&self, uid: &str) -> Option<&Account> {
        self.by_email.values().find(|a| a.uid == uid)
    }

    fn issue(&mut self, uid: &str) -> (String, String) {
        let id_token = Uuid::new_v4().simple().to_string();
        let refresh_token = Uuid::new_v4().simple().to_string();
        self.id_tokens.insert(id_token.clone(), uid.to_string());
        self.refresh_tokens.insert(refresh_token.clone(), uid.to_string());
        (id_token, refresh_token)
    }
}

/// In-process identity provider for development and tests.
///
/// Payload shapes follow the hosted provider so clients see the same fields:
/// sign-in returns `idToken`/`refreshToken`/`localId`, refresh returns
/// `id_token`/`refresh_token`/`user_id`. Tokens are opaque and never expire.
#[derive(Default)]
pub struct MemoryIdentity {
    inner: RwLock<Accounts>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_password(uid: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uid.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(IdentityError::Rejected(format!(
                "WEAK_PASSWORD : Password should be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut inner = self.inner.write().await;
        let key = email.to_ascii_lowercase();
        if inner.by_email.contains_key(&key) {
            return Err(IdentityError::Rejected("EMAIL_EXISTS".to_string()));
        }

        let uid = Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&uid, password);
        inner.by_email.insert(
            key,
            Account { uid: uid.clone(), email: email.to_string(), password_hash },
        );
        tracing::debug!("Created in-memory account {}", uid);
        Ok(uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, IdentityError> {
        let mut inner = self.inner.write().await;
        let (uid, email) = match inner.by_email.get(&email.to_ascii_lowercase()) {
            Some(account) if account.password_hash == hash_password(&account.uid, password) => {
                (account.uid.clone(), account.email.clone())
            }
            _ => return Err(IdentityError::Rejected("INVALID_LOGIN_CREDENTIALS".to_string())),
        };

        let (id_token, refresh_token) = inner.issue(&uid);
        Ok(json!({
            "localId": uid,
            "email": email,
            "idToken": id_token,
            "refreshToken": refresh_token,
            "expiresIn": TOKEN_LIFETIME_SECS,
            "registered": true,
        }))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Value, IdentityError> {
        let mut inner = self.inner.write().await;
        let uid = inner
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| IdentityError::Rejected("INVALID_REFRESH_TOKEN".to_string()))?;

        let (id_token, refresh_token) = inner.issue(&uid);
        Ok(json!({
            "id_token": id_token,
            "refresh_token": refresh_token,
            "expires_in": TOKEN_LIFETIME_SECS,
            "token_type": "Bearer",
            "user_id": uid,
        }))
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let inner = self.inner.read().await;
        let uid = inner
            .id_tokens
            .get(token)
            .ok_or_else(|| IdentityError::InvalidToken("unknown or revoked token".to_string()))?;
        let email = inner.by_uid(uid).map(|a| a.email.clone());

        Ok(Identity {
            uid: uid.clone(),
            email: email.clone(),
            claims: json!({ "sub": uid, "user_id": uid, "email": email }),
        })
    }
}
