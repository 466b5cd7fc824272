// handlers/public/auth/mod.rs - Public authentication handlers

use serde_json::Value;

pub mod login; // POST /login - password sign-in, returns provider token payload
pub mod refresh; // POST /refreshIdToken - exchange refresh token
pub mod signup; // POST /signup - create account, returns { id }

pub use login::login_post;
pub use refresh::refresh_post;
pub use signup::signup_post;

/// Reads a field the validator already confirmed is a non-empty string
fn text<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}
