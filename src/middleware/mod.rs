pub mod auth;

pub use auth::{extract_token, token_gate, AuthUser};
