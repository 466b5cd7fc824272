// handlers/public/mod.rs - Public handlers (no token required)
//
// Account creation and token acquisition. These forward to the identity
// provider and hand its payload back untouched.

pub mod auth;

pub use auth::*;
