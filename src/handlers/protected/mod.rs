// handlers/protected/mod.rs - Protected handlers (token gate required)
//
// Every route here runs behind `middleware::token_gate`, which has already
// verified the caller and stored an `AuthUser` in the request extensions.
// Each handler validates its body, issues one store operation (notes also
// read their parent candidate first) and maps the outcome to a response.

pub mod candidates;
pub mod notes;
pub mod postings;
pub mod utils;
