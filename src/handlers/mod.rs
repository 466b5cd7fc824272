// handlers/mod.rs - two security tiers
//
// Public (no token) → Protected (token gate)
pub mod public; // /signup, /login, /refreshIdToken
pub mod protected; // /postings, /candidates, /candidates/:id/notes
