// handlers/mod.rs - two handler tiers
//
// Public handlers need no credentials; protected handlers take an `AuthUser`
// extractor and are rejected with 401/403 before they run.
pub mod protected;
pub mod public;
