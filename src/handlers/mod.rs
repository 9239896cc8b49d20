// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token checked by `check_auth`)

pub mod protected;
pub mod public;
