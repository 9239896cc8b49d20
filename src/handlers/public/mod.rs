// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service description, liveness and token acquisition.

pub mod health;
pub mod login;

pub use health::{health, root};
pub use login::login;
