pub mod group;
pub mod user;

pub use group::{Group, GroupPayload, Permission};
pub use user::{User, UserPayload};
