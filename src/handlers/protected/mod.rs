// handlers/protected/mod.rs - Handlers behind `check_auth`

pub mod group;
pub mod user;

use serde::Serialize;

/// Body returned by soft-delete endpoints
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}
