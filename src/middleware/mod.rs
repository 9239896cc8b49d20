pub mod auth;
pub mod response;

pub use auth::{check_auth, AuthUser};
pub use response::{ApiResponse, ApiResult};
