pub mod group_service;
mod records;
pub mod user_service;

pub use group_service::GroupService;
pub use user_service::UserService;

use thiserror::Error;

use crate::database::accessor::AccessorError;

/// Failures raised by the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Record kind, e.g. "User"
    #[error("{0} not found!")]
    NotFound(&'static str),

    #[error("Error while updating!")]
    UpdateFailed,

    #[error(transparent)]
    Accessor(#[from] AccessorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_fixed_strings() {
        assert_eq!(ServiceError::NotFound("User").to_string(), "User not found!");
        assert_eq!(ServiceError::NotFound("Group").to_string(), "Group not found!");
        assert_eq!(ServiceError::UpdateFailed.to_string(), "Error while updating!");
    }
}
