// Fixtures and accessor mocks shared by unit tests

use async_trait::async_trait;
use mockall::mock;

use crate::database::accessor::{AccessorError, DataAccessor};
use crate::database::models::{Group, Permission, User};

/// Baseline user; override fields with struct update syntax
pub fn create_test_user() -> User {
    User {
        id: "33333".to_string(),
        login: "myLogin".to_string(),
        password: "strongPass1".to_string(),
        age: 12,
        is_deleted: false,
    }
}

pub fn create_test_group() -> Group {
    Group {
        id: "g-1".to_string(),
        name: "readers".to_string(),
        permissions: vec![Permission::Read],
        is_deleted: false,
    }
}

mock! {
    pub UserAccessor {}

    #[async_trait]
    impl DataAccessor<User> for UserAccessor {
        async fn get_by_id(&self, id: &str) -> Result<Option<User>, AccessorError>;
        async fn get_some_by_substring(
            &self,
            pattern: &str,
            limit: Option<usize>,
        ) -> Result<Vec<User>, AccessorError>;
        async fn create_or_update(&self, entity: User) -> Result<Option<User>, AccessorError>;
    }
}

mock! {
    pub GroupAccessor {}

    #[async_trait]
    impl DataAccessor<Group> for GroupAccessor {
        async fn get_by_id(&self, id: &str) -> Result<Option<Group>, AccessorError>;
        async fn get_some_by_substring(
            &self,
            pattern: &str,
            limit: Option<usize>,
        ) -> Result<Vec<Group>, AccessorError>;
        async fn create_or_update(&self, entity: Group) -> Result<Option<Group>, AccessorError>;
    }
}
