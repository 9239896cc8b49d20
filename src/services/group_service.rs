use std::sync::Arc;

use super::{records, ServiceError};
use crate::database::accessor::DataAccessor;
use crate::database::models::{Group, GroupPayload};

/// Business logic over group records. Mirrors `UserService` without the
/// credential check.
#[derive(Clone)]
pub struct GroupService {
    accessor: Arc<dyn DataAccessor<Group>>,
}

impl GroupService {
    pub fn new(accessor: Arc<dyn DataAccessor<Group>>) -> Self {
        Self { accessor }
    }

    pub async fn get(&self, id: &str) -> Result<Group, ServiceError> {
        records::fetch(self.accessor.as_ref(), id).await
    }

    pub async fn create(&self, payload: GroupPayload) -> Result<Group, ServiceError> {
        records::save(self.accessor.as_ref(), payload.into_group()).await
    }

    pub async fn update(&self, id: &str, payload: GroupPayload) -> Result<Group, ServiceError> {
        let mut group = records::fetch(self.accessor.as_ref(), id).await?;
        payload.apply_to(&mut group);
        records::save(self.accessor.as_ref(), group).await
    }

    pub async fn remove_softly(&self, id: &str) -> Result<bool, ServiceError> {
        records::remove_softly(self.accessor.as_ref(), id).await
    }

    /// Groups whose name contains `substring`
    pub async fn search(&self, substring: &str, limit: usize) -> Result<Vec<Group>, ServiceError> {
        Ok(self
            .accessor
            .get_some_by_substring(substring, Some(limit))
            .await?)
    }
}
