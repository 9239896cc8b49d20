use std::sync::Arc;

use tracing::debug;

use super::{records, ServiceError};
use crate::auth::passwords_match;
use crate::database::accessor::DataAccessor;
use crate::database::models::{User, UserPayload};

/// Business logic over user records
#[derive(Clone)]
pub struct UserService {
    accessor: Arc<dyn DataAccessor<User>>,
}

impl UserService {
    pub fn new(accessor: Arc<dyn DataAccessor<User>>) -> Self {
        Self { accessor }
    }

    pub async fn get(&self, id: &str) -> Result<User, ServiceError> {
        records::fetch(self.accessor.as_ref(), id).await
    }

    pub async fn create(&self, payload: UserPayload) -> Result<User, ServiceError> {
        records::save(self.accessor.as_ref(), payload.into_user()).await
    }

    pub async fn update(&self, id: &str, payload: UserPayload) -> Result<User, ServiceError> {
        let mut user = records::fetch(self.accessor.as_ref(), id).await?;
        payload.apply_to(&mut user);
        records::save(self.accessor.as_ref(), user).await
    }

    /// Live user with exactly this login, created from `payload` when missing
    pub async fn ensure_user(&self, payload: UserPayload) -> Result<User, ServiceError> {
        let existing = self
            .accessor
            .get_some_by_substring(&payload.login, None)
            .await?
            .into_iter()
            .find(|user| user.login == payload.login);

        match existing {
            Some(user) => Ok(user),
            None => self.create(payload).await,
        }
    }

    /// Mark the user deleted. Fails with `NotFound` or `UpdateFailed`.
    pub async fn remove_softly(&self, id: &str) -> Result<bool, ServiceError> {
        records::remove_softly(self.accessor.as_ref(), id).await
    }

    /// Users whose login contains `substring`, exactly as the accessor returns them
    pub async fn search(&self, substring: &str, limit: usize) -> Result<Vec<User>, ServiceError> {
        Ok(self
            .accessor
            .get_some_by_substring(substring, Some(limit))
            .await?)
    }

    /// First user whose login equals `login` and whose password matches.
    ///
    /// Stored passwords are plaintext; the comparison itself is constant-time.
    pub async fn check_user_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<User>, ServiceError> {
        let candidates = self.accessor.get_some_by_substring(login, None).await?;
        debug!(login, candidates = candidates.len(), "checking credentials");

        Ok(candidates
            .into_iter()
            .find(|user| user.login == login && passwords_match(password, &user.password)))
    }
}
