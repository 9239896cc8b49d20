use std::sync::Arc;

use thiserror::Error;

use crate::auth::{JwtError, JwtKeys};
use crate::config::{ApiConfig, AppConfig, StorageBackend};
use crate::database::accessor::DataAccessor;
use crate::database::models::{Group, User, UserPayload};
use crate::database::postgres::{self, PgGroupAccessor, PgUserAccessor};
use crate::database::{DatabaseError, DatabaseManager, MemoryAccessor, Storage};
use crate::services::{GroupService, ServiceError, UserService};

/// Age recorded for the startup account
const BOOTSTRAP_AGE: i32 = 30;

/// Page size rules for search endpoints
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub default: usize,
    pub max: usize,
}

impl SearchLimits {
    /// Requested limit, falling back to the default and capped at the maximum
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default).min(self.max)
    }
}

impl From<&ApiConfig> for SearchLimits {
    fn from(api: &ApiConfig) -> Self {
        Self {
            default: api.default_search_limit,
            max: api.max_search_limit,
        }
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Jwt(#[from] JwtError),

    #[error("invalid bootstrap user: {0}")]
    InvalidBootstrapUser(String),

    #[error("failed to create bootstrap user: {0}")]
    Bootstrap(#[from] ServiceError),
}

/// Shared handles every handler sees
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub groups: GroupService,
    pub jwt: JwtKeys,
    pub storage: Storage,
    pub limits: SearchLimits,
}

impl AppState {
    /// Wire services to the storage backend selected in `config`
    pub async fn build(config: &AppConfig) -> Result<Self, StateError> {
        let (users, groups, storage): (
            Arc<dyn DataAccessor<User>>,
            Arc<dyn DataAccessor<Group>>,
            Storage,
        ) = match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                (
                    Arc::new(MemoryAccessor::<User>::new()),
                    Arc::new(MemoryAccessor::<Group>::new()),
                    Storage::Memory,
                )
            }
            StorageBackend::Postgres => {
                let db = DatabaseManager::connect(&config.database).await?;
                postgres::ensure_schema(db.pool())
                    .await
                    .map_err(DatabaseError::from)?;
                (
                    Arc::new(PgUserAccessor::new(db.pool().clone())),
                    Arc::new(PgGroupAccessor::new(db.pool().clone())),
                    Storage::Postgres(db),
                )
            }
        };

        let users = UserService::new(users);
        if let Some(bootstrap) = &config.security.bootstrap_user {
            let payload = UserPayload {
                login: bootstrap.login.clone(),
                password: bootstrap.password.clone(),
                age: BOOTSTRAP_AGE,
            };
            payload.validate().map_err(|errors| {
                let mut fields: Vec<_> = errors.into_values().collect();
                fields.sort();
                StateError::InvalidBootstrapUser(fields.join("; "))
            })?;
            let user = users.ensure_user(payload).await?;
            tracing::info!(user_id = %user.id, login = %user.login, "bootstrap user ready");
        }

        Ok(Self {
            users,
            groups: GroupService::new(groups),
            jwt: JwtKeys::from_config(&config.security)?,
            storage,
            limits: SearchLimits::from(&config.api),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_limit_resolution() {
        let limits = SearchLimits { default: 10, max: 100 };
        assert_eq!(limits.resolve(None), 10);
        assert_eq!(limits.resolve(Some(3)), 3);
        assert_eq!(limits.resolve(Some(5000)), 100);
    }

    #[tokio::test]
    async fn memory_backend_builds_without_database() {
        let mut config = AppConfig::development();
        config.storage = StorageBackend::Memory;

        let state = AppState::build(&config).await.unwrap();
        assert_eq!(state.storage.label(), "memory");
        assert!(state.storage.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn bootstrap_user_can_log_in() {
        let mut config = AppConfig::development();
        config.storage = StorageBackend::Memory;
        config.security.bootstrap_user = Some(crate::config::BootstrapUser {
            login: "root".to_string(),
            password: "rootpass1".to_string(),
        });

        let state = AppState::build(&config).await.unwrap();
        let user = state
            .users
            .check_user_credentials("root", "rootpass1")
            .await
            .unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn weak_bootstrap_password_is_rejected() {
        let mut config = AppConfig::development();
        config.storage = StorageBackend::Memory;
        config.security.bootstrap_user = Some(crate::config::BootstrapUser {
            login: "root".to_string(),
            password: "short".to_string(),
        });

        assert!(matches!(
            AppState::build(&config).await,
            Err(StateError::InvalidBootstrapUser(_))
        ));
    }

    #[tokio::test]
    async fn postgres_backend_requires_url() {
        let mut config = AppConfig::development();
        config.database.url = None;

        let result = AppState::build(&config).await;
        assert!(matches!(
            result,
            Err(StateError::Database(DatabaseError::ConfigMissing("DATABASE_URL")))
        ));
    }
}
