use async_trait::async_trait;
use sqlx::PgPool;

use super::{map_write_error, sql_limit};
use crate::database::accessor::{AccessorError, DataAccessor, Entity};
use crate::database::models::User;

const USER_COLUMNS: &str = "id, login, password, age, is_deleted";

pub struct PgUserAccessor {
    pool: PgPool,
}

impl PgUserAccessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataAccessor<User> for PgUserAccessor {
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND NOT is_deleted",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_some_by_substring(
        &self,
        pattern: &str,
        limit: Option<usize>,
    ) -> Result<Vec<User>, AccessorError> {
        // strpos avoids escaping LIKE wildcards in the pattern
        let sql = format!(
            "SELECT {} FROM users WHERE NOT is_deleted AND strpos(login, $1) > 0 ORDER BY login LIMIT $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(pattern)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create_or_update(&self, mut entity: User) -> Result<Option<User>, AccessorError> {
        if entity.id().is_empty() {
            entity.assign_id(uuid::Uuid::new_v4().to_string());
        }

        let sql = format!(
            r#"
            INSERT INTO users (id, login, password, age, is_deleted)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                login = EXCLUDED.login,
                password = EXCLUDED.password,
                age = EXCLUDED.age,
                is_deleted = EXCLUDED.is_deleted
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&entity.id)
            .bind(&entity.login)
            .bind(&entity.password)
            .bind(entity.age)
            .bind(entity.is_deleted)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }
}
