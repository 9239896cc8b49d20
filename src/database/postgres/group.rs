use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use super::{map_write_error, sql_limit};
use crate::database::accessor::{AccessorError, DataAccessor, Entity};
use crate::database::models::{Group, Permission};

const GROUP_COLUMNS: &str = "id, name, permissions, is_deleted";

/// Row shape of `user_groups`; permissions are stored as text
#[derive(Debug, FromRow)]
struct GroupRow {
    id: String,
    name: String,
    permissions: Vec<String>,
    is_deleted: bool,
}

impl TryFrom<GroupRow> for Group {
    type Error = AccessorError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        let permissions = row
            .permissions
            .iter()
            .map(|p| p.parse::<Permission>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AccessorError::InvalidRecord(format!("group {}: {}", row.id, e)))?;

        Ok(Group {
            id: row.id,
            name: row.name,
            permissions,
            is_deleted: row.is_deleted,
        })
    }
}

pub struct PgGroupAccessor {
    pool: PgPool,
}

impl PgGroupAccessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataAccessor<Group> for PgGroupAccessor {
    async fn get_by_id(&self, id: &str) -> Result<Option<Group>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM user_groups WHERE id = $1 AND NOT is_deleted",
            GROUP_COLUMNS
        );
        sqlx::query_as::<_, GroupRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Group::try_from)
            .transpose()
    }

    async fn get_some_by_substring(
        &self,
        pattern: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Group>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM user_groups WHERE NOT is_deleted AND strpos(name, $1) > 0 ORDER BY name LIMIT $2",
            GROUP_COLUMNS
        );
        sqlx::query_as::<_, GroupRow>(&sql)
            .bind(pattern)
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Group::try_from)
            .collect()
    }

    async fn create_or_update(&self, mut entity: Group) -> Result<Option<Group>, AccessorError> {
        if entity.id().is_empty() {
            entity.assign_id(uuid::Uuid::new_v4().to_string());
        }

        let permissions: Vec<String> = entity.permissions.iter().map(|p| p.as_str().to_string()).collect();
        let sql = format!(
            r#"
            INSERT INTO user_groups (id, name, permissions, is_deleted)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                permissions = EXCLUDED.permissions,
                is_deleted = EXCLUDED.is_deleted
            RETURNING {}
            "#,
            GROUP_COLUMNS
        );

        sqlx::query_as::<_, GroupRow>(&sql)
            .bind(&entity.id)
            .bind(&entity.name)
            .bind(permissions)
            .bind(entity.is_deleted)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .map(Group::try_from)
            .transpose()
    }
}
