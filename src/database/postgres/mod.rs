// database/postgres/mod.rs - PostgreSQL accessors
//
// Tables are created on startup when missing. There is no migration
// tracking beyond that.

pub mod group;
pub mod user;

pub use group::PgGroupAccessor;
pub use user::PgUserAccessor;

use sqlx::PgPool;
use tracing::info;

use crate::database::accessor::AccessorError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        login TEXT NOT NULL,
        password TEXT NOT NULL,
        age INTEGER NOT NULL,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_login_live ON users (login) WHERE NOT is_deleted",
    r#"
    CREATE TABLE IF NOT EXISTS user_groups (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        permissions TEXT[] NOT NULL DEFAULT '{}',
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS user_groups_name_live ON user_groups (name) WHERE NOT is_deleted",
];

/// Create the users and groups tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema is ready");
    Ok(())
}

/// Unique violations become conflicts; everything else stays a database error
fn map_write_error(err: sqlx::Error) -> AccessorError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AccessorError::Conflict(db_err.message().to_string());
        }
    }
    AccessorError::Database(err)
}

/// `LIMIT NULL` means no limit in PostgreSQL
fn sql_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_maps_to_nullable_bigint() {
        assert_eq!(sql_limit(None), None);
        assert_eq!(sql_limit(Some(5)), Some(5));
        assert_eq!(sql_limit(Some(usize::MAX)), Some(i64::MAX));
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AccessorError::Database(sqlx::Error::RowNotFound)));
    }
}
