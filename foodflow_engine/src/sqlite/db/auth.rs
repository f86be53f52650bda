//! Sqlite database operations for accounts and role assignments.
//!
//! Generally clients should never call these methods directly, and prefer to use the [`crate::traits::AuthManagement`]
//! trait methods that are implemented on the [`crate::SqliteDatabase`] struct instead.

use log::error;
use sqlx::{QueryBuilder, Row, SqliteConnection};

use crate::{
    db_types::{Role, Roles, UserId},
    traits::AuthApiError,
};

pub async fn roles_for_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Roles, AuthApiError> {
    let rows: Vec<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    let roles = rows
        .iter()
        .map(|r| {
            r.parse::<Role>().map_err(|_| {
                error!("🧑️ The roles table contains an unknown role '{r}' for user {user_id}");
                AuthApiError::DatabaseError(format!("Unknown role in database: {r}"))
            })
        })
        .collect::<Result<Roles, _>>()?;
    Ok(roles)
}

pub async fn user_has_roles(user_id: UserId, roles: &[Role], conn: &mut SqliteConnection) -> Result<(), AuthApiError> {
    let role_strings = roles.iter().map(|r| format!("'{r}'")).collect::<Vec<String>>().join(",");
    let q = format!(r#"SELECT count(role) as "num_roles" FROM user_roles WHERE user_id = ? AND role IN ({role_strings})"#);
    #[allow(clippy::cast_possible_truncation)]
    let num_matching_roles = sqlx::query(&q).bind(user_id).fetch_one(conn).await?.get::<i64, usize>(0) as usize;
    if num_matching_roles == roles.len() {
        Ok(())
    } else {
        let n = roles.len().saturating_sub(num_matching_roles);
        Err(AuthApiError::RoleNotAllowed(n))
    }
}

/// Assigns the given roles to the user. Roles the user already holds are skipped, so the call is idempotent.
pub async fn assign_roles(user_id: UserId, roles: &[Role], conn: &mut SqliteConnection) -> Result<(), AuthApiError> {
    if roles.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::new("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES ");
    let mut values = qb.separated(", ");
    for role in roles {
        values.push("(");
        values.push_bind_unseparated(user_id);
        values.push_unseparated(", ");
        values.push_bind_unseparated(role.to_string());
        values.push_unseparated(")");
    }
    qb.build().execute(conn).await?;
    Ok(())
}

/// Removes the given roles from the user, returning the number of assignments actually deleted.
pub async fn remove_roles(user_id: UserId, roles: &[Role], conn: &mut SqliteConnection) -> Result<u64, AuthApiError> {
    if roles.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::new("DELETE FROM user_roles WHERE user_id = ");
    qb.push_bind(user_id);
    qb.push(" AND role IN (");
    let mut values = qb.separated(", ");
    roles.iter().for_each(|role| {
        values.push_bind(role.to_string());
    });
    qb.push(")");
    let res = qb.build().execute(conn).await?;
    Ok(res.rows_affected())
}
