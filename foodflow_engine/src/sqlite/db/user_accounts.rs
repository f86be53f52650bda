use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, UserAccount, UserId},
    helpers::create_password_hash,
    traits::AuthApiError,
};

/// Inserts a new user account. The password is hashed here; the plaintext never reaches the database.
///
/// Emails are unique (case-insensitively). A duplicate insert maps to [`AuthApiError::EmailAlreadyInUse`], so
/// callers racing on the same email lose cleanly rather than with a constraint error.
pub async fn insert_user(user: &NewUser, conn: &mut SqliteConnection) -> Result<UserAccount, AuthApiError> {
    let password_hash = create_password_hash(user.password.reveal());
    let account: UserAccount = sqlx::query_as(
        r#"
            INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(user.name.as_str())
    .bind(user.email.as_str())
    .bind(password_hash)
    .fetch_one(conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(de) if de.is_unique_violation() => AuthApiError::EmailAlreadyInUse,
        _ => AuthApiError::from(e),
    })?;
    trace!("🧑️ New account {} created for {}", account.id, account.email);
    Ok(account)
}

pub async fn user_by_id(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let account = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(account)
}

/// Fetches the account registered under `email`. The email column collates case-insensitively, so
/// `Alice@example.com` and `alice@example.com` refer to the same account.
pub async fn user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let account = sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(account)
}
