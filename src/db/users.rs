use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::User;
use bcrypt::{DEFAULT_COST, hash, verify};
use rusqlite::{OptionalExtension, params};
use tracing::{debug, info, instrument, warn};

/// Creates a new user with a bcrypt-hashed password.
///
/// # Returns
///
/// Returns `Ok(i64)` with the ID of the newly inserted user.
///
/// # Errors
///
/// Returns `Error::Duplicate` if the email is already registered, or
/// `Error::Database` if the database lock cannot be acquired.
#[instrument(skip(pool, password))]
pub async fn create_user(pool: &DbPool, email: &str, password: &str, name: &str) -> Result<i64> {
    let password_hash = hash(password, DEFAULT_COST)?;
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt =
        conn.prepare_cached("INSERT INTO users (email, password_hash, name) VALUES (?1, ?2, ?3)")?;
    let user_id = stmt
        .insert(params![email, password_hash, name])
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Duplicate(format!("email '{}' is already registered", email))
            }
            other => Error::from(other),
        })?;

    info!("Created user_id {} for email {}", user_id, email);
    Ok(user_id)
}

/// Authenticates a user by email and password.
///
/// Returns `Ok(None)` both for an unknown email and for a wrong password;
/// the caller shows the same message either way.
#[instrument(skip(pool, password))]
pub async fn authenticate(pool: &DbPool, email: &str, password: &str) -> Result<Option<User>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt =
        conn.prepare_cached("SELECT id, email, name, password_hash FROM users WHERE email = ?1")?;
    let row: Option<(i64, String, String, String)> = stmt
        .query_row(params![email], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .optional()?;

    let Some((id, email, name, password_hash)) = row else {
        debug!("No user found for email {}", email);
        return Ok(None);
    };

    if verify(password, &password_hash)? {
        info!("Authenticated user_id {}", id);
        Ok(Some(User { id, email, name }))
    } else {
        warn!("Password mismatch for user_id {}", id);
        Ok(None)
    }
}

/// Deletes a user account. The profile row and all meal log entries cascade.
///
/// # Errors
///
/// Returns `Error::NotFound` if no user has the given id.
#[instrument(skip(pool))]
pub async fn delete_user(pool: &DbPool, user_id: i64) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    if rows == 0 {
        return Err(Error::NotFound(format!("user id {}", user_id)));
    }
    info!("Deleted user_id {} (profile and meal logs cascaded)", user_id);
    Ok(())
}
