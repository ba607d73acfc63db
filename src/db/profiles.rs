use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::Profile;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, info, instrument};

/// Inserts or replaces a user's profile as a single unit.
///
/// Partial updates are not supported; every column is written on each save,
/// exactly as the profile form submits it.
#[instrument(skip(pool, profile))]
pub async fn upsert_profile(pool: &DbPool, profile: &Profile) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO profiles (user_id, name, dob, height_cm, weight_kg, activity_level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id) DO UPDATE SET
             name = excluded.name,
             dob = excluded.dob,
             height_cm = excluded.height_cm,
             weight_kg = excluded.weight_kg,
             activity_level = excluded.activity_level",
    )?;
    stmt.execute(params![
        profile.user_id,
        profile.name,
        profile.dob,
        profile.height_cm,
        profile.weight_kg,
        profile.activity_level,
    ])?;

    info!("Saved profile for user_id {}", profile.user_id);
    Ok(())
}

/// Retrieves a user's profile, or `None` if one was never saved.
#[instrument(skip(pool))]
pub async fn get_profile(pool: &DbPool, user_id: i64) -> Result<Option<Profile>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "SELECT user_id, name, dob, height_cm, weight_kg, activity_level
         FROM profiles WHERE user_id = ?1",
    )?;
    let profile = stmt
        .query_row(params![user_id], |row| {
            Ok(Profile {
                user_id: row.get(0)?,
                name: row.get(1)?,
                dob: row.get(2)?,
                height_cm: row.get(3)?,
                weight_kg: row.get(4)?,
                activity_level: row.get(5)?,
            })
        })
        .optional()?;

    debug!(
        "Profile lookup for user_id {}: {}",
        user_id,
        if profile.is_some() { "found" } else { "absent" }
    );
    Ok(profile)
}
