use crate::core::nutrition::coerce_calories;
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{GUEST_USER_ID, MealLogEntry};
use chrono::NaiveDate;
use rusqlite::{Row, params};
use tracing::{debug, info, instrument};

/// Default number of entries returned by [`get_meals`] when no limit is given.
pub const DEFAULT_LIST_LIMIT: u32 = 200;

/// The writable fields of a meal log entry, as submitted by the entry form
/// (or by the accept-recipe flow, which formats a bundle into these strings).
///
/// Calories is raw text here; it is coerced to a number at write time and is
/// the only field that gets any interpretation. The six nutrient strings are
/// stored verbatim, garbage included.
#[derive(Debug, Clone, Copy)]
pub struct MealFields<'a> {
    pub meal: &'a str,
    pub calories: &'a str,
    pub protein: &'a str,
    pub carbs: &'a str,
    pub fat: &'a str,
    pub fiber: &'a str,
    pub sugar: &'a str,
    pub sodium: &'a str,
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<MealLogEntry> {
    Ok(MealLogEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date_log: row.get(2)?,
        meal: row.get(3)?,
        calories: row.get(4)?,
        protein: row.get(5)?,
        carbs: row.get(6)?,
        fat: row.get(7)?,
        fiber: row.get(8)?,
        sugar: row.get(9)?,
        sodium: row.get(10)?,
    })
}

const ENTRY_COLUMNS: &str =
    "id, user_id, date_log, meal, calories, protein, carbs, fat, fiber, sugar, sodium";

/// Creates a new meal log entry.
///
/// Unparsable calories input is coerced to 0.0 rather than rejected; a log
/// entry is always recordable. The insert is a single statement, so a
/// persistence failure leaves no partial write behind.
///
/// # Returns
///
/// Returns `Ok(i64)` with the ID of the newly inserted entry.
#[instrument(skip(pool, fields))]
pub async fn add_meal(
    pool: &DbPool,
    user_id: i64,
    date: NaiveDate,
    fields: &MealFields<'_>,
) -> Result<i64> {
    let calories = coerce_calories(fields.calories);
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO meal_logs (user_id, date_log, meal, calories, protein, carbs, fat, fiber, sugar, sodium)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    let meal_id = stmt.insert(params![
        user_id,
        date,
        fields.meal,
        calories,
        fields.protein,
        fields.carbs,
        fields.fat,
        fields.fiber,
        fields.sugar,
        fields.sodium,
    ])?;

    info!(
        "Logged meal_id {} for user_id {} on {}: calories={}",
        meal_id, user_id, date, calories
    );
    Ok(meal_id)
}

/// Retrieves a user's meal log, newest first by (date, id), capped at `limit`
/// (default 200). The guest identity always gets an empty list without a
/// query.
#[instrument(skip(pool))]
pub async fn get_meals(pool: &DbPool, user_id: i64, limit: Option<u32>) -> Result<Vec<MealLogEntry>> {
    if user_id == GUEST_USER_ID {
        debug!("Guest session; skipping meal log query");
        return Ok(Vec::new());
    }
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ENTRY_COLUMNS} FROM meal_logs
         WHERE user_id = ?1
         ORDER BY date_log DESC, id DESC
         LIMIT ?2"
    ))?;
    let entries = stmt
        .query_map(params![user_id, i64::from(limit)], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!("Fetched {} meal entries for user_id {}", entries.len(), user_id);
    Ok(entries)
}

/// Retrieves all entries a user logged on one calendar date, oldest first.
/// This is the feed for the daily aggregator.
#[instrument(skip(pool))]
pub async fn get_meals_for_date(
    pool: &DbPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Vec<MealLogEntry>> {
    if user_id == GUEST_USER_ID {
        return Ok(Vec::new());
    }

    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ENTRY_COLUMNS} FROM meal_logs
         WHERE user_id = ?1 AND date_log = ?2
         ORDER BY id"
    ))?;
    let entries = stmt
        .query_map(params![user_id, date], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// Replaces every field of an existing entry. Partial updates are not
/// supported. Calories is coerced with the same leniency as [`add_meal`].
///
/// # Errors
///
/// Returns `Error::NotFound` if no entry has the given id.
#[instrument(skip(pool, fields))]
pub async fn update_meal(
    pool: &DbPool,
    meal_id: i64,
    date: NaiveDate,
    fields: &MealFields<'_>,
) -> Result<()> {
    let calories = coerce_calories(fields.calories);
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "UPDATE meal_logs
         SET date_log = ?1, meal = ?2, calories = ?3, protein = ?4, carbs = ?5,
             fat = ?6, fiber = ?7, sugar = ?8, sodium = ?9
         WHERE id = ?10",
    )?;
    let rows = stmt.execute(params![
        date,
        fields.meal,
        calories,
        fields.protein,
        fields.carbs,
        fields.fat,
        fields.fiber,
        fields.sugar,
        fields.sodium,
        meal_id,
    ])?;

    if rows == 0 {
        return Err(Error::NotFound(format!("meal log entry id {}", meal_id)));
    }
    info!("Updated meal_id {}", meal_id);
    Ok(())
}

/// Deletes a meal log entry by id. Idempotent: deleting an id that does not
/// exist (or was already deleted) is not an error.
#[instrument(skip(pool))]
pub async fn delete_meal(pool: &DbPool, meal_id: i64) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let rows = conn.execute("DELETE FROM meal_logs WHERE id = ?1", params![meal_id])?;
    debug!("Delete of meal_id {} removed {} row(s)", meal_id, rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{
        direct_insert_meal, init_test_tracing, insert_test_user, insert_test_user_with_id,
        setup_test_db,
    };
    use crate::errors::Result;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const PLAIN_FIELDS: MealFields<'static> = MealFields {
        meal: "Dal with rice",
        calories: "450",
        protein: "18.2g",
        carbs: "60g",
        fat: "9.5g",
        fiber: "7g",
        sugar: "3g",
        sodium: "640mg",
    };

    #[tokio::test]
    async fn test_add_then_list_round_trip() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;
        let user_id = {
            let conn = db_pool.lock().unwrap();
            insert_test_user(&conn, "log@example.com", "Log")?
        };

        let meal_id = add_meal(&db_pool, user_id, date(2025, 6, 1), &PLAIN_FIELDS).await?;
        assert!(meal_id > 0);

        let entries = get_meals(&db_pool, user_id, None).await?;
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, meal_id);
        assert_eq!(entry.meal, "Dal with rice");
        assert_eq!(entry.calories, 450.0);
        // The six nutrient strings come back byte-for-byte as submitted
        assert_eq!(entry.protein, "18.2g");
        assert_eq!(entry.carbs, "60g");
        assert_eq!(entry.fat, "9.5g");
        assert_eq!(entry.fiber, "7g");
        assert_eq!(entry.sugar, "3g");
        assert_eq!(entry.sodium, "640mg");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_coerces_unparsable_calories_to_zero() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;
        let user_id = {
            let conn = db_pool.lock().unwrap();
            insert_test_user(&conn, "coerce@example.com", "Coerce")?
        };

        let fields = MealFields {
            calories: "a lot",
            protein: "not a number either",
            ..PLAIN_FIELDS
        };
        add_meal(&db_pool, user_id, date(2025, 6, 1), &fields).await?;

        let entries = get_meals(&db_pool, user_id, None).await?;
        assert_eq!(entries[0].calories, 0.0, "Bad calories input becomes 0.0");
        assert_eq!(
            entries[0].protein, "not a number either",
            "Nutrient strings are preserved verbatim, not validated"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_caps() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;
        let user_id = {
            let conn = db_pool.lock().unwrap();
            let user_id = insert_test_user(&conn, "order@example.com", "Order")?;
            direct_insert_meal(&conn, user_id, date(2025, 5, 30), "older day", 100.0)?;
            direct_insert_meal(&conn, user_id, date(2025, 6, 1), "same day, first", 200.0)?;
            direct_insert_meal(&conn, user_id, date(2025, 6, 1), "same day, second", 300.0)?;
            user_id
        };

        let entries = get_meals(&db_pool, user_id, None).await?;
        let meals: Vec<&str> = entries.iter().map(|e| e.meal.as_str()).collect();
        assert_eq!(
            meals,
            vec!["same day, second", "same day, first", "older day"],
            "Ordered by date desc, then id desc"
        );

        let capped = get_meals(&db_pool, user_id, Some(2)).await?;
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].meal, "same day, second");
        Ok(())
    }

    #[tokio::test]
    async fn test_guest_list_is_empty_regardless_of_store() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;
        {
            let conn = db_pool.lock().unwrap();
            // Even a rogue row keyed to id 0 must never surface
            insert_test_user_with_id(&conn, GUEST_USER_ID, "rogue@example.com", "Rogue")?;
            direct_insert_meal(&conn, GUEST_USER_ID, date(2025, 6, 1), "phantom", 500.0)?;
        }

        assert!(get_meals(&db_pool, GUEST_USER_ID, None).await?.is_empty());
        assert!(
            get_meals_for_date(&db_pool, GUEST_USER_ID, date(2025, 6, 1))
                .await?
                .is_empty()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_every_field() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;
        let (user_id, meal_id) = {
            let conn = db_pool.lock().unwrap();
            let user_id = insert_test_user(&conn, "edit@example.com", "Edit")?;
            let meal_id = direct_insert_meal(&conn, user_id, date(2025, 6, 1), "draft", 100.0)?;
            (user_id, meal_id)
        };

        let replacement = MealFields {
            meal: "Paneer tikka",
            calories: "520kcal",
            protein: "32g",
            carbs: "12g",
            fat: "38g",
            fiber: "4g",
            sugar: "6g",
            sodium: "890mg",
        };
        update_meal(&db_pool, meal_id, date(2025, 6, 2), &replacement).await?;

        let entries = get_meals(&db_pool, user_id, None).await?;
        let entry = &entries[0];
        assert_eq!(entry.id, meal_id);
        assert_eq!(entry.date_log, date(2025, 6, 2));
        assert_eq!(entry.meal, "Paneer tikka");
        assert_eq!(entry.calories, 520.0, "Calories coerced on update too");
        assert_eq!(entry.sodium, "890mg");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails_loudly() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;

        let err = update_meal(&db_pool, 12345, date(2025, 6, 1), &PLAIN_FIELDS)
            .await
            .expect_err("Updating a missing entry should fail");
        assert!(matches!(err, Error::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db().await?;
        let (user_id, meal_id) = {
            let conn = db_pool.lock().unwrap();
            let user_id = insert_test_user(&conn, "del@example.com", "Del")?;
            let meal_id = direct_insert_meal(&conn, user_id, date(2025, 6, 1), "gone", 100.0)?;
            direct_insert_meal(&conn, user_id, date(2025, 6, 1), "kept", 200.0)?;
            (user_id, meal_id)
        };

        delete_meal(&db_pool, meal_id).await?;
        assert_eq!(get_meals(&db_pool, user_id, None).await?.len(), 1);

        // Second delete of the same id: no error, store unchanged
        delete_meal(&db_pool, meal_id).await?;
        let entries = get_meals(&db_pool, user_id, None).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].meal, "kept");
        Ok(())
    }
}
