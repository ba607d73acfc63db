use crate::errors::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

#[instrument(skip(conn))]
pub(crate) fn create_tables(conn: &Connection) -> Result<()> {
    debug!("Executing CREATE TABLE statements if tables do not exist.");
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT ''
        );

        -- One row per user, written as a whole on every save
        CREATE TABLE IF NOT EXISTS profiles (
            user_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            dob TEXT NOT NULL DEFAULT '',
            height_cm REAL NOT NULL DEFAULT 0,
            weight_kg REAL NOT NULL DEFAULT 0,
            activity_level TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );

        -- calories is numeric (coerced at write time); the six nutrient
        -- columns keep whatever text was entered, unit suffix included
        CREATE TABLE IF NOT EXISTS meal_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            date_log TEXT NOT NULL,
            meal TEXT NOT NULL,
            calories REAL NOT NULL DEFAULT 0,
            protein TEXT NOT NULL DEFAULT '',
            carbs TEXT NOT NULL DEFAULT '',
            fat TEXT NOT NULL DEFAULT '',
            fiber TEXT NOT NULL DEFAULT '',
            sugar TEXT NOT NULL DEFAULT '',
            sodium TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );

        -- The daily aggregator filters on exactly this pair
        CREATE INDEX IF NOT EXISTS idx_meal_logs_user_date
            ON meal_logs(user_id, date_log);

        COMMIT;",
    )
    .map_err(|e| Error::Database(format!("Failed to create tables: {}", e)))?;
    info!("Database tables ensured (users, profiles, meal_logs).");
    Ok(())
}
