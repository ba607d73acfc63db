#![allow(dead_code)]
use crate::db::{DbPool, schema};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

// Fresh in-memory database with the full schema, one per test
pub(crate) async fn setup_test_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()
        .map_err(|e| Error::Database(format!("Test DB: Failed to open in-memory: {}", e)))?;
    conn.execute("PRAGMA foreign_keys = ON;", [])
        .map_err(|e| Error::Database(format!("Test DB: Failed to enable foreign keys: {}", e)))?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

// Direct user insert with a placeholder hash, bypassing bcrypt for tests that
// only need a valid foreign key target
pub(crate) fn insert_test_user(conn: &Connection, email: &str, name: &str) -> Result<i64> {
    let mut stmt = conn
        .prepare_cached("INSERT INTO users (email, password_hash, name) VALUES (?1, 'x', ?2)")?;
    let id = stmt.insert(params![email, name])?;
    Ok(id)
}

// Variant with an explicit id, used to plant rows that must never surface
// (e.g. the reserved guest id)
pub(crate) fn insert_test_user_with_id(
    conn: &Connection,
    id: i64,
    email: &str,
    name: &str,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO users (id, email, password_hash, name) VALUES (?1, ?2, 'x', ?3)",
    )?;
    let id = stmt.insert(params![id, email, name])?;
    Ok(id)
}

// Simplified meal insert for test setup; nutrient strings get uniform values
// derived from the calories figure
pub(crate) fn direct_insert_meal(
    conn: &Connection,
    user_id: i64,
    date: NaiveDate,
    meal: &str,
    calories: f64,
) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO meal_logs (user_id, date_log, meal, calories, protein, carbs, fat, fiber, sugar, sodium)
         VALUES (?1, ?2, ?3, ?4, '10g', '20g', '5g', '2g', '1g', '100mg')",
    )?;
    let id = stmt.insert(params![user_id, date, meal, calories])?;
    Ok(id)
}

pub(crate) struct DirectMealArgs<'a> {
    pub(crate) conn: &'a Connection,
    pub(crate) user_id: i64,
    pub(crate) date: NaiveDate,
    pub(crate) meal: &'a str,
    pub(crate) calories: f64,
    pub(crate) protein: &'a str,
    pub(crate) carbs: &'a str,
    pub(crate) fat: &'a str,
    pub(crate) fiber: &'a str,
    pub(crate) sugar: &'a str,
    pub(crate) sodium: &'a str,
}

// Full-control variant for aggregation tests that need specific strings
pub(crate) fn direct_insert_meal_full(args: &DirectMealArgs<'_>) -> Result<i64> {
    let mut stmt = args.conn.prepare_cached(
        "INSERT INTO meal_logs (user_id, date_log, meal, calories, protein, carbs, fat, fiber, sugar, sodium)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    let id = stmt.insert(params![
        args.user_id,
        args.date,
        args.meal,
        args.calories,
        args.protein,
        args.carbs,
        args.fat,
        args.fiber,
        args.sugar,
        args.sodium,
    ])?;
    Ok(id)
}
