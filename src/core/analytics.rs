//! Per-day nutrient aggregation.
//!
//! Recomputed on demand from the meal log; nothing here is persisted.
//! Calories was coerced to a number at write time and sums directly; the six
//! nutrient columns are free-form strings and go through the normalizer,
//! with anything unparsable contributing 0 to its sum.

use crate::core::nutrition::parse_leading_number;
use crate::db::{self, DbPool};
use crate::errors::Result;
use crate::models::{DailyTotals, GUEST_USER_ID, MealLogEntry};
use chrono::{Local, NaiveDate};
use tracing::{debug, instrument};

/// Computes the nutrient totals for everything a user logged today.
///
/// Returns `Ok(None)` for the guest identity without touching the store;
/// otherwise `Some(totals)`, where [`DailyTotals::is_empty`] tells the caller
/// to render an empty state instead of a zeroed chart.
#[instrument(skip(pool))]
pub async fn totals_for_today(pool: &DbPool, user_id: i64) -> Result<Option<DailyTotals>> {
    totals_for_date(pool, user_id, Local::now().date_naive()).await
}

/// Same as [`totals_for_today`] for an arbitrary calendar date.
#[instrument(skip(pool))]
pub async fn totals_for_date(
    pool: &DbPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<DailyTotals>> {
    if user_id == GUEST_USER_ID {
        debug!("Guest session; no analytics to compute");
        return Ok(None);
    }

    let entries = db::get_meals_for_date(pool, user_id, date).await?;
    let totals = sum_entries(&entries);
    debug!(
        "Totals for user_id {} on {}: {} entries, {} kcal",
        user_id, date, totals.entries, totals.calories
    );
    Ok(Some(totals))
}

fn sum_entries(entries: &[MealLogEntry]) -> DailyTotals {
    entries.iter().fold(DailyTotals::default(), |mut acc, e| {
        acc.calories += e.calories;
        acc.protein += parse_leading_number(&e.protein);
        acc.carbs += parse_leading_number(&e.carbs);
        acc.fat += parse_leading_number(&e.fat);
        acc.fiber += parse_leading_number(&e.fiber);
        acc.sugar += parse_leading_number(&e.sugar);
        acc.sodium += parse_leading_number(&e.sodium);
        acc.entries += 1;
        acc
    })
}
