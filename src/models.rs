use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reserved id for the anonymous guest session. Never written to the store;
/// repositories short-circuit reads for it.
pub const GUEST_USER_ID: i64 = 0;

// Mirrors the "users" table (password_hash stays inside db::users)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl User {
    /// Synthesizes the in-memory guest identity for an unauthenticated session.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            id: GUEST_USER_ID,
            email: String::new(),
            name: "Guest".to_string(),
        }
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.id == GUEST_USER_ID
    }
}

// Mirrors the "profiles" table; one row per user, upserted as a unit
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Profile {
    pub user_id: i64,
    pub name: String,
    pub dob: String, // free-form "YYYY-MM-DD", not validated
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: String,
}

// Mirrors the "meal_logs" table
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MealLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub date_log: NaiveDate,
    pub meal: String,
    /// Coerced to a number at write time; unparsable input becomes 0.0.
    pub calories: f64,
    // The six nutrient fields are stored verbatim as entered, typically a
    // leading number plus a unit suffix ("18.2g"). Summed through
    // core::nutrition::parse_leading_number.
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub fiber: String,
    pub sugar: String,
    pub sodium: String,
}

/// Per-day nutrient sums for one user. Derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    /// Number of entries that matched the (user, date) filter.
    pub entries: usize,
}

impl DailyTotals {
    /// True when nothing was logged for the day; callers render this as an
    /// empty state rather than a zero-valued chart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0 && self.calories == 0.0
    }
}

/// A single quantity+unit nutrient fact, e.g. `{12.5, "g"}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NutrientAmount {
    pub quantity: f64,
    pub unit: String,
}

impl NutrientAmount {
    #[must_use]
    pub fn new(quantity: f64, unit: &str) -> Self {
        Self {
            quantity,
            unit: unit.to_string(),
        }
    }

    /// Renders the amount the way the log stores it: `"12.5g"`, one decimal.
    #[must_use]
    pub fn to_field_string(&self) -> String {
        format!("{:.1}{}", self.quantity, self.unit)
    }
}

/// The canonical seven-field shape handed from the recipe result mapper to
/// the entry-population step. Transient; never persisted as such.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NutrientBundle {
    pub calories: NutrientAmount,
    pub protein: NutrientAmount,
    pub carbs: NutrientAmount,
    pub fat: NutrientAmount,
    pub fiber: NutrientAmount,
    pub sugar: NutrientAmount,
    pub sodium: NutrientAmount,
}

/// One mapped recipe candidate from the lookup service.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeHit {
    pub title: String,
    /// Rounded integer of the looked-up Calories amount.
    pub calories: i64,
    pub nutrients: NutrientBundle,
}
