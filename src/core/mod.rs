/// Per-day nutrient aggregation over the meal log
pub mod analytics;

/// Derived health metrics (BMI)
pub mod health;

/// Normalization of free-form nutrient value strings
pub mod nutrition;
