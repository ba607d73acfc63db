//! Derived health metrics. Nothing in here is persisted; the profile page
//! recomputes BMI from the stored measurements every time it is shown.

use std::fmt;

/// Weight classification for a computed BMI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obesity,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Underweight => "Underweight",
            Self::NormalWeight => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obesity => "Obesity",
        };
        write!(f, "{label}")
    }
}

impl BmiCategory {
    fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::NormalWeight
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obesity
        }
    }
}

/// A computed body-mass index, rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

/// Computes BMI from a profile's measurements.
///
/// Returns `None` unless both height and weight are strictly positive; the
/// caller displays the metric as absent rather than as zero.
#[must_use]
pub fn bmi_from_measurements(height_cm: f64, weight_kg: f64) -> Option<Bmi> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let value = (weight_kg / (height_m * height_m) * 10.0).round() / 10.0;
    Some(Bmi {
        value,
        category: BmiCategory::from_value(value),
    })
}
