//! Body mass index classification.

use serde::{Deserialize, Serialize};

/// WHO weight class for a body mass index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiClass {
    /// Below 18.5
    Underweight,
    /// 18.5 up to 25
    Normal,
    /// 25 up to 30
    Overweight,
    /// 30 and above
    Obese,
}

impl BmiClass {
    /// Classify a BMI value.
    pub fn from_bmi(bmi: f32) -> Self {
        if bmi < 18.5 {
            BmiClass::Underweight
        } else if bmi < 25.0 {
            BmiClass::Normal
        } else if bmi < 30.0 {
            BmiClass::Overweight
        } else {
            BmiClass::Obese
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            BmiClass::Underweight => "Untergewicht",
            BmiClass::Normal => "Normalgewicht",
            BmiClass::Overweight => "Übergewicht",
            BmiClass::Obese => "Adipositas",
        }
    }
}

impl std::fmt::Display for BmiClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Compute BMI from weight in kg and height in cm, rounded to one decimal.
///
/// Returns `None` for non-positive inputs.
pub fn body_mass_index(weight_kg: f32, height_cm: f32) -> Option<f32> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    Some((bmi * 10.0).round() / 10.0)
}
