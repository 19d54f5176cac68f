//! Body Mass Index calculation and category interpretation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const UNDERWEIGHT_BELOW: f64 = 18.5;
const OVERWEIGHT_FROM: f64 = 25.0;
const OBESE_FROM: f64 = 30.0;

/// Why a weight/height pair could not be turned into a BMI.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BmiError {
    #[error("height must not be zero")]
    DivisionByZero,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("computation failed: {0}")]
    Computation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Place a BMI value on the contiguous partition `[0, 18.5) [18.5, 25) [25, 30) [30, ∞)`.
    pub fn from_value(value: f64) -> Self {
        if value < UNDERWEIGHT_BELOW {
            Self::Underweight
        } else if value < OVERWEIGHT_FROM {
            Self::Normal
        } else if value < OBESE_FROM {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "體重過輕",
            Self::Normal => "健康",
            Self::Overweight => "體重過重",
            Self::Obese => "肥胖",
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            Self::Underweight => "建議增加營養攝取並結合力量訓練。",
            Self::Normal => "請繼續保持健康的生活方式！",
            Self::Overweight => "建議控制飲食並增加有氧運動。",
            Self::Obese => "建議在專業人士指導下進行飲食控制和系統健身計畫。",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    /// Rounded to two decimals.
    pub value: f64,
    pub category: BmiCategory,
    pub message: String,
}

/// Compute BMI from weight in kilograms and height in metres.
///
/// A zero height is reported as [`BmiError::DivisionByZero`] before any other
/// validation so callers can tell it apart from ordinary bad input.
pub fn classify(weight: f64, height: f64) -> Result<BmiResult, BmiError> {
    if height == 0.0 {
        return Err(BmiError::DivisionByZero);
    }
    if !weight.is_finite() || !height.is_finite() {
        return Err(BmiError::InvalidInput(
            "weight and height must be finite numbers".into(),
        ));
    }
    if weight <= 0.0 {
        return Err(BmiError::InvalidInput(format!(
            "weight must be positive, got {weight}"
        )));
    }
    if height < 0.0 {
        return Err(BmiError::InvalidInput(format!(
            "height must be positive, got {height}"
        )));
    }

    let raw = weight / (height * height);
    if !raw.is_finite() {
        return Err(BmiError::Computation(format!(
            "BMI for weight {weight} and height {height} is not a finite number"
        )));
    }

    // Categorize the rounded value so the number shown and the category agree.
    let value = (raw * 100.0).round() / 100.0;
    let category = BmiCategory::from_value(value);
    let message = format!(
        "你的 BMI 是 {value:.2}，屬於{}範圍，{}",
        category.label(),
        category.recommendation()
    );

    Ok(BmiResult {
        value,
        category,
        message,
    })
}
