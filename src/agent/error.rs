//! Failures a single turn can run into.
//!
//! None of these escape the assistant: each is turned into a reply drawn from
//! the fixed messages in [`FlowError::user_message`]. The variant is kept on
//! the reply so callers and tests can tell them apart.

use crate::advice::FALLBACK_REPLY;
use crate::bmi::BmiError;
use thiserror::Error;

pub const INVALID_NUMBER_MESSAGE: &str = "請輸入有效的數字！體重與身高都必須是大於 0 的數值。";
pub const ZERO_HEIGHT_MESSAGE: &str = "身高不能為 0，請重新輸入有效的身高！";
pub const COMPUTATION_MESSAGE: &str = "計算 BMI 時發生問題，請確認輸入的數值後再試一次。";
/// Prefix marking replies produced because the model backend failed.
pub const BACKEND_UNAVAILABLE_PREFIX: &str = "[系統] 模型服務暫時無法使用，以下為預設建議：";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("division by zero: height is 0")]
    DivisionByZero,
    #[error("computation failed: {0}")]
    Computation(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Unsupported requests are answered with an apology instead; the variant
    /// exists so the taxonomy is complete.
    #[error("unsupported intent: {0}")]
    UnsupportedIntent(String),
}

impl FlowError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DivisionByZero => "division_by_zero",
            Self::Computation(_) => "computation",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::UnsupportedIntent(_) => "unsupported_intent",
        }
    }

    /// The user-facing text. Never includes the underlying error detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => INVALID_NUMBER_MESSAGE,
            Self::DivisionByZero => ZERO_HEIGHT_MESSAGE,
            Self::Computation(_) => COMPUTATION_MESSAGE,
            Self::BackendUnavailable(_) => BACKEND_UNAVAILABLE_PREFIX,
            Self::UnsupportedIntent(_) => FALLBACK_REPLY,
        }
    }
}

impl From<BmiError> for FlowError {
    fn from(err: BmiError) -> Self {
        match err {
            BmiError::DivisionByZero => Self::DivisionByZero,
            BmiError::InvalidInput(detail) => Self::InvalidInput(detail),
            BmiError::Computation(detail) => Self::Computation(detail),
        }
    }
}

/// Parse a user-typed number. Anything that is not a finite decimal is
/// [`FlowError::InvalidInput`].
pub fn parse_number(raw: &str) -> Result<f64, FlowError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FlowError::InvalidInput(format!("not a number: {trimmed:?}"))),
    }
}
