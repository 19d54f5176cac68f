//! Fitness plan composition.
//!
//! A plan always echoes the request (goal, level, weekly hours) in a header and
//! then appends a prescriptive block. The block comes from the static advice
//! library unless the caller supplies model-generated text.

use crate::advice::{Goal, UNSUPPORTED_GOAL};

pub const DEFAULT_LEVEL: &str = "初學者";
pub const DEFAULT_HOURS_PER_WEEK: f64 = 5.0;

/// A plan request as typed by the user. Optional fields are raw text so that
/// blank or malformed answers fall back to defaults here rather than upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub goal: String,
    pub level: String,
    pub hours_per_week: f64,
}

impl PlanRequest {
    pub fn new(goal: &str, level: Option<&str>, hours_per_week: Option<&str>) -> Self {
        let level = level
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LEVEL)
            .to_string();
        let hours_per_week = hours_per_week
            .and_then(|h| h.trim().parse::<f64>().ok())
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(DEFAULT_HOURS_PER_WEEK);

        Self {
            goal: goal.trim().to_string(),
            level,
            hours_per_week,
        }
    }

    pub fn recognized_goal(&self) -> Option<Goal> {
        Goal::parse(&self.goal)
    }

    pub fn header(&self) -> String {
        format!(
            "健身目標：{}\n健身程度：{}\n每週訓練時數：{}",
            self.goal,
            self.level,
            format_hours(self.hours_per_week)
        )
    }

    /// Compose the final plan text. `body` replaces the static block for a
    /// recognized goal; it is ignored for an unrecognized one.
    pub fn compose(&self, body: Option<&str>) -> String {
        let block = match self.recognized_goal() {
            Some(goal) => body
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| goal.static_plan()),
            None => UNSUPPORTED_GOAL,
        };
        format!("{}\n\n{block}", self.header())
    }
}

/// Build a plan from the static library alone.
pub fn generate_plan(goal: &str, level: Option<&str>, hours_per_week: Option<&str>) -> String {
    PlanRequest::new(goal, level, hours_per_week).compose(None)
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours}")
    }
}
