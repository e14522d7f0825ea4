use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::meals::repo_types::{GoalSettings, LoggedMeal, MacroTotals, MealType};
use crate::meals::services::ServingChoice;

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

/// `YYYY-MM-DD`; blank counts as absent.
pub fn parse_date(raw: Option<&str>) -> Result<Option<Date>, (StatusCode, String)> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid date {:?}, expected YYYY-MM-DD", s))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummaryResponse {
    pub date: String,
    pub totals: MacroTotals,
    pub goals: GoalSettings,
    pub remaining_calories: f64,
    pub remaining_macros: MacroTotals,
    pub meals_by_type: BTreeMap<MealType, Vec<LoggedMeal>>,
}

/// Log a catalog food at a given serving.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFoodRequest {
    pub meal_type: MealType,
    #[serde(flatten)]
    pub choice: ServingChoice,
}

/// Analyze by name or photo, then log the estimate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeAndLogRequest {
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    pub meal_type: MealType,
    #[serde(flatten)]
    pub choice: ServingChoice,
}
