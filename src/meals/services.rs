use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::catalog::repo_types::FoodItem;
use crate::meals::repo::MealLedger;
use crate::meals::repo_types::{LoggedMeal, MealType, NewMeal};
use crate::relay::client::FoodAnalyzer;
use crate::relay::dto::FoodAnalysis;
use crate::relay::error::RelayError;

const FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=400&h=400&fit=crop";

/// Which serving of a food and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingChoice {
    #[serde(default)]
    pub serving_index: usize,
    #[serde(default = "one")]
    pub quantity: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for ServingChoice {
    fn default() -> Self {
        Self {
            serving_index: 0,
            quantity: 1.0,
        }
    }
}

/// Scale factor relative to the first serving size; a missing or zero
/// gram weight falls back to 100 g for the base and to the base otherwise.
pub fn serving_multiplier(grams: &[f64], choice: ServingChoice) -> f64 {
    let base = grams.first().copied().filter(|g| *g != 0.0).unwrap_or(100.0);
    let selected = grams
        .get(choice.serving_index)
        .copied()
        .filter(|g| *g != 0.0)
        .unwrap_or(base);
    (selected / base) * choice.quantity
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn scaled(
    food_id: String,
    name: String,
    image: String,
    [calories, protein, carbs, fat]: [f64; 4],
    multiplier: f64,
    quantity: f64,
    meal_type: MealType,
) -> NewMeal {
    NewMeal {
        food_id,
        name,
        image,
        calories: (calories * multiplier).round(),
        protein: round1(protein * multiplier),
        carbs: round1(carbs * multiplier),
        fat: round1(fat * multiplier),
        servings: quantity,
        meal_type,
    }
}

pub fn food_to_meal(food: &FoodItem, choice: ServingChoice, meal_type: MealType) -> NewMeal {
    let grams: Vec<f64> = food.serving_sizes.iter().map(|s| s.grams).collect();
    scaled(
        food.id.clone(),
        food.name.clone(),
        food.image.clone(),
        [food.calories, food.protein, food.carbs, food.fat],
        serving_multiplier(&grams, choice),
        choice.quantity,
        meal_type,
    )
}

/// Where an AI estimate came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalysisSource<'a> {
    Named(&'a str),
    Photo,
}

impl AnalysisSource<'_> {
    pub fn food_id(&self) -> String {
        match self {
            AnalysisSource::Named(name) if !name.trim().is_empty() => format!("ai-{}", name.trim()),
            AnalysisSource::Named(_) => "ai-custom".into(),
            AnalysisSource::Photo => "ai-image".into(),
        }
    }
}

/// AI serving labels carry no weights, so every size counts as 100 g.
pub fn meal_from_analysis(
    analysis: &FoodAnalysis,
    source: AnalysisSource<'_>,
    choice: ServingChoice,
    meal_type: MealType,
) -> NewMeal {
    let grams = vec![100.0; analysis.serving_sizes.len()];
    let image = if analysis.image.starts_with("http") {
        analysis.image.clone()
    } else if !analysis.image.is_empty() && analysis.image.chars().count() < 10 {
        analysis.image.clone()
    } else {
        FALLBACK_IMAGE.to_string()
    };
    scaled(
        source.food_id(),
        analysis.name.clone(),
        image,
        [analysis.calories, analysis.protein, analysis.carbs, analysis.fat],
        serving_multiplier(&grams, choice),
        choice.quantity,
        meal_type,
    )
}

/// What to hand the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput {
    FoodName(String),
    Image(String),
}

/// Ask the analyzer, then log the estimate. The ledger lock is only taken
/// once the relay has answered; a relay failure leaves the ledger untouched.
#[instrument(skip(ledger, analyzer, input))]
pub async fn log_analyzed_food(
    ledger: &RwLock<MealLedger>,
    analyzer: &dyn FoodAnalyzer,
    input: &AnalysisInput,
    choice: ServingChoice,
    meal_type: MealType,
) -> Result<LoggedMeal, RelayError> {
    let new_meal = match input {
        AnalysisInput::FoodName(name) => {
            let analysis = analyzer.analyze_food(name).await?;
            meal_from_analysis(&analysis, AnalysisSource::Named(name), choice, meal_type)
        }
        AnalysisInput::Image(image) => {
            let analysis = analyzer.analyze_image(image).await?;
            meal_from_analysis(&analysis.food, AnalysisSource::Photo, choice, meal_type)
        }
    };
    let meal = ledger.write().await.add_meal(new_meal);
    info!(meal_id = %meal.id, food_id = %meal.food_id, "analyzed meal logged");
    Ok(meal)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: String,
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub goal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub days: Vec<DaySummary>,
    pub weekly_average: i64,
    pub days_on_target: usize,
}

fn short(s: impl ToString) -> String {
    s.to_string().chars().take(3).collect()
}

/// Seven days ending at `end`, oldest first. `None` when the window would
/// start before the earliest representable date.
pub fn weekly_summary(ledger: &MealLedger, end: Date) -> Option<WeeklySummary> {
    let goal = ledger.goals().calorie_goal;
    let start = end.checked_sub(Duration::days(6))?;
    let days: Vec<DaySummary> = std::iter::successors(Some(start), |d| d.next_day())
        .take(7)
        .map(|date| {
            let totals = ledger.totals(Some(date));
            DaySummary {
                day: short(date.weekday()),
                date: format!("{} {}", short(date.month()), date.day()),
                calories: totals.calories,
                protein: totals.protein,
                carbs: totals.carbs,
                fat: totals.fat,
                goal,
            }
        })
        .collect();

    let sum: f64 = days.iter().map(|d| d.calories).sum();
    let days_on_target = days
        .iter()
        .filter(|d| d.calories >= goal * 0.8 && d.calories <= goal * 1.1)
        .count();
    Some(WeeklySummary {
        days,
        weekly_average: (sum / 7.0).round() as i64,
        days_on_target,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MealEntry {
    pub name: String,
    pub calories: f64,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub average_calories: i64,
    pub daily_average: i64,
    pub highest_calorie_day: String,
    pub highest_calories: i64,
}

/// Per-meal mean, per-day mean and the heaviest day. Values truncate
/// toward zero; ties for the heaviest day go to the earliest date.
pub fn process_analytics(entries: &[MealEntry]) -> AnalyticsReport {
    if entries.is_empty() {
        return AnalyticsReport {
            average_calories: 0,
            daily_average: 0,
            highest_calorie_day: "N/A".into(),
            highest_calories: 0,
        };
    }

    let total: f64 = entries.iter().map(|e| e.calories).sum();
    let mut by_day: BTreeMap<&str, f64> = BTreeMap::new();
    for e in entries {
        *by_day.entry(e.date.as_str()).or_default() += e.calories;
    }

    let mut highest: Option<(&str, f64)> = None;
    for (day, cals) in &by_day {
        if highest.map_or(true, |(_, best)| *cals > best) {
            highest = Some((day, *cals));
        }
    }
    let (highest_day, highest_calories) = highest.unwrap_or(("N/A", 0.0));

    AnalyticsReport {
        average_calories: (total / entries.len() as f64) as i64,
        daily_average: (by_day.values().sum::<f64>() / by_day.len() as f64) as i64,
        highest_calorie_day: highest_day.to_string(),
        highest_calories: highest_calories as i64,
    }
}

/// Every meal of the last `days` days ending today, as analytics entries,
/// in insertion order. One pass over the ledger whatever the window size.
pub fn recent_entries(ledger: &MealLedger, days: u32) -> Vec<MealEntry> {
    if days == 0 {
        return Vec::new();
    }
    let today = ledger.today();
    let start = today
        .checked_sub(Duration::days(i64::from(days) - 1))
        .unwrap_or(Date::MIN);
    ledger
        .meals()
        .iter()
        .filter_map(|m| {
            let day = ledger.day_of(m.timestamp);
            (start <= day && day <= today).then(|| MealEntry {
                name: m.name.clone(),
                calories: m.calories,
                date: day.to_string(),
            })
        })
        .collect()
}
