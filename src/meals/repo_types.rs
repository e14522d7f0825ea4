use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];
}

/// One recorded eating event. Macro fields are already scaled to the serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMeal {
    pub id: String,
    pub food_id: String,
    pub name: String,
    pub image: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub servings: f64,
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime, // fixed at creation
}

/// Fields supplied by the caller when logging a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeal {
    pub food_id: String,
    pub name: String,
    pub image: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub servings: f64,
    pub meal_type: MealType,
}

/// Partial edit. There is no slot for `id` or `timestamp`, so a payload
/// carrying them deserializes with those keys dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealUpdate {
    #[serde(default)]
    pub food_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub servings: Option<f64>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
}

impl LoggedMeal {
    pub(crate) fn from_new(meal: NewMeal, id: String, timestamp: OffsetDateTime) -> Self {
        let NewMeal {
            food_id,
            name,
            image,
            calories,
            protein,
            carbs,
            fat,
            servings,
            meal_type,
        } = meal;
        Self {
            id,
            food_id,
            name,
            image,
            calories,
            protein,
            carbs,
            fat,
            servings,
            meal_type,
            timestamp,
        }
    }

    pub(crate) fn apply(&mut self, update: MealUpdate) {
        if let Some(v) = update.food_id {
            self.food_id = v;
        }
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.image {
            self.image = v;
        }
        if let Some(v) = update.calories {
            self.calories = v;
        }
        if let Some(v) = update.protein {
            self.protein = v;
        }
        if let Some(v) = update.carbs {
            self.carbs = v;
        }
        if let Some(v) = update.fat {
            self.fat = v;
        }
        if let Some(v) = update.servings {
            self.servings = v;
        }
        if let Some(v) = update.meal_type {
            self.meal_type = v;
        }
    }
}

/// The active daily targets. Replaced wholesale, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSettings {
    pub calorie_goal: f64,
    pub protein_goal: f64,
    pub carbs_goal: f64,
    pub fat_goal: f64,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            calorie_goal: 2500.0,
            protein_goal: 150.0,
            carbs_goal: 250.0,
            fat_goal: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    pub(crate) fn with_meal(mut self, meal: &LoggedMeal) -> Self {
        self.calories += meal.calories;
        self.protein += meal.protein;
        self.carbs += meal.carbs;
        self.fat += meal.fat;
        self
    }
}
