use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use time::{Date, Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::meals::repo_types::{GoalSettings, LoggedMeal, MacroTotals, MealType, MealUpdate, NewMeal};
use crate::storage::KeyValueStore;

pub const MEALS_STORAGE_KEY: &str = "logged-meals";
pub const GOALS_STORAGE_KEY: &str = "nutrition-goals";

/// In-memory source of truth for logged meals and the active goals.
///
/// Every mutation is mirrored to the store right away. A failed write is
/// logged and otherwise ignored; the in-memory state stays authoritative.
/// Calendar days are evaluated in `offset`.
pub struct MealLedger {
    meals: Vec<LoggedMeal>,
    goals: GoalSettings,
    offset: UtcOffset,
    store: Arc<dyn KeyValueStore>,
}

impl MealLedger {
    /// Read both keys from the store, falling back to the seeded sample
    /// meals and the default goals when a key is absent or unreadable.
    pub fn load(store: Arc<dyn KeyValueStore>, offset: UtcOffset) -> Self {
        let meals = load_or_default(store.as_ref(), MEALS_STORAGE_KEY, || sample_meals(offset));
        let goals = load_or_default(store.as_ref(), GOALS_STORAGE_KEY, GoalSettings::default);
        info!(meals = meals.len(), calorie_goal = goals.calorie_goal, "ledger loaded");
        Self {
            meals,
            goals,
            offset,
            store,
        }
    }

    /// Build a ledger from known state without touching the store.
    pub fn from_parts(
        meals: Vec<LoggedMeal>,
        goals: GoalSettings,
        offset: UtcOffset,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            meals,
            goals,
            offset,
            store,
        }
    }

    pub fn meals(&self) -> &[LoggedMeal] {
        &self.meals
    }

    pub fn meal(&self, id: &str) -> Option<&LoggedMeal> {
        self.meals.iter().find(|m| m.id == id)
    }

    pub fn goals(&self) -> GoalSettings {
        self.goals
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    pub fn day_of(&self, timestamp: OffsetDateTime) -> Date {
        timestamp.to_offset(self.offset).date()
    }

    pub fn add_meal(&mut self, meal: NewMeal) -> LoggedMeal {
        let logged = LoggedMeal::from_new(meal, self.fresh_id(), self.now());
        self.meals.push(logged.clone());
        debug!(meal_id = %logged.id, name = %logged.name, calories = logged.calories, "meal added");
        self.persist_meals();
        logged
    }

    /// Unknown ids are ignored.
    pub fn remove_meal(&mut self, id: &str) {
        let before = self.meals.len();
        self.meals.retain(|m| m.id != id);
        if self.meals.len() == before {
            debug!(meal_id = %id, "remove of unknown meal ignored");
            return;
        }
        debug!(meal_id = %id, "meal removed");
        self.persist_meals();
    }

    /// Shallow merge; `id` and `timestamp` are never touched. Unknown ids are ignored.
    pub fn update_meal(&mut self, id: &str, update: MealUpdate) {
        let Some(meal) = self.meals.iter_mut().find(|m| m.id == id) else {
            debug!(meal_id = %id, "update of unknown meal ignored");
            return;
        };
        meal.apply(update);
        debug!(meal_id = %id, "meal updated");
        self.persist_meals();
    }

    pub fn update_goals(&mut self, goals: GoalSettings) {
        self.goals = goals;
        info!(
            calorie_goal = goals.calorie_goal,
            protein_goal = goals.protein_goal,
            carbs_goal = goals.carbs_goal,
            fat_goal = goals.fat_goal,
            "goals replaced"
        );
        self.persist(GOALS_STORAGE_KEY, &self.goals);
    }

    /// Meals whose timestamp falls on `date`, in insertion order.
    pub fn meals_by_date(&self, date: Date) -> Vec<LoggedMeal> {
        self.selected(Some(date)).cloned().collect()
    }

    /// All meals, newest first.
    pub fn history(&self) -> Vec<LoggedMeal> {
        let mut meals = self.meals.clone();
        meals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        meals
    }

    /// Meals of `date` grouped by meal type. Every type has an entry.
    pub fn meals_by_type(&self, date: Date) -> BTreeMap<MealType, Vec<LoggedMeal>> {
        let mut grouped: BTreeMap<MealType, Vec<LoggedMeal>> =
            MealType::ALL.iter().map(|t| (*t, Vec::new())).collect();
        for meal in self.selected(Some(date)) {
            grouped.entry(meal.meal_type).or_default().push(meal.clone());
        }
        grouped
    }

    pub fn total_calories(&self, date: Option<Date>) -> f64 {
        self.selected(date).map(|m| m.calories).sum()
    }

    pub fn total_protein(&self, date: Option<Date>) -> f64 {
        self.selected(date).map(|m| m.protein).sum()
    }

    pub fn total_carbs(&self, date: Option<Date>) -> f64 {
        self.selected(date).map(|m| m.carbs).sum()
    }

    pub fn total_fat(&self, date: Option<Date>) -> f64 {
        self.selected(date).map(|m| m.fat).sum()
    }

    pub fn totals(&self, date: Option<Date>) -> MacroTotals {
        self.selected(date).fold(MacroTotals::default(), MacroTotals::with_meal)
    }

    /// Negative once the goal is exceeded.
    pub fn remaining_calories(&self, date: Option<Date>) -> f64 {
        self.goals.calorie_goal - self.total_calories(date)
    }

    /// Headroom left under each goal on `date`, floored at zero.
    pub fn remaining_macros(&self, date: Date) -> MacroTotals {
        let eaten = self.totals(Some(date));
        MacroTotals {
            calories: (self.goals.calorie_goal - eaten.calories).max(0.0),
            protein: (self.goals.protein_goal - eaten.protein).max(0.0),
            carbs: (self.goals.carbs_goal - eaten.carbs).max(0.0),
            fat: (self.goals.fat_goal - eaten.fat).max(0.0),
        }
    }

    fn selected(&self, date: Option<Date>) -> impl Iterator<Item = &LoggedMeal> + '_ {
        self.meals
            .iter()
            .filter(move |m| date.map_or(true, |d| self.day_of(m.timestamp) == d))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.meal(&id).is_none() {
                return id;
            }
        }
    }

    fn persist_meals(&self) {
        self.persist(MEALS_STORAGE_KEY, &self.meals);
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_vec(value)
            .with_context(|| format!("serialize {}", key))
            .and_then(|bytes| self.store.set(key, &bytes));
        if let Err(e) = result {
            error!(key = %key, error = %e, "persist failed; in-memory state kept");
        }
    }
}

fn load_or_default<T, F>(store: &dyn KeyValueStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "stored value unparsable; using default");
                default()
            }
        },
        Ok(None) => default(),
        Err(e) => {
            warn!(key = %key, error = %e, "store read failed; using default");
            default()
        }
    }
}

/// Seed shown to a first-time user: two meals today, two yesterday.
pub fn sample_meals(offset: UtcOffset) -> Vec<LoggedMeal> {
    let today = OffsetDateTime::now_utc().to_offset(offset);
    let yesterday = today - Duration::days(1);
    let seed = |id: &str, food_id: &str, name: &str, image: &str, macros: [f64; 4], meal_type, timestamp| {
        LoggedMeal {
            id: id.to_string(),
            food_id: food_id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            calories: macros[0],
            protein: macros[1],
            carbs: macros[2],
            fat: macros[3],
            servings: 1.0,
            meal_type,
            timestamp,
        }
    };
    vec![
        seed(
            "1",
            "breakfast-1",
            "Oatmeal & Berries",
            "https://images.unsplash.com/photo-1517673400267-0251440c45dc?w=400&h=400&fit=crop",
            [320.0, 12.0, 54.0, 6.0],
            MealType::Breakfast,
            today,
        ),
        seed(
            "2",
            "lunch-1",
            "Grilled Chicken Salad",
            "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=400&h=400&fit=crop",
            [450.0, 35.0, 20.0, 18.0],
            MealType::Lunch,
            today,
        ),
        seed(
            "3",
            "breakfast-2",
            "Eggs & Toast",
            "https://images.unsplash.com/photo-1525351484163-7529414344d8?w=400&h=400&fit=crop",
            [380.0, 18.0, 32.0, 20.0],
            MealType::Breakfast,
            yesterday,
        ),
        seed(
            "4",
            "dinner-1",
            "Pasta Bolognese",
            "https://images.unsplash.com/photo-1551892374-ecf8754cf8b0?w=400&h=400&fit=crop",
            [650.0, 28.0, 75.0, 24.0],
            MealType::Dinner,
            yesterday,
        ),
    ]
}
