use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::catalog::repo::{
    food_by_id, foods, recipe_by_id, recipes, recipes_by_category, search_foods, search_recipes,
};
use crate::catalog::repo_types::{FoodItem, Recipe, RecipeCategory};
use crate::meals::dto::LogFoodRequest;
use crate::meals::handlers::location;
use crate::meals::repo_types::LoggedMeal;
use crate::meals::services::food_to_meal;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FoodQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    pub q: Option<String>,
    pub category: Option<RecipeCategory>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods))
        .route("/foods/:id", get(get_food))
        .route("/foods/:id/log", post(log_food))
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

/// GET /foods?q= (no query: whole catalog)
#[instrument]
pub async fn list_foods(Query(q): Query<FoodQuery>) -> Json<Vec<FoodItem>> {
    let found: Vec<FoodItem> = match q.q.as_deref() {
        Some(query) => search_foods(query).into_iter().cloned().collect(),
        None => foods().to_vec(),
    };
    Json(found)
}

#[instrument]
pub async fn get_food(Path(id): Path<String>) -> Result<Json<FoodItem>, (StatusCode, String)> {
    food_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Food not found".into()))
}

/// POST /foods/:id/log { mealType, servingIndex?, quantity? }
#[instrument(skip(state))]
pub async fn log_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LogFoodRequest>,
) -> Result<(StatusCode, HeaderMap, Json<LoggedMeal>), (StatusCode, String)> {
    let food = food_by_id(&id).ok_or((StatusCode::NOT_FOUND, "Food not found".to_string()))?;
    let meal = state
        .ledger
        .write()
        .await
        .add_meal(food_to_meal(food, body.choice, body.meal_type));
    info!(meal_id = %meal.id, food_id = %id, "catalog food logged");
    Ok((StatusCode::CREATED, location(&meal.id), Json(meal)))
}

/// GET /recipes?q=&category=
#[instrument]
pub async fn list_recipes(Query(q): Query<RecipeQuery>) -> Json<Vec<Recipe>> {
    let mut found: Vec<&Recipe> = match q.q.as_deref() {
        Some(query) => search_recipes(query),
        None => match q.category {
            Some(category) => recipes_by_category(category),
            None => recipes().iter().collect(),
        },
    };
    if let Some(category) = q.category {
        found.retain(|r| r.category == category);
    }
    Json(found.into_iter().cloned().collect())
}

#[instrument]
pub async fn get_recipe(Path(id): Path<String>) -> Result<Json<Recipe>, (StatusCode, String)> {
    recipe_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".into()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::state::AppState;

    use super::*;

    async fn call(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let res = build_app(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn food_search_and_lookup() {
        let state = AppState::fake();
        let (status, body) = call(&state, get("/api/v1/foods?q=b")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "banana");
        assert_eq!(body[0]["servingSizes"][0]["grams"], 118.0);

        let (_, all) = call(&state, get("/api/v1/foods")).await;
        assert_eq!(all.as_array().unwrap().len(), foods().len());

        let (status, _) = call(&state, get("/api/v1/foods/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logging_a_catalog_food_scales_it() {
        let state = AppState::fake();
        let before = state.ledger.read().await.meals().len();
        let req = Request::post("/api/v1/foods/chicken-breast/log")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"mealType":"Dinner","servingIndex":1,"quantity":1}"#))
            .unwrap();
        let (status, meal) = call(&state, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(meal["foodId"], "chicken-breast");
        // 165 kcal per 100g, 172g breast
        assert_eq!(meal["calories"], 284.0);
        assert_eq!(meal["protein"], 53.3);
        assert_eq!(state.ledger.read().await.meals().len(), before + 1);

        let req = Request::post("/api/v1/foods/unknown/log")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"mealType":"Dinner"}"#))
            .unwrap();
        let (status, _) = call(&state, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(state.ledger.read().await.meals().len(), before + 1);
    }

    #[tokio::test]
    async fn recipes_filter_by_category_and_query() {
        let state = AppState::fake();
        let (_, body) = call(&state, get("/api/v1/recipes?category=low-carb")).await;
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["zucchini-noodles", "salmon-asparagus"]);

        let (_, body) = call(&state, get("/api/v1/recipes?q=keto&category=high-protein")).await;
        assert!(body.as_array().unwrap().is_empty());

        let (status, body) = call(&state, get("/api/v1/recipes/poha")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "high-carb");

        let (status, _) = call(&state, get("/api/v1/recipes?category=sweet")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
