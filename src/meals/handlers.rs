use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::meals::dto::{
    parse_date, AnalyzeAndLogRequest, DateQuery, DaySummaryResponse, DaysQuery, WeekQuery,
};
use crate::meals::repo_types::{GoalSettings, LoggedMeal, MealUpdate, NewMeal};
use crate::meals::services::{
    log_analyzed_food, process_analytics, recent_entries, weekly_summary, AnalysisInput,
    AnalyticsReport, MealEntry, WeeklySummary,
};
use crate::relay::dto::ErrorBody;
use crate::relay::handlers::relay_error;
use crate::state::AppState;

const ANALYTICS_WINDOW_DAYS: u32 = 30;
const MAX_ANALYTICS_DAYS: u32 = 366;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/history", get(meal_history))
        .route("/meals/:id", get(get_meal))
        .route("/summary", get(day_summary))
        .route("/goals", get(get_goals))
        .route("/analytics", get(ledger_analytics))
        .route("/analytics/weekly", get(weekly))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(add_meal))
        .route("/meals/:id", patch(update_meal).delete(remove_meal))
        .route("/goals", axum::routing::put(update_goals))
        .route("/process-analytics", post(analytics_from_entries))
        .merge(
            Router::new()
                .route("/meals/analyze", post(analyze_and_log))
                .layer(DefaultBodyLimit::max(20 * 1024 * 1024)), // 20MB
        )
}

// --- handlers ---

/// GET /meals?date=YYYY-MM-DD (no date: everything, insertion order)
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<LoggedMeal>>, (StatusCode, String)> {
    let date = parse_date(q.date.as_deref())?;
    let ledger = state.ledger.read().await;
    let meals = match date {
        Some(d) => ledger.meals_by_date(d),
        None => ledger.meals().to_vec(),
    };
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn meal_history(State(state): State<AppState>) -> Json<Vec<LoggedMeal>> {
    Json(state.ledger.read().await.history())
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LoggedMeal>, (StatusCode, String)> {
    state
        .ledger
        .read()
        .await
        .meal(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".into()))
}

#[instrument(skip(state, body))]
pub async fn add_meal(
    State(state): State<AppState>,
    Json(body): Json<NewMeal>,
) -> (StatusCode, HeaderMap, Json<LoggedMeal>) {
    let meal = state.ledger.write().await.add_meal(body);
    (StatusCode::CREATED, location(&meal.id), Json(meal))
}

/// Unknown ids are ignored; the answer is 204 either way.
#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MealUpdate>,
) -> StatusCode {
    state.ledger.write().await.update_meal(&id, body);
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn remove_meal(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.ledger.write().await.remove_meal(&id);
    StatusCode::NO_CONTENT
}

/// GET /summary?date= (defaults to today)
#[instrument(skip(state))]
pub async fn day_summary(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<DaySummaryResponse>, (StatusCode, String)> {
    let date = parse_date(q.date.as_deref())?;
    let ledger = state.ledger.read().await;
    let date = date.unwrap_or_else(|| ledger.today());
    Ok(Json(DaySummaryResponse {
        date: date.to_string(),
        totals: ledger.totals(Some(date)),
        goals: ledger.goals(),
        remaining_calories: ledger.remaining_calories(Some(date)),
        remaining_macros: ledger.remaining_macros(date),
        meals_by_type: ledger.meals_by_type(date),
    }))
}

#[instrument(skip(state))]
pub async fn get_goals(State(state): State<AppState>) -> Json<GoalSettings> {
    Json(state.ledger.read().await.goals())
}

#[instrument(skip(state))]
pub async fn update_goals(
    State(state): State<AppState>,
    Json(body): Json<GoalSettings>,
) -> Json<GoalSettings> {
    let mut ledger = state.ledger.write().await;
    ledger.update_goals(body);
    Json(ledger.goals())
}

/// GET /analytics/weekly?end= (defaults to today)
#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    Query(q): Query<WeekQuery>,
) -> Result<Json<WeeklySummary>, (StatusCode, String)> {
    let end = parse_date(q.end.as_deref())?;
    let ledger = state.ledger.read().await;
    let end = end.unwrap_or_else(|| ledger.today());
    weekly_summary(&ledger, end)
        .map(Json)
        .ok_or((StatusCode::BAD_REQUEST, format!("end date {} out of range", end)))
}

/// GET /analytics?days=30 over the ledger itself, at most a year back.
#[instrument(skip(state))]
pub async fn ledger_analytics(
    State(state): State<AppState>,
    Query(q): Query<DaysQuery>,
) -> Result<Json<AnalyticsReport>, (StatusCode, String)> {
    let days = q.days.unwrap_or(ANALYTICS_WINDOW_DAYS);
    if days > MAX_ANALYTICS_DAYS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("days must be at most {}", MAX_ANALYTICS_DAYS),
        ));
    }
    let entries = recent_entries(&*state.ledger.read().await, days);
    Ok(Json(process_analytics(&entries)))
}

#[instrument(skip(body))]
pub async fn analytics_from_entries(Json(body): Json<Vec<MealEntry>>) -> Json<AnalyticsReport> {
    Json(process_analytics(&body))
}

/// POST /meals/analyze { foodName | imageBase64, mealType, servingIndex?, quantity? }
#[instrument(skip(state, body))]
pub async fn analyze_and_log(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeAndLogRequest>,
) -> Result<(StatusCode, HeaderMap, Json<LoggedMeal>), (StatusCode, Json<ErrorBody>)> {
    let input = match (body.food_name, body.image_base64) {
        (_, Some(image)) if !image.trim().is_empty() => AnalysisInput::Image(image),
        (Some(name), _) if !name.trim().is_empty() => AnalysisInput::FoodName(name),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "foodName or imageBase64 is required".into(),
                }),
            ))
        }
    };

    let meal = log_analyzed_food(
        &state.ledger,
        state.analyzer.as_ref(),
        &input,
        body.choice,
        body.meal_type,
    )
    .await
    .map_err(relay_error)?;
    info!(meal_id = %meal.id, "meal logged from analysis");
    Ok((StatusCode::CREATED, location(&meal.id), Json(meal)))
}

pub(crate) fn location(id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = format!("/api/v1/meals/{}", id).parse() {
        headers.insert(axum::http::header::LOCATION, v);
    }
    headers
}
