use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, instrument};

use crate::images::services::{is_image, upload_to_data_url, UploadItem};
use crate::relay::dto::{
    AnalyzeFoodRequest, AnalyzeImageRequest, ErrorBody, FoodAnalysis, ImageAnalysis,
    InsightRequest, InsightResponse,
};
use crate::relay::error::RelayError;
use crate::relay::services;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn text_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-food", post(analyze_food))
        .route("/get-insight", post(get_insight))
}

pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-food-image", post(analyze_food_image))
        .route("/analyze-image", post(analyze_image_upload)) // multipart `file`
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn analyze_food(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeFoodRequest>,
) -> Result<Json<FoodAnalysis>, ApiError> {
    services::analyze_food(state.gateway.as_ref(), &body.food_name)
        .await
        .map(Json)
        .map_err(relay_error)
}

#[instrument(skip(state, body))]
pub async fn analyze_food_image(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeImageRequest>,
) -> Result<Json<ImageAnalysis>, ApiError> {
    services::analyze_food_image(state.gateway.as_ref(), &body.image_base64)
        .await
        .map(Json)
        .map_err(relay_error)
}

#[instrument(skip(state, mp))]
pub async fn analyze_image_upload(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<ImageAnalysis>, ApiError> {
    let mut upload = None;
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(e.to_string())),
        };
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        if !is_image(&content_type) {
            return Err(bad_request("File must be an image."));
        }
        let body = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
        upload = Some((body, content_type));
        break;
    }

    let Some((body, content_type)) = upload else {
        return Err(bad_request("file is required"));
    };
    let data_url = upload_to_data_url(&UploadItem {
        body,
        content_type: &content_type,
    })
    .map_err(|e| bad_request(e.to_string()))?;

    services::analyze_food_image(state.gateway.as_ref(), &data_url)
        .await
        .map(Json)
        .map_err(relay_error)
}

#[instrument(skip(state))]
pub async fn get_insight(
    State(state): State<AppState>,
    Json(body): Json<InsightRequest>,
) -> Json<InsightResponse> {
    let insight = services::health_insight(state.gateway.as_ref(), body).await;
    Json(InsightResponse { insight })
}

pub(crate) fn relay_error(e: RelayError) -> ApiError {
    let status = e.status_code();
    if status.is_server_error() {
        error!(error = %e, "relay failed");
    }
    (status, Json(ErrorBody { error: e.to_string() }))
}

fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg.into() }))
}
