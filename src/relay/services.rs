use tracing::{info, warn};

use crate::images::services::to_data_url;
use crate::relay::dto::{FoodAnalysis, ImageAnalysis, InsightRequest};
use crate::relay::error::RelayError;
use crate::relay::gateway::{ChatGateway, ChatRequest, UserContent};
use crate::relay::parse::{food_placeholder, image_placeholder, parse_food, parse_image};

pub const FALLBACK_INSIGHT: &str = "Stay consistent and hydrated!";

const FOOD_PROMPT: &str = r#"You are a nutrition assistant. Given the name of a food, estimate its nutrition for one typical serving.
Reply with a single JSON object and nothing else, using exactly these keys:
{"name": string, "calories": number, "protein": number, "carbs": number, "fat": number,
 "fiber": number, "sugar": number, "sodium": number, "servingSize": string,
 "servingSizes": [string], "description": string, "image": "a single food emoji"}
Regional dishes (South and North Indian meals, street food, home cooking) are common; estimate from typical ingredients when unsure."#;

const IMAGE_PROMPT: &str = r#"You are a nutrition assistant looking at a photo of a meal. Identify what is on the plate and estimate the nutrition of the visible portion.
Reply with a single JSON object and nothing else, using exactly these keys:
{"name": string, "calories": number, "protein": number, "carbs": number, "fat": number,
 "fiber": number, "sugar": number, "sodium": number, "servingSize": string,
 "servingSizes": [string], "description": string, "image": "a single food emoji",
 "confidence": "high" | "medium" | "low", "detectedItems": [string]}
If the photo shows no food, use name "Unknown Food", zero for every number and confidence "low"."#;

const IMAGE_INSTRUCTION: &str =
    "Identify every food item in this photo and estimate calories, protein, carbs and fat.";

const INSIGHT_PROMPT: &str = "You are a friendly nutrition coach.";

pub async fn analyze_food(
    gateway: &dyn ChatGateway,
    food_name: &str,
) -> Result<FoodAnalysis, RelayError> {
    let food_name = food_name.trim();
    if food_name.is_empty() {
        return Err(RelayError::InvalidRequest("No food name provided".into()));
    }
    info!(food = %food_name, "analyzing food");

    let content = gateway
        .complete(ChatRequest {
            system: FOOD_PROMPT.into(),
            user: UserContent::Text(format!(
                "Estimate the nutrition of \"{}\".",
                food_name
            )),
        })
        .await?;

    Ok(parse_food(&content).unwrap_or_else(|e| {
        warn!(error = %e, food = %food_name, "unreadable AI reply; using estimate");
        food_placeholder(food_name)
    }))
}

/// `image` is a data URL or bare base64 (taken as JPEG).
pub async fn analyze_food_image(
    gateway: &dyn ChatGateway,
    image: &str,
) -> Result<ImageAnalysis, RelayError> {
    let image_url =
        to_data_url(image).ok_or_else(|| RelayError::InvalidRequest("No image provided".into()))?;
    info!(bytes = image_url.len(), "analyzing food image");

    let content = gateway
        .complete(ChatRequest {
            system: IMAGE_PROMPT.into(),
            user: UserContent::TextWithImage {
                text: IMAGE_INSTRUCTION.into(),
                image_url,
            },
        })
        .await?;

    Ok(parse_image(&content).unwrap_or_else(|e| {
        warn!(error = %e, "unreadable AI reply for image; using estimate");
        image_placeholder()
    }))
}

/// Never fails; any gateway problem yields [`FALLBACK_INSIGHT`].
pub async fn health_insight(gateway: &dyn ChatGateway, req: InsightRequest) -> String {
    let prompt = format!(
        "So far today I have eaten {}g protein and {}g carbs. My daily goal is {} calories. Give me a two-sentence motivational health tip.",
        req.protein, req.carbs, req.goal
    );
    match gateway
        .complete(ChatRequest {
            system: INSIGHT_PROMPT.into(),
            user: UserContent::Text(prompt),
        })
        .await
    {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "insight unavailable");
            FALLBACK_INSIGHT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::dto::Confidence;
    use crate::relay::gateway::scripted::ScriptedGateway;

    #[tokio::test]
    async fn analyze_food_relays_model_json() {
        let gw = ScriptedGateway::replying(vec![Ok(
            r#"{"name":"Poha","calories":250,"protein":5,"carbs":45,"fat":6,"image":"🍛"}"#.into(),
        )]);
        let food = analyze_food(&gw, "  poha ").await.unwrap();
        assert_eq!(food.name, "Poha");
        assert_eq!(food.calories, 250.0);

        let requests = gw.requests.lock().unwrap();
        assert_eq!(requests[0].user, UserContent::Text("Estimate the nutrition of \"poha\".".into()));
    }

    #[tokio::test]
    async fn analyze_food_degrades_to_placeholder() {
        let gw = ScriptedGateway::replying(vec![Ok("no idea, sorry".into())]);
        let food = analyze_food(&gw, "mystery stew").await.unwrap();
        assert_eq!(food, food_placeholder("mystery stew"));
    }

    #[tokio::test]
    async fn analyze_food_rejects_blank_name_without_calling_gateway() {
        let gw = ScriptedGateway::default();
        let err = analyze_food(&gw, "   ").await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(gw.request_count(), 0);
    }

    #[tokio::test]
    async fn gateway_errors_propagate() {
        let gw = ScriptedGateway::replying(vec![Err(RelayError::RateLimited)]);
        assert_eq!(analyze_food(&gw, "dal").await, Err(RelayError::RateLimited));
    }

    #[tokio::test]
    async fn image_analysis_prefixes_bare_base64() {
        let gw = ScriptedGateway::replying(vec![Ok(
            r#"{"name":"Biryani","calories":500,"protein":18,"carbs":60,"fat":18,"confidence":"medium","detectedItems":["rice","chicken"]}"#.into(),
        )]);
        let analysis = analyze_food_image(&gw, "/9j/4AAQ").await.unwrap();
        assert_eq!(analysis.confidence, Confidence::Medium);
        assert_eq!(analysis.detected_items.len(), 2);

        let requests = gw.requests.lock().unwrap();
        match &requests[0].user {
            UserContent::TextWithImage { image_url, .. } => {
                assert_eq!(image_url, "data:image/jpeg;base64,/9j/4AAQ")
            }
            other => panic!("unexpected user content {:?}", other),
        }
    }

    #[tokio::test]
    async fn image_analysis_placeholder_and_missing_image() {
        let gw = ScriptedGateway::replying(vec![Ok("```\nnot json\n```".into())]);
        let analysis = analyze_food_image(&gw, "data:image/png;base64,AAAA").await.unwrap();
        assert_eq!(analysis, image_placeholder());

        let err = analyze_food_image(&gw, "").await.unwrap_err();
        assert_eq!(err, RelayError::InvalidRequest("No image provided".into()));
    }

    #[tokio::test]
    async fn insight_falls_back_on_error() {
        let gw = ScriptedGateway::replying(vec![
            Ok(" Great protein today! Keep it up. ".into()),
            Err(RelayError::MissingApiKey),
        ]);
        let req = InsightRequest { protein: 120.0, carbs: 180.0, goal: 2200.0 };
        assert_eq!(health_insight(&gw, req).await, "Great protein today! Keep it up.");
        assert_eq!(health_insight(&gw, req).await, FALLBACK_INSIGHT);

        let requests = gw.requests.lock().unwrap();
        match &requests[0].user {
            UserContent::Text(t) => assert!(t.contains("120g protein and 180g carbs") && t.contains("2200 calories")),
            other => panic!("unexpected user content {:?}", other),
        }
    }
}
