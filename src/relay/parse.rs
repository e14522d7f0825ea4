use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::relay::dto::{Confidence, FoodAnalysis, ImageAnalysis};

/// The model reply could not be read as a nutrition record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("no JSON object in reply")]
    NoJson,
    #[error("reply is not a nutrition record: {0}")]
    Shape(String),
    #[error("nutrition record has no name")]
    MissingName,
    #[error("field {0} is not a finite number")]
    NonFinite(&'static str),
}

lazy_static! {
    // Greedy: from the first `{` to the last `}`, across lines and code fences.
    static ref JSON_SPAN: Regex = Regex::new(r"(?s)\{.*\}").expect("static regex");
}

pub fn parse_food(content: &str) -> Result<FoodAnalysis, ParseFailure> {
    let food: FoodAnalysis = parse_span(content)?;
    validate(&food)?;
    Ok(food)
}

pub fn parse_image(content: &str) -> Result<ImageAnalysis, ParseFailure> {
    let analysis: ImageAnalysis = parse_span(content)?;
    validate(&analysis.food)?;
    Ok(analysis)
}

fn parse_span<T: DeserializeOwned>(content: &str) -> Result<T, ParseFailure> {
    let span = JSON_SPAN
        .find(content)
        .ok_or(ParseFailure::NoJson)?
        .as_str();
    serde_json::from_str(span).map_err(|e| ParseFailure::Shape(e.to_string()))
}

pub(crate) fn validate(food: &FoodAnalysis) -> Result<(), ParseFailure> {
    if food.name.trim().is_empty() {
        return Err(ParseFailure::MissingName);
    }
    for (field, value) in [
        ("calories", food.calories),
        ("protein", food.protein),
        ("carbs", food.carbs),
        ("fat", food.fat),
    ] {
        if !value.is_finite() {
            return Err(ParseFailure::NonFinite(field));
        }
    }
    Ok(())
}

/// Stand-in estimate used when a name lookup reply is unreadable.
pub fn food_placeholder(food_name: &str) -> FoodAnalysis {
    FoodAnalysis {
        name: food_name.to_string(),
        calories: 200.0,
        protein: 5.0,
        carbs: 25.0,
        fat: 8.0,
        fiber: 2.0,
        sugar: Some(3.0),
        sodium: Some(150.0),
        serving_size: "1 serving".into(),
        serving_sizes: vec!["1 serving".into(), "100g".into()],
        description: Some(format!("Estimated nutritional values for {}", food_name)),
        image: "🍽️".into(),
    }
}

/// Stand-in estimate used when a photo reply is unreadable.
pub fn image_placeholder() -> ImageAnalysis {
    ImageAnalysis {
        food: FoodAnalysis {
            name: "Detected Food".into(),
            calories: 300.0,
            protein: 10.0,
            carbs: 35.0,
            fat: 12.0,
            fiber: 3.0,
            sugar: Some(5.0),
            sodium: Some(200.0),
            serving_size: "1 serving".into(),
            serving_sizes: vec!["1 serving".into(), "100g".into()],
            description: Some("Food detected from image".into()),
            image: "🍽️".into(),
        },
        confidence: Confidence::Low,
        detected_items: Vec::new(),
    }
}
