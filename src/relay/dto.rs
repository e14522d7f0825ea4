use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFoodRequest {
    #[serde(default)]
    pub food_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    #[serde(default)]
    pub image_base64: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct InsightRequest {
    pub protein: f64,
    pub carbs: f64,
    pub goal: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InsightResponse {
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Nutrition estimate for one food, as relayed from the model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default)]
    pub serving_size: String,
    #[serde(default)]
    pub serving_sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Pictogram glyph or an http(s) image URL.
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

// Anything the model invents beyond the three levels reads as low.
impl From<String> for Confidence {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        String::deserialize(d).map(Confidence::from)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(flatten)]
    pub food: FoodAnalysis,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub detected_items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_analysis_flattens_food_fields() {
        let raw = json!({
            "name": "Masala Dosa",
            "calories": 350,
            "protein": 8,
            "carbs": 50,
            "fat": 12,
            "servingSize": "1 dosa",
            "servingSizes": ["1 dosa", "100g"],
            "image": "🫓",
            "confidence": "High",
            "detectedItems": ["dosa", "sambar"]
        });
        let parsed: ImageAnalysis = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.food.name, "Masala Dosa");
        assert_eq!(parsed.food.fiber, 0.0);
        assert_eq!(parsed.confidence, Confidence::High);
        assert_eq!(parsed.detected_items, vec!["dosa", "sambar"]);

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["servingSize"], "1 dosa");
        assert_eq!(back["confidence"], "high");
        assert!(back.get("sugar").is_none());
    }

    #[test]
    fn unknown_confidence_reads_as_low() {
        let c: Confidence = serde_json::from_value(json!("high/medium/low")).unwrap();
        assert_eq!(c, Confidence::Low);
        let c: Confidence = serde_json::from_value(json!("Medium")).unwrap();
        assert_eq!(c, Confidence::Medium);
    }

    #[test]
    fn food_request_reads_camel_case() {
        let req: AnalyzeFoodRequest = serde_json::from_value(json!({"foodName": "idli"})).unwrap();
        assert_eq!(req.food_name, "idli");
        let req: AnalyzeFoodRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.food_name.is_empty());
    }
}
