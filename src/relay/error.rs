use axum::http::StatusCode;
use thiserror::Error;

/// Failure of an AI relay round trip, on either side of the wire.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelayError {
    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,
    #[error("AI credits exhausted. Please add credits to continue.")]
    CreditsExhausted,
    #[error("AI gateway error: {status}")]
    Gateway { status: u16 },
    #[error("No response from AI")]
    EmptyResponse,
    #[error("AI_API_KEY is not configured")]
    MissingApiKey,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("relay request failed: {0}")]
    Transport(String),
    /// The relay answered with a non-2xx status or an `error` body.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("malformed relay response: {0}")]
    Malformed(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(RelayError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(RelayError::CreditsExhausted.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            RelayError::InvalidRequest("No image provided".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::Gateway { status: 503 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(RelayError::MissingApiKey.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            RelayError::Rejected { status: 404, message: "nope".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RelayError::Rejected { status: 42, message: "odd".into() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn messages_match_gateway_wording() {
        assert_eq!(
            RelayError::Gateway { status: 500 }.to_string(),
            "AI gateway error: 500"
        );
        assert_eq!(
            RelayError::Rejected { status: 500, message: "boom".into() }.to_string(),
            "boom"
        );
    }
}
