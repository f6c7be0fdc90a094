use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailer::DeliveryError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", .0.body_text())]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    Provider(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::JsonExtractorRejection(rejection) => rejection.status(),
            Self::BadRequest(_) | Self::Delivery(DeliveryError::InvalidMessage(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotConfigured(_) | Self::Delivery(_) | Self::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Email request failed");
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
