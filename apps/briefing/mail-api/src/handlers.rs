//! HTTP handlers for the mail API.

use crate::content;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::Utc;
use mailer::{DeliveryResult, EmailProvider, Message};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// Envelope for every successful send
#[derive(Debug, Serialize)]
pub struct SendResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> SendResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BriefingRequest {
    pub email: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResendDirectRequest {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/test/email", post(send_test_email))
        .route("/api/briefings/send", post(send_briefing))
        .route("/api/test/resend-direct", post(send_resend_direct))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: state.app.name,
        version: state.app.version,
    })
}

fn required_email(email: Option<String>) -> ApiResult<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email address is required".to_string()))
}

async fn send_test_email(
    State(state): State<AppState>,
    payload: Result<Json<TestEmailRequest>, JsonRejection>,
) -> ApiResult<Json<SendResponse<DeliveryResult>>> {
    let Json(request) = payload?;
    let email = required_email(request.email)?;
    let html = content::test_email_html(&email, request.name.as_deref());

    let message = Message::new(email, content::TEST_EMAIL_SUBJECT).with_html(html);
    let result = state.dispatcher.send(&message).await?;

    info!(provider = result.provider(), "Test email sent");
    Ok(SendResponse::ok("Test email sent successfully", result))
}

async fn send_briefing(
    State(state): State<AppState>,
    payload: Result<Json<BriefingRequest>, JsonRejection>,
) -> ApiResult<Json<SendResponse<DeliveryResult>>> {
    let Json(request) = payload?;
    let email = required_email(request.email)?;
    let html = request
        .html
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Briefing HTML is required".to_string()))?;

    let message = Message::new(email, content::briefing_subject(&Utc::now())).with_html(html);
    let result = state.dispatcher.send(&message).await?;

    info!(provider = result.provider(), "Briefing sent");
    Ok(SendResponse::ok("Briefing sent successfully", result))
}

async fn send_resend_direct(
    State(state): State<AppState>,
    payload: Result<Json<ResendDirectRequest>, JsonRejection>,
) -> ApiResult<Json<SendResponse<Value>>> {
    let Json(request) = payload?;
    let email = required_email(request.email)?;
    let resend = state
        .resend
        .as_ref()
        .ok_or(ApiError::NotConfigured("RESEND_API_KEY"))?;

    let subject = request
        .subject
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| content::TEST_EMAIL_SUBJECT.to_string());
    let html = content::resend_direct_html(request.message.as_deref(), &Utc::now());

    let outbound = Message::new(email.clone(), subject)
        .with_html(html)
        .resolve(&state.resend_from);

    let payload = resend
        .attempt(&outbound)
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    Ok(SendResponse::ok(
        format!("Email sent successfully to {email}"),
        payload,
    ))
}
