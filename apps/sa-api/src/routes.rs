use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sa_domain::{Message, SmartAction};
use sa_service::{ConfirmReport, Error as ServiceError};

use crate::state::AppState;

pub const SUGGESTED_STATUS: &str = "Smart action suggested.";
pub const FAILED_STATUS: &str = "Unable to suggest a smart action.";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/messages", post(submit_message))
		.route("/v1/messages/confirm", post(confirm_message))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
	pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
	pub message: Message,
	pub smart_action: Option<SuggestedAction>,
	pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestedAction {
	pub label: SmartAction,
	pub associated_data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
	pub text: String,
	pub label: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// Resolution failures never fail the submission; the message comes back without a suggestion.
async fn submit_message(
	State(state): State<AppState>,
	Json(payload): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
	if payload.text.trim().is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"Message text must be non-empty.",
			Some(vec!["$.text".to_string()]),
		));
	}

	let message = Message::new(payload.text.as_str());
	let response = match state.service.resolve(&payload.text).await {
		Ok(label) => MessageResponse {
			message,
			smart_action: Some(SuggestedAction { label, associated_data: Map::new() }),
			status: SUGGESTED_STATUS.to_string(),
		},
		Err(err) => {
			tracing::error!(error = %err, "Smart action resolution failed.");

			MessageResponse { message, smart_action: None, status: FAILED_STATUS.to_string() }
		},
	};

	Ok(Json(response))
}

async fn confirm_message(
	State(state): State<AppState>,
	Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmReport>, ApiError> {
	let report = state.service.confirm(&payload.text, &payload.label).await?;

	Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::Validation(inner) => json_error(
				StatusCode::UNPROCESSABLE_ENTITY,
				"validation_failed",
				inner.to_string(),
				None,
			),
			err @ (ServiceError::Embedding { .. } | ServiceError::Classifier { .. }) => {
				tracing::error!(error = %err, "Provider request failed.");

				json_error(StatusCode::BAD_GATEWAY, "provider_error", err.to_string(), None)
			},
			ServiceError::Index(inner) => {
				tracing::error!(error = %inner, "Index request failed.");

				json_error(StatusCode::SERVICE_UNAVAILABLE, "index_error", inner.to_string(), None)
			},
			err @ (ServiceError::Config(_) | ServiceError::Dataset { .. }) => {
				tracing::error!(error = %err, "Request failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string(), None)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
