use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
	#[error("Upstream error: {0}")]
	Upstream(String),
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
	#[error("Not found")]
	NotFound,
}

#[derive(Serialize)]
struct ErrorBody {
	code: u16,
	message: String,
}

impl IntoResponse for AppError {
	fn into_response(self) -> axum::response::Response {
		let (status, message) = match self {
			AppError::Upstream(e) => (StatusCode::BAD_GATEWAY, e),
			AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
			AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
		};
		let body = Json(ErrorBody { code: status.as_u16(), message });
		(status, body).into_response()
	}
}

pub type AppResult<T> = Result<T, AppError>;
