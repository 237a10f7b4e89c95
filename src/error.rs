use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt::Debug;

const CONFLICT_CODE: i32 = 10;
const NOT_FOUND_CODE: i32 = 102;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_conflict(&self) -> bool {
        self.code == CONFLICT_CODE
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            CONFLICT_CODE => (StatusCode::CONFLICT, self.message.as_str()),
            NOT_FOUND_CODE => (StatusCode::NOT_FOUND, self.message.as_str()),
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn database_error<T: Debug>(_: T) -> Error {
    Error {
        code: 2,
        message: "database error".into(),
    }
}

/// Version mismatch on save. Recoverable: the booking loop retries on it.
pub fn conflict_error() -> Error {
    Error {
        code: CONFLICT_CODE,
        message: "concurrent modification detected".into(),
    }
}

/// Seat or luggage bookkeeping would go negative. The matcher filters on
/// capacity before selecting, so reaching this is a programming error.
pub fn capacity_violation_error() -> Error {
    Error {
        code: 11,
        message: "insufficient seat or luggage capacity".into(),
    }
}

pub fn invalid_state_error() -> Error {
    Error {
        code: 100,
        message: "invalid state".into(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        code: NOT_FOUND_CODE,
        message: "resource not found".into(),
    }
}
