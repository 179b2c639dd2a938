//! Translation of every request failure into one uniform HTTP response.
//!
//! | Failure          | Status | Body                          |
//! |------------------|--------|-------------------------------|
//! | field validation | 400    | `{field: message, ...}`       |
//! | already exists   | 400    | [`ErrorResponseDto`]          |
//! | malformed input  | 400    | [`ErrorResponseDto`]          |
//! | not found        | 404    | [`ErrorResponseDto`]          |
//! | anything else    | 500    | [`ErrorResponseDto`]          |

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use std::fmt;

use super::models::ErrorResponseDto;
use super::AppState;
use crate::domain::accounts::{AccountsError, FailureKind};

/// Message sent in place of unclassified failure details
pub const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred. Please contact Dev team";

/// A failure bound to the request it ended
#[derive(Debug)]
pub struct ApiError {
    api_path: String,
    error: AccountsError,
    expose_internal: bool,
}

impl ApiError {
    /// Bind `error` to `req`, logging and counting it once
    pub fn new(req: &HttpRequest, error: AccountsError) -> Self {
        let state = req.app_data::<web::Data<AppState>>();
        let expose_internal = state
            .map(|s| s.config.errors.expose_internal_messages)
            .unwrap_or(false);

        let kind = error.kind();
        if let Some(state) = state {
            state.metrics.record_http_error(kind.label());
        }

        match kind {
            FailureKind::Unclassified => {
                tracing::error!(path = %req.path(), error = %error, "Request failed");
            }
            _ => {
                tracing::debug!(path = %req.path(), kind = kind.label(), error = %error, "Request rejected");
            }
        }

        Self {
            api_path: format!("uri={}", req.path()),
            error,
            expose_internal,
        }
    }

    /// `map_err` adapter: `.map_err(ApiError::at(&req))`
    pub fn at(req: &HttpRequest) -> impl FnOnce(AccountsError) -> ApiError + '_ {
        move |error| ApiError::new(req, error)
    }

    fn message(&self) -> String {
        match self.error.kind() {
            FailureKind::Unclassified if !self.expose_internal => GENERIC_INTERNAL_MESSAGE.to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.api_path)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.error.kind() {
            FailureKind::Validation | FailureKind::AlreadyExists | FailureKind::MalformedRequest => {
                StatusCode::BAD_REQUEST
            }
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let AccountsError::Validation(errors) = &self.error {
            return HttpResponse::build(status).json(errors);
        }

        HttpResponse::build(status).json(ErrorResponseDto::new(&self.api_path, status, self.message()))
    }
}
