//! Client-facing API failures.
//!
//! # Invariants
//! - Backend error details are logged here and never reach the response body.

use crate::envelope::Envelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Unauthenticated,
    ResolutionNotFound,
    RouteNotFound,
    MethodNotAllowed,
    MalformedPayload,
    /// Payload parsed but failed validation; carries the validation message.
    Rejected(String),
    /// Repository or database failure; carries the generic client message.
    Internal(&'static str),
}

impl ApiError {
    /// Logs `err` and hides it behind `message`.
    pub(crate) fn internal(operation: &str, err: &dyn Error, message: &'static str) -> Self {
        warn!("event=api_{operation} module=api status=error error={err}");
        Self::Internal(message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::ResolutionNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedPayload | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Not authenticated"),
            Self::ResolutionNotFound => write!(f, "Resolution not found"),
            Self::RouteNotFound => write!(f, "Not found"),
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
            Self::MalformedPayload => write!(f, "Malformed payload"),
            Self::Rejected(message) => write!(f, "{message}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(Envelope::message(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Rejected("too long".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        let response = ApiError::Internal("Error fetching resolutions").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
