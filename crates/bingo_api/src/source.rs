//! `ResolutionSource` that goes through the admin routes.
//!
//! Lets the admin page state machine talk to the same router a browser
//! would, including status-code handling, without opening a socket.

use crate::routes::router;
use crate::state::{ApiState, ADMIN_TOKEN_HEADER};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bingo_core::{Resolution, ResolutionId, ResolutionPatch, ResolutionSource, SourceError};
use serde::de::DeserializeOwned;
use std::io;
use tokio::runtime::{Builder, Runtime};
use tower::ServiceExt;

const BODY_LIMIT: usize = 1024 * 1024;

pub struct ApiResolutionSource {
    router: Router,
    runtime: Runtime,
    token: Option<String>,
}

impl ApiResolutionSource {
    /// Builds an anonymous source; call `with_admin_token` to sign writes.
    ///
    /// Must not be used from inside another tokio runtime.
    pub fn new(state: ApiState) -> io::Result<Self> {
        Ok(Self {
            router: router(state),
            runtime: Builder::new_current_thread().build()?,
            token: None,
        })
    }

    pub fn with_admin_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Body,
        id: Option<ResolutionId>,
    ) -> Result<T, SourceError> {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.header(ADMIN_TOKEN_HEADER, token.as_str());
        }
        let request = request
            .body(body)
            .map_err(|err| SourceError::Rejected(err.to_string()))?;

        self.runtime.block_on(async {
            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .unwrap_or_else(|never| match never {});
            let status = response.status();
            let bytes = to_bytes(response.into_body(), BODY_LIMIT)
                .await
                .map_err(|err| SourceError::Unavailable(err.to_string()))?;
            decode_data(status, &bytes, id)
        })
    }
}

impl ResolutionSource for ApiResolutionSource {
    fn fetch(&self) -> Result<Vec<Resolution>, SourceError> {
        self.send(Method::GET, "/api/resolutions", Body::empty(), None)
    }

    fn update(&self, id: ResolutionId, patch: &ResolutionPatch) -> Result<Resolution, SourceError> {
        let body = serde_json::to_vec(patch).map_err(|err| SourceError::Rejected(err.to_string()))?;
        self.send(
            Method::PUT,
            &format!("/api/resolutions/{id}"),
            Body::from(body),
            Some(id),
        )
    }
}

fn decode_data<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    id: Option<ResolutionId>,
) -> Result<T, SourceError> {
    let mut envelope: serde_json::Value =
        serde_json::from_slice(body).map_err(|err| SourceError::Unavailable(err.to_string()))?;
    let message = envelope
        .get("message")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();

    if status.is_success() {
        let data = envelope
            .get_mut("data")
            .map(serde_json::Value::take)
            .unwrap_or_default();
        return serde_json::from_value(data).map_err(|err| SourceError::Unavailable(err.to_string()));
    }
    match (status, id) {
        (StatusCode::UNAUTHORIZED, _) => Err(SourceError::Unauthorized),
        (StatusCode::NOT_FOUND, Some(id)) => Err(SourceError::NotFound(id)),
        (status, _) if status.is_client_error() => Err(SourceError::Rejected(message)),
        _ => Err(SourceError::Unavailable(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_data, ApiResolutionSource};
    use crate::state::ApiState;
    use axum::http::StatusCode;
    use bingo_core::db::open_db_in_memory;
    use bingo_core::{Resolution, ResolutionPatch, ResolutionSource, SourceError};

    #[test]
    fn unauthenticated_update_maps_to_unauthorized() {
        let state = ApiState::new(open_db_in_memory().unwrap()).with_admin_token("letmein");
        let created = state.with_service(|service| service.create("Read 12 books")).unwrap();

        let source = ApiResolutionSource::new(state).unwrap();
        assert_eq!(source.fetch().unwrap().len(), 1);
        assert_eq!(
            source.update(created.id, &ResolutionPatch::status("1/12")),
            Err(SourceError::Unauthorized)
        );
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let state = ApiState::new(open_db_in_memory().unwrap()).with_admin_token("letmein");
        let source = ApiResolutionSource::new(state).unwrap().with_admin_token("letmein");

        assert_eq!(
            source.update(41, &ResolutionPatch::status("done")),
            Err(SourceError::NotFound(41))
        );
    }

    #[test]
    fn server_errors_keep_the_generic_message() {
        let body = br#"{"message":"Error fetching resolutions"}"#;
        assert_eq!(
            decode_data::<Vec<Resolution>>(StatusCode::INTERNAL_SERVER_ERROR, body, None),
            Err(SourceError::Unavailable("Error fetching resolutions".to_string()))
        );
    }
}
