use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::{auth::Viewer, error::ErrorReport};
use crate::infra::http::{AdminState, error::ApiError};

const DENIAL_MESSAGE: &str = "You need admin privileges to access this page.";

#[derive(Debug, Serialize)]
struct Denial {
    message: &'static str,
    home: &'static str,
}

pub(super) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller before any admin handler runs. Only admins get through;
/// their `Principal` and `Viewer` ride along as request extensions.
pub async fn require_admin(
    State(state): State<AdminState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let viewer = match state.gate.resolve(bearer_token(request.headers())).await {
        Ok(viewer) => viewer,
        Err(err) => {
            return ApiError::from(err)
                .with_source("infra::http::admin::gate")
                .into_response();
        }
    };

    match &viewer {
        Viewer::Anonymous => ApiError::unauthorized()
            .with_source("infra::http::admin::gate")
            .into_response(),
        Viewer::Member(principal) => {
            let mut response = (
                StatusCode::FORBIDDEN,
                Json(Denial {
                    message: DENIAL_MESSAGE,
                    home: "/",
                }),
            )
                .into_response();
            ErrorReport::from_message(
                "infra::http::admin::gate",
                StatusCode::FORBIDDEN,
                format!("forbidden: {} is not an admin", principal.user.email),
            )
            .attach(&mut response);
            response.extensions_mut().insert(viewer.clone());
            response
        }
        Viewer::Admin(principal) => {
            request.extensions_mut().insert(principal.clone());
            request.extensions_mut().insert(viewer.clone());
            next.run(request).await
        }
    }
}
