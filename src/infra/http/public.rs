use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::application::{
    contact::ContactSubmission,
    sections::{ContentSource, Section, SectionReader, SectionView, masonry_columns},
};

use super::{
    HttpState,
    error::ApiError,
    middleware::{log_responses, set_request_context},
};

const GALLERY_COLUMNS: usize = 3;

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/sections/portfolio", get(portfolio_section))
        .route("/api/sections/gallery", get(gallery_section))
        .route("/api/sections/gallery/columns", get(gallery_columns))
        .route("/api/sections/experience", get(experience_section))
        .route("/api/contact", post(submit_contact))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SectionQuery {
    /// `false` answers from the cache immediately instead of waiting on the store.
    wait: bool,
}

impl Default for SectionQuery {
    fn default() -> Self {
        Self { wait: true }
    }
}

async fn portfolio_section(
    State(state): State<HttpState>,
    Query(query): Query<SectionQuery>,
) -> Response {
    section_response(&state.sections.portfolio, query).await
}

async fn gallery_section(
    State(state): State<HttpState>,
    Query(query): Query<SectionQuery>,
) -> Response {
    section_response(&state.sections.gallery, query).await
}

async fn experience_section(
    State(state): State<HttpState>,
    Query(query): Query<SectionQuery>,
) -> Response {
    section_response(&state.sections.experience, query).await
}

async fn section_response<R: Section>(reader: &SectionReader<R>, query: SectionQuery) -> Response {
    if query.wait || !reader.retains_content() {
        return match reader.load().await {
            Ok(content) => Json(content.as_ref()).into_response(),
            Err(err) => ApiError::from(err)
                .with_source("infra::http::public::section")
                .into_response(),
        };
    }

    let view = reader.snapshot();
    refresh_in_background(reader.clone());
    match view {
        SectionView::Ready(content) => Json(content.as_ref()).into_response(),
        SectionView::Loading { placeholders } => (
            StatusCode::ACCEPTED,
            Json(json!({ "state": "loading", "placeholders": placeholders })),
        )
            .into_response(),
        SectionView::Failed(err) => ApiError::from(err)
            .with_source("infra::http::public::section")
            .into_response(),
    }
}

/// Fresh entries are cache hits; anything else is refetched once.
fn refresh_in_background<R: Section>(reader: SectionReader<R>) {
    tokio::spawn(async move {
        if let Err(err) = reader.load().await {
            debug!(key = %reader.key(), error = %err, "background section load failed");
        }
    });
}

#[derive(Debug, Serialize)]
struct GalleryColumns<T> {
    source: ContentSource,
    columns: Vec<Vec<T>>,
}

async fn gallery_columns(State(state): State<HttpState>) -> Response {
    match state.sections.gallery.load().await {
        Ok(content) => Json(GalleryColumns {
            source: content.source,
            columns: masonry_columns(&content.items, GALLERY_COLUMNS),
        })
        .into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::public::gallery_columns")
            .into_response(),
    }
}

async fn submit_contact(
    State(state): State<HttpState>,
    Json(submission): Json<ContactSubmission>,
) -> Response {
    match state.contact.submit(&submission).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "status": "received" }))).into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::public::contact")
            .into_response(),
    }
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
