//! Admin listener: auth endpoints plus the gated mutation panel.

mod gate;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    application::{
        admin::DraftForm,
        auth::{Credentials, Principal, SignUpOutcome, Viewer},
    },
    domain::{
        drafts::{Draft, ExperienceDraft, GalleryDraft, PortfolioDraft},
        entities::{ContactMessage, ExperienceEntry, GalleryImage, PortfolioItem, Record},
        types::Collection,
    },
};

use super::{
    AdminState,
    error::ApiError,
    middleware::{log_responses, set_request_context},
};

pub use gate::require_admin;

pub fn build_admin_router(state: AdminState) -> Router {
    let gated = Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route(
            "/admin/portfolio",
            get(list_collection::<PortfolioItem>).post(create_record::<PortfolioDraft>),
        )
        .route(
            "/admin/portfolio/{id}",
            delete(delete_record::<PortfolioItem>),
        )
        .route(
            "/admin/gallery",
            get(list_collection::<GalleryImage>).post(create_record::<GalleryDraft>),
        )
        .route("/admin/gallery/{id}", delete(delete_record::<GalleryImage>))
        .route(
            "/admin/experience",
            get(list_collection::<ExperienceEntry>).post(create_record::<ExperienceDraft>),
        )
        .route(
            "/admin/experience/{id}",
            delete(delete_record::<ExperienceEntry>),
        )
        .route("/admin/messages", get(list_collection::<ContactMessage>))
        .route(
            "/admin/messages/{id}",
            delete(delete_record::<ContactMessage>),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
        .route("/_health", get(health))
        .merge(gated)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

fn label(collection: Collection) -> &'static str {
    match collection {
        Collection::Portfolio => "Portfolio item",
        Collection::Gallery => "Gallery image",
        Collection::Experience => "Experience entry",
        Collection::Messages => "Message",
    }
}

async fn sign_in(
    State(state): State<AdminState>,
    Json(credentials): Json<Credentials>,
) -> Response {
    match state.gate.sign_in(&credentials).await {
        Ok(session) => Json(json!({ "session": session, "notice": "Welcome back!" })).into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::sign_in")
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SignUpRequest {
    #[serde(flatten)]
    credentials: Credentials,
    #[serde(default)]
    full_name: Option<String>,
}

async fn sign_up(State(state): State<AdminState>, Json(request): Json<SignUpRequest>) -> Response {
    match state
        .gate
        .sign_up(&request.credentials, request.full_name.as_deref())
        .await
    {
        Ok(SignUpOutcome::SignedIn(session)) => (
            StatusCode::CREATED,
            Json(json!({ "session": session, "notice": "Account created!" })),
        )
            .into_response(),
        Ok(SignUpOutcome::ConfirmationRequired { email }) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "status": "confirmation_required",
                "email": email,
                "notice": "Please check your email to confirm your account.",
            })),
        )
            .into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::sign_up")
            .into_response(),
    }
}

async fn sign_out(State(state): State<AdminState>, headers: HeaderMap) -> Response {
    let Some(token) = gate::bearer_token(&headers) else {
        return ApiError::unauthorized()
            .with_source("infra::http::admin::sign_out")
            .into_response();
    };
    match state.gate.sign_out(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::sign_out")
            .into_response(),
    }
}

async fn me(State(state): State<AdminState>, headers: HeaderMap) -> Response {
    match state.gate.resolve(gate::bearer_token(&headers)).await {
        Ok(Viewer::Anonymous) => Json(json!({ "state": "anonymous" })).into_response(),
        Ok(Viewer::Member(principal)) => {
            Json(json!({ "state": "member", "user": principal.user })).into_response()
        }
        Ok(Viewer::Admin(principal)) => {
            Json(json!({ "state": "admin", "user": principal.user })).into_response()
        }
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::me")
            .into_response(),
    }
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn dashboard(
    State(state): State<AdminState>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match state.panel.dashboard(&principal).await {
        Ok(counts) => Json(counts).into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::dashboard")
            .into_response(),
    }
}

async fn list_collection<R: Record>(
    State(state): State<AdminState>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match state.panel.list::<R>(&principal).await {
        Ok(records) => Json(records.as_ref()).into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::list")
            .into_response(),
    }
}

/// A failed create answers with the submitted values so nothing typed is lost.
async fn create_record<D: Draft>(
    State(state): State<AdminState>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<D>,
) -> Response {
    let mut form = DraftForm::with_values(draft);
    match form.submit(&state.panel, &principal).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({
                "record": record,
                "form": form.values(),
                "notice": format!("{} added!", label(<D::Record as Record>::COLLECTION)),
            })),
        )
            .into_response(),
        Err(err) => {
            let values = serde_json::to_value(form.values()).unwrap_or(Value::Null);
            ApiError::from(err)
                .with_source("infra::http::admin::create")
                .with_form(values)
                .into_response()
        }
    }
}

async fn delete_record<R: Record>(
    State(state): State<AdminState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.panel.delete(&principal, R::COLLECTION, id).await {
        Ok(()) => Json(json!({
            "deleted": id,
            "notice": format!("{} deleted!", label(R::COLLECTION)),
        }))
        .into_response(),
        Err(err) => ApiError::from(err)
            .with_source("infra::http::admin::delete")
            .into_response(),
    }
}
