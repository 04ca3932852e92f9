use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::application::{
    admin::MutationError,
    auth::{AuthError, GateError},
    contact::ContactError,
    error::ErrorReport,
    repos::StoreError,
    sections::SectionError,
};
use crate::domain::{drafts::DraftError, validation::ValidationError};

pub mod codes {
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const MISSING_FIELDS: &str = "missing_fields";
    pub const ACCOUNT_EXISTS: &str = "account_exists";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const AUTH_REJECTED: &str = "auth_rejected";
    pub const BACKEND_UNAVAILABLE: &str = "backend_unavailable";
    pub const BACKEND_REJECTED: &str = "backend_rejected";
    pub const BACKEND_DECODE: &str = "backend_decode";
}

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const REQUIRED: &str = "This field is required";

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<&'static str, String>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
    fields: Option<BTreeMap<&'static str, String>>,
    form: Option<Value>,
    detail: Option<String>,
    source: &'static str,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            hint,
            fields: None,
            form: None,
            detail: None,
            source: "infra::http",
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Please sign in to continue.",
            None,
        )
    }

    /// Label the report attached to the response.
    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = source;
        self
    }

    /// Echo the submitted form values so the client can keep them.
    pub fn with_form(mut self, form: Value) -> Self {
        self.form = Some(form);
        self
    }

    /// Server-side detail kept in the error report and never sent to clients.
    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    fn with_fields(mut self, fields: BTreeMap<&'static str, String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self.detail.as_deref().or(self.hint.as_deref()) {
            Some(detail) => format!("{}: {detail}", self.code),
            None => format!("{}: {}", self.code, self.message),
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
                fields: self.fields,
            },
            form: self.form,
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(self.source, self.status, detail).attach(&mut response);
        response
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let (status, code) = match &err {
            StoreError::Transport(_) => (StatusCode::SERVICE_UNAVAILABLE, codes::BACKEND_UNAVAILABLE),
            StoreError::Decode(_) => (StatusCode::BAD_GATEWAY, codes::BACKEND_DECODE),
            StoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED),
            StoreError::Conflict(_) => (StatusCode::CONFLICT, codes::DUPLICATE),
            StoreError::Rejected(_) => (StatusCode::BAD_REQUEST, codes::BACKEND_REJECTED),
        };
        Self::new(status, code, GENERIC_FAILURE, None).with_detail(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = err
            .fields
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| "Invalid input".to_string());
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            codes::INVALID_INPUT,
            message,
            None,
        )
        .with_fields(err.fields)
    }
}

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        let hint = err.to_string();
        let fields = err
            .missing
            .iter()
            .map(|field| (*field, REQUIRED.to_string()))
            .collect();
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            codes::MISSING_FIELDS,
            "Please fill in the required fields.",
            Some(hint),
        )
        .with_fields(fields)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::AccountExists => Self::new(
                StatusCode::CONFLICT,
                codes::ACCOUNT_EXISTS,
                err.to_string(),
                None,
            ),
            AuthError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                codes::INVALID_CREDENTIALS,
                err.to_string(),
                None,
            ),
            AuthError::Rejected(message) => Self::new(
                StatusCode::BAD_REQUEST,
                codes::AUTH_REJECTED,
                message.clone(),
                None,
            ),
            AuthError::Transport(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::BACKEND_UNAVAILABLE,
                GENERIC_FAILURE,
                None,
            )
            .with_detail(err.to_string()),
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Invalid(err) => err.into(),
            GateError::Auth(err) => err.into(),
        }
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Draft(err) => err.into(),
            MutationError::Store(err) => err.into(),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Invalid(err) => err.into(),
            ContactError::Store(err) => err.into(),
        }
    }
}

impl From<SectionError> for ApiError {
    fn from(err: SectionError) -> Self {
        match err {
            SectionError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::json;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn store_transport_maps_to_generic_503() {
        let response = ApiError::from(StoreError::Transport("timeout".into())).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("report attached");
        assert!(report.messages[0].contains("timeout"));

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], codes::BACKEND_UNAVAILABLE);
        assert_eq!(body["error"]["message"], GENERIC_FAILURE);
        assert!(body["error"].get("hint").is_none());
    }

    #[tokio::test]
    async fn backend_detail_stays_in_the_report() {
        let err = StoreError::Rejected("status 500: relation \"gallery_images\" is locked".into());
        let response = ApiError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("report attached");
        assert!(report.messages[0].contains("status 500"));

        let body = body_json(response).await;
        assert!(!body.to_string().contains("status 500"));
        assert_eq!(body["error"]["message"], GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn draft_error_lists_missing_fields() {
        let err = DraftError {
            missing: vec!["title", "image_url"],
        };
        let response = ApiError::from(err)
            .with_form(json!({ "title": "", "category": "Desert" }))
            .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["fields"]["title"], REQUIRED);
        assert_eq!(body["error"]["fields"]["image_url"], REQUIRED);
        assert_eq!(body["form"]["category"], "Desert");
    }

    #[tokio::test]
    async fn auth_errors_keep_user_facing_messages() {
        let exists = ApiError::from(AuthError::AccountExists).into_response();
        assert_eq!(exists.status(), StatusCode::CONFLICT);
        let body = body_json(exists).await;
        assert_eq!(
            body["error"]["message"],
            "This email is already registered. Please sign in instead."
        );

        let invalid = ApiError::from(AuthError::InvalidCredentials).into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let rejected = ApiError::from(AuthError::Rejected("Signups not allowed".into())).into_response();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        let body = body_json(rejected).await;
        assert_eq!(body["error"]["message"], "Signups not allowed");
    }

    #[tokio::test]
    async fn validation_error_reports_first_field_message() {
        let mut err = ValidationError::new();
        err.push("email", "Please enter a valid email");
        err.push("password", "Password must be at least 6 characters");

        let body = body_json(ApiError::from(GateError::Invalid(err)).into_response()).await;

        assert_eq!(body["error"]["code"], codes::INVALID_INPUT);
        assert_eq!(body["error"]["message"], "Please enter a valid email");
        assert_eq!(
            body["error"]["fields"]["password"],
            "Password must be at least 6 characters"
        );
    }
}
