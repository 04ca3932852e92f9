//! Shared harness: both routers wired to one in-memory backend and cache.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, StatusCode, header},
};
use knoxs::{
    application::{
        admin::AdminPanel, auth::AuthGate, contact::ContactService, sections::PublicSections,
    },
    cache::{CacheConfig, QueryCache},
    infra::{
        http::{self, AdminState, HttpState},
        memory::{MemoryAuth, MemoryStore},
    },
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "knoxs@example.com";
pub const PASSWORD: &str = "savanna-42";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<QueryCache>,
    pub public: Router,
    pub admin: Router,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_fallback(true)
    }

    pub fn with_fallback(fallback: bool) -> Self {
        Self::with_config(fallback, CacheConfig::default())
    }

    pub fn with_config(fallback: bool, config: CacheConfig) -> Self {
        let auth = Arc::new(MemoryAuth::new([ADMIN_EMAIL.to_string()]));
        let store = Arc::new(MemoryStore::guarded(Arc::clone(&auth)));
        let cache = Arc::new(QueryCache::new(config));

        let public = http::build_router(HttpState {
            sections: PublicSections::new(store.clone(), Arc::clone(&cache), fallback),
            contact: ContactService::new(store.clone(), Arc::clone(&cache)),
        });
        let admin = http::build_admin_router(AdminState {
            gate: AuthGate::new(auth),
            panel: AdminPanel::new(store.clone(), Arc::clone(&cache)),
        });

        Self {
            store,
            cache,
            public,
            admin,
        }
    }

    /// Sign up `email` and return its bearer token.
    pub async fn sign_up(&self, email: &str) -> String {
        let (status, body) = send(
            &self.admin,
            Method::POST,
            "/auth/sign-up",
            None,
            Some(serde_json::json!({
                "email": email,
                "password": PASSWORD,
                "full_name": "Test Account",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {body}");
        body["session"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.sign_up(ADMIN_EMAIL).await
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    read_json(response).await
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}
