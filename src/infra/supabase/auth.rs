//! Auth provider over the hosted GoTrue endpoint plus the `has_role` RPC.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::auth::{
    AuthError, AuthProvider, CurrentUser, Session, SignUpOutcome,
};

use super::client::SupabaseClient;

const ADMIN_ROLE: &str = "admin";
const ALREADY_REGISTERED: &str = "already registered";
const USER_EXISTS_CODE: &str = "user_already_exists";

pub struct SupabaseAuth {
    client: SupabaseClient,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// Sign-up answers with a session, or with the bare user while the address
/// awaits confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoTrueError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    error: Option<String>,
}

impl GoTrueError {
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn message(&self, status: StatusCode) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| format!("auth request failed with status {status}"))
    }

    fn is_existing_account(&self, status: StatusCode) -> bool {
        self.error_code.as_deref() == Some(USER_EXISTS_CODE)
            || self
                .message(status)
                .to_ascii_lowercase()
                .contains(ALREADY_REGISTERED)
    }
}

fn transport(err: reqwest::Error) -> AuthError {
    AuthError::Transport(err.to_string())
}

fn url_error(err: url::ParseError) -> AuthError {
    AuthError::Transport(format!("invalid auth url: {err}"))
}

fn decode(err: serde_json::Error) -> AuthError {
    AuthError::Transport(format!("unreadable auth response: {err}"))
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<(StatusCode, Vec<u8>), AuthError> {
        let url = self.client.url(path, query).map_err(url_error)?;
        let mut request = self.client.request(method, url, bearer);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        Ok((status, bytes.to_vec()))
    }

    async fn has_admin_role(&self, access_token: &str, user_id: Uuid) -> Result<bool, AuthError> {
        let (status, body) = self
            .send(
                Method::POST,
                "rest/v1/rpc/has_role",
                &[],
                Some(access_token),
                Some(json!({ "_user_id": user_id, "_role": ADMIN_ROLE })),
            )
            .await?;
        if !status.is_success() {
            return Err(AuthError::Transport(
                GoTrueError::parse(&body).message(status),
            ));
        }
        serde_json::from_slice(&body).map_err(decode)
    }

    async fn session_from(&self, token: TokenResponse) -> Result<Session, AuthError> {
        let is_admin = self.has_admin_role(&token.access_token, token.user.id).await?;
        Ok(Session {
            user: CurrentUser {
                id: token.user.id,
                email: token.user.email.unwrap_or_default(),
                is_admin,
            },
            access_token: token.access_token,
        })
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let (status, body) = self
            .send(
                Method::POST,
                "auth/v1/token",
                &[("grant_type", "password")],
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        if status.is_server_error() {
            return Err(AuthError::Transport(GoTrueError::parse(&body).message(status)));
        }
        if !status.is_success() {
            return Err(AuthError::InvalidCredentials);
        }
        let token: TokenResponse = serde_json::from_slice(&body).map_err(decode)?;
        self.session_from(token).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let (status, body) = self
            .send(
                Method::POST,
                "auth/v1/signup",
                &[],
                None,
                Some(json!({
                    "email": email,
                    "password": password,
                    "data": { "full_name": display_name.unwrap_or_default() },
                })),
            )
            .await?;
        if !status.is_success() {
            let error = GoTrueError::parse(&body);
            return Err(if error.is_existing_account(status) {
                AuthError::AccountExists
            } else if status.is_server_error() {
                AuthError::Transport(error.message(status))
            } else {
                AuthError::Rejected(error.message(status))
            });
        }

        match serde_json::from_slice(&body).map_err(decode)? {
            SignUpResponse::Session(token) => {
                Ok(SignUpOutcome::SignedIn(self.session_from(token).await?))
            }
            SignUpResponse::User(user) => Ok(SignUpOutcome::ConfirmationRequired {
                email: user.email.unwrap_or_else(|| email.to_string()),
            }),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let (status, body) = self
            .send(Method::POST, "auth/v1/logout", &[], Some(access_token), None)
            .await?;
        // An expired session is already signed out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(AuthError::Rejected(GoTrueError::parse(&body).message(status)))
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<CurrentUser>, AuthError> {
        let (status, body) = self
            .send(Method::GET, "auth/v1/user", &[], Some(access_token), None)
            .await?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::Transport(GoTrueError::parse(&body).message(status)));
        }
        let user: AuthUser = serde_json::from_slice(&body).map_err(decode)?;
        let is_admin = self.has_admin_role(access_token, user.id).await?;
        Ok(Some(CurrentUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
            is_admin,
        }))
    }
}
