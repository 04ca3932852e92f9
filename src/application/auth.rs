//! Auth gate: credential checks, sessions and viewer resolution.
//!
//! Sessions are never stored here. A bearer token travels with each request
//! and is resolved into a [`Viewer`] by asking the auth collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    application::repos::Access,
    domain::validation::{ValidationError, looks_like_email, non_blank},
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: CurrentUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// The account exists but the backend wants the address confirmed first.
    ConfirmationRequired { email: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("This email is already registered. Please sign in instead.")]
    AccountExists,
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    #[error("{0}")]
    Rejected(String),
    #[error("auth service unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// `None` for unknown or expired tokens.
    async fn current_user(&self, access_token: &str) -> Result<Option<CurrentUser>, AuthError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut error = ValidationError::new();
        if !looks_like_email(&self.email) {
            error.push("email", "Please enter a valid email");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            error.push("password", "Password must be at least 6 characters");
        }
        error.into_result()
    }

    fn email(&self) -> &str {
        self.email.trim()
    }
}

/// An authenticated caller and the access its store calls are made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: CurrentUser,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Member(Principal),
    Admin(Principal),
}

impl Viewer {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Member(principal) | Viewer::Admin(principal) => Some(principal),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Viewer::Admin(_))
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GateError> {
        credentials.validate()?;
        let session = self
            .provider
            .sign_in(credentials.email(), &credentials.password)
            .await?;
        info!(
            email = %session.user.email,
            is_admin = session.user.is_admin,
            "signed in"
        );
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        credentials: &Credentials,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, GateError> {
        credentials.validate()?;
        let display_name = display_name.and_then(non_blank);
        let outcome = self
            .provider
            .sign_up(
                credentials.email(),
                &credentials.password,
                display_name.as_deref(),
            )
            .await?;
        info!(
            email = credentials.email(),
            confirmed = matches!(outcome, SignUpOutcome::SignedIn(_)),
            "account created"
        );
        Ok(outcome)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), GateError> {
        self.provider.sign_out(access_token).await?;
        debug!("signed out");
        Ok(())
    }

    /// Resolve a bearer token. Missing, unknown and expired tokens are anonymous.
    pub async fn resolve(&self, access_token: Option<&str>) -> Result<Viewer, AuthError> {
        let Some(token) = access_token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Viewer::Anonymous);
        };
        let Some(user) = self.provider.current_user(token).await? else {
            return Ok(Viewer::Anonymous);
        };

        let principal = Principal {
            access: Access::Bearer(token.to_string()),
            user,
        };
        Ok(if principal.user.is_admin {
            Viewer::Admin(principal)
        } else {
            Viewer::Member(principal)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct StubAuth {
        calls: AtomicUsize,
    }

    fn user(email: &str, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::from_u128(42),
            email: email.to_string(),
            is_admin,
        }
    }

    #[async_trait]
    impl AuthProvider for StubAuth {
        async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if password != "correct-horse" {
                return Err(AuthError::InvalidCredentials);
            }
            Ok(Session {
                access_token: "token-admin".into(),
                user: user(email, true),
            })
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            _display_name: Option<&str>,
        ) -> Result<SignUpOutcome, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if email == "taken@example.com" {
                return Err(AuthError::AccountExists);
            }
            Ok(SignUpOutcome::ConfirmationRequired {
                email: email.to_string(),
            })
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn current_user(&self, token: &str) -> Result<Option<CurrentUser>, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match token {
                "token-admin" => Some(user("owner@example.com", true)),
                "token-member" => Some(user("fan@example.com", false)),
                _ => None,
            })
        }
    }

    fn gate() -> (AuthGate, Arc<StubAuth>) {
        let stub = Arc::new(StubAuth::default());
        (AuthGate::new(stub.clone()), stub)
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn malformed_credentials_make_no_call() {
        let (gate, stub) = gate();

        let err = gate
            .sign_in(&credentials("not-an-email", "123"))
            .await
            .expect_err("invalid credentials");

        let GateError::Invalid(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.message("email"), Some("Please enter a valid email"));
        assert_eq!(
            fields.message("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_sign_up_reports_existing_account() {
        let (gate, _) = gate();

        let err = gate
            .sign_up(&credentials("taken@example.com", "secret1"), Some("Ada"))
            .await
            .expect_err("account exists");

        assert_eq!(
            err.to_string(),
            "This email is already registered. Please sign in instead."
        );
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (gate, _) = gate();

        let err = gate
            .sign_in(&credentials("owner@example.com", "wrong-pass"))
            .await
            .expect_err("rejected");

        assert!(matches!(err, GateError::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn resolves_viewers_by_role() {
        let (gate, _) = gate();

        assert_eq!(gate.resolve(None).await, Ok(Viewer::Anonymous));
        assert_eq!(gate.resolve(Some("expired")).await, Ok(Viewer::Anonymous));
        assert!(matches!(
            gate.resolve(Some("token-member")).await,
            Ok(Viewer::Member(_))
        ));
        let admin = gate.resolve(Some("token-admin")).await.expect("resolve");
        assert!(admin.is_admin());
        assert_eq!(
            admin.principal().map(|p| &p.access),
            Some(&Access::Bearer("token-admin".into()))
        );
    }
}
