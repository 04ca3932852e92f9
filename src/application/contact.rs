//! Public contact form intake.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    application::repos::{Access, RecordStore, Returning, StoreError},
    cache::QueryCache,
    domain::{
        types::Collection,
        validation::{ValidationError, looks_like_email, non_blank},
    },
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn validate(&self) -> Result<NewContactMessage, ValidationError> {
        let mut error = ValidationError::new();
        let name = non_blank(&self.name);
        if name.is_none() {
            error.push("name", "Name is required");
        }
        let email = non_blank(&self.email);
        match email.as_deref() {
            None => error.push("email", "Email is required"),
            Some(value) if !looks_like_email(value) => {
                error.push("email", "Please enter a valid email")
            }
            Some(_) => {}
        }
        let message = non_blank(&self.message);
        if message.is_none() {
            error.push("message", "Message is required");
        }

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) if error.is_empty() => Ok(NewContactMessage {
                name,
                email,
                message,
            }),
            _ => Err(error),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn RecordStore>,
    cache: Arc<QueryCache>,
}

impl ContactService {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    /// Store the message anonymously. Visitors cannot read messages back, so
    /// the insert asks for no representation.
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<(), ContactError> {
        let message = submission.validate()?;
        let fields = serde_json::to_value(&message).map_err(StoreError::decode)?;
        self.store
            .insert(
                Collection::Messages,
                fields,
                &Access::Anonymous,
                Returning::Minimal,
            )
            .await?;
        self.cache.invalidate_collection(Collection::Messages);
        info!(from = %message.email, "contact message received");
        Ok(())
    }
}
