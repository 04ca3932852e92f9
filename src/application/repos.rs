//! Collaborator traits describing the hosted record store.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::Record,
    types::{Collection, OrderBy},
};

/// Credentials a store call is made with. Row-level security is the store's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Bearer(String),
}

impl Access {
    pub fn token(&self) -> Option<&str> {
        match self {
            Access::Anonymous => None,
            Access::Bearer(token) => Some(token.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record store unreachable: {0}")]
    Transport(String),
    #[error("record store refused credentials: {0}")]
    Unauthorized(String),
    #[error("record conflicts with existing data: {0}")]
    Conflict(String),
    #[error("record store rejected request: {0}")]
    Rejected(String),
    #[error("record store returned an unreadable row: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Whether an insert should echo the stored row back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returning {
    Representation,
    Minimal,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(
        &self,
        collection: Collection,
        order: OrderBy,
        access: &Access,
    ) -> Result<Vec<Value>, StoreError>;

    async fn insert(
        &self,
        collection: Collection,
        fields: Value,
        access: &Access,
        returning: Returning,
    ) -> Result<Option<Value>, StoreError>;

    /// Deleting an absent id succeeds.
    async fn delete(
        &self,
        collection: Collection,
        id: Uuid,
        access: &Access,
    ) -> Result<(), StoreError>;
}

/// Ordered select decoded into `R`.
pub async fn list_records<R: Record>(
    store: &dyn RecordStore,
    access: &Access,
) -> Result<Vec<R>, StoreError> {
    let rows = store
        .select(R::COLLECTION, R::COLLECTION.order(), access)
        .await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::decode))
        .collect()
}

/// Insert returning the decoded stored row.
pub async fn insert_record<R: Record>(
    store: &dyn RecordStore,
    fields: &impl Serialize,
    access: &Access,
) -> Result<R, StoreError> {
    let fields = serde_json::to_value(fields).map_err(StoreError::decode)?;
    let row = store
        .insert(R::COLLECTION, fields, access, Returning::Representation)
        .await?
        .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))?;
    serde_json::from_value(row).map_err(StoreError::decode)
}
