//! Record store over the hosted PostgREST endpoint.

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::repos::{Access, RecordStore, Returning, StoreError},
    domain::types::{Collection, OrderBy},
};

use super::client::SupabaseClient;

const UNIQUE_VIOLATION: &str = "23505";

pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn table_url(
        &self,
        collection: Collection,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Url, StoreError> {
        self.client
            .url(&format!("rest/v1/{}", collection.table()), query)
            .map_err(|err| StoreError::Rejected(format!("invalid table url: {err}")))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

/// Map a non-success response onto the store error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> StoreError {
    let parsed: PostgrestError = serde_json::from_slice(body).unwrap_or_default();
    let detail = parsed
        .message
        .or(parsed.details)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
    let detail = format!("status {status}: {detail}");

    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
        StoreError::Conflict(detail)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StoreError::Unauthorized(detail)
    } else if status.is_client_error() {
        StoreError::Rejected(detail)
    } else {
        StoreError::Transport(detail)
    }
}

async fn read_body(response: Response) -> Result<Vec<u8>, StoreError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport)?;
    if !status.is_success() {
        return Err(status_error(status, &bytes));
    }
    Ok(bytes.to_vec())
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn select(
        &self,
        collection: Collection,
        order: OrderBy,
        access: &Access,
    ) -> Result<Vec<Value>, StoreError> {
        let order = order.as_query();
        let url = self.table_url(collection, &[("select", "*"), ("order", order.as_str())])?;
        let response = self
            .client
            .request(Method::GET, url, access.token())
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response).await?;
        let rows: Vec<Value> = serde_json::from_slice(&body).map_err(StoreError::decode)?;
        debug!(table = collection.table(), rows = rows.len(), "selected rows");
        Ok(rows)
    }

    async fn insert(
        &self,
        collection: Collection,
        fields: Value,
        access: &Access,
        returning: Returning,
    ) -> Result<Option<Value>, StoreError> {
        let url = self.table_url(collection, &[])?;
        let prefer = match returning {
            Returning::Representation => "return=representation",
            Returning::Minimal => "return=minimal",
        };
        let response = self
            .client
            .request(Method::POST, url, access.token())
            .header("Prefer", prefer)
            .json(&Value::Array(vec![fields]))
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response).await?;

        match returning {
            Returning::Minimal => Ok(None),
            Returning::Representation => {
                let rows: Vec<Value> = serde_json::from_slice(&body).map_err(StoreError::decode)?;
                rows.into_iter()
                    .next()
                    .map(Some)
                    .ok_or_else(|| StoreError::Unauthorized(format!(
                        "insert into {} returned no row; the session may lack write access",
                        collection.table()
                    )))
            }
        }
    }

    async fn delete(
        &self,
        collection: Collection,
        id: Uuid,
        access: &Access,
    ) -> Result<(), StoreError> {
        let filter = format!("eq.{id}");
        let url = self.table_url(collection, &[("id", filter.as_str())])?;
        let response = self
            .client
            .request(Method::DELETE, url, access.token())
            .send()
            .await
            .map_err(transport)?;
        read_body(response).await?;
        Ok(())
    }
}
