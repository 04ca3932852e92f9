//! Stub collaborators shared by application unit tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    application::repos::{Access, RecordStore, Returning, StoreError},
    domain::types::{Collection, OrderBy},
};

#[derive(Default)]
pub struct StubStore {
    rows: Mutex<HashMap<Collection, Vec<Value>>>,
    fail_next_select: Mutex<Option<StoreError>>,
    fail_next_insert: Mutex<Option<StoreError>>,
    selects: AtomicUsize,
    inserts: AtomicUsize,
    pub last_access: Mutex<Option<Access>>,
}

impl StubStore {
    pub fn with_rows(collection: Collection, rows: Vec<Value>) -> Self {
        let store = Self::default();
        store
            .rows
            .lock()
            .expect("rows lock")
            .insert(collection, rows);
        store
    }

    pub fn fail_next_select(&self, error: StoreError) {
        *self.fail_next_select.lock().expect("fail lock") = Some(error);
    }

    pub fn fail_next_insert(&self, error: StoreError) {
        *self.fail_next_insert.lock().expect("fail lock") = Some(error);
    }

    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for StubStore {
    async fn select(
        &self,
        collection: Collection,
        order: OrderBy,
        access: &Access,
    ) -> Result<Vec<Value>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        *self.last_access.lock().expect("access lock") = Some(access.clone());
        if let Some(error) = self.fail_next_select.lock().expect("fail lock").take() {
            return Err(error);
        }
        let mut rows = self
            .rows
            .lock()
            .expect("rows lock")
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        rows.sort_by_key(|row| row[order.column].as_i64().unwrap_or_default());
        if !order.ascending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn insert(
        &self,
        collection: Collection,
        mut fields: Value,
        access: &Access,
        returning: Returning,
    ) -> Result<Option<Value>, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        *self.last_access.lock().expect("access lock") = Some(access.clone());
        if let Some(error) = self.fail_next_insert.lock().expect("fail lock").take() {
            return Err(error);
        }
        fields["id"] = json!(Uuid::new_v4());
        fields["created_at"] = json!("2025-01-01T00:00:00Z");
        self.rows
            .lock()
            .expect("rows lock")
            .entry(collection)
            .or_default()
            .push(fields.clone());
        Ok((returning == Returning::Representation).then_some(fields))
    }

    async fn delete(
        &self,
        collection: Collection,
        id: Uuid,
        _access: &Access,
    ) -> Result<(), StoreError> {
        let id = id.to_string();
        if let Some(rows) = self.rows.lock().expect("rows lock").get_mut(&collection) {
            rows.retain(|row| row["id"].as_str() != Some(id.as_str()));
        }
        Ok(())
    }
}
