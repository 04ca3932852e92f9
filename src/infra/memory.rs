//! In-process record store and auth provider.
//!
//! Used when no backend URL is configured and by the integration tests. The
//! store can be guarded by a [`MemoryAuth`] to mimic the hosted row-level
//! policies: public reads of content, admin-only writes, anonymous contact
//! inserts and admin-only message reads.

use std::{
    cmp::Ordering as CmpOrdering,
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{
    application::{
        auth::{AuthError, AuthProvider, CurrentUser, Session, SignUpOutcome},
        repos::{Access, RecordStore, Returning, StoreError},
    },
    cache::lock::mutex_lock,
    domain::types::{Collection, OrderBy},
};

const SOURCE: &str = "infra::memory";

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Collection, Vec<Value>>>,
    selects: Mutex<HashMap<Collection, usize>>,
    guard: Option<Arc<MemoryAuth>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce admin-only policies using sessions issued by `auth`.
    pub fn guarded(auth: Arc<MemoryAuth>) -> Self {
        Self {
            guard: Some(auth),
            ..Self::default()
        }
    }

    /// Insert rows directly, bypassing policies.
    pub fn seed(&self, collection: Collection, rows: impl IntoIterator<Item = Value>) {
        let mut tables = mutex_lock(&self.tables, SOURCE, "seed");
        let table = tables.entry(collection).or_default();
        for row in rows {
            if let Value::Object(fields) = row {
                table.push(Value::Object(complete_row(collection, fields)));
            }
        }
    }

    /// Number of selects issued against `collection`.
    pub fn select_count(&self, collection: Collection) -> usize {
        mutex_lock(&self.selects, SOURCE, "select_count")
            .get(&collection)
            .copied()
            .unwrap_or_default()
    }

    pub fn total_selects(&self) -> usize {
        mutex_lock(&self.selects, SOURCE, "total_selects")
            .values()
            .sum()
    }

    fn authorize(
        &self,
        access: &Access,
        operation: Operation,
        collection: Collection,
    ) -> Result<(), StoreError> {
        let Some(auth) = self.guard.as_ref() else {
            return Ok(());
        };
        let public = match (operation, collection) {
            (Operation::Select, Collection::Messages) => false,
            (Operation::Select, _) => true,
            (Operation::Insert, Collection::Messages) => true,
            _ => false,
        };
        if public || access.token().is_some_and(|token| auth.token_is_admin(token)) {
            Ok(())
        } else {
            Err(StoreError::Unauthorized(format!(
                "{operation:?} on {} requires an admin session",
                collection.table()
            )))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Select,
    Insert,
    Delete,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(
        &self,
        collection: Collection,
        order: OrderBy,
        access: &Access,
    ) -> Result<Vec<Value>, StoreError> {
        *mutex_lock(&self.selects, SOURCE, "select")
            .entry(collection)
            .or_default() += 1;
        self.authorize(access, Operation::Select, collection)?;

        let mut rows = mutex_lock(&self.tables, SOURCE, "select")
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        // Stable sort keeps insertion order for ties.
        rows.sort_by(|a, b| {
            let ordering = compare_column(&a[order.column], &b[order.column]);
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        Ok(rows)
    }

    async fn insert(
        &self,
        collection: Collection,
        fields: Value,
        access: &Access,
        returning: Returning,
    ) -> Result<Option<Value>, StoreError> {
        self.authorize(access, Operation::Insert, collection)?;
        let Value::Object(fields) = fields else {
            return Err(StoreError::Rejected("insert body must be an object".into()));
        };

        let row = Value::Object(complete_row(collection, fields));
        mutex_lock(&self.tables, SOURCE, "insert")
            .entry(collection)
            .or_default()
            .push(row.clone());
        Ok(match returning {
            Returning::Representation => Some(row),
            Returning::Minimal => None,
        })
    }

    async fn delete(
        &self,
        collection: Collection,
        id: Uuid,
        access: &Access,
    ) -> Result<(), StoreError> {
        self.authorize(access, Operation::Delete, collection)?;
        let id = id.to_string();
        if let Some(rows) = mutex_lock(&self.tables, SOURCE, "delete").get_mut(&collection) {
            rows.retain(|row| row["id"].as_str() != Some(id.as_str()));
        }
        Ok(())
    }
}

fn complete_row(collection: Collection, mut fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    if !fields.contains_key("created_at") {
        let now = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        fields.insert("created_at".into(), Value::String(now));
    }
    // Column default for omitted orders; an explicit null stays null and
    // sorts last until the record decoder reads it as 0.
    if collection != Collection::Messages {
        fields
            .entry("display_order")
            .or_insert_with(|| Value::from(0));
    }
    fields
}

fn compare_column(a: &Value, b: &Value) -> CmpOrdering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Null, Value::Null) => CmpOrdering::Equal,
        // Nulls sort last ascending, like the hosted store.
        (Value::Null, _) => CmpOrdering::Greater,
        (_, Value::Null) => CmpOrdering::Less,
        _ => CmpOrdering::Equal,
    }
}

struct MemoryUser {
    id: Uuid,
    salt: String,
    password_hash: Vec<u8>,
}

/// Password accounts with bearer sessions. Admin rights come from a fixed
/// address list.
pub struct MemoryAuth {
    users: Mutex<HashMap<String, MemoryUser>>,
    sessions: Mutex<HashMap<String, String>>,
    admin_emails: HashSet<String>,
}

impl MemoryAuth {
    pub fn new(admin_emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            admin_emails: admin_emails
                .into_iter()
                .map(|email| normalize_email(&email))
                .collect(),
        }
    }

    fn token_is_admin(&self, token: &str) -> bool {
        mutex_lock(&self.sessions, SOURCE, "token_is_admin")
            .get(token)
            .is_some_and(|email| self.admin_emails.contains(email))
    }

    fn open_session(&self, email: &str, id: Uuid) -> Session {
        let access_token = issue_token();
        mutex_lock(&self.sessions, SOURCE, "open_session")
            .insert(access_token.clone(), email.to_string());
        Session {
            access_token,
            user: self.describe(email, id),
        }
    }

    fn describe(&self, email: &str, id: Uuid) -> CurrentUser {
        CurrentUser {
            id,
            email: email.to_string(),
            is_admin: self.admin_emails.contains(email),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let id = {
            let users = mutex_lock(&self.users, SOURCE, "sign_in");
            let user = users.get(&email).ok_or(AuthError::InvalidCredentials)?;
            let candidate = hash_password(&user.salt, password);
            if user.password_hash.ct_eq(&candidate).unwrap_u8() == 0 {
                return Err(AuthError::InvalidCredentials);
            }
            user.id
        };
        Ok(self.open_session(&email, id))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _display_name: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let email = normalize_email(email);
        let id = {
            let mut users = mutex_lock(&self.users, SOURCE, "sign_up");
            if users.contains_key(&email) {
                return Err(AuthError::AccountExists);
            }
            let salt = Uuid::new_v4().simple().to_string();
            let id = Uuid::new_v4();
            users.insert(
                email.clone(),
                MemoryUser {
                    id,
                    password_hash: hash_password(&salt, password),
                    salt,
                },
            );
            id
        };
        Ok(SignUpOutcome::SignedIn(self.open_session(&email, id)))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        mutex_lock(&self.sessions, SOURCE, "sign_out").remove(access_token);
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<CurrentUser>, AuthError> {
        let Some(email) = mutex_lock(&self.sessions, SOURCE, "current_user")
            .get(access_token)
            .cloned()
        else {
            return Ok(None);
        };
        let id = mutex_lock(&self.users, SOURCE, "current_user")
            .get(&email)
            .map(|user| user.id);
        Ok(id.map(|id| self.describe(&email, id)))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn hash_password(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn issue_token() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}
