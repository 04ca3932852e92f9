//! Selects the record store and auth provider from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::{auth::AuthProvider, repos::RecordStore},
    config::{AuthSettings, BackendSettings},
    infra::{
        error::InfraError,
        memory::{MemoryAuth, MemoryStore},
        supabase::{SupabaseAuth, SupabaseClient, SupabaseStore},
    },
};

#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn RecordStore>,
    pub auth: Arc<dyn AuthProvider>,
}

pub fn connect(backend: &BackendSettings, auth: &AuthSettings) -> Result<Backend, InfraError> {
    match backend {
        BackendSettings::Hosted {
            url,
            anon_key,
            request_timeout,
        } => {
            let client = SupabaseClient::new(url, anon_key.as_str(), *request_timeout)?;
            info!(backend = %client.base(), "using hosted backend");
            Ok(Backend {
                store: Arc::new(SupabaseStore::new(client.clone())),
                auth: Arc::new(SupabaseAuth::new(client)),
            })
        }
        BackendSettings::Memory => {
            if auth.admin_emails.is_empty() {
                warn!("in-memory backend has no admin addresses; no account can reach the admin panel");
            }
            Ok(memory(auth.admin_emails.iter().cloned()))
        }
    }
}

/// In-memory backend guarded by its own sessions.
pub fn memory(admin_emails: impl IntoIterator<Item = String>) -> Backend {
    let auth = Arc::new(MemoryAuth::new(admin_emails));
    let store = Arc::new(MemoryStore::guarded(Arc::clone(&auth)));
    Backend { store, auth }
}
