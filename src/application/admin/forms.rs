//! Create form state for the admin panel.

use crate::{
    application::{
        admin::{AdminPanel, MutationError},
        auth::Principal,
    },
    domain::drafts::Draft,
};

/// Form values for one collection. A successful submit resets the form; a
/// failed one keeps what was typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm<D> {
    values: D,
}

impl<D: Draft> DraftForm<D> {
    pub fn with_values(values: D) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &D {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut D {
        &mut self.values
    }

    pub async fn submit(
        &mut self,
        panel: &AdminPanel,
        principal: &Principal,
    ) -> Result<D::Record, MutationError> {
        let record = panel.create(principal, &self.values).await?;
        self.values = D::default();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::{
        application::{
            auth::CurrentUser,
            repos::{Access, StoreError},
            test_support::StubStore,
        },
        cache::{CacheConfig, QueryCache},
        domain::drafts::ExperienceDraft,
    };

    fn principal() -> Principal {
        Principal {
            user: CurrentUser {
                id: Uuid::from_u128(1),
                email: "owner@example.com".into(),
                is_admin: true,
            },
            access: Access::Bearer("token".into()),
        }
    }

    fn filled() -> ExperienceDraft {
        ExperienceDraft {
            year: "2024".into(),
            title: "Desert Season".into(),
            description: "Six weeks in the Namib.".into(),
            display_order: Some(5),
        }
    }

    #[tokio::test]
    async fn success_resets_values() {
        let store = Arc::new(StubStore::default());
        let panel = AdminPanel::new(store, Arc::new(QueryCache::new(CacheConfig::default())));
        let mut form = DraftForm::with_values(filled());

        let entry = form.submit(&panel, &principal()).await.expect("submit");

        assert_eq!(entry.year, "2024");
        assert_eq!(form.values(), &ExperienceDraft::default());
    }

    #[tokio::test]
    async fn failure_preserves_values() {
        let store = Arc::new(StubStore::default());
        store.fail_next_insert(StoreError::Transport("timeout".into()));
        let panel = AdminPanel::new(store, Arc::new(QueryCache::new(CacheConfig::default())));
        let mut form = DraftForm::with_values(filled());

        form.submit(&panel, &principal())
            .await
            .expect_err("store failure");
        assert_eq!(form.values(), &filled());

        form.values_mut().year.clear();
        form.submit(&panel, &principal())
            .await
            .expect_err("missing year");
        assert_eq!(form.values().title, "Desert Season");
    }
}
