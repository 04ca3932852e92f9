//! Admin mutation panel.
//!
//! Listings are cached under the admin key of each collection and never fall
//! back to defaults. Every successful create or delete invalidates all cached
//! views of the mutated collection, public sections included.

pub mod forms;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    application::{
        auth::Principal,
        repos::{RecordStore, StoreError, insert_record, list_records},
    },
    cache::{QueryCache, QueryKey},
    domain::{
        drafts::{Draft, DraftError},
        entities::{ContactMessage, ExperienceEntry, GalleryImage, PortfolioItem, Record},
        types::Collection,
    },
};

pub use forms::DraftForm;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub portfolio: usize,
    pub gallery: usize,
    pub experience: usize,
    pub messages: usize,
}

#[derive(Clone)]
pub struct AdminPanel {
    store: Arc<dyn RecordStore>,
    cache: Arc<QueryCache>,
}

impl AdminPanel {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    pub async fn list<R: Record>(&self, principal: &Principal) -> Result<Arc<Vec<R>>, StoreError> {
        let store = Arc::clone(&self.store);
        let access = principal.access.clone();
        self.cache
            .get(QueryKey::admin(R::COLLECTION), move || async move {
                list_records::<R>(store.as_ref(), &access).await
            })
            .await
    }

    pub async fn dashboard(&self, principal: &Principal) -> Result<DashboardCounts, StoreError> {
        let (portfolio, gallery, experience, messages) = futures::try_join!(
            self.list::<PortfolioItem>(principal),
            self.list::<GalleryImage>(principal),
            self.list::<ExperienceEntry>(principal),
            self.list::<ContactMessage>(principal),
        )?;
        Ok(DashboardCounts {
            portfolio: portfolio.len(),
            gallery: gallery.len(),
            experience: experience.len(),
            messages: messages.len(),
        })
    }

    /// Validate and insert `draft`. Nothing reaches the store when a required
    /// field is missing.
    pub async fn create<D: Draft>(
        &self,
        principal: &Principal,
        draft: &D,
    ) -> Result<D::Record, MutationError> {
        let insert = draft.validate()?;
        let collection = <D::Record as Record>::COLLECTION;
        let record =
            insert_record::<D::Record>(self.store.as_ref(), &insert, &principal.access).await?;
        self.cache.invalidate_collection(collection);
        info!(
            actor = %principal.user.email,
            collection = collection.as_str(),
            id = %record.id(),
            "record created"
        );
        Ok(record)
    }

    pub async fn delete(
        &self,
        principal: &Principal,
        collection: Collection,
        id: Uuid,
    ) -> Result<(), StoreError> {
        self.store
            .delete(collection, id, &principal.access)
            .await?;
        self.cache.invalidate_collection(collection);
        info!(
            actor = %principal.user.email,
            collection = collection.as_str(),
            id = %id,
            "record deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        application::{
            auth::CurrentUser,
            repos::Access,
            sections::{ContentSource, SectionReader},
            test_support::StubStore,
        },
        cache::CacheConfig,
        domain::drafts::{GalleryDraft, PortfolioDraft},
    };

    fn admin() -> Principal {
        Principal {
            user: CurrentUser {
                id: Uuid::from_u128(7),
                email: "owner@example.com".into(),
                is_admin: true,
            },
            access: Access::Bearer("token-admin".into()),
        }
    }

    fn panel(store: Arc<StubStore>) -> (AdminPanel, Arc<QueryCache>) {
        let cache = Arc::new(QueryCache::new(CacheConfig::default()));
        (AdminPanel::new(store, Arc::clone(&cache)), cache)
    }

    fn portfolio_row(id: u128, title: &str, order: i32) -> serde_json::Value {
        json!({
            "id": Uuid::from_u128(id),
            "title": title,
            "image_url": format!("https://img/{id}.jpg"),
            "display_order": order,
        })
    }

    #[tokio::test]
    async fn create_refreshes_admin_and_public_views() {
        let store = Arc::new(StubStore::with_rows(
            Collection::Portfolio,
            vec![
                portfolio_row(1, "Savanna", 1),
                portfolio_row(2, "Arctic", 2),
                portfolio_row(4, "Rainforest", 4),
            ],
        ));
        let (panel, cache) = panel(Arc::clone(&store));
        let public = SectionReader::<PortfolioItem>::new(store.clone(), cache, true);
        let principal = admin();

        assert_eq!(public.load().await.expect("public").items.len(), 3);
        assert_eq!(panel.list::<PortfolioItem>(&principal).await.expect("admin").len(), 3);

        let created = panel
            .create(
                &principal,
                &PortfolioDraft {
                    title: "Dunes at Dawn".into(),
                    image_url: "https://x/y.jpg".into(),
                    category: "Desert".into(),
                    display_order: Some(3),
                    ..Default::default()
                },
            )
            .await
            .expect("create");
        assert_eq!(created.title, "Dunes at Dawn");

        let admin_titles: Vec<_> = panel
            .list::<PortfolioItem>(&principal)
            .await
            .expect("admin")
            .iter()
            .map(|item| item.title.clone())
            .collect();
        assert_eq!(admin_titles, ["Savanna", "Arctic", "Dunes at Dawn", "Rainforest"]);

        let public_content = public.load().await.expect("public");
        assert_eq!(public_content.source, ContentSource::Store);
        assert!(public_content.items.iter().any(|item| item.id == created.id));
    }

    #[tokio::test]
    async fn missing_fields_never_reach_the_store() {
        let store = Arc::new(StubStore::default());
        let (panel, _) = panel(Arc::clone(&store));

        let err = panel
            .create(&admin(), &GalleryDraft::default())
            .await
            .expect_err("image_url required");

        assert!(matches!(err, MutationError::Draft(DraftError { ref missing }) if missing == &["image_url"]));
        assert_eq!(store.inserts(), 0);
    }

    #[tokio::test]
    async fn store_failure_leaves_cache_untouched() {
        let store = Arc::new(StubStore::default());
        let (panel, _) = panel(Arc::clone(&store));
        let principal = admin();
        panel.list::<GalleryImage>(&principal).await.expect("prime");
        store.fail_next_insert(StoreError::Unauthorized("row level security".into()));

        let err = panel
            .create(
                &principal,
                &GalleryDraft {
                    image_url: "https://x/owl.jpg".into(),
                    ..Default::default()
                },
            )
            .await
            .expect_err("store refuses");

        assert!(matches!(err, MutationError::Store(StoreError::Unauthorized(_))));
        panel.list::<GalleryImage>(&principal).await.expect("cached");
        assert_eq!(store.selects(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_visible() {
        let store = Arc::new(StubStore::with_rows(
            Collection::Portfolio,
            vec![portfolio_row(1, "Savanna", 1)],
        ));
        let (panel, _) = panel(Arc::clone(&store));
        let principal = admin();
        let id = Uuid::from_u128(1);
        assert_eq!(panel.list::<PortfolioItem>(&principal).await.expect("list").len(), 1);

        panel
            .delete(&principal, Collection::Portfolio, id)
            .await
            .expect("delete");
        panel
            .delete(&principal, Collection::Portfolio, id)
            .await
            .expect("repeat delete");

        assert!(panel.list::<PortfolioItem>(&principal).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn dashboard_counts_every_collection() {
        let store = Arc::new(StubStore::with_rows(
            Collection::Portfolio,
            vec![portfolio_row(1, "Savanna", 1), portfolio_row(2, "Arctic", 2)],
        ));
        let (panel, _) = panel(store);

        let counts = panel.dashboard(&admin()).await.expect("dashboard");

        assert_eq!(
            counts,
            DashboardCounts {
                portfolio: 2,
                gallery: 0,
                experience: 0,
                messages: 0,
            }
        );
    }
}
