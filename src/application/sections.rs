//! Public section readers.
//!
//! Each reader lists one collection through the query cache under its public
//! key. An empty collection is shown as the built-in default sequence when
//! fallback is enabled.

use std::{marker::PhantomData, sync::Arc};

use serde::Serialize;
use thiserror::Error;

use crate::{
    application::repos::{Access, RecordStore, StoreError, list_records},
    cache::{QueryCache, QueryKey, QueryState},
    domain::{
        defaults,
        entities::{ExperienceEntry, GalleryImage, PortfolioItem, Record},
    },
};

/// A record type rendered as a public section.
pub trait Section: Record {
    /// Number of placeholder cards shown while loading.
    const PLACEHOLDERS: usize;

    fn defaults() -> Vec<Self>;
}

impl Section for PortfolioItem {
    const PLACEHOLDERS: usize = 2;

    fn defaults() -> Vec<Self> {
        defaults::portfolio_items()
    }
}

impl Section for GalleryImage {
    const PLACEHOLDERS: usize = 9;

    fn defaults() -> Vec<Self> {
        defaults::gallery_images()
    }
}

impl Section for ExperienceEntry {
    const PLACEHOLDERS: usize = 4;

    fn defaults() -> Vec<Self> {
        defaults::experience_entries()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Store,
    Defaults,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionContent<R> {
    pub source: ContentSource,
    pub items: Vec<R>,
}

/// What a section shows right now, without waiting on the store.
#[derive(Debug, Clone)]
pub enum SectionView<R> {
    Loading { placeholders: usize },
    Ready(Arc<SectionContent<R>>),
    Failed(StoreError),
}

#[derive(Debug, Error)]
pub enum SectionError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SectionReader<R> {
    store: Arc<dyn RecordStore>,
    cache: Arc<QueryCache>,
    fallback: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SectionReader<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            fallback: self.fallback,
            _record: PhantomData,
        }
    }
}

impl<R: Section> SectionReader<R> {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<QueryCache>, fallback: bool) -> Self {
        Self {
            store,
            cache,
            fallback,
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::public(R::COLLECTION)
    }

    /// Whether settled content is retained; without it a snapshot never fills.
    pub fn retains_content(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Ordered section content, from cache when fresh.
    pub async fn load(&self) -> Result<Arc<SectionContent<R>>, SectionError> {
        let store = Arc::clone(&self.store);
        let fallback = self.fallback;
        let content = self
            .cache
            .get(self.key(), move || async move {
                let items = list_records::<R>(store.as_ref(), &Access::Anonymous).await?;
                Ok::<_, StoreError>(with_fallback(items, fallback))
            })
            .await?;
        Ok(content)
    }

    /// Stale or previous content stays visible while a refetch runs.
    pub fn snapshot(&self) -> SectionView<R> {
        match self.cache.state::<SectionContent<R>>(self.key()) {
            QueryState::Ready(content)
            | QueryState::Stale(content)
            | QueryState::Pending {
                previous: Some(content),
            }
            | QueryState::Failed {
                previous: Some(content),
                ..
            } => SectionView::Ready(content),
            QueryState::Idle | QueryState::Pending { previous: None } => SectionView::Loading {
                placeholders: R::PLACEHOLDERS,
            },
            QueryState::Failed {
                error,
                previous: None,
            } => SectionView::Failed(error),
        }
    }
}

fn with_fallback<R: Section>(items: Vec<R>, fallback: bool) -> SectionContent<R> {
    if items.is_empty() && fallback {
        SectionContent {
            source: ContentSource::Defaults,
            items: R::defaults(),
        }
    } else {
        SectionContent {
            source: ContentSource::Store,
            items,
        }
    }
}

/// Round-robin split into `columns` masonry columns.
pub fn masonry_columns<T: Clone>(items: &[T], columns: usize) -> Vec<Vec<T>> {
    let columns = columns.max(1);
    let mut out = vec![Vec::new(); columns];
    for (index, item) in items.iter().enumerate() {
        out[index % columns].push(item.clone());
    }
    out
}

/// The three readers behind the public site.
#[derive(Clone)]
pub struct PublicSections {
    pub portfolio: SectionReader<PortfolioItem>,
    pub gallery: SectionReader<GalleryImage>,
    pub experience: SectionReader<ExperienceEntry>,
}

impl PublicSections {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<QueryCache>, fallback: bool) -> Self {
        Self {
            portfolio: SectionReader::new(Arc::clone(&store), Arc::clone(&cache), fallback),
            gallery: SectionReader::new(Arc::clone(&store), Arc::clone(&cache), fallback),
            experience: SectionReader::new(store, cache, fallback),
        }
    }
}
