//! Create drafts for the admin panel.
//!
//! A draft holds raw form values. `validate` trims them, turns blank optional
//! fields into `None` and reports every missing required field at once.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::domain::{
    entities::{ExperienceEntry, GalleryImage, PortfolioItem, Record},
    validation::non_blank,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct DraftError {
    pub missing: Vec<&'static str>,
}

pub trait Draft: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Record: Record;
    type Insert: Serialize + Send + Sync;

    fn validate(&self) -> Result<Self::Insert, DraftError>;
}

fn required(
    value: &str,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = non_blank(value);
    if value.is_none() {
        missing.push(field);
    }
    value
}

fn finish<T>(missing: Vec<&'static str>, build: impl FnOnce() -> Option<T>) -> Result<T, DraftError> {
    if !missing.is_empty() {
        return Err(DraftError { missing });
    }
    build().ok_or(DraftError { missing })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPortfolioItem {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub category: Option<String>,
    pub display_order: i32,
}

impl Draft for PortfolioDraft {
    type Record = PortfolioItem;
    type Insert = NewPortfolioItem;

    fn validate(&self) -> Result<NewPortfolioItem, DraftError> {
        let mut missing = Vec::new();
        let title = required(&self.title, "title", &mut missing);
        let image_url = required(&self.image_url, "image_url", &mut missing);
        finish(missing, || {
            Some(NewPortfolioItem {
                title: title?,
                description: non_blank(&self.description),
                image_url: image_url?,
                category: non_blank(&self.category),
                display_order: self.display_order.unwrap_or_default(),
            })
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryDraft {
    pub image_url: String,
    pub alt_text: String,
    pub category: String,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGalleryImage {
    pub image_url: String,
    pub alt_text: Option<String>,
    pub category: Option<String>,
    pub display_order: i32,
}

impl Draft for GalleryDraft {
    type Record = GalleryImage;
    type Insert = NewGalleryImage;

    fn validate(&self) -> Result<NewGalleryImage, DraftError> {
        let mut missing = Vec::new();
        let image_url = required(&self.image_url, "image_url", &mut missing);
        finish(missing, || {
            Some(NewGalleryImage {
                image_url: image_url?,
                alt_text: non_blank(&self.alt_text),
                category: non_blank(&self.category),
                display_order: self.display_order.unwrap_or_default(),
            })
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceDraft {
    pub year: String,
    pub title: String,
    pub description: String,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExperienceEntry {
    pub year: String,
    pub title: String,
    pub description: Option<String>,
    pub display_order: i32,
}

impl Draft for ExperienceDraft {
    type Record = ExperienceEntry;
    type Insert = NewExperienceEntry;

    fn validate(&self) -> Result<NewExperienceEntry, DraftError> {
        let mut missing = Vec::new();
        let year = required(&self.year, "year", &mut missing);
        let title = required(&self.title, "title", &mut missing);
        finish(missing, || {
            Some(NewExperienceEntry {
                year: year?,
                title: title?,
                description: non_blank(&self.description),
                display_order: self.display_order.unwrap_or_default(),
            })
        })
    }
}
