//! Records mirrored from the hosted store.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::Collection;

/// A row type stored in one collection.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: Uuid,
    pub image_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub year: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record for PortfolioItem {
    const COLLECTION: Collection = Collection::Portfolio;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for GalleryImage {
    const COLLECTION: Collection = Collection::Gallery;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for ExperienceEntry {
    const COLLECTION: Collection = Collection::Experience;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for ContactMessage {
    const COLLECTION: Collection = Collection::Messages;

    fn id(&self) -> Uuid {
        self.id
    }
}

// The store column is nullable with a zero default. Rows are already ordered
// nulls-last by the store, so a null reads as 0 without being re-sorted.
fn null_as_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_store_rows_with_nulls() {
        let row = json!({
            "id": "7f1f9a8e-5a52-4a6e-9f83-1f0c5f6f2d11",
            "title": "Dunes at Dawn",
            "description": null,
            "image_url": "https://x/y.jpg",
            "category": "Desert",
            "display_order": null,
            "created_at": "2025-01-02T03:04:05.123456+00:00"
        });

        let item: PortfolioItem = serde_json::from_value(row).expect("row decodes");
        assert_eq!(item.display_order, 0);
        assert_eq!(item.description, None);
        assert_eq!(item.category.as_deref(), Some("Desert"));
    }

    #[test]
    fn message_timestamps_are_rfc3339() {
        let row = json!({
            "id": "7f1f9a8e-5a52-4a6e-9f83-1f0c5f6f2d11",
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Hello",
            "created_at": "2025-01-02T03:04:05.123456+00:00"
        });

        let message: ContactMessage = serde_json::from_value(row).expect("row decodes");
        assert_eq!(message.created_at.year(), 2025);
    }
}
