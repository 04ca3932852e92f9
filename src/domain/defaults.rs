//! Built-in content shown by public sections while a collection is empty.

use uuid::Uuid;

use crate::domain::entities::{ExperienceEntry, GalleryImage, PortfolioItem};

fn default_id(position: usize) -> Uuid {
    Uuid::from_u128(position as u128 + 1)
}

fn position_order(position: usize) -> i32 {
    i32::try_from(position + 1).unwrap_or(i32::MAX)
}

pub fn portfolio_items() -> Vec<PortfolioItem> {
    const ITEMS: [(&str, &str, &str, &str); 2] = [
        (
            "African Savanna",
            "A breathtaking series capturing the majesty of African wildlife during the Great Migration.",
            "https://images.unsplash.com/photo-1516426122078-c23e76319801?q=80&w=2068&auto=format&fit=crop",
            "Safari",
        ),
        (
            "Arctic Expeditions",
            "Documenting the fragile beauty of polar ecosystems and their magnificent inhabitants.",
            "https://images.unsplash.com/photo-1589656966895-2f33e7653819?q=80&w=2070&auto=format&fit=crop",
            "Arctic",
        ),
    ];

    ITEMS
        .iter()
        .enumerate()
        .map(
            |(position, (title, description, image_url, category))| PortfolioItem {
                id: default_id(position),
                title: (*title).to_string(),
                description: Some((*description).to_string()),
                image_url: (*image_url).to_string(),
                category: Some((*category).to_string()),
                display_order: position_order(position),
            },
        )
        .collect()
}

pub fn gallery_images() -> Vec<GalleryImage> {
    const IMAGES: [(&str, &str); 9] = [
        (
            "https://images.unsplash.com/photo-1474511320723-9a56873571b7?q=80&w=2072&auto=format&fit=crop",
            "Lion in savanna",
        ),
        (
            "https://images.unsplash.com/photo-1535338454770-8be927b5a00b?q=80&w=2044&auto=format&fit=crop",
            "Eagle in flight",
        ),
        (
            "https://images.unsplash.com/photo-1504173010664-32509aeebb62?q=80&w=2069&auto=format&fit=crop",
            "Elephant herd",
        ),
        (
            "https://images.unsplash.com/photo-1557050543-4d5f4e07ef46?q=80&w=2032&auto=format&fit=crop",
            "Tiger in wild",
        ),
        (
            "https://images.unsplash.com/photo-1564349683136-77e08dba1ef7?q=80&w=2072&auto=format&fit=crop",
            "Giraffe portrait",
        ),
        (
            "https://images.unsplash.com/photo-1551085254-e96b210db58a?q=80&w=2021&auto=format&fit=crop",
            "Penguin colony",
        ),
        (
            "https://images.unsplash.com/photo-1606567595334-d39972c85dfd?q=80&w=1974&auto=format&fit=crop",
            "Cheetah running",
        ),
        (
            "https://images.unsplash.com/photo-1544985361-b420d7a77043?q=80&w=1974&auto=format&fit=crop",
            "Owl eyes",
        ),
        (
            "https://images.unsplash.com/photo-1552410260-0fd9e8f4a8b5?q=80&w=2070&auto=format&fit=crop",
            "Polar bear",
        ),
    ];

    IMAGES
        .iter()
        .enumerate()
        .map(|(position, (image_url, alt_text))| GalleryImage {
            id: default_id(position),
            image_url: (*image_url).to_string(),
            alt_text: Some((*alt_text).to_string()),
            category: None,
            display_order: position_order(position),
        })
        .collect()
}

pub fn experience_entries() -> Vec<ExperienceEntry> {
    const ENTRIES: [(&str, &str, &str); 4] = [
        (
            "2020",
            "National Geographic Feature",
            "Featured photographer for National Geographic's 'Wild Earth' documentary series.",
        ),
        (
            "2018",
            "Wildlife Photographer of the Year",
            "Winner of the prestigious Wildlife Photographer of the Year award.",
        ),
        (
            "2015",
            "Amazon Expedition",
            "Led a 6-month expedition documenting rare species in the Amazon rainforest.",
        ),
        (
            "2010",
            "Career Beginning",
            "Started professional wildlife photography journey in Kenya's Maasai Mara.",
        ),
    ];

    ENTRIES
        .iter()
        .enumerate()
        .map(|(position, (year, title, description))| ExperienceEntry {
            id: default_id(position),
            year: (*year).to_string(),
            title: (*title).to_string(),
            description: Some((*description).to_string()),
            display_order: position_order(position),
        })
        .collect()
}
