//! Askama templates for the server-rendered listing pages. The JSON API in
//! cf-api is the primary surface; these pages are a thin read-only consumer.

use askama::Template;
use cf_core::models::Item;

/// Flattened, display-ready projection of an [`Item`].
pub struct ItemView {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub status: String,
    pub image_url: String,
    pub reporter: String,
    pub reported_on: String,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        ItemView {
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category.to_string(),
            location: item.location.clone(),
            status: item.status.to_string(),
            image_url: item.image.display_url().unwrap_or_default(),
            reporter: item.reporter_name.clone(),
            reported_on: item.created_at.format("%b %e, %Y").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub lost_count: usize,
    pub found_count: usize,
}

#[derive(Template)]
#[template(path = "items.html")]
pub struct ItemsTemplate {
    pub title: String,
    /// "lost" or "found"; drives the tab state.
    pub kind: String,
    pub items: Vec<ItemView>,
    /// Currently selected category filter, empty for all.
    pub category: String,
    /// Current free-text search, empty for none.
    pub query: String,
}
