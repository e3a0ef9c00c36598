use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::Result;

/// One image of a portfolio category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub label: String,
}

impl MediaItem {
    pub fn new(src: impl Into<String>, alt: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            label: label.into(),
        }
    }
}

/// Read-only mapping from category key to its ordered images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GalleryCollection {
    categories: BTreeMap<String, Vec<MediaItem>>,
}

impl GalleryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, key: impl Into<String>, items: Vec<MediaItem>) -> Self {
        self.categories.insert(key.into(), items);
        self
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// Items of a category, `None` when the key is absent or has no items.
    pub fn items(&self, key: &str) -> Option<&[MediaItem]> {
        self.categories
            .get(key)
            .map(Vec::as_slice)
            .filter(|items| !items.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MediaItem])> {
        self.categories
            .iter()
            .map(|(key, items)| (key.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_documents() {
        let collection = GalleryCollection::from_json_str(
            r#"{
                "sports": [
                    { "src": "images/sports/main.jpg", "alt": "Track meet", "label": "Dribble" },
                    { "src": "images/sports/DSC02060.jpg" }
                ],
                "empty": []
            }"#,
        )
        .unwrap();

        let sports = collection.items("sports").unwrap();
        assert_eq!(sports.len(), 2);
        assert_eq!(sports[1].label, "");
        assert!(collection.items("empty").is_none());
        assert!(collection.items("missing").is_none());
        assert_eq!(collection.keys().collect::<Vec<_>>(), vec!["empty", "sports"]);
    }
}
