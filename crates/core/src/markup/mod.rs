//! Typed readings of the `data-*` attributes the page markup carries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{GalleryError, Result};

/// Opaque reference to a host element. The core never owns elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute snapshot of a single element, as handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementAttributes {
    pub id: ElementId,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ElementAttributes {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            attributes: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Non-empty, trimmed attribute value.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|value| !value.is_empty())
    }
}

/// `data-carousel-direction`: `reverse` gives -1, anything else +1.
pub fn direction_multiplier(element: &ElementAttributes) -> i64 {
    match element.value("data-carousel-direction") {
        Some(value) if value.eq_ignore_ascii_case("reverse") => -1,
        _ => 1,
    }
}

/// `data-carousel-nav-inverted`: present and not `false`.
pub fn nav_inverted(element: &ElementAttributes) -> bool {
    match element.get("data-carousel-nav-inverted") {
        Some(value) => !value.trim().eq_ignore_ascii_case("false"),
        None => false,
    }
}

/// Parallax factor from `data-parallax`, falling back to `data-depth`.
pub fn parallax_factor(element: &ElementAttributes) -> Result<Option<f64>> {
    for name in ["data-parallax", "data-depth"] {
        if let Some(raw) = element.value(name) {
            let factor = raw
                .parse::<f64>()
                .ok()
                .filter(|factor| factor.is_finite())
                .ok_or_else(|| GalleryError::InvalidAttribute {
                    name,
                    value: raw.to_string(),
                })?;
            return Ok(Some(factor));
        }
    }
    Ok(None)
}

/// Comma separated `data-playlist` sources, blanks dropped.
pub fn playlist(element: &ElementAttributes) -> Vec<String> {
    element
        .get("data-playlist")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|source| !source.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Full resolution source of a carousel card or lightbox trigger.
pub fn full_source(element: &ElementAttributes) -> Option<&str> {
    element
        .value("data-full")
        .or_else(|| element.value("data-lightbox-src"))
        .or_else(|| element.value("src"))
}
