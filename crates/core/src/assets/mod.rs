use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::Result;

/// One alternate-resolution rendition of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVariant {
    pub src: String,
    pub width: u32,
}

/// Responsive source-set for a canonical asset path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSet {
    #[serde(default)]
    pub variants: Vec<SourceVariant>,
    /// `sizes` attribute to pair with the set, if any.
    #[serde(default)]
    pub sizes: Option<String>,
}

impl SourceSet {
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// `srcset` attribute text, e.g. `a-480.webp 480w, a-960.webp 960w`.
    pub fn srcset(&self) -> String {
        self.variants
            .iter()
            .map(|variant| format!("{} {}w", variant.src, variant.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Largest variant, or the canonical source when the set is empty.
    pub fn src_or<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.variants
            .iter()
            .max_by_key(|variant| variant.width)
            .map(|variant| variant.src.as_str())
            .unwrap_or(canonical)
    }
}

/// Strips leading `./` and `../` markers from an asset path.
pub fn normalize_path(path: &str) -> &str {
    let mut rest = path;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Resolves canonical asset paths to their precomputed source-sets.
///
/// Lookups are memoized under both the normalized and the original key, so
/// repeat resolutions of either spelling hand back the same shared descriptor.
#[derive(Debug, Default)]
pub struct ResponsiveImageResolver {
    manifest: HashMap<String, SourceSet>,
    cache: RefCell<HashMap<String, Rc<SourceSet>>>,
}

impl ResponsiveImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifest(manifest: HashMap<String, SourceSet>) -> Self {
        let manifest = manifest
            .into_iter()
            .map(|(path, set)| (normalize_path(&path).to_string(), set))
            .collect();
        Self {
            manifest,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Parses a manifest document mapping asset paths to source-sets.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let manifest: HashMap<String, SourceSet> = serde_json::from_str(source)?;
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn resolve(&self, path: &str) -> Rc<SourceSet> {
        if let Some(hit) = self.cache.borrow().get(path) {
            return hit.clone();
        }

        let normalized = normalize_path(path);
        let mut cache = self.cache.borrow_mut();
        let descriptor = match cache.get(normalized) {
            Some(hit) => hit.clone(),
            None => {
                let set = self.manifest.get(normalized).cloned().unwrap_or_else(|| {
                    tracing::debug!(path = normalized, "no source-set, using canonical source");
                    SourceSet::default()
                });
                let set = Rc::new(set);
                cache.insert(normalized.to_string(), set.clone());
                set
            }
        };
        cache.insert(path.to_string(), descriptor.clone());
        descriptor
    }

    /// Whether the manifest has an entry for the path.
    pub fn contains(&self, path: &str) -> bool {
        self.manifest.contains_key(normalize_path(path))
    }

    pub fn manifest_len(&self) -> usize {
        self.manifest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ResponsiveImageResolver {
        ResponsiveImageResolver::from_json_str(
            r#"{
                "a.jpg": { "variants": [
                    { "src": "a-480.webp", "width": 480 },
                    { "src": "a-960.webp", "width": 960 }
                ] },
                "./images/b.jpg": {
                    "variants": [{ "src": "b-640.webp", "width": 640 }],
                    "sizes": "50vw"
                }
            }"#,
        )
        .expect("manifest should parse")
    }

    #[test]
    fn relative_spellings_share_one_descriptor() {
        let resolver = resolver();
        let dotted = resolver.resolve("./a.jpg");
        let bare = resolver.resolve("a.jpg");

        assert!(Rc::ptr_eq(&dotted, &bare));
        assert!(Rc::ptr_eq(&dotted, &resolver.resolve("./a.jpg")));
        assert_eq!(bare.srcset(), "a-480.webp 480w, a-960.webp 960w");
    }

    #[test]
    fn manifest_keys_are_normalized() {
        let resolver = resolver();
        let set = resolver.resolve("../images/b.jpg");

        assert_eq!(set.sizes.as_deref(), Some("50vw"));
        assert!(resolver.contains("images/b.jpg"));
    }

    #[test]
    fn absent_entries_fall_back_to_canonical_source() {
        let resolver = resolver();
        let set = resolver.resolve("missing.jpg");

        assert!(set.is_empty());
        assert_eq!(set.src_or("missing.jpg"), "missing.jpg");
        assert_eq!(resolver.resolve("a.jpg").src_or("a.jpg"), "a-960.webp");
    }

    #[test]
    fn strips_repeated_markers() {
        assert_eq!(normalize_path("./../a/b.jpg"), "a/b.jpg");
        assert_eq!(normalize_path("images/./x.jpg"), "images/./x.jpg");
    }
}
