/// Result alias that carries the custom [`GalleryError`] type.
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Common error type for the core crate.
///
/// Runtime variants (`MissingHook`, `EmptyCollection`, `PlaybackRejected`,
/// `UnsupportedCapability`) are contained by the component that observes
/// them and never reach the visitor; they exist so the containment points can
/// log something meaningful and so tests can assert on them.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// An expected presentation element is absent from the page.
    #[error("missing presentation hook `{0}`")]
    MissingHook(String),
    /// An overlay was asked to open a collection that is absent or empty.
    #[error("collection `{0}` is absent or empty")]
    EmptyCollection(String),
    /// The host refused to start media playback.
    #[error("playback of `{0}` was rejected by the host")]
    PlaybackRejected(String),
    /// The host has no media-query support.
    #[error("media queries are not supported by the host")]
    UnsupportedCapability,
    /// A carousel must hold at least one card.
    #[error("carousel `{0}` has no cards")]
    EmptyCarousel(String),
    /// A markup attribute could not be interpreted.
    #[error("invalid value `{value}` for attribute `{name}`")]
    InvalidAttribute { name: &'static str, value: String },
    /// Free-form message for configuration and CLI problems.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl GalleryError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for GalleryError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for GalleryError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
