//! Modal image preview and indexed gallery overlay.
//!
//! Both overlays are singleton sessions owned by [`OverlayPresenter`]. They
//! share the page-wide scroll lock, which is held by at most one session and
//! released exactly once.

use serde::{Deserialize, Serialize};

use crate::{
    assets::ResponsiveImageResolver,
    collection::{GalleryCollection, MediaItem},
    render::PresentationIntent,
    timeline::{FrameHandle, FrameScheduler},
    GalleryError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Preview,
    Gallery,
}

impl OverlayKind {
    fn other(self) -> Self {
        match self {
            OverlayKind::Preview => OverlayKind::Gallery,
            OverlayKind::Gallery => OverlayKind::Preview,
        }
    }
}

/// Single image to show in the preview overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Keys the overlays respond to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    #[serde(other)]
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    pub intents: Vec<PresentationIntent>,
    /// Suppress the browser's default handling (arrow-key scrolling).
    pub prevent_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySession {
    pub collection_key: Option<String>,
    pub index: usize,
    pub open: bool,
    reveal_frame: Option<FrameHandle>,
}

impl OverlaySession {
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.reveal_frame
    }
}

/// Page-wide scroll lock shared by the overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollLock {
    holder: Option<OverlayKind>,
}

impl ScrollLock {
    pub fn holder(&self) -> Option<OverlayKind> {
        self.holder
    }

    pub fn is_locked(&self) -> bool {
        self.holder.is_some()
    }

    fn acquire(&mut self, kind: OverlayKind) -> Option<PresentationIntent> {
        if self.holder.is_some() {
            return None;
        }
        self.holder = Some(kind);
        Some(PresentationIntent::ScrollLock { locked: true })
    }

    /// Releases the lock if `kind` holds it, handing it to `successor` when
    /// that session is still open.
    fn release(
        &mut self,
        kind: OverlayKind,
        successor: Option<OverlayKind>,
    ) -> Option<PresentationIntent> {
        if self.holder != Some(kind) {
            return None;
        }
        self.holder = successor;
        match successor {
            Some(_) => None,
            None => Some(PresentationIntent::ScrollLock { locked: false }),
        }
    }
}

/// Which overlay elements exist in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayHooks {
    pub preview: bool,
    pub gallery: bool,
}

impl Default for OverlayHooks {
    fn default() -> Self {
        Self {
            preview: true,
            gallery: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct OverlayPresenter {
    hooks: OverlayHooks,
    preview: OverlaySession,
    preview_item: Option<PreviewRequest>,
    gallery: OverlaySession,
    scroll_lock: ScrollLock,
}

impl OverlayPresenter {
    pub fn new(hooks: OverlayHooks) -> Self {
        Self {
            hooks,
            ..Default::default()
        }
    }

    pub fn session(&self, kind: OverlayKind) -> &OverlaySession {
        match kind {
            OverlayKind::Preview => &self.preview,
            OverlayKind::Gallery => &self.gallery,
        }
    }

    pub fn is_open(&self, kind: OverlayKind) -> bool {
        self.session(kind).open
    }

    pub fn scroll_lock(&self) -> ScrollLock {
        self.scroll_lock
    }

    pub fn preview_item(&self) -> Option<&PreviewRequest> {
        self.preview_item.as_ref()
    }

    /// Opens the gallery overlay at the first item of `key`.
    pub fn open_gallery(
        &mut self,
        key: &str,
        collections: &GalleryCollection,
        resolver: &ResponsiveImageResolver,
        frames: &mut dyn FrameScheduler,
    ) -> Vec<PresentationIntent> {
        if !self.hooks.gallery {
            let err = GalleryError::MissingHook("gallery-overlay".into());
            tracing::debug!(%err, "gallery overlay unavailable");
            return Vec::new();
        }
        let Some(items) = collections.items(key) else {
            let err = GalleryError::EmptyCollection(key.to_string());
            tracing::debug!(%err, "gallery not opened");
            return Vec::new();
        };

        self.cancel_reveal(OverlayKind::Gallery, frames);
        self.gallery.collection_key = Some(key.to_string());
        self.gallery.index = 0;
        self.gallery.open = true;
        self.gallery.reveal_frame = Some(frames.request_frame());

        let mut intents = vec![PresentationIntent::ShowOverlay {
            kind: OverlayKind::Gallery,
        }];
        intents.extend(gallery_item_intents(key, items, 0, resolver));
        intents.extend(self.scroll_lock.acquire(OverlayKind::Gallery));
        intents
    }

    pub fn open_preview(
        &mut self,
        request: PreviewRequest,
        resolver: &ResponsiveImageResolver,
        frames: &mut dyn FrameScheduler,
    ) -> Vec<PresentationIntent> {
        if !self.hooks.preview {
            let err = GalleryError::MissingHook("lightbox".into());
            tracing::debug!(%err, "preview unavailable");
            return Vec::new();
        }
        if request.src.trim().is_empty() {
            return Vec::new();
        }

        self.cancel_reveal(OverlayKind::Preview, frames);
        self.preview.collection_key = None;
        self.preview.index = 0;
        self.preview.open = true;
        self.preview.reveal_frame = Some(frames.request_frame());

        let sources = resolver.resolve(&request.src);
        let mut intents = vec![
            PresentationIntent::ShowOverlay {
                kind: OverlayKind::Preview,
            },
            image_intent(OverlayKind::Preview, &request.src, &request.alt, &sources),
        ];
        intents.extend(self.scroll_lock.acquire(OverlayKind::Preview));
        self.preview_item = Some(request);
        intents
    }

    pub fn next(
        &mut self,
        collections: &GalleryCollection,
        resolver: &ResponsiveImageResolver,
    ) -> Vec<PresentationIntent> {
        self.step_gallery(1, collections, resolver)
    }

    pub fn prev(
        &mut self,
        collections: &GalleryCollection,
        resolver: &ResponsiveImageResolver,
    ) -> Vec<PresentationIntent> {
        self.step_gallery(-1, collections, resolver)
    }

    /// Closes a session. Safe to call when it is already closed.
    pub fn close(
        &mut self,
        kind: OverlayKind,
        frames: &mut dyn FrameScheduler,
    ) -> Vec<PresentationIntent> {
        self.cancel_reveal(kind, frames);
        if !self.session(kind).open {
            return Vec::new();
        }

        let mut intents = vec![
            PresentationIntent::HideOverlay { kind },
            PresentationIntent::SetOverlayImage {
                kind,
                src: String::new(),
                srcset: None,
                sizes: None,
                alt: String::new(),
            },
        ];
        match kind {
            OverlayKind::Preview => {
                self.preview = OverlaySession::default();
                self.preview_item = None;
            }
            OverlayKind::Gallery => {
                self.gallery = OverlaySession::default();
                intents.push(PresentationIntent::SetOverlayText {
                    kind,
                    label: String::new(),
                    indicator: String::new(),
                });
            }
        }

        let successor = Some(kind.other()).filter(|other| self.is_open(*other));
        intents.extend(self.scroll_lock.release(kind, successor));
        intents
    }

    /// Closes whichever sessions are open, preview first.
    pub fn close_all(&mut self, frames: &mut dyn FrameScheduler) -> Vec<PresentationIntent> {
        let mut intents = self.close(OverlayKind::Preview, frames);
        intents.extend(self.close(OverlayKind::Gallery, frames));
        intents
    }

    /// Click on the overlay backdrop (or the preview image itself).
    pub fn backdrop_click(
        &mut self,
        kind: OverlayKind,
        frames: &mut dyn FrameScheduler,
    ) -> Vec<PresentationIntent> {
        self.close(kind, frames)
    }

    pub fn handle_key(
        &mut self,
        key: &Key,
        collections: &GalleryCollection,
        resolver: &ResponsiveImageResolver,
        frames: &mut dyn FrameScheduler,
    ) -> KeyOutcome {
        match key {
            Key::Escape => {
                let kind = if self.preview.open {
                    OverlayKind::Preview
                } else if self.gallery.open {
                    OverlayKind::Gallery
                } else {
                    return KeyOutcome::default();
                };
                KeyOutcome {
                    intents: self.close(kind, frames),
                    prevent_default: false,
                }
            }
            Key::ArrowLeft | Key::ArrowRight if self.gallery.open => {
                let delta = if *key == Key::ArrowLeft { -1 } else { 1 };
                KeyOutcome {
                    intents: self.step_gallery(delta, collections, resolver),
                    prevent_default: true,
                }
            }
            _ => KeyOutcome::default(),
        }
    }

    pub fn owns_frame(&self, handle: FrameHandle) -> bool {
        self.preview.reveal_frame == Some(handle) || self.gallery.reveal_frame == Some(handle)
    }

    /// Runs a reveal frame callback. Unknown handles produce nothing.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Vec<PresentationIntent> {
        for kind in [OverlayKind::Preview, OverlayKind::Gallery] {
            let session = self.session_mut(kind);
            if session.reveal_frame == Some(handle) {
                session.reveal_frame = None;
                if session.open {
                    return vec![PresentationIntent::RevealOverlay { kind }];
                }
            }
        }
        Vec::new()
    }

    /// Indicator text of the gallery session, e.g. `"3 / 9"`.
    pub fn indicator(&self, collections: &GalleryCollection) -> Option<String> {
        let key = self.gallery.collection_key.as_deref().filter(|_| self.gallery.open)?;
        let items = collections.items(key)?;
        Some(indicator(self.gallery.index, items.len()))
    }

    fn step_gallery(
        &mut self,
        delta: i64,
        collections: &GalleryCollection,
        resolver: &ResponsiveImageResolver,
    ) -> Vec<PresentationIntent> {
        if !self.gallery.open {
            return Vec::new();
        }
        let Some(key) = self.gallery.collection_key.clone() else {
            return Vec::new();
        };
        let Some(items) = collections.items(&key) else {
            return Vec::new();
        };
        let len = items.len() as i64;
        self.gallery.index = (self.gallery.index as i64 + delta).rem_euclid(len) as usize;
        gallery_item_intents(&key, items, self.gallery.index, resolver)
    }

    fn cancel_reveal(&mut self, kind: OverlayKind, frames: &mut dyn FrameScheduler) {
        if let Some(handle) = self.session_mut(kind).reveal_frame.take() {
            frames.cancel_frame(handle);
        }
    }

    fn session_mut(&mut self, kind: OverlayKind) -> &mut OverlaySession {
        match kind {
            OverlayKind::Preview => &mut self.preview,
            OverlayKind::Gallery => &mut self.gallery,
        }
    }
}

fn indicator(index: usize, len: usize) -> String {
    format!("{} / {}", index + 1, len)
}

fn image_intent(
    kind: OverlayKind,
    src: &str,
    alt: &str,
    sources: &crate::assets::SourceSet,
) -> PresentationIntent {
    let srcset = Some(sources.srcset()).filter(|set| !set.is_empty());
    PresentationIntent::SetOverlayImage {
        kind,
        src: src.to_string(),
        srcset,
        sizes: sources.sizes.clone().filter(|_| !sources.is_empty()),
        alt: alt.to_string(),
    }
}

fn gallery_item_intents(
    key: &str,
    items: &[MediaItem],
    index: usize,
    resolver: &ResponsiveImageResolver,
) -> Vec<PresentationIntent> {
    let item = &items[index];
    let sources = resolver.resolve(&item.src);
    let label = if item.label.trim().is_empty() {
        key.to_string()
    } else {
        item.label.clone()
    };
    vec![
        image_intent(OverlayKind::Gallery, &item.src, &item.alt, &sources),
        PresentationIntent::SetOverlayText {
            kind: OverlayKind::Gallery,
            label,
            indicator: indicator(index, items.len()),
        },
    ]
}
