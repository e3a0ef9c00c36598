//! Core library for the portfolio gallery interaction layer.
//!
//! Every interactive behaviour of the portfolio pages lives here as plain
//! state plus reducers: carousels, the preview and gallery overlays, the
//! portfolio filter, parallax and reveal-on-scroll, and background playlists.
//! Nothing touches a document directly. Components emit declarative
//! [`PresentationIntent`]s that a host applies through a [`RenderAdapter`],
//! and host capabilities (frame scheduling, media queries, playback) come in
//! through traits so the whole layer runs under test without a browser.

pub mod assets;
pub mod breakpoint;
pub mod carousel;
pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod gesture;
pub mod markup;
pub mod media;
pub mod overlay;
pub mod popup;
pub mod render;
pub mod reveal;
pub mod scroll;
pub mod timeline;

pub use assets::{normalize_path, ResponsiveImageResolver, SourceSet, SourceVariant};
pub use breakpoint::{
    BreakpointMonitor, BreakpointState, MediaQueryHost, StaticMediaHost, TrackedFeature,
};
pub use carousel::{CarouselInstance, NavControl};
pub use collection::{GalleryCollection, MediaItem};
pub use config::AppConfig;
pub use context::{ContextBuilder, Dispatch, HostEvent, InteractionContext, PageMarkup};
pub use error::{GalleryError, Result};
pub use filter::PortfolioFilter;
pub use gesture::{GestureEvent, GestureRecognizer};
pub use markup::{ElementAttributes, ElementId};
pub use media::{LoggingPlayer, MediaPlayer, Playlist};
pub use overlay::{OverlayKind, OverlayPresenter, PreviewRequest};
pub use popup::{PopupOutcome, PopupService};
pub use render::{IntentLog, PresentationIntent, RenderAdapter, TracingRenderer};
pub use reveal::RevealTracker;
pub use scroll::{LerpVirtualizer, ParallaxAnimator, ScrollVirtualizer};
pub use timeline::{Debouncer, FrameHandle, FrameScheduler, ManualFrameScheduler};
