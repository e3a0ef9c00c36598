//! Composition root for the interaction layer.
//!
//! [`InteractionContext`] owns every component, the host frame scheduler and
//! the process-wide breakpoint state. Hosts build it once from a snapshot of
//! the page markup, feed it [`HostEvent`]s and frame callbacks, and apply the
//! returned intents through a [`RenderAdapter`](crate::RenderAdapter).

use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    assets::ResponsiveImageResolver,
    breakpoint::{
        BreakpointMonitor, BreakpointState, MediaQueryHost, StaticMediaHost, TrackedFeature,
    },
    carousel::{CarouselInstance, CarouselOutcome, NavControl},
    collection::GalleryCollection,
    config::AppConfig,
    filter::{self, PortfolioFilter},
    gesture::GestureEvent,
    markup::{self, ElementAttributes, ElementId},
    media::{LoggingPlayer, MediaPlayer, Playlist},
    overlay::{Key, OverlayHooks, OverlayKind, OverlayPresenter, PreviewRequest},
    popup::{self, PopupOutcome, PopupService},
    render::PresentationIntent,
    reveal::RevealTracker,
    scroll::{ParallaxAnimator, ParallaxLayer, VirtualizerFactory},
    timeline::{Debouncer, FrameHandle, FrameScheduler, ManualFrameScheduler},
    GalleryError,
};

fn present() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarouselMarkup {
    pub container: ElementAttributes,
    #[serde(default)]
    pub cards: Vec<ElementAttributes>,
}

/// Snapshot of the page elements the interaction layer hooks into.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageMarkup {
    pub carousels: Vec<CarouselMarkup>,
    pub filter_buttons: Vec<ElementAttributes>,
    pub portfolio_items: Vec<ElementAttributes>,
    pub parallax_layers: Vec<ElementAttributes>,
    pub reveal_sections: Vec<ElementId>,
    pub playlists: Vec<ElementAttributes>,
    pub lightbox_triggers: Vec<ElementAttributes>,
    #[serde(default = "present")]
    pub preview_overlay: bool,
    #[serde(default = "present")]
    pub gallery_overlay: bool,
}

impl Default for PageMarkup {
    fn default() -> Self {
        Self {
            carousels: Vec::new(),
            filter_buttons: Vec::new(),
            portfolio_items: Vec::new(),
            parallax_layers: Vec::new(),
            reveal_sections: Vec::new(),
            playlists: Vec::new(),
            lightbox_triggers: Vec::new(),
            preview_overlay: true,
            gallery_overlay: true,
        }
    }
}

/// Everything the host can report to the interaction layer, except frame
/// callbacks which go through [`InteractionContext::run_frame`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Scroll,
    Resize { width: f64, time_ms: f64 },
    /// Timer tick; fires the debounced resize once its quiet window passed.
    Timer { time_ms: f64 },
    MediaChanged { feature: TrackedFeature, matches: bool },
    Key { key: String },
    Touch { carousel: String, gesture: GestureEvent },
    CarouselControl { carousel: String, control: NavControl },
    CardClick { carousel: String, card: usize },
    CardFocus { carousel: String, card: usize },
    CardBlur { carousel: String },
    FilterClick { element: ElementId },
    ItemClick { element: ElementId },
    LightboxClick { element: ElementId },
    OverlayBackdrop { kind: OverlayKind },
    OverlayClose { kind: OverlayKind },
    GalleryNext,
    GalleryPrev,
    Intersection { element: ElementId, ratio: f64 },
    /// In-page anchor click; `target_y` is `None` when the target is missing.
    AnchorClick { target_y: Option<f64> },
    MediaEnded { element: ElementId },
    /// Click on a booking / contact link backed by the popup form service.
    PopupTrigger { form: String, fallback_url: String },
}

/// Result of dispatching one host event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    pub intents: Vec<PresentationIntent>,
    /// The host should call `preventDefault` on the originating event.
    pub prevent_default: bool,
}

impl From<Vec<PresentationIntent>> for Dispatch {
    fn from(intents: Vec<PresentationIntent>) -> Self {
        Self {
            intents,
            prevent_default: false,
        }
    }
}

pub struct ContextBuilder<F> {
    config: AppConfig,
    frames: F,
    markup: PageMarkup,
    collections: GalleryCollection,
    resolver: ResponsiveImageResolver,
    host: Box<dyn MediaQueryHost>,
    player: Box<dyn MediaPlayer>,
    popup: Option<Box<dyn PopupService>>,
    virtualizer: Option<VirtualizerFactory>,
}

impl<F: FrameScheduler> ContextBuilder<F> {
    pub fn new(config: AppConfig, frames: F) -> Self {
        Self {
            config,
            frames,
            markup: PageMarkup::default(),
            collections: GalleryCollection::default(),
            resolver: ResponsiveImageResolver::default(),
            host: Box::new(StaticMediaHost::new(1280.0, false)),
            player: Box::new(LoggingPlayer),
            popup: None,
            virtualizer: None,
        }
    }

    pub fn markup(mut self, markup: PageMarkup) -> Self {
        self.markup = markup;
        self
    }

    pub fn collections(mut self, collections: GalleryCollection) -> Self {
        self.collections = collections;
        self
    }

    pub fn resolver(mut self, resolver: ResponsiveImageResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn media_host(mut self, host: impl MediaQueryHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn player(mut self, player: impl MediaPlayer + 'static) -> Self {
        self.player = Box::new(player);
        self
    }

    pub fn popup(mut self, service: impl PopupService + 'static) -> Self {
        self.popup = Some(Box::new(service));
        self
    }

    pub fn virtualizer(mut self, factory: VirtualizerFactory) -> Self {
        self.virtualizer = Some(factory);
        self
    }

    /// Builds every component and returns the initial presentation. Broken
    /// pieces of markup degrade the matching feature and never fail the page.
    pub fn init(self) -> (InteractionContext<F>, Vec<PresentationIntent>) {
        let Self {
            config,
            frames,
            markup,
            collections,
            resolver,
            host,
            player,
            popup,
            virtualizer,
        } = self;

        let carousels: Vec<CarouselInstance> = markup
            .carousels
            .iter()
            .filter_map(|carousel| {
                CarouselInstance::from_markup(&carousel.container, &carousel.cards, &config)
                    .map_err(|err| tracing::warn!(%err, "carousel disabled"))
                    .ok()
            })
            .collect();

        let layers = markup
            .parallax_layers
            .iter()
            .filter_map(ParallaxLayer::from_markup)
            .collect();
        let mut animator = ParallaxAnimator::new(layers);
        if let Some(factory) = virtualizer {
            animator = animator.with_virtualizer(factory);
        }

        let mut reveal = RevealTracker::new(config.scroll.reveal_threshold);
        for section in &markup.reveal_sections {
            reveal.observe(section.clone());
        }

        let lightbox = markup
            .lightbox_triggers
            .iter()
            .filter_map(|trigger| {
                let src = markup::full_source(trigger)?;
                Some((
                    trigger.id.clone(),
                    PreviewRequest {
                        src: src.to_string(),
                        alt: trigger.get("alt").unwrap_or_default().to_string(),
                    },
                ))
            })
            .collect();

        let mut context = InteractionContext {
            monitor: BreakpointMonitor::new(config.breakpoints),
            resize: Debouncer::new(config.scroll.resize_debounce()),
            viewport_width: host.viewport_width(),
            overlay: OverlayPresenter::new(OverlayHooks {
                preview: markup.preview_overlay,
                gallery: markup.gallery_overlay,
            }),
            filter: PortfolioFilter::from_markup(&markup.filter_buttons, &markup.portfolio_items),
            playlists: markup.playlists.iter().filter_map(Playlist::from_markup).collect(),
            config,
            frames,
            host,
            player,
            popup,
            resolver,
            collections,
            carousels,
            animator,
            reveal,
            lightbox,
        };

        let state = context.monitor.evaluate(context.host.as_ref());
        let mut intents = Vec::new();
        for carousel in &context.carousels {
            intents.extend(carousel.layout());
        }
        if context.filter.has_button(filter::ALL) {
            intents.extend(context.filter.select(filter::ALL));
        }
        intents.extend(context.animator.apply_breakpoints(&state, &mut context.frames));
        for playlist in &mut context.playlists {
            intents.extend(playlist.start(context.player.as_mut()));
        }

        tracing::info!(
            carousels = context.carousels.len(),
            layers = context.animator.layers().len(),
            playlists = context.playlists.len(),
            ?state,
            "interaction context initialised"
        );
        (context, intents)
    }
}

pub struct InteractionContext<F> {
    config: AppConfig,
    frames: F,
    host: Box<dyn MediaQueryHost>,
    player: Box<dyn MediaPlayer>,
    popup: Option<Box<dyn PopupService>>,
    monitor: BreakpointMonitor,
    resolver: ResponsiveImageResolver,
    collections: GalleryCollection,
    overlay: OverlayPresenter,
    carousels: Vec<CarouselInstance>,
    animator: ParallaxAnimator,
    filter: PortfolioFilter,
    reveal: RevealTracker,
    playlists: Vec<Playlist>,
    lightbox: HashMap<ElementId, PreviewRequest>,
    resize: Debouncer,
    viewport_width: f64,
}

impl<F: FrameScheduler> InteractionContext<F> {
    pub fn builder(config: AppConfig, frames: F) -> ContextBuilder<F> {
        ContextBuilder::new(config, frames)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn breakpoints(&self) -> BreakpointState {
        self.monitor.state()
    }

    /// Access for registering breakpoint subscribers.
    pub fn monitor_mut(&mut self) -> &mut BreakpointMonitor {
        &mut self.monitor
    }

    pub fn overlay(&self) -> &OverlayPresenter {
        &self.overlay
    }

    pub fn carousel(&self, id: &str) -> Option<&CarouselInstance> {
        self.carousels.iter().find(|carousel| carousel.id() == id)
    }

    pub fn animator(&self) -> &ParallaxAnimator {
        &self.animator
    }

    pub fn filter(&self) -> &PortfolioFilter {
        &self.filter
    }

    pub fn collections(&self) -> &GalleryCollection {
        &self.collections
    }

    pub fn resolver(&self) -> &ResponsiveImageResolver {
        &self.resolver
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn dispatch(&mut self, event: HostEvent) -> Dispatch {
        match event {
            HostEvent::Scroll => {
                self.animator.on_scroll(&mut self.frames);
                Dispatch::default()
            }
            HostEvent::Resize { width, time_ms } => {
                self.viewport_width = width;
                self.resize.trigger(time_ms);
                Dispatch::default()
            }
            HostEvent::Timer { time_ms } => {
                if self.resize.poll(time_ms) {
                    self.resized().into()
                } else {
                    Dispatch::default()
                }
            }
            HostEvent::MediaChanged { feature, matches } => {
                let previous = self.monitor.state();
                self.monitor.media_changed(feature, matches);
                self.breakpoints_changed(previous).into()
            }
            HostEvent::Key { key } => {
                let outcome = self.overlay.handle_key(
                    &Key::from_dom(&key),
                    &self.collections,
                    &self.resolver,
                    &mut self.frames,
                );
                Dispatch {
                    intents: outcome.intents,
                    prevent_default: outcome.prevent_default,
                }
            }
            HostEvent::Touch { carousel, gesture } => {
                self.with_carousel(&carousel, |carousel, _| carousel.handle_gesture(gesture))
            }
            HostEvent::CarouselControl { carousel, control } => {
                self.with_carousel(&carousel, |carousel, _| CarouselOutcome {
                    intents: carousel.step(control),
                    ..Default::default()
                })
            }
            HostEvent::CardClick { carousel, card } => {
                self.with_carousel(&carousel, |carousel, state| carousel.click(card, state))
            }
            HostEvent::CardFocus { carousel, card } => self.with_carousel(&carousel, |carousel, _| {
                carousel.focus(card);
                CarouselOutcome::default()
            }),
            HostEvent::CardBlur { carousel } => self.with_carousel(&carousel, |carousel, _| {
                carousel.blur();
                CarouselOutcome::default()
            }),
            HostEvent::FilterClick { element } => self.filter.click_button(&element).into(),
            HostEvent::ItemClick { element } => match self.filter.gallery_for(&element) {
                Some(key) => self
                    .overlay
                    .open_gallery(key, &self.collections, &self.resolver, &mut self.frames)
                    .into(),
                None => Dispatch::default(),
            },
            HostEvent::LightboxClick { element } => match self.lightbox.get(&element) {
                Some(request) => self
                    .overlay
                    .open_preview(request.clone(), &self.resolver, &mut self.frames)
                    .into(),
                None => {
                    let err = GalleryError::MissingHook(element.to_string());
                    tracing::debug!(%err, "lightbox trigger ignored");
                    Dispatch::default()
                }
            },
            HostEvent::OverlayBackdrop { kind } => {
                self.overlay.backdrop_click(kind, &mut self.frames).into()
            }
            HostEvent::OverlayClose { kind } => self.overlay.close(kind, &mut self.frames).into(),
            HostEvent::GalleryNext => self.overlay.next(&self.collections, &self.resolver).into(),
            HostEvent::GalleryPrev => self.overlay.prev(&self.collections, &self.resolver).into(),
            HostEvent::Intersection { element, ratio } => {
                self.reveal.intersection(&element, ratio).into_iter().collect::<Vec<_>>().into()
            }
            HostEvent::AnchorClick { target_y } => match target_y {
                Some(y) => Dispatch {
                    intents: self.animator.scroll_to(y).into_iter().collect(),
                    prevent_default: true,
                },
                None => Dispatch::default(),
            },
            HostEvent::MediaEnded { element } => {
                match self.playlists.iter_mut().find(|playlist| playlist.element() == &element) {
                    Some(playlist) => playlist.on_ended(self.player.as_mut()).into(),
                    None => Dispatch::default(),
                }
            }
            HostEvent::PopupTrigger { form, fallback_url } => {
                let state = self.monitor.state();
                let outcome = match self.popup.as_mut() {
                    Some(service) => {
                        popup::launch(Some(service.as_mut()), &form, &fallback_url, &state)
                    }
                    None => popup::launch(None, &form, &fallback_url, &state),
                };
                match outcome {
                    PopupOutcome::Opened => Dispatch {
                        intents: Vec::new(),
                        prevent_default: true,
                    },
                    PopupOutcome::Fallback(intent) => vec![intent].into(),
                }
            }
        }
    }

    /// Runs one frame callback. Handles cancelled earlier produce nothing.
    pub fn run_frame(
        &mut self,
        handle: FrameHandle,
        time_ms: f64,
        scroll_y: f64,
    ) -> Vec<PresentationIntent> {
        if self.animator.owns_frame(handle) {
            self.animator.on_frame(handle, time_ms, scroll_y, &mut self.frames)
        } else if self.overlay.owns_frame(handle) {
            self.overlay.on_frame(handle)
        } else {
            Vec::new()
        }
    }

    /// Closes overlays, stops the frame loop and drops subscribers. Every
    /// frame request is cancelled before this returns.
    pub fn teardown(&mut self) -> Vec<PresentationIntent> {
        let mut intents = self.overlay.close_all(&mut self.frames);
        intents.extend(self.animator.teardown(&mut self.frames));
        self.resize.cancel();
        self.monitor.clear();
        tracing::info!("interaction context torn down");
        intents
    }

    fn resized(&mut self) -> Vec<PresentationIntent> {
        let previous = self.monitor.state();
        self.monitor.refresh_width(self.viewport_width);
        let mut intents = self.breakpoints_changed(previous);
        for carousel in &self.carousels {
            intents.extend(carousel.layout());
        }
        intents
    }

    fn breakpoints_changed(&mut self, previous: BreakpointState) -> Vec<PresentationIntent> {
        let state = self.monitor.state();
        if state == previous {
            return Vec::new();
        }
        self.animator.apply_breakpoints(&state, &mut self.frames)
    }

    fn with_carousel(
        &mut self,
        id: &str,
        action: impl FnOnce(&mut CarouselInstance, &BreakpointState) -> CarouselOutcome,
    ) -> Dispatch {
        let state = self.monitor.state();
        let Some(carousel) = self.carousels.iter_mut().find(|carousel| carousel.id() == id) else {
            let err = GalleryError::MissingHook(id.to_string());
            tracing::debug!(%err, "carousel event ignored");
            return Dispatch::default();
        };
        let outcome = action(carousel, &state);
        let mut intents = outcome.intents;
        if let Some(request) = outcome.open_preview {
            intents.extend(self.overlay.open_preview(request, &self.resolver, &mut self.frames));
        }
        Dispatch {
            intents,
            prevent_default: outcome.prevent_default,
        }
    }
}

impl InteractionContext<ManualFrameScheduler> {
    /// Fires every pending frame callback of the manual scheduler.
    pub fn run_due_frames(&mut self, time_ms: f64, scroll_y: f64) -> Vec<PresentationIntent> {
        let due = self.frames.take_due();
        due.into_iter()
            .flat_map(|handle| self.run_frame(handle, time_ms, scroll_y))
            .collect()
    }
}

impl<F> std::fmt::Debug for InteractionContext<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionContext")
            .field("breakpoints", &self.monitor.state())
            .field("carousels", &self.carousels.len())
            .field("overlay", &self.overlay)
            .field("animator", &self.animator)
            .finish()
    }
}
