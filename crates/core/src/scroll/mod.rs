//! Scroll-driven parallax on a single coalesced frame loop.
//!
//! At most one frame request is outstanding at any time. When motion is not
//! allowed the animator is fully static: layers sit at the identity transform,
//! scroll events return immediately and no frame is pending. When a scroll
//! virtualization layer is configured, its per-frame update runs on the same
//! loop and the loop re-arms itself every frame until motion is disabled.

use crate::{
    breakpoint::BreakpointState,
    markup::{self, ElementAttributes, ElementId},
    render::PresentationIntent,
    timeline::{FrameHandle, FrameScheduler},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    pub element: ElementId,
    pub factor: f64,
}

impl ParallaxLayer {
    /// Reads `data-parallax` / `data-depth`. Malformed factors skip the layer.
    pub fn from_markup(element: &ElementAttributes) -> Option<Self> {
        match markup::parallax_factor(element) {
            Ok(Some(factor)) => Some(Self {
                element: element.id.clone(),
                factor,
            }),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(%err, element = %element.id, "parallax layer skipped");
                None
            }
        }
    }
}

/// Library-driven smooth scrolling that replaces native scroll delegation.
pub trait ScrollVirtualizer {
    /// Current (eased) scroll offset.
    fn scroll_y(&self) -> f64;

    fn scroll_to(&mut self, y: f64);

    /// Per-frame update, driven from the animator's frame loop.
    fn raf(&mut self, time_ms: f64);

    fn destroy(&mut self);
}

/// Builds a fresh virtualization layer each time motion becomes allowed.
pub type VirtualizerFactory = Box<dyn FnMut() -> Box<dyn ScrollVirtualizer>>;

/// Linear-interpolation easing toward the requested offset.
#[derive(Debug, Clone)]
pub struct LerpVirtualizer {
    current: f64,
    target: f64,
    lerp: f64,
    destroyed: bool,
}

impl LerpVirtualizer {
    pub fn new(start: f64, lerp: f64) -> Self {
        Self {
            current: start,
            target: start,
            lerp: lerp.clamp(0.01, 1.0),
            destroyed: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl ScrollVirtualizer for LerpVirtualizer {
    fn scroll_y(&self) -> f64 {
        self.current
    }

    fn scroll_to(&mut self, y: f64) {
        self.target = y.max(0.0);
    }

    fn raf(&mut self, _time_ms: f64) {
        if self.destroyed {
            return;
        }
        let delta = self.target - self.current;
        self.current = if delta.abs() < 0.5 {
            self.target
        } else {
            self.current + delta * self.lerp
        };
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// How scroll position is currently obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionMode {
    /// Reduced motion or narrow viewport: no listener, identity transforms.
    Static,
    /// Native scroll position, one frame per burst of scroll events.
    Native,
    /// Virtualized scroll position on a continuously re-armed frame loop.
    Virtualized,
}

pub struct ParallaxAnimator {
    layers: Vec<ParallaxLayer>,
    mode: Option<MotionMode>,
    pending_frame: Option<FrameHandle>,
    factory: Option<VirtualizerFactory>,
    virtualizer: Option<Box<dyn ScrollVirtualizer>>,
    last_offset: Option<f64>,
}

impl ParallaxAnimator {
    pub fn new(layers: Vec<ParallaxLayer>) -> Self {
        Self {
            layers,
            mode: None,
            pending_frame: None,
            factory: None,
            virtualizer: None,
            last_offset: None,
        }
    }

    pub fn with_virtualizer(mut self, factory: VirtualizerFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn mode(&self) -> MotionMode {
        self.mode.unwrap_or(MotionMode::Static)
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn owns_frame(&self, handle: FrameHandle) -> bool {
        self.pending_frame == Some(handle)
    }

    pub fn is_virtualized(&self) -> bool {
        self.virtualizer.is_some()
    }

    /// Switches mode for the given breakpoint state. Leaving a moving mode
    /// cancels the pending frame and destroys the virtualization layer before
    /// returning.
    pub fn apply_breakpoints(
        &mut self,
        state: &BreakpointState,
        frames: &mut dyn FrameScheduler,
    ) -> Vec<PresentationIntent> {
        let target = if !state.motion_allowed() {
            MotionMode::Static
        } else if self.factory.is_some() {
            MotionMode::Virtualized
        } else {
            MotionMode::Native
        };
        if self.mode == Some(target) {
            return Vec::new();
        }
        tracing::info!(from = ?self.mode, to = ?target, "parallax motion mode changed");

        self.stop(frames);
        self.mode = Some(target);
        match target {
            MotionMode::Static => self.identity(),
            MotionMode::Native => {
                self.request(frames);
                Vec::new()
            }
            MotionMode::Virtualized => {
                if let Some(factory) = self.factory.as_mut() {
                    self.virtualizer = Some(factory());
                }
                self.request(frames);
                Vec::new()
            }
        }
    }

    /// Native scroll notification. Coalesced into the next frame; a no-op
    /// while static.
    pub fn on_scroll(&mut self, frames: &mut dyn FrameScheduler) {
        if self.mode() == MotionMode::Static {
            return;
        }
        self.request(frames);
    }

    /// Frame callback. Stale or foreign handles are ignored.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        time_ms: f64,
        native_scroll_y: f64,
        frames: &mut dyn FrameScheduler,
    ) -> Vec<PresentationIntent> {
        if self.pending_frame != Some(handle) {
            return Vec::new();
        }
        self.pending_frame = None;

        let offset = match (self.mode(), self.virtualizer.as_mut()) {
            (MotionMode::Static, _) => return Vec::new(),
            (MotionMode::Virtualized, Some(virtualizer)) => {
                virtualizer.raf(time_ms);
                let offset = virtualizer.scroll_y();
                self.request(frames);
                offset
            }
            _ => native_scroll_y,
        };
        self.transforms(offset)
    }

    /// Current scroll offset, through the virtualization layer when active.
    pub fn scroll_position(&self, native_scroll_y: f64) -> f64 {
        self.virtualizer
            .as_ref()
            .map(|virtualizer| virtualizer.scroll_y())
            .unwrap_or(native_scroll_y)
    }

    /// Scroll request (anchor links). Routed through the virtualization layer
    /// when active, otherwise handed to the host; smooth only while motion is
    /// allowed.
    pub fn scroll_to(&mut self, y: f64) -> Option<PresentationIntent> {
        match self.virtualizer.as_mut() {
            Some(virtualizer) => {
                virtualizer.scroll_to(y);
                None
            }
            None => Some(PresentationIntent::ScrollTo {
                y,
                smooth: self.mode() != MotionMode::Static,
            }),
        }
    }

    /// Cancels everything and returns layers to the identity transform.
    pub fn teardown(&mut self, frames: &mut dyn FrameScheduler) -> Vec<PresentationIntent> {
        self.stop(frames);
        self.mode = Some(MotionMode::Static);
        self.identity()
    }

    fn request(&mut self, frames: &mut dyn FrameScheduler) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(frames.request_frame());
        }
    }

    fn stop(&mut self, frames: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending_frame.take() {
            frames.cancel_frame(handle);
        }
        if let Some(mut virtualizer) = self.virtualizer.take() {
            virtualizer.destroy();
        }
        self.last_offset = None;
    }

    fn transforms(&mut self, offset: f64) -> Vec<PresentationIntent> {
        if self.last_offset == Some(offset) {
            return Vec::new();
        }
        self.last_offset = Some(offset);
        self.layers
            .iter()
            .map(|layer| PresentationIntent::LayerTransform {
                element: layer.element.clone(),
                translate_y: Some(offset * layer.factor),
            })
            .collect()
    }

    fn identity(&self) -> Vec<PresentationIntent> {
        self.layers
            .iter()
            .map(|layer| PresentationIntent::LayerTransform {
                element: layer.element.clone(),
                translate_y: None,
            })
            .collect()
    }
}

impl std::fmt::Debug for ParallaxAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallaxAnimator")
            .field("layers", &self.layers)
            .field("mode", &self.mode)
            .field("pending_frame", &self.pending_frame)
            .field("virtualized", &self.virtualizer.is_some())
            .finish()
    }
}
