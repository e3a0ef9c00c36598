//! Declarative presentation intents and the adapter seam that applies them.
//!
//! Components never touch the document. They return [`PresentationIntent`]s
//! and a thin [`RenderAdapter`] owned by the host turns those into class,
//! style and attribute changes.

use serde::Serialize;

use crate::{markup::ElementId, overlay::OverlayKind};

/// Transform applied to a carousel card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CardTransform {
    pub translate_x: f64,
    pub rotate_deg: f64,
    pub lift_y: f64,
}

impl CardTransform {
    pub fn css(&self) -> String {
        format!(
            "translate3d({}px, {}px, 0) rotate({}deg)",
            self.translate_x,
            0.0 - self.lift_y,
            self.rotate_deg
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum PresentationIntent {
    CardLayout {
        carousel: String,
        card: usize,
        element: ElementId,
        transform: CardTransform,
        active: bool,
        /// Zero opacity and non-interactive.
        hidden: bool,
        focusable: bool,
    },
    ClearFocus {
        element: ElementId,
    },
    ShowOverlay {
        kind: OverlayKind,
    },
    HideOverlay {
        kind: OverlayKind,
    },
    /// Adds the fade-in class one frame after an overlay is shown.
    RevealOverlay {
        kind: OverlayKind,
    },
    SetOverlayImage {
        kind: OverlayKind,
        src: String,
        srcset: Option<String>,
        sizes: Option<String>,
        alt: String,
    },
    SetOverlayText {
        kind: OverlayKind,
        label: String,
        indicator: String,
    },
    /// Page-wide `overflow: hidden` toggle.
    ScrollLock {
        locked: bool,
    },
    /// `None` resets the layer to the identity transform.
    LayerTransform {
        element: ElementId,
        translate_y: Option<f64>,
    },
    FilterButton {
        element: ElementId,
        pressed: bool,
    },
    ItemVisibility {
        element: ElementId,
        visible: bool,
    },
    RevealSection {
        element: ElementId,
    },
    ScrollTo {
        y: f64,
        smooth: bool,
    },
    SetMediaSource {
        element: ElementId,
        src: String,
    },
    NavigateTo {
        url: String,
    },
}

impl PresentationIntent {
    /// CSS transform text for layer intents.
    pub fn layer_css(translate_y: Option<f64>) -> String {
        match translate_y {
            Some(y) => format!("translate3d(0, {y}px, 0)"),
            None => "none".to_string(),
        }
    }
}

/// Host side applier of presentation intents.
pub trait RenderAdapter {
    fn apply(&mut self, intent: &PresentationIntent);

    fn apply_all(&mut self, intents: &[PresentationIntent]) {
        for intent in intents {
            self.apply(intent);
        }
    }
}

/// Adapter that records every intent it is asked to apply.
#[derive(Debug, Default, Clone)]
pub struct IntentLog {
    applied: Vec<PresentationIntent>,
}

impl IntentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> &[PresentationIntent] {
        &self.applied
    }

    pub fn clear(&mut self) {
        self.applied.clear();
    }

    pub fn take(&mut self) -> Vec<PresentationIntent> {
        std::mem::take(&mut self.applied)
    }

    /// Most recent transform applied to a parallax layer.
    pub fn last_layer_transform(&self, element: &ElementId) -> Option<Option<f64>> {
        self.applied.iter().rev().find_map(|intent| match intent {
            PresentationIntent::LayerTransform {
                element: target,
                translate_y,
            } if target == element => Some(*translate_y),
            _ => None,
        })
    }

    /// Whether the page is scroll locked according to the applied intents.
    pub fn scroll_locked(&self) -> bool {
        self.applied
            .iter()
            .rev()
            .find_map(|intent| match intent {
                PresentationIntent::ScrollLock { locked } => Some(*locked),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl RenderAdapter for IntentLog {
    fn apply(&mut self, intent: &PresentationIntent) {
        self.applied.push(intent.clone());
    }
}

/// Adapter that writes every intent to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    applied: usize,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl RenderAdapter for TracingRenderer {
    fn apply(&mut self, intent: &PresentationIntent) {
        self.applied += 1;
        tracing::info!(?intent, "apply");
    }
}
