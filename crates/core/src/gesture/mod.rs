//! Touch sequence interpretation with one-time axis locking.
//!
//! [`reduce`] is a pure function from the live [`SwipeGesture`] (if any) and a
//! [`GestureEvent`] to the next gesture and the effects to apply. The
//! [`GestureRecognizer`] wrapper holds the single live gesture of a carousel.

use serde::{Deserialize, Serialize};

use crate::config::GestureConfig;

/// Axis a touch sequence has been locked to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Touch input, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    Start { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    End { x: f64, y: f64 },
    Cancel,
}

/// Transient state for one touch sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeGesture {
    pub start_x: f64,
    pub start_y: f64,
    pub locked_axis: Axis,
    pub active: bool,
}

impl SwipeGesture {
    pub fn begin(x: f64, y: f64) -> Self {
        Self {
            start_x: x,
            start_y: y,
            locked_axis: Axis::None,
            active: true,
        }
    }
}

/// Effects produced by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    /// Step the carousel by this many cards.
    Navigate(i64),
    /// The host should prevent the browser's native scroll for this move.
    SuppressNativeScroll,
}

/// Pure gesture reducer.
///
/// A leftward swipe steps forward (+1) and a rightward swipe steps back
/// (-1); `direction` (+1 or -1) flips that for reversed carousels.
pub fn reduce(
    state: Option<SwipeGesture>,
    event: GestureEvent,
    config: &GestureConfig,
    direction: i64,
) -> (Option<SwipeGesture>, Vec<GestureEffect>) {
    match event {
        GestureEvent::Start { x, y } => (Some(SwipeGesture::begin(x, y)), Vec::new()),
        GestureEvent::Cancel => (None, Vec::new()),
        GestureEvent::Move { x, y } => {
            let Some(mut gesture) = state.filter(|gesture| gesture.active) else {
                return (None, Vec::new());
            };
            let dx = x - gesture.start_x;
            let dy = y - gesture.start_y;

            if gesture.locked_axis == Axis::None
                && (dx.abs() > config.lock_threshold || dy.abs() > config.lock_threshold)
            {
                gesture.locked_axis = if dy.abs() > dx.abs() * config.axis_ratio {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                };
            }

            let effects = if gesture.locked_axis == Axis::Horizontal {
                vec![GestureEffect::SuppressNativeScroll]
            } else {
                Vec::new()
            };
            (Some(gesture), effects)
        }
        GestureEvent::End { x, .. } => {
            let Some(gesture) = state.filter(|gesture| gesture.active) else {
                return (None, Vec::new());
            };
            let dx = x - gesture.start_x;
            if gesture.locked_axis != Axis::Horizontal || dx.abs() < config.swipe_threshold {
                return (None, Vec::new());
            }
            let step = if dx < 0.0 { 1 } else { -1 };
            (None, vec![GestureEffect::Navigate(step * direction)])
        }
    }
}

/// Holds the single live gesture of one carousel.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    current: Option<SwipeGesture>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn handle(&mut self, event: GestureEvent, direction: i64) -> Vec<GestureEffect> {
        let (next, effects) = reduce(self.current, event, &self.config, direction);
        self.current = next;
        effects
    }

    pub fn current(&self) -> Option<&SwipeGesture> {
        self.current.as_ref()
    }

    pub fn locked_axis(&self) -> Axis {
        self.current
            .map(|gesture| gesture.locked_axis)
            .unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
