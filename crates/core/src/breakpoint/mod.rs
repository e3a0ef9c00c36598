//! Viewport class and motion preference tracking.
//!
//! The monitor prefers host media-query notifications. Hosts without media
//! query support report [`GalleryError::UnsupportedCapability`]; the monitor
//! then degrades to comparing the viewport width whenever [`refresh`] is
//! called and assumes motion is allowed.
//!
//! [`refresh`]: BreakpointMonitor::refresh

use serde::{Deserialize, Serialize};

use crate::{config::BreakpointConfig, GalleryError, Result};

/// Process-wide breakpoint flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakpointState {
    pub is_mobile: bool,
    pub avoid_parallax: bool,
    pub prefers_reduced_motion: bool,
}

impl BreakpointState {
    /// Whether scroll-driven motion may run at all.
    pub fn motion_allowed(&self) -> bool {
        !self.prefers_reduced_motion && !self.avoid_parallax
    }
}

/// A media feature the monitor follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaFeature {
    MaxWidth(f64),
    PrefersReducedMotion,
}

impl MediaFeature {
    /// CSS media query text for the feature.
    pub fn query(&self) -> String {
        match self {
            MediaFeature::MaxWidth(width) => format!("(max-width: {width}px)"),
            MediaFeature::PrefersReducedMotion => "(prefers-reduced-motion: reduce)".to_string(),
        }
    }
}

/// Which tracked flag a feature drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedFeature {
    Mobile,
    AvoidParallax,
    ReducedMotion,
}

/// Host capability used to evaluate media features.
pub trait MediaQueryHost {
    /// Evaluates a media feature, or reports that queries are unsupported.
    fn matches(&self, feature: &MediaFeature) -> Result<bool>;

    /// Current layout viewport width in CSS px.
    fn viewport_width(&self) -> f64;
}

/// Static host double. A `None` motion preference behaves like a host
/// without media-query support.
#[derive(Debug, Clone, Default)]
pub struct StaticMediaHost {
    pub width: f64,
    pub reduced_motion: Option<bool>,
}

impl StaticMediaHost {
    pub fn new(width: f64, reduced_motion: bool) -> Self {
        Self {
            width,
            reduced_motion: Some(reduced_motion),
        }
    }

    /// A host with no media-query support at all.
    pub fn without_queries(width: f64) -> Self {
        Self {
            width,
            reduced_motion: None,
        }
    }
}

impl MediaQueryHost for StaticMediaHost {
    fn matches(&self, feature: &MediaFeature) -> Result<bool> {
        let reduced = self.reduced_motion.ok_or(GalleryError::UnsupportedCapability)?;
        Ok(match feature {
            MediaFeature::MaxWidth(max) => self.width <= *max,
            MediaFeature::PrefersReducedMotion => reduced,
        })
    }

    fn viewport_width(&self) -> f64 {
        self.width
    }
}

/// Identifier returned by [`BreakpointMonitor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&BreakpointState)>;

/// Tracks [`BreakpointState`] and fans changes out to subscribers.
pub struct BreakpointMonitor {
    config: BreakpointConfig,
    state: BreakpointState,
    queries_supported: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl BreakpointMonitor {
    pub fn new(config: BreakpointConfig) -> Self {
        Self {
            config,
            state: BreakpointState::default(),
            queries_supported: true,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Evaluates every tracked feature against the host. Never fails.
    pub fn evaluate(&mut self, host: &dyn MediaQueryHost) -> BreakpointState {
        let next = match self.query_state(host) {
            Ok(state) => {
                self.queries_supported = true;
                state
            }
            Err(err) => {
                if self.queries_supported {
                    tracing::warn!(%err, "falling back to viewport width comparison");
                }
                self.queries_supported = false;
                self.width_state(host.viewport_width())
            }
        };
        self.commit(next);
        self.state
    }

    /// On-demand re-evaluation. With media queries available this is the same
    /// as [`evaluate`](Self::evaluate); without them it is the width fallback.
    pub fn refresh(&mut self, host: &dyn MediaQueryHost) -> BreakpointState {
        if self.queries_supported {
            self.evaluate(host)
        } else {
            self.refresh_width(host.viewport_width())
        }
    }

    /// Width fallback after a resize. Ignored while media queries drive the
    /// state, since the host notifies those changes itself.
    pub fn refresh_width(&mut self, width: f64) -> BreakpointState {
        if !self.queries_supported {
            let next = self.width_state(width);
            self.commit(next);
        }
        self.state
    }

    /// Applies a media-query change notification from the host.
    pub fn media_changed(&mut self, feature: TrackedFeature, matches: bool) -> BreakpointState {
        let mut next = self.state;
        match feature {
            TrackedFeature::Mobile => next.is_mobile = matches,
            TrackedFeature::AvoidParallax => next.avoid_parallax = matches,
            TrackedFeature::ReducedMotion => next.prefers_reduced_motion = matches,
        }
        self.commit(next);
        self.state
    }

    /// Registers a listener invoked after every change, in registration order.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&BreakpointState) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    pub fn state(&self) -> BreakpointState {
        self.state
    }

    pub fn queries_supported(&self) -> bool {
        self.queries_supported
    }

    /// Features the host should deliver change notifications for.
    pub fn tracked_features(&self) -> [(TrackedFeature, MediaFeature); 3] {
        [
            (
                TrackedFeature::Mobile,
                MediaFeature::MaxWidth(self.config.mobile_max_width),
            ),
            (
                TrackedFeature::AvoidParallax,
                MediaFeature::MaxWidth(self.config.parallax_max_width),
            ),
            (
                TrackedFeature::ReducedMotion,
                MediaFeature::PrefersReducedMotion,
            ),
        ]
    }

    /// Drops every subscriber.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    fn query_state(&self, host: &dyn MediaQueryHost) -> Result<BreakpointState> {
        let [mobile, parallax, motion] = self.tracked_features();
        Ok(BreakpointState {
            is_mobile: host.matches(&mobile.1)?,
            avoid_parallax: host.matches(&parallax.1)?,
            prefers_reduced_motion: host.matches(&motion.1)?,
        })
    }

    fn width_state(&self, width: f64) -> BreakpointState {
        BreakpointState {
            is_mobile: width <= self.config.mobile_max_width,
            avoid_parallax: width <= self.config.parallax_max_width,
            prefers_reduced_motion: false,
        }
    }

    fn commit(&mut self, next: BreakpointState) {
        if next == self.state {
            return;
        }
        tracing::debug!(?next, previous = ?self.state, "breakpoint state changed");
        self.state = next;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}

impl std::fmt::Debug for BreakpointMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakpointMonitor")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("queries_supported", &self.queries_supported)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn monitor() -> BreakpointMonitor {
        BreakpointMonitor::new(BreakpointConfig::default())
    }

    #[test]
    fn evaluates_media_queries() {
        let mut monitor = monitor();
        let state = monitor.evaluate(&StaticMediaHost::new(375.0, true));

        assert!(state.is_mobile);
        assert!(state.avoid_parallax);
        assert!(state.prefers_reduced_motion);
        assert!(monitor.queries_supported());
    }

    #[test]
    fn notifies_subscribers_in_registration_order() {
        let mut monitor = monitor();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let first = calls.clone();
        monitor.subscribe(move |_| first.borrow_mut().push("first"));
        let second = calls.clone();
        monitor.subscribe(move |_| second.borrow_mut().push("second"));

        monitor.media_changed(TrackedFeature::ReducedMotion, true);
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let mut monitor = monitor();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        monitor.subscribe(move |_| *counter.borrow_mut() += 1);

        monitor.media_changed(TrackedFeature::Mobile, false);
        assert_eq!(*count.borrow(), 0);

        monitor.media_changed(TrackedFeature::Mobile, true);
        monitor.media_changed(TrackedFeature::Mobile, true);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribed_listeners_are_skipped() {
        let mut monitor = monitor();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let id = monitor.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(monitor.unsubscribe(id));
        assert!(!monitor.unsubscribe(id));
        monitor.media_changed(TrackedFeature::Mobile, true);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn degrades_to_width_comparison_without_queries() {
        let mut monitor = monitor();
        let state = monitor.evaluate(&StaticMediaHost::without_queries(900.0));

        assert!(!monitor.queries_supported());
        assert!(!state.is_mobile);
        assert!(state.avoid_parallax);
        assert!(!state.prefers_reduced_motion);

        let state = monitor.refresh(&StaticMediaHost::without_queries(1440.0));
        assert!(!state.avoid_parallax);
        assert!(state.motion_allowed());
    }
}
