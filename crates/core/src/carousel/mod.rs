//! Card carousel state machine.
//!
//! The active index always wraps, and every transition re-derives the whole
//! fan-out layout so the host only ever applies absolute state.

use serde::{Deserialize, Serialize};

use crate::{
    breakpoint::BreakpointState,
    config::{AppConfig, CarouselConfig, GestureConfig},
    gesture::{GestureEffect, GestureEvent, GestureRecognizer},
    markup::{self, ElementAttributes, ElementId},
    overlay::PreviewRequest,
    render::{CardTransform, PresentationIntent},
    GalleryError, Result,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    pub index: usize,
    pub full_src: String,
    pub alt: String,
    pub element: ElementId,
}

/// Derived presentation of one card relative to the active card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    /// Raw signed distance from the active card.
    pub offset: i64,
    pub clamped: i64,
    pub transform: CardTransform,
    pub hidden: bool,
    pub active: bool,
}

/// Previous / next controls next to a carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavControl {
    Prev,
    Next,
}

/// What a carousel interaction asks of the rest of the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselOutcome {
    pub intents: Vec<PresentationIntent>,
    pub open_preview: Option<PreviewRequest>,
    /// The host should call `preventDefault` on the triggering event.
    pub prevent_default: bool,
}

impl CarouselOutcome {
    fn intents(intents: Vec<PresentationIntent>) -> Self {
        Self {
            intents,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CarouselInstance {
    id: String,
    cards: Vec<CardRecord>,
    active_index: usize,
    direction: i64,
    nav_inverted: bool,
    geometry: CarouselConfig,
    focused: Option<usize>,
    gesture: GestureRecognizer,
}

impl CarouselInstance {
    pub fn new(
        id: impl Into<String>,
        cards: Vec<CardRecord>,
        direction: i64,
        nav_inverted: bool,
        geometry: CarouselConfig,
        gesture: GestureConfig,
    ) -> Result<Self> {
        let id = id.into();
        if cards.is_empty() {
            return Err(GalleryError::EmptyCarousel(id));
        }
        Ok(Self {
            id,
            cards,
            active_index: 0,
            direction: if direction < 0 { -1 } else { 1 },
            nav_inverted,
            geometry: CarouselConfig {
                max_fan_out: geometry.max_fan_out.max(0),
                ..geometry
            },
            focused: None,
            gesture: GestureRecognizer::new(gesture),
        })
    }

    /// Builds a carousel from a `data-carousel` container and its cards.
    /// Cards without any usable source are skipped.
    pub fn from_markup(
        container: &ElementAttributes,
        cards: &[ElementAttributes],
        config: &AppConfig,
    ) -> Result<Self> {
        let id = container
            .value("data-carousel")
            .unwrap_or_else(|| container.id.as_str())
            .to_string();
        let records = cards
            .iter()
            .filter_map(|card| {
                let src = markup::full_source(card);
                if src.is_none() {
                    tracing::debug!(card = %card.id, carousel = %id, "card without source skipped");
                }
                src.map(|src| (card, src.to_string()))
            })
            .enumerate()
            .map(|(index, (card, full_src))| CardRecord {
                index,
                full_src,
                alt: card.get("alt").unwrap_or_default().to_string(),
                element: card.id.clone(),
            })
            .collect();

        Self::new(
            id,
            records,
            markup::direction_multiplier(container),
            markup::nav_inverted(container),
            config.carousel,
            config.gesture,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always `false`; construction rejects empty carousels.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn direction(&self) -> i64 {
        self.direction
    }

    pub fn nav_inverted(&self) -> bool {
        self.nav_inverted
    }

    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn gesture(&self) -> &GestureRecognizer {
        &self.gesture
    }

    /// Steps the active card by `delta`, wrapping in both directions.
    pub fn navigate(&mut self, delta: i64) -> Vec<PresentationIntent> {
        let len = self.cards.len() as i64;
        let step = delta.rem_euclid(len);
        let next = ((self.active_index as i64 + step) % len) as usize;
        self.activate(next)
    }

    /// Makes `index` the active card and re-derives the layout.
    pub fn activate(&mut self, index: usize) -> Vec<PresentationIntent> {
        let index = index.min(self.cards.len() - 1);
        let mut intents = Vec::new();
        if let Some(focused) = self.focused {
            if focused != index {
                self.focused = None;
                intents.push(PresentationIntent::ClearFocus {
                    element: self.cards[focused].element.clone(),
                });
            }
        }
        self.active_index = index;
        intents.extend(self.layout());
        intents
    }

    pub fn card_layout(&self, index: usize) -> CardLayout {
        let offset = index as i64 - self.active_index as i64;
        let max = self.geometry.max_fan_out;
        let clamped = offset.clamp(-max, max);
        let direction = self.direction as f64;
        CardLayout {
            offset,
            clamped,
            transform: CardTransform {
                translate_x: clamped as f64 * self.geometry.unit_x * direction,
                rotate_deg: clamped as f64 * self.geometry.unit_r * direction,
                lift_y: clamped.abs() as f64 * self.geometry.unit_y,
            },
            hidden: offset.abs() > max,
            active: offset == 0,
        }
    }

    /// Absolute layout intents for every card.
    pub fn layout(&self) -> Vec<PresentationIntent> {
        self.cards
            .iter()
            .map(|card| {
                let layout = self.card_layout(card.index);
                PresentationIntent::CardLayout {
                    carousel: self.id.clone(),
                    card: card.index,
                    element: card.element.clone(),
                    transform: layout.transform,
                    active: layout.active,
                    hidden: layout.hidden,
                    focusable: layout.active,
                }
            })
            .collect()
    }

    /// Records host focus. Only the active card accepts it.
    pub fn focus(&mut self, index: usize) -> bool {
        if index == self.active_index {
            self.focused = Some(index);
            true
        } else {
            false
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn step(&mut self, control: NavControl) -> Vec<PresentationIntent> {
        let delta = match control {
            NavControl::Next => 1,
            NavControl::Prev => -1,
        };
        let delta = if self.nav_inverted { -delta } else { delta };
        self.navigate(delta)
    }

    pub fn handle_gesture(&mut self, event: GestureEvent) -> CarouselOutcome {
        let mut outcome = CarouselOutcome::default();
        for effect in self.gesture.handle(event, self.direction) {
            match effect {
                GestureEffect::Navigate(delta) => outcome.intents.extend(self.navigate(delta)),
                GestureEffect::SuppressNativeScroll => outcome.prevent_default = true,
            }
        }
        outcome
    }

    /// Click on a card. Hidden cards are inert; a visible card becomes active
    /// and, outside the mobile breakpoint, is previewed at full resolution.
    pub fn click(&mut self, index: usize, breakpoint: &BreakpointState) -> CarouselOutcome {
        if index >= self.cards.len() || self.card_layout(index).hidden {
            return CarouselOutcome::default();
        }

        let mut outcome = if index == self.active_index {
            CarouselOutcome::default()
        } else {
            CarouselOutcome::intents(self.activate(index))
        };

        if !breakpoint.is_mobile {
            let card = &self.cards[index];
            outcome.open_preview = Some(PreviewRequest {
                src: card.full_src.clone(),
                alt: card.alt.clone(),
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(count: usize) -> Vec<CardRecord> {
        (0..count)
            .map(|index| CardRecord {
                index,
                full_src: format!("images/full/{index}.jpg"),
                alt: format!("card {index}"),
                element: ElementId::new(format!("card-{index}")),
            })
            .collect()
    }

    fn carousel(count: usize, direction: i64) -> CarouselInstance {
        CarouselInstance::new(
            "featured",
            cards(count),
            direction,
            false,
            CarouselConfig::default(),
            GestureConfig::default(),
        )
        .expect("carousel should build")
    }

    fn desktop() -> BreakpointState {
        BreakpointState::default()
    }

    #[test]
    fn rejects_empty_carousels() {
        let err = CarouselInstance::new(
            "empty",
            Vec::new(),
            1,
            false,
            CarouselConfig::default(),
            GestureConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GalleryError::EmptyCarousel(id) if id == "empty"));
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut carousel = carousel(5, 1);
        carousel.navigate(-1);
        assert_eq!(carousel.active_index(), 4);
        carousel.navigate(1);
        assert_eq!(carousel.active_index(), 0);
        carousel.navigate(-12);
        assert_eq!(carousel.active_index(), 3);
    }

    #[test]
    fn extreme_deltas_wrap_without_overflow() {
        let mut carousel = carousel(5, 1);
        carousel.activate(1);
        carousel.navigate(i64::MAX);
        assert_eq!(carousel.active_index(), 3);

        carousel.activate(4);
        carousel.navigate(i64::MIN);
        assert_eq!(carousel.active_index(), 1);
    }

    #[test]
    fn layout_fans_out_and_hides_distant_cards() {
        let mut carousel = carousel(7, 1);
        carousel.activate(3);

        let left = carousel.card_layout(1);
        assert_eq!(left.offset, -2);
        assert_eq!(left.transform.translate_x, -112.0);
        assert_eq!(left.transform.rotate_deg, -12.0);
        assert_eq!(left.transform.lift_y, 28.0);
        assert!(!left.hidden);

        let far = carousel.card_layout(6);
        assert_eq!(far.offset, 3);
        assert_eq!(far.clamped, 2);
        assert!(far.hidden);

        assert!(carousel.card_layout(3).active);
    }

    #[test]
    fn offsets_are_raw_not_shortest_path() {
        let mut carousel = carousel(6, 1);
        carousel.activate(0);
        let last = carousel.card_layout(5);
        assert_eq!(last.offset, 5);
        assert!(last.hidden);
    }

    #[test]
    fn reversed_direction_mirrors_lateral_motion() {
        let mut carousel = carousel(5, -1);
        carousel.activate(2);
        let right = carousel.card_layout(3);
        assert_eq!(right.transform.translate_x, -56.0);
        assert_eq!(right.transform.rotate_deg, -6.0);
        assert_eq!(right.transform.lift_y, 14.0);
    }

    #[test]
    fn only_active_card_is_focusable() {
        let mut carousel = carousel(4, 1);
        assert!(!carousel.focus(2));
        assert!(carousel.focus(0));

        let intents = carousel.navigate(1);
        assert_eq!(
            intents.first(),
            Some(&PresentationIntent::ClearFocus {
                element: ElementId::new("card-0")
            })
        );
        assert_eq!(carousel.focused(), None);

        let focusable: Vec<usize> = intents
            .iter()
            .filter_map(|intent| match intent {
                PresentationIntent::CardLayout { card, focusable: true, .. } => Some(*card),
                _ => None,
            })
            .collect();
        assert_eq!(focusable, vec![1]);
    }

    #[test]
    fn clicking_a_side_card_activates_and_previews_on_desktop() {
        let mut carousel = carousel(5, 1);
        let outcome = carousel.click(1, &desktop());

        assert_eq!(carousel.active_index(), 1);
        assert_eq!(
            outcome.open_preview,
            Some(PreviewRequest {
                src: "images/full/1.jpg".to_string(),
                alt: "card 1".to_string(),
            })
        );
        assert!(!outcome.intents.is_empty());
    }

    #[test]
    fn clicking_the_active_card_previews_without_relayout() {
        let mut carousel = carousel(5, 1);
        carousel.activate(2);
        let outcome = carousel.click(2, &desktop());

        assert!(outcome.intents.is_empty());
        assert_eq!(
            outcome.open_preview,
            Some(PreviewRequest {
                src: "images/full/2.jpg".to_string(),
                alt: "card 2".to_string(),
            })
        );

        let mobile = BreakpointState {
            is_mobile: true,
            ..Default::default()
        };
        assert_eq!(carousel.click(2, &mobile), CarouselOutcome::default());
        assert_eq!(carousel.active_index(), 2);
    }

    #[test]
    fn clicking_on_mobile_only_activates() {
        let mut carousel = carousel(5, 1);
        let mobile = BreakpointState {
            is_mobile: true,
            ..Default::default()
        };
        let outcome = carousel.click(2, &mobile);

        assert_eq!(carousel.active_index(), 2);
        assert!(outcome.open_preview.is_none());
    }

    #[test]
    fn hidden_cards_ignore_clicks() {
        let mut carousel = carousel(6, 1);
        let outcome = carousel.click(4, &desktop());

        assert_eq!(outcome, CarouselOutcome::default());
        assert_eq!(carousel.active_index(), 0);
    }

    #[test]
    fn inverted_controls_step_backwards() {
        let mut carousel = CarouselInstance::new(
            "inverted",
            cards(3),
            1,
            true,
            CarouselConfig::default(),
            GestureConfig::default(),
        )
        .unwrap();
        carousel.step(NavControl::Next);
        assert_eq!(carousel.active_index(), 2);
        carousel.step(NavControl::Prev);
        assert_eq!(carousel.active_index(), 0);
    }

    #[test]
    fn swipes_drive_navigation() {
        let mut carousel = carousel(4, 1);
        carousel.handle_gesture(GestureEvent::Start { x: 300.0, y: 10.0 });
        let moved = carousel.handle_gesture(GestureEvent::Move { x: 250.0, y: 15.0 });
        assert!(moved.prevent_default);
        carousel.handle_gesture(GestureEvent::End { x: 250.0, y: 15.0 });
        assert_eq!(carousel.active_index(), 1);

        carousel.handle_gesture(GestureEvent::Start { x: 0.0, y: 0.0 });
        carousel.handle_gesture(GestureEvent::Move { x: -5.0, y: 40.0 });
        let outcome = carousel.handle_gesture(GestureEvent::End { x: -40.0, y: 40.0 });
        assert!(outcome.intents.is_empty());
        assert_eq!(carousel.active_index(), 1);
    }

    #[test]
    fn builds_from_markup() {
        let container = ElementAttributes::new("carousel-el")
            .with("data-carousel", "featured")
            .with("data-carousel-direction", "reverse");
        let cards = vec![
            ElementAttributes::new("a").with("data-full", "a.jpg").with("alt", "A"),
            ElementAttributes::new("b"),
            ElementAttributes::new("c").with("src", "c.jpg"),
        ];

        let carousel =
            CarouselInstance::from_markup(&container, &cards, &AppConfig::default()).unwrap();
        assert_eq!(carousel.id(), "featured");
        assert_eq!(carousel.direction(), -1);
        assert_eq!(carousel.len(), 2);
        assert_eq!(carousel.cards()[1].element, ElementId::new("c"));
        assert_eq!(carousel.cards()[1].index, 1);
    }
}
