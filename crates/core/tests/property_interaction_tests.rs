//! Property-based tests for the interaction state machines
//!
//! Random navigation, gesture and scroll sequences are driven through the
//! public API and checked against the invariants every host relies on.

use portfolio_gallery_core::{
    breakpoint::BreakpointState,
    carousel::CardRecord,
    config::{CarouselConfig, GestureConfig},
    normalize_path,
    overlay::{Key, OverlayHooks},
    scroll::ParallaxLayer,
    CarouselInstance, ElementId, GalleryCollection, GestureEvent, ManualFrameScheduler, MediaItem,
    OverlayKind, OverlayPresenter, ParallaxAnimator, PresentationIntent, ResponsiveImageResolver,
};
use proptest::prelude::*;

fn carousel(len: usize, direction: i64) -> CarouselInstance {
    let cards = (0..len)
        .map(|index| CardRecord {
            index,
            full_src: format!("images/full/{index}.jpg"),
            alt: String::new(),
            element: ElementId::new(format!("card-{index}")),
        })
        .collect();
    CarouselInstance::new(
        "prop",
        cards,
        direction,
        false,
        CarouselConfig::default(),
        GestureConfig::default(),
    )
    .expect("non-empty carousel")
}

fn gallery(len: usize) -> GalleryCollection {
    let items = (0..len)
        .map(|index| MediaItem::new(format!("g/{index}.jpg"), "", ""))
        .collect();
    GalleryCollection::new().with_category("prop", items)
}

#[derive(Debug, Clone)]
enum ScrollOp {
    Scroll,
    Frame(f64),
    Motion(bool),
}

fn scroll_op() -> impl Strategy<Value = ScrollOp> {
    prop_oneof![
        3 => Just(ScrollOp::Scroll),
        3 => (0.0f64..5000.0).prop_map(ScrollOp::Frame),
        1 => any::<bool>().prop_map(ScrollOp::Motion),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    /// Property: the active index stays in range and exactly one card is active
    #[test]
    fn prop_navigation_keeps_index_in_range(
        len in 1usize..12,
        deltas in prop::collection::vec(-20i64..20, 0..40),
    ) {
        let mut carousel = carousel(len, 1);
        for delta in deltas {
            carousel.navigate(delta);
            prop_assert!(carousel.active_index() < len);

            let active = (0..len).filter(|&index| carousel.card_layout(index).active).count();
            prop_assert_eq!(active, 1);
        }
    }

    /// Property: arbitrarily large steps still land on a valid card
    #[test]
    fn prop_extreme_deltas_stay_in_range(
        len in 1usize..12,
        start in 0usize..12,
        deltas in prop::collection::vec(any::<i64>(), 1..20),
    ) {
        let mut carousel = carousel(len, 1);
        carousel.activate(start % len);
        for delta in deltas {
            let expected = (carousel.active_index() as i128 + delta as i128)
                .rem_euclid(len as i128) as usize;
            carousel.navigate(delta);
            prop_assert_eq!(carousel.active_index(), expected);
        }
    }

    /// Property: stepping forward once per card returns to the starting card
    #[test]
    fn prop_full_cycle_returns_home(len in 1usize..12, start in 0usize..12) {
        let mut carousel = carousel(len, 1);
        carousel.activate(start % len);
        let home = carousel.active_index();
        for _ in 0..len {
            carousel.navigate(1);
        }
        prop_assert_eq!(carousel.active_index(), home);

        carousel.navigate(1);
        carousel.navigate(-1);
        prop_assert_eq!(carousel.active_index(), home);
    }

    /// Property: cards beyond the fan-out are hidden and clamped to its edge
    #[test]
    fn prop_fan_out_is_clamped(len in 1usize..12, active in 0usize..12, reverse in any::<bool>()) {
        let mut carousel = carousel(len, if reverse { -1 } else { 1 });
        carousel.activate(active % len);
        for index in 0..len {
            let layout = carousel.card_layout(index);
            prop_assert!(layout.clamped.abs() <= 2);
            prop_assert_eq!(layout.hidden, layout.offset.abs() > 2);
            prop_assert!(layout.transform.lift_y >= 0.0);
            prop_assert_eq!(layout.transform.lift_y, layout.clamped.abs() as f64 * 14.0);
        }
    }

    /// Property: a horizontal swipe past the threshold moves exactly one card
    #[test]
    fn prop_horizontal_swipes_move_one_card(
        len in 2usize..10,
        dx in prop_oneof![-400.0f64..-32.0, 32.0f64..400.0],
        dy in -5.0f64..5.0,
    ) {
        let mut carousel = carousel(len, 1);
        carousel.handle_gesture(GestureEvent::Start { x: 500.0, y: 300.0 });
        carousel.handle_gesture(GestureEvent::Move { x: 500.0 + dx, y: 300.0 + dy });
        carousel.handle_gesture(GestureEvent::End { x: 500.0 + dx, y: 300.0 + dy });

        let expected = if dx < 0.0 { 1 } else { len - 1 };
        prop_assert_eq!(carousel.active_index(), expected);
    }

    /// Property: short movements never navigate
    #[test]
    fn prop_short_swipes_are_ignored(dx in -31.0f64..31.0, dy in -31.0f64..31.0) {
        let mut carousel = carousel(5, 1);
        carousel.handle_gesture(GestureEvent::Start { x: 0.0, y: 0.0 });
        carousel.handle_gesture(GestureEvent::Move { x: dx, y: dy });
        let outcome = carousel.handle_gesture(GestureEvent::End { x: dx, y: dy });
        prop_assert!(outcome.intents.is_empty());
        prop_assert_eq!(carousel.active_index(), 0);
    }

    /// Property: gallery keyboard navigation stays inside the collection and
    /// the scroll lock follows the open state
    #[test]
    fn prop_gallery_keys_stay_in_bounds(
        len in 1usize..15,
        keys in prop::collection::vec(
            prop_oneof![
                4 => Just(Key::ArrowRight),
                4 => Just(Key::ArrowLeft),
                1 => Just(Key::Escape),
                1 => Just(Key::Other),
            ],
            0..50,
        ),
    ) {
        let collections = gallery(len);
        let resolver = ResponsiveImageResolver::new();
        let mut frames = ManualFrameScheduler::new();
        let mut overlay = OverlayPresenter::new(OverlayHooks::default());
        overlay.open_gallery("prop", &collections, &resolver, &mut frames);

        for key in keys {
            overlay.handle_key(&key, &collections, &resolver, &mut frames);
            let session = overlay.session(OverlayKind::Gallery);
            prop_assert!(session.index < len);
            prop_assert_eq!(overlay.scroll_lock().is_locked(), session.open);
        }
        prop_assert!(frames.pending() <= 1);
    }

    /// Property: the parallax loop never has more than one frame outstanding,
    /// and none while motion is disallowed
    #[test]
    fn prop_parallax_frames_are_coalesced(ops in prop::collection::vec(scroll_op(), 0..60)) {
        let mut frames = ManualFrameScheduler::new();
        let mut animator = ParallaxAnimator::new(vec![ParallaxLayer {
            element: ElementId::new("hero"),
            factor: 0.4,
        }]);
        let mut motion = true;
        animator.apply_breakpoints(&BreakpointState::default(), &mut frames);

        for op in ops {
            match op {
                ScrollOp::Scroll => animator.on_scroll(&mut frames),
                ScrollOp::Frame(scroll_y) => {
                    for handle in frames.take_due() {
                        let intents = animator.on_frame(handle, 0.0, scroll_y, &mut frames);
                        for intent in intents {
                            let is_moving = matches!(
                                intent,
                                PresentationIntent::LayerTransform { translate_y: Some(_), .. }
                            );
                            prop_assert!(is_moving && motion);
                        }
                    }
                }
                ScrollOp::Motion(allowed) => {
                    motion = allowed;
                    let state = BreakpointState {
                        prefers_reduced_motion: !allowed,
                        ..Default::default()
                    };
                    animator.apply_breakpoints(&state, &mut frames);
                }
            }
            prop_assert!(frames.pending() <= 1);
            if !motion {
                prop_assert_eq!(frames.pending(), 0);
            }
        }
    }

    /// Property: path normalization is idempotent and never keeps a relative prefix
    #[test]
    fn prop_normalize_path_is_idempotent(
        prefix in "(\\./|\\.\\./){0,4}",
        rest in "[a-z]{1,8}(/[a-z]{1,8}){0,3}\\.jpg",
    ) {
        let path = format!("{prefix}{rest}");
        let normalized = normalize_path(&path);
        prop_assert_eq!(normalized, rest.as_str());
        prop_assert_eq!(normalize_path(normalized), normalized);
    }
}
