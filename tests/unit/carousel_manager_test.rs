use std::rc::Rc;

use frameshell::app::shell_queue;
use frameshell::managers::carousel_manager::{CarouselLayout, CarouselManager, EntryTarget};
use frameshell::managers::frame_manager::{FrameManager, FrameManagerTrait};
use frameshell::services::event_bus::EventBus;
use frameshell::services::renderer::HeadlessRenderer;
use frameshell::types::command::ImageBlob;
use frameshell::types::frame::{FrameConfig, FrameId, FrameKind};
use frameshell::types::settings::CarouselSettings;

struct Fixture {
    store: FrameManager,
    renderer: HeadlessRenderer,
    carousel: CarouselManager,
    a: FrameId,
    b: FrameId,
    c: FrameId,
}

fn fixture(desktop_mode: bool) -> Fixture {
    let bus = EventBus::new();
    let (tx, _rx) = shell_queue();
    std::mem::forget(_rx);
    let mut store = FrameManager::new(Rc::clone(&bus), "shell://".to_string(), true);
    let mut renderer = HeadlessRenderer::manual_capture(tx);

    let home = store
        .create(
            "shell://homescreen",
            FrameConfig {
                kind: FrameKind::Homescreen,
                ..FrameConfig::default()
            },
            &mut renderer,
        )
        .unwrap();
    store.activate(home, &mut renderer);
    let a = store
        .create("https://a.example", FrameConfig::default(), &mut renderer)
        .unwrap();
    let b = store
        .create("https://b.example", FrameConfig::default(), &mut renderer)
        .unwrap();
    let c = store
        .create("https://c.example", FrameConfig::default(), &mut renderer)
        .unwrap();

    Fixture {
        store,
        renderer,
        carousel: CarouselManager::new(&CarouselSettings::default(), desktop_mode),
        a,
        b,
        c,
    }
}

fn blob() -> Option<ImageBlob> {
    Some(ImageBlob { data: vec![1, 2, 3] })
}

#[test]
fn test_snapshot_has_frame_entries_plus_new_frame() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);

    // Three frames plus the synthetic new-frame entry.
    assert_eq!(fx.carousel.entries().len(), 4);
    assert_eq!(
        fx.carousel.entries().last().unwrap().target,
        EntryTarget::NewFrame
    );
    assert!(fx
        .carousel
        .entries()
        .iter()
        .take(3)
        .all(|e| matches!(e.target, EntryTarget::Frame(_))));
}

#[test]
fn test_reveal_waits_for_all_captures() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    assert!(fx.carousel.is_engaged());
    assert!(!fx.carousel.is_revealed());

    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    assert!(!fx.carousel.is_revealed());

    fx.carousel.on_screenshot(fx.c, 1, blob());
    assert!(fx.carousel.is_revealed());
    assert_eq!(fx.carousel.ledger().live_count(), 3);
}

#[test]
fn test_capture_failure_degrades_to_placeholder() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, None);
    fx.carousel.on_screenshot(fx.c, 1, blob());

    // Failed capture still reveals, with a placeholder entry.
    assert!(fx.carousel.is_revealed());
    let entry = fx
        .carousel
        .entries()
        .iter()
        .find(|e| e.target == EntryTarget::Frame(fx.b))
        .unwrap();
    assert!(entry.handle.is_none());
    assert_eq!(fx.carousel.ledger().live_count(), 2);
}

#[test]
fn test_open_is_idempotent() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    assert_eq!(fx.carousel.entries().len(), 4);

    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());
    assert!(fx.carousel.is_revealed());

    // A second open while revealed is also a no-op.
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    assert!(fx.carousel.is_revealed());
    assert_eq!(fx.carousel.entries().len(), 4);
}

#[test]
fn test_close_while_pending_cancels_reveal() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    assert_eq!(fx.carousel.ledger().live_count(), 2);

    fx.carousel.close();
    assert!(!fx.carousel.is_engaged());
    assert_eq!(fx.carousel.ledger().live_count(), 0);

    // The straggler arrives after the cancel and is discarded.
    fx.carousel.on_screenshot(fx.c, 1, blob());
    assert!(!fx.carousel.is_revealed());
    assert_eq!(fx.carousel.ledger().live_count(), 0);
}

#[test]
fn test_stale_generation_discarded() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.close();

    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    // Generation 1 completion against the generation 2 snapshot.
    fx.carousel.on_screenshot(fx.a, 1, blob());
    assert!(!fx.carousel.is_revealed());
    assert_eq!(fx.carousel.ledger().live_count(), 0);

    fx.carousel.on_screenshot(fx.a, 2, blob());
    fx.carousel.on_screenshot(fx.b, 2, blob());
    fx.carousel.on_screenshot(fx.c, 2, blob());
    assert!(fx.carousel.is_revealed());
    assert_eq!(fx.carousel.ledger().live_count(), 3);
}

#[test]
fn test_close_releases_every_handle() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());
    assert_eq!(fx.carousel.ledger().live_count(), 3);

    fx.carousel.close();
    assert_eq!(fx.carousel.ledger().live_count(), 0);
    assert_eq!(fx.carousel.ledger().total_allocated(), 3);
    assert!(fx.carousel.entries().is_empty());
}

#[test]
fn test_snapshot_rebuilt_from_scratch_each_open() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.close();

    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    assert_eq!(fx.carousel.entries().len(), 4);
    assert!(fx.carousel.entries().iter().all(|e| e.handle.is_none()));
}

#[test]
fn test_cursor_seeded_at_resume_target() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, Some(fx.b));
    assert_eq!(fx.carousel.cursor(), 1);
    assert_eq!(fx.carousel.commit_target(), Some(fx.b));
}

#[test]
fn test_step_wraps_over_frame_entries() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, Some(fx.a));

    fx.carousel.step(false);
    assert_eq!(fx.carousel.commit_target(), Some(fx.b));
    fx.carousel.step(false);
    assert_eq!(fx.carousel.commit_target(), Some(fx.c));
    // Wraps past the synthetic entry back to the first frame.
    fx.carousel.step(false);
    assert_eq!(fx.carousel.commit_target(), Some(fx.a));

    fx.carousel.step(true);
    assert_eq!(fx.carousel.commit_target(), Some(fx.c));
}

#[test]
fn test_dismiss_releases_and_reindexes() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());

    let closed = fx.carousel.dismiss(fx.b);
    assert!(!closed);
    assert_eq!(fx.carousel.ledger().live_count(), 2);
    assert_eq!(fx.carousel.entries().len(), 3);
    let positions: Vec<usize> = fx.carousel.entries().iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn test_dismissing_last_frame_requests_close() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());

    assert!(!fx.carousel.dismiss(fx.a));
    assert!(!fx.carousel.dismiss(fx.b));
    assert!(fx.carousel.dismiss(fx.c));
}

#[test]
fn test_dismiss_while_pending_can_complete_reveal() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());

    // The only outstanding capture belongs to the dismissed entry.
    fx.carousel.dismiss(fx.c);
    assert!(fx.carousel.is_revealed());
}

#[test]
fn test_wide_layout_margins_and_centering() {
    let mut fx = fixture(true);
    fx.carousel.open(&fx.store, &mut fx.renderer, Some(fx.b));
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());

    match fx.carousel.layout() {
        CarouselLayout::Wide {
            margin_fraction,
            slot_width,
            track_length,
            scroll_offset,
            max_scroll,
        } => {
            assert_eq!(margin_fraction, 0.25);
            assert_eq!(slot_width, 0.5);
            // 4 entries on a half-width slot plus both margins.
            assert_eq!(track_length, 2.5);
            // Centered on the second entry.
            assert_eq!(scroll_offset, 0.5);
            assert_eq!(max_scroll, 1.5);
        }
        other => panic!("expected wide layout, got {:?}", other),
    }
}

#[test]
fn test_scroll_by_clamps_to_track() {
    let mut fx = fixture(true);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());

    fx.carousel.scroll_by(-1.0);
    match fx.carousel.layout() {
        CarouselLayout::Wide { scroll_offset, .. } => assert_eq!(scroll_offset, 0.0),
        other => panic!("expected wide layout, got {:?}", other),
    }

    fx.carousel.scroll_by(10.0);
    match fx.carousel.layout() {
        CarouselLayout::Wide {
            scroll_offset,
            max_scroll,
            ..
        } => assert_eq!(scroll_offset, max_scroll),
        other => panic!("expected wide layout, got {:?}", other),
    }
}

#[test]
fn test_compact_layout_rows() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, None);
    match fx.carousel.layout() {
        CarouselLayout::Compact { rows, scrollable } => {
            assert_eq!(rows, 2);
            assert!(!scrollable);
        }
        other => panic!("expected compact layout, got {:?}", other),
    }
}

#[test]
fn test_compact_layout_scrolls_past_two_rows() {
    let bus = EventBus::new();
    let (tx, _rx) = shell_queue();
    std::mem::forget(_rx);
    let mut store = FrameManager::new(bus, "shell://".to_string(), true);
    let mut renderer = HeadlessRenderer::manual_capture(tx);
    store
        .create(
            "shell://homescreen",
            FrameConfig {
                kind: FrameKind::Homescreen,
                ..FrameConfig::default()
            },
            &mut renderer,
        )
        .unwrap();
    for i in 0..5 {
        store
            .create(
                &format!("https://app{}.example", i),
                FrameConfig::default(),
                &mut renderer,
            )
            .unwrap();
    }

    let mut carousel = CarouselManager::new(&CarouselSettings::default(), false);
    carousel.open(&store, &mut renderer, None);
    match carousel.layout() {
        CarouselLayout::Compact { rows, scrollable } => {
            assert_eq!(rows, 3);
            assert!(scrollable);
        }
        other => panic!("expected compact layout, got {:?}", other),
    }
}

#[test]
fn test_desktop_mode_switch_relayouts() {
    let mut fx = fixture(false);
    fx.carousel.open(&fx.store, &mut fx.renderer, Some(fx.c));
    fx.carousel.on_screenshot(fx.a, 1, blob());
    fx.carousel.on_screenshot(fx.b, 1, blob());
    fx.carousel.on_screenshot(fx.c, 1, blob());
    assert!(matches!(
        fx.carousel.layout(),
        CarouselLayout::Compact { .. }
    ));

    fx.carousel.set_desktop_mode(true);
    match fx.carousel.layout() {
        CarouselLayout::Wide { scroll_offset, .. } => assert_eq!(scroll_offset, 1.0),
        other => panic!("expected wide layout, got {:?}", other),
    }
}

#[test]
fn test_empty_store_reveals_immediately() {
    let bus = EventBus::new();
    let (tx, _rx) = shell_queue();
    std::mem::forget(_rx);
    let mut store = FrameManager::new(bus, "shell://".to_string(), true);
    let mut renderer = HeadlessRenderer::manual_capture(tx);
    store
        .create(
            "shell://homescreen",
            FrameConfig {
                kind: FrameKind::Homescreen,
                ..FrameConfig::default()
            },
            &mut renderer,
        )
        .unwrap();

    let mut carousel = CarouselManager::new(&CarouselSettings::default(), false);
    carousel.open(&store, &mut renderer, None);
    // Nothing to capture: only the synthetic entry, revealed at once.
    assert!(carousel.is_revealed());
    assert_eq!(carousel.entries().len(), 1);
    assert_eq!(carousel.commit_target(), None);
}
