use std::rc::Rc;

use frameshell::app::shell_queue;
use frameshell::managers::frame_manager::{FrameManager, FrameManagerTrait};
use frameshell::managers::visibility_arbiter::VisibilityArbiter;
use frameshell::services::event_bus::EventBus;
use frameshell::services::renderer::{HeadlessRenderer, RendererOp};
use frameshell::types::command::VisibilityUpdate;
use frameshell::types::frame::{FrameConfig, FrameId, FrameKind, LifecycleState};
use frameshell::types::settings::VisibilitySettings;

struct Fixture {
    store: FrameManager,
    arbiter: VisibilityArbiter,
    renderer: HeadlessRenderer,
    home: FrameId,
    a: FrameId,
    b: FrameId,
}

fn fixture() -> Fixture {
    let bus = EventBus::new();
    let (tx, _rx) = shell_queue();
    std::mem::forget(_rx);
    let mut store = FrameManager::new(Rc::clone(&bus), "shell://".to_string(), true);
    let mut renderer = HeadlessRenderer::new(tx);

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

    Fixture {
        store,
        arbiter: VisibilityArbiter::new(&VisibilitySettings::default()),
        renderer,
        home,
        a,
        b,
    }
}

fn batch(updates: &[(FrameId, f64)]) -> Vec<VisibilityUpdate> {
    updates
        .iter()
        .map(|&(id, ratio)| VisibilityUpdate { id, ratio })
        .collect()
}

#[test]
fn test_below_threshold_never_activates() {
    let mut fx = fixture();
    fx.arbiter.apply_batch(
        &batch(&[(fx.a, 0.5), (fx.b, 0.6)]),
        &mut fx.store,
        &mut fx.renderer,
    );
    assert_eq!(fx.store.active_frame(), Some(fx.home));
}

#[test]
fn test_single_crossing_becomes_active() {
    let mut fx = fixture();
    // The explicit homescreen activation has long settled; clear the guard
    // with the homescreen's own crossing first.
    fx.arbiter
        .apply_batch(&batch(&[(fx.home, 1.0)]), &mut fx.store, &mut fx.renderer);

    fx.arbiter.apply_batch(
        &batch(&[(fx.home, 0.1), (fx.a, 0.9)]),
        &mut fx.store,
        &mut fx.renderer,
    );
    assert_eq!(fx.store.active_frame(), Some(fx.a));
    assert_eq!(
        fx.store.get(fx.a).unwrap().lifecycle,
        LifecycleState::Active
    );
}

#[test]
fn test_stability_bias_keeps_current_active() {
    let mut fx = fixture();
    fx.arbiter
        .apply_batch(&batch(&[(fx.home, 1.0)]), &mut fx.store, &mut fx.renderer);
    // Both the active homescreen and a challenger cross in one batch.
    fx.arbiter.apply_batch(
        &batch(&[(fx.a, 0.8), (fx.home, 0.8)]),
        &mut fx.store,
        &mut fx.renderer,
    );
    assert_eq!(fx.store.active_frame(), Some(fx.home));
}

#[test]
fn test_expected_frame_wins_race() {
    let mut fx = fixture();
    // Explicit activation arms the guard for a.
    fx.store.activate(fx.a, &mut fx.renderer);
    assert_eq!(fx.store.expected_active(), Some(fx.a));

    // A transient crossing of b during the scroll must not steal activation.
    fx.arbiter.apply_batch(
        &batch(&[(fx.b, 0.95), (fx.a, 0.4)]),
        &mut fx.store,
        &mut fx.renderer,
    );
    assert_eq!(fx.store.active_frame(), Some(fx.a));
    assert_eq!(fx.store.expected_active(), Some(fx.a));

    // The expected frame's own crossing clears the guard.
    fx.arbiter
        .apply_batch(&batch(&[(fx.a, 0.9)]), &mut fx.store, &mut fx.renderer);
    assert_eq!(fx.store.active_frame(), Some(fx.a));
    assert_eq!(fx.store.expected_active(), None);
}

#[test]
fn test_newer_explicit_activation_wins() {
    let mut fx = fixture();
    fx.store.activate(fx.a, &mut fx.renderer);
    // A newer explicit call re-arms the guard for b.
    fx.store.activate(fx.b, &mut fx.renderer);
    assert_eq!(fx.store.expected_active(), Some(fx.b));

    // a's late crossing no longer matters.
    fx.arbiter
        .apply_batch(&batch(&[(fx.a, 0.9)]), &mut fx.store, &mut fx.renderer);
    assert_eq!(fx.store.active_frame(), Some(fx.b));
}

#[test]
fn test_first_in_collection_order_breaks_ties() {
    let mut fx = fixture();
    fx.arbiter
        .apply_batch(&batch(&[(fx.home, 1.0)]), &mut fx.store, &mut fx.renderer);
    // Homescreen scrolled away, both others cross; update order within the
    // batch must not matter.
    fx.arbiter.apply_batch(
        &batch(&[(fx.b, 0.9), (fx.a, 0.9), (fx.home, 0.1)]),
        &mut fx.store,
        &mut fx.renderer,
    );
    assert_eq!(fx.store.active_frame(), Some(fx.a));
}

#[test]
fn test_low_ratio_deactivates_background_frame() {
    let mut fx = fixture();
    assert_eq!(
        fx.store.get(fx.a).unwrap().lifecycle,
        LifecycleState::Opening
    );
    fx.arbiter
        .apply_batch(&batch(&[(fx.a, 0.1)]), &mut fx.store, &mut fx.renderer);
    assert_eq!(
        fx.store.get(fx.a).unwrap().lifecycle,
        LifecycleState::Inactive
    );
}

#[test]
fn test_hysteresis_band_changes_nothing() {
    let mut fx = fixture();
    fx.arbiter
        .apply_batch(&batch(&[(fx.a, 0.5)]), &mut fx.store, &mut fx.renderer);
    // Inside the band: neither activated nor deactivated.
    assert_eq!(
        fx.store.get(fx.a).unwrap().lifecycle,
        LifecycleState::Opening
    );
    assert_eq!(fx.store.active_frame(), Some(fx.home));
}

#[test]
fn test_active_frame_never_deactivated_by_low_ratio() {
    let mut fx = fixture();
    fx.arbiter
        .apply_batch(&batch(&[(fx.home, 0.05)]), &mut fx.store, &mut fx.renderer);
    assert_eq!(
        fx.store.get(fx.home).unwrap().lifecycle,
        LifecycleState::Active
    );
}

#[test]
fn test_suspended_arbiter_records_but_decides_nothing() {
    let mut fx = fixture();
    fx.arbiter
        .apply_batch(&batch(&[(fx.home, 1.0)]), &mut fx.store, &mut fx.renderer);
    fx.arbiter.set_suspended(true);
    fx.arbiter
        .apply_batch(&batch(&[(fx.a, 1.0)]), &mut fx.store, &mut fx.renderer);
    assert_eq!(fx.store.active_frame(), Some(fx.home));
    assert_eq!(fx.store.get(fx.a).unwrap().visibility_ratio, 1.0);

    // Resuming lets the next batch decide normally.
    fx.arbiter.set_suspended(false);
    fx.arbiter.apply_batch(
        &batch(&[(fx.a, 1.0), (fx.home, 0.0)]),
        &mut fx.store,
        &mut fx.renderer,
    );
    assert_eq!(fx.store.active_frame(), Some(fx.a));
}

#[test]
fn test_ratios_clamped_to_unit_interval() {
    let mut fx = fixture();
    fx.arbiter
        .apply_batch(&batch(&[(fx.a, 3.5)]), &mut fx.store, &mut fx.renderer);
    assert_eq!(fx.store.get(fx.a).unwrap().visibility_ratio, 1.0);
}

#[test]
fn test_ensure_active_reasserts_current() {
    let mut fx = fixture();
    let ops = fx.renderer.ops_handle();
    ops.borrow_mut().clear();

    fx.arbiter.ensure_active(&mut fx.store, &mut fx.renderer);
    assert_eq!(fx.store.active_frame(), Some(fx.home));
    assert!(ops
        .borrow()
        .iter()
        .any(|op| *op == RendererOp::Activate(fx.home)));
}

#[test]
fn test_ensure_active_falls_back_to_homescreen() {
    let bus = EventBus::new();
    let (tx, _rx) = shell_queue();
    std::mem::forget(_rx);
    let mut store = FrameManager::new(bus, "shell://".to_string(), true);
    let mut renderer = HeadlessRenderer::new(tx);
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
    // Never explicitly activated: ensure_active picks the homescreen.
    let arbiter = VisibilityArbiter::new(&VisibilitySettings::default());
    arbiter.ensure_active(&mut store, &mut renderer);
    assert_eq!(store.active_frame(), Some(home));
}
