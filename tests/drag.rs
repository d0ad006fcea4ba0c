use playback_overlay::geometry::{
    compute_overlay_position, OverlayPosition, Point, PositionOffset, Rect,
};
use playback_overlay::overlay::Lifecycle;
use playback_overlay::store::{JsonFileStore, LocalStore};
use playback_overlay::{HostProbe, MediaElement, PointerEvent, Settings};
use std::fs;
use std::time::{Duration, Instant};

use mock_page::{document, engine_with_store, started_engine, FailingStore, FakeMedia, BODY};

// Bottom edge at 70, so the default offset lands the overlay at top 50, left 50.
fn target() -> Rect {
    Rect::new(30.0, 0.0, 400.0, 70.0)
}

fn down(media: &FakeMedia, x: f64, y: f64) -> PointerEvent {
    PointerEvent::Down {
        overlay_of: media.handle(),
        button: 0,
        at: Point::new(x, y),
    }
}

#[test]
fn drag_round_trip_reproduces_drop_position() {
    let dir = tempfile::tempdir().unwrap();
    let probe = HostProbe::new();
    let media = FakeMedia::video(target());
    let mut engine = started_engine(dir.path(), &probe, &[media.clone()], Instant::now());
    let overlay = |engine: &playback_overlay::PlaybackEngine<FakeMedia>| {
        engine
            .registry()
            .controller(media.handle())
            .unwrap()
            .overlay()
            .unwrap()
            .clone()
    };
    assert_eq!(overlay(&engine).position, OverlayPosition::new(50.0, 50.0));

    assert!(engine.handle_pointer(down(&media, 100.0, 100.0)));
    assert!(overlay(&engine).transitions_suppressed);

    assert!(engine.handle_pointer(PointerEvent::Move {
        at: Point::new(130.0, 140.0)
    }));
    assert_eq!(overlay(&engine).position, OverlayPosition::new(90.0, 80.0));

    assert!(engine.handle_pointer(PointerEvent::Up {
        at: Point::new(130.0, 140.0)
    }));
    let after = overlay(&engine);
    assert!(!after.transitions_suppressed);
    assert_eq!(after.position, OverlayPosition::new(90.0, 80.0));

    let persisted = JsonFileStore::in_dir(dir.path())
        .load_position_offset()
        .unwrap()
        .expect("offset persisted");
    assert_eq!(persisted, PositionOffset { x: 50.0, y: -20.0 });
    assert_eq!(
        compute_overlay_position(target(), BODY, persisted),
        OverlayPosition::new(90.0, 80.0)
    );
}

#[test]
fn dropped_offset_becomes_default_for_new_elements() {
    let dir = tempfile::tempdir().unwrap();
    let probe = HostProbe::new();
    let now = Instant::now();
    let media = FakeMedia::video(target());
    let mut engine = started_engine(dir.path(), &probe, &[media.clone()], now);

    engine.handle_pointer(down(&media, 0.0, 0.0));
    engine.handle_pointer(PointerEvent::Move {
        at: Point::new(10.0, -10.0),
    });
    engine.handle_pointer(PointerEvent::Up {
        at: Point::new(10.0, -10.0),
    });

    let late = FakeMedia::video(Rect::new(0.0, 0.0, 200.0, 100.0));
    engine.handle_mutations(
        &[playback_overlay::registry::MutationRecord {
            added: vec![document(&[late.clone()])],
        }],
        now,
    );
    let controller = engine.registry().controller(late.handle()).unwrap();
    assert_eq!(controller.offset(), PositionOffset { x: 30.0, y: 30.0 });
}

#[test]
fn stray_moves_and_releases_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let probe = HostProbe::new();
    let a = FakeMedia::video(target());
    let b = FakeMedia::video(Rect::new(0.0, 200.0, 300.0, 100.0));
    let mut engine = started_engine(dir.path(), &probe, &[a.clone(), b.clone()], Instant::now());
    let before = engine.registry().controller(b.handle()).unwrap().overlay().unwrap().position;

    assert!(!engine.handle_pointer(PointerEvent::Move {
        at: Point::new(500.0, 500.0)
    }));
    assert!(!engine.handle_pointer(PointerEvent::Up {
        at: Point::new(500.0, 500.0)
    }));

    // dragging `a` leaves `b` untouched
    engine.handle_pointer(down(&a, 0.0, 0.0));
    engine.handle_pointer(PointerEvent::Move {
        at: Point::new(40.0, 40.0),
    });
    engine.handle_pointer(PointerEvent::Up {
        at: Point::new(40.0, 40.0),
    });
    let after = engine.registry().controller(b.handle()).unwrap().overlay().unwrap().position;
    assert_eq!(before, after);
    assert!(JsonFileStore::in_dir(dir.path())
        .load_position_offset()
        .unwrap()
        .is_some());
}

#[test]
fn secondary_button_is_not_consumed() {
    let dir = tempfile::tempdir().unwrap();
    let probe = HostProbe::new();
    let media = FakeMedia::video(target());
    let mut engine = started_engine(dir.path(), &probe, &[media.clone()], Instant::now());

    assert!(!engine.handle_pointer(PointerEvent::Down {
        overlay_of: media.handle(),
        button: 2,
        at: Point::new(60.0, 60.0),
    }));
    assert!(!engine.registry().controller(media.handle()).unwrap().is_dragging());
}

#[test]
fn ticks_do_not_fight_an_active_drag() {
    let dir = tempfile::tempdir().unwrap();
    let probe = HostProbe::new();
    let t0 = Instant::now();
    let media = FakeMedia::video(target());
    let mut engine = started_engine(dir.path(), &probe, &[media.clone()], t0);

    engine.handle_pointer(down(&media, 0.0, 0.0));
    engine.handle_pointer(PointerEvent::Move {
        at: Point::new(5.0, 5.0),
    });
    engine.tick(t0 + Duration::from_millis(200));

    let overlay = engine.registry().controller(media.handle()).unwrap().overlay().unwrap();
    assert_eq!(overlay.position, OverlayPosition::new(55.0, 55.0));
}

#[test]
fn persistence_failure_still_finishes_drag() {
    let probe = HostProbe::new();
    let media = FakeMedia::video(target());
    let mut engine = engine_with_store(Box::new(FailingStore), &probe);
    engine.start(Settings::default(), &document(&[media.clone()]), Instant::now());

    engine.handle_pointer(down(&media, 0.0, 0.0));
    engine.handle_pointer(PointerEvent::Move {
        at: Point::new(10.0, 0.0),
    });
    assert!(engine.handle_pointer(PointerEvent::Up {
        at: Point::new(10.0, 0.0)
    }));

    let controller = engine.registry().controller(media.handle()).unwrap();
    assert!(!controller.is_dragging());
    assert_eq!(controller.offset(), PositionOffset { x: 30.0, y: 20.0 });
}

#[test]
fn release_after_host_loss_keeps_storage_and_tears_down() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    store
        .save_position_offset(PositionOffset { x: 20.0, y: 20.0 })
        .unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let probe = HostProbe::new();
    let media = FakeMedia::video(target());
    let mut engine = started_engine(dir.path(), &probe, &[media.clone()], Instant::now());

    assert!(engine.handle_pointer(down(&media, 100.0, 100.0)));
    assert!(engine.handle_pointer(PointerEvent::Move {
        at: Point::new(130.0, 140.0)
    }));
    probe.invalidate();
    assert!(engine.handle_pointer(PointerEvent::Up {
        at: Point::new(130.0, 140.0)
    }));

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    let controller = engine.registry().controller(media.handle()).unwrap();
    assert_eq!(controller.lifecycle(), Lifecycle::Destroyed);
    assert!(controller.overlay().is_none());
    assert!(!controller.is_dragging());
    assert_eq!(controller.offset(), PositionOffset { x: 20.0, y: 20.0 });
}
