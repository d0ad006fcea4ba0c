use criterion::{criterion_group, criterion_main, Criterion};
use playback_overlay::geometry::Rect;
use playback_overlay::host::{ElementHandle, MediaElement, MediaKind, ParentNode};
use playback_overlay::overlay::ControllerConfig;
use playback_overlay::registry::DomNode;
use playback_overlay::store::MemoryStore;
use playback_overlay::{HostProbe, PlaybackEngine, Settings};
use std::rc::Rc;
use std::time::Instant;

struct BenchMedia {
    handle: ElementHandle,
    rect: Rect,
    paused: bool,
}

impl MediaElement for BenchMedia {
    fn handle(&self) -> ElementHandle {
        self.handle
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn playback_rate(&self) -> f64 {
        1.0
    }

    fn set_playback_rate(&self, _rate: f64) {}

    fn current_time(&self) -> f64 {
        0.0
    }

    fn set_current_time(&self, _seconds: f64) {}

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn bounding_box(&self) -> Rect {
        self.rect
    }

    fn positioning_parent(&self) -> Option<ParentNode> {
        None
    }
}

fn bench_select_best(c: &mut Criterion) {
    let elements: Vec<Rc<BenchMedia>> = (0..1_000)
        .map(|i| {
            Rc::new(BenchMedia {
                handle: ElementHandle::next(),
                rect: Rect::new(0.0, 0.0, (i % 97) as f64 * 10.0, 90.0),
                paused: i % 13 != 0,
            })
        })
        .collect();
    let document = DomNode::Element(elements.iter().cloned().map(DomNode::Media).collect());

    let mut engine = PlaybackEngine::new(
        Box::new(MemoryStore::default()),
        Rc::new(HostProbe::new()),
        ControllerConfig::default(),
    );
    engine.start(Settings::default(), &document, Instant::now());

    c.bench_function("select_best_1k", |b| b.iter(|| engine.registry().select_best()));
}

criterion_group!(benches, bench_select_best);
criterion_main!(benches);
