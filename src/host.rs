//! Boundary between the overlay core and the page/extension that hosts it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::geometry::Rect;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a page node. Holding a handle never keeps the node
/// alive; it only lets the core recognise the same node again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

impl ElementHandle {
    /// Allocate a handle that no other node on this page shares.
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// The node an overlay is attached to and positioned against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentNode {
    pub handle: ElementHandle,
    pub bounding_box: Rect,
}

/// A live audio/video element. Setters take `&self` because the page owns
/// the element and mutates it behind our back as well.
pub trait MediaElement {
    fn handle(&self) -> ElementHandle;
    fn kind(&self) -> MediaKind;
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    fn is_paused(&self) -> bool;
    fn bounding_box(&self) -> Rect;
    /// Parent element, falling back to the document body. `None` when
    /// neither is available.
    fn positioning_parent(&self) -> Option<ParentNode>;
}

/// Liveness probe for the surrounding extension runtime.
pub trait HostContext {
    fn is_alive(&self) -> bool;
}

/// Shared liveness flag. Clones observe the same state, so the embedder can
/// keep one copy and flip it when the runtime goes away.
#[derive(Debug, Clone)]
pub struct HostProbe {
    alive: Arc<AtomicBool>,
}

impl Default for HostProbe {
    fn default() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl HostProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            tracing::debug!("host context invalidated");
        }
    }
}

impl HostContext for HostProbe {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
