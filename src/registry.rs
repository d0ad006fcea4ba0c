use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use hashlink::LinkedHashMap;

use crate::context::PageContext;
use crate::host::{ElementHandle, MediaElement};
use crate::overlay::{ControllerConfig, Lifecycle, MediaController};

/// Minimal view of the page tree: media elements, other elements with
/// children, and leaves that can never contain media.
#[derive(Debug, Clone)]
pub enum DomNode<E> {
    Media(Rc<E>),
    Element(Vec<DomNode<E>>),
    Text,
}

impl<E> DomNode<E> {
    /// Every media element in or under this node, in document order.
    pub fn media_elements(&self) -> Vec<Rc<E>> {
        let mut found = Vec::new();
        self.collect_media(&mut found);
        found
    }

    fn collect_media(&self, found: &mut Vec<Rc<E>>) {
        match self {
            DomNode::Media(element) => found.push(Rc::clone(element)),
            DomNode::Element(children) => {
                for child in children {
                    child.collect_media(found);
                }
            }
            DomNode::Text => {}
        }
    }
}

/// One structural change: the nodes inserted under the body. Removals are
/// not reported.
#[derive(Debug, Clone)]
pub struct MutationRecord<E> {
    pub added: Vec<DomNode<E>>,
}

/// Ordering key for picking the element hotkeys act on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rank {
    playing: bool,
    area: f64,
}

impl Rank {
    fn of<E: MediaElement>(element: &E) -> Self {
        Self {
            playing: !element.is_paused(),
            area: element.bounding_box().area(),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.playing
            .cmp(&other.playing)
            .then(self.area.partial_cmp(&other.area).unwrap_or(Ordering::Equal))
    }
}

/// All controllers on the page, in discovery order.
///
/// Explicitly removed controllers stay in the map as `Destroyed` and pruned
/// ones move to `retired`, so neither is ever rebound. Both only grow, bounded
/// by the number of media elements the page has ever inserted.
#[derive(Debug)]
pub struct MediaRegistry<E: MediaElement> {
    controllers: LinkedHashMap<ElementHandle, MediaController<E>>,
    retired: HashSet<ElementHandle>,
    observing: bool,
    config: ControllerConfig,
}

impl<E: MediaElement> MediaRegistry<E> {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            controllers: LinkedHashMap::new(),
            retired: HashSet::new(),
            observing: false,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn contains(&self, handle: ElementHandle) -> bool {
        self.controllers.contains_key(&handle) || self.retired.contains(&handle)
    }

    pub fn controller(&self, handle: ElementHandle) -> Option<&MediaController<E>> {
        self.controllers.get(&handle)
    }

    pub fn controller_mut(&mut self, handle: ElementHandle) -> Option<&mut MediaController<E>> {
        self.controllers.get_mut(&handle)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &MediaController<E>> {
        self.controllers.values()
    }

    pub fn controllers_mut(&mut self) -> impl Iterator<Item = &mut MediaController<E>> {
        self.controllers.values_mut()
    }

    /// Create and initialise a controller unless `element` was seen before.
    pub fn bind(&mut self, element: &Rc<E>, ctx: &PageContext, now: Instant) -> bool {
        let handle = element.handle();
        if self.contains(handle) {
            return false;
        }
        let mut controller = MediaController::new(element);
        controller.initialize(ctx, &self.config, now);
        tracing::debug!(
            handle = handle.raw(),
            kind = ?element.kind(),
            lifecycle = ?controller.lifecycle(),
            "bound media element"
        );
        self.controllers.insert(handle, controller);
        true
    }

    /// Bind every media element under `root`. Returns how many were new.
    pub fn discover(&mut self, root: &DomNode<E>, ctx: &PageContext, now: Instant) -> usize {
        let mut bound = 0;
        for element in root.media_elements() {
            if self.bind(&element, ctx, now) {
                bound += 1;
            }
        }
        bound
    }

    /// Start accepting mutation batches.
    pub fn observe(&mut self) {
        self.observing = true;
    }

    /// Bind media found in a batch of inserted nodes, in document order.
    pub fn on_mutations(
        &mut self,
        batch: &[MutationRecord<E>],
        ctx: &PageContext,
        now: Instant,
    ) -> usize {
        if !self.observing {
            return 0;
        }
        let mut bound = 0;
        for record in batch {
            for node in &record.added {
                bound += self.discover(node, ctx, now);
            }
        }
        bound
    }

    /// The element hotkeys act on: playing beats paused, then the larger
    /// rendered area wins. Ties keep discovery order.
    pub fn select_best(&self) -> Option<Rc<E>> {
        let mut best: Option<(Rank, Rc<E>)> = None;
        for controller in self.controllers.values() {
            let Some(element) = controller.element() else {
                continue;
            };
            let rank = Rank::of(element.as_ref());
            let better = match &best {
                Some((current, _)) => rank.compare(current) == Ordering::Greater,
                None => true,
            };
            if better {
                best = Some((rank, element));
            }
        }
        best.map(|(_, element)| element)
    }

    /// Run each controller's tick, then forget controllers whose element the
    /// page has dropped.
    pub fn tick(&mut self, ctx: &PageContext, now: Instant) {
        for controller in self.controllers.values_mut() {
            controller.tick(ctx, now);
        }
        self.prune();
    }

    /// Explicitly tear down the controller for `handle`.
    pub fn remove(&mut self, handle: ElementHandle) -> bool {
        match self.controllers.get_mut(&handle) {
            Some(controller) => {
                controller.destroy();
                true
            }
            None => false,
        }
    }

    fn prune(&mut self) {
        let dead: Vec<ElementHandle> = self
            .controllers
            .iter()
            .filter(|(_, controller)| {
                controller.element().is_none() && controller.lifecycle() != Lifecycle::Ready
            })
            .map(|(handle, _)| *handle)
            .collect();
        for handle in dead {
            self.controllers.remove(&handle);
            self.retired.insert(handle);
        }
    }
}
