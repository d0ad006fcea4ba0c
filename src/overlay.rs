//! Per-element overlay: creation, re-anchoring, dragging and teardown.

use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::context::{PageContext, NORMAL_SPEED};
use crate::drag::DragController;
use crate::geometry::{
    compute_offset_from_drop, compute_overlay_position, OverlayPosition, Point, PositionOffset,
    Rect, DEFAULT_OFFSET,
};
use crate::host::{ElementHandle, MediaElement, ParentNode};
use crate::timer::{IntervalTimer, DEFAULT_TICK_INTERVAL};

pub const SPEED_LABEL: &str = "Speed";
/// Inset used by the reset command, measured from the top-left corner.
pub const RESET_INSET: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub tick_interval: Duration,
    pub default_offset: PositionOffset,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            default_offset: DEFAULT_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Play,
    RateChange,
}

/// What the page should render for one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub label: &'static str,
    pub position: OverlayPosition,
    /// Node the overlay is attached to; `None` while detached.
    pub parent: Option<ElementHandle>,
    pub visible: bool,
    pub speed_text: String,
    pub opacity: f64,
    /// Set while dragging so movement is not animated.
    pub transitions_suppressed: bool,
}

impl OverlayView {
    fn new(visible: bool, rate: f64, opacity: f64) -> Self {
        Self {
            label: SPEED_LABEL,
            position: OverlayPosition::default(),
            parent: None,
            visible,
            speed_text: format_speed(rate),
            opacity,
            transitions_suppressed: false,
        }
    }
}

pub fn format_speed(rate: f64) -> String {
    format!("{rate:.2}")
}

/// Controller bound to a single media element for the lifetime of the page.
#[derive(Debug)]
pub struct MediaController<E: MediaElement> {
    handle: ElementHandle,
    element: Weak<E>,
    lifecycle: Lifecycle,
    init_attempted: bool,
    offset: PositionOffset,
    overlay: Option<OverlayView>,
    drag: DragController,
    ticker: Option<IntervalTimer>,
}

impl<E: MediaElement> MediaController<E> {
    pub fn new(element: &Rc<E>) -> Self {
        Self {
            handle: element.handle(),
            element: Rc::downgrade(element),
            lifecycle: Lifecycle::Uninitialized,
            init_attempted: false,
            offset: DEFAULT_OFFSET,
            overlay: None,
            drag: DragController::default(),
            ticker: None,
        }
    }

    pub fn handle(&self) -> ElementHandle {
        self.handle
    }

    /// The element, if the page still holds it.
    pub fn element(&self) -> Option<Rc<E>> {
        self.element.upgrade()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn offset(&self) -> PositionOffset {
        self.offset
    }

    pub fn overlay(&self) -> Option<&OverlayView> {
        self.overlay.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Load the stored offset, build the overlay and start the re-anchor
    /// tick. Runs at most once; if the host disappears before or during the
    /// load the controller stays `Uninitialized` for good.
    pub fn initialize(&mut self, ctx: &PageContext, config: &ControllerConfig, now: Instant) {
        if self.init_attempted || self.lifecycle != Lifecycle::Uninitialized {
            return;
        }
        self.init_attempted = true;

        if !ctx.host_alive() {
            tracing::debug!(handle = self.handle.raw(), "host gone before init, abandoning");
            return;
        }
        let Some(element) = self.element.upgrade() else {
            return;
        };

        if ctx.last_speed != NORMAL_SPEED && ctx.last_speed != element.playback_rate() {
            element.set_playback_rate(ctx.last_speed);
        }

        self.offset = match ctx.store().load_position_offset() {
            Ok(Some(offset)) => offset,
            Ok(None) => config.default_offset,
            Err(err) => {
                tracing::warn!(%err, "failed to load overlay offset, using default");
                config.default_offset
            }
        };

        if !ctx.host_alive() {
            tracing::debug!(handle = self.handle.raw(), "host gone during init, abandoning");
            return;
        }

        let mut view = OverlayView::new(
            !ctx.settings.start_hidden,
            element.playback_rate(),
            ctx.settings.opacity,
        );
        view.parent = element.positioning_parent().map(|parent| parent.handle);
        self.overlay = Some(view);
        self.ticker = Some(IntervalTimer::start(config.tick_interval, now));
        self.lifecycle = Lifecycle::Ready;
        tracing::debug!(handle = self.handle.raw(), offset = ?self.offset, "overlay ready");

        self.reanchor(ctx);
    }

    /// Drive the recurring tick. Re-anchors when a period has elapsed.
    pub fn tick(&mut self, ctx: &PageContext, now: Instant) {
        if self.lifecycle != Lifecycle::Ready {
            return;
        }
        let due = self.ticker.as_mut().is_some_and(|ticker| ticker.poll(now));
        if due {
            self.reanchor(ctx);
        }
    }

    /// Glue the overlay to the element's current box. Returns `true` when the
    /// overlay was moved. Tears the controller down if the host or the
    /// element has gone away.
    pub fn reanchor(&mut self, ctx: &PageContext) -> bool {
        if self.lifecycle != Lifecycle::Ready {
            return false;
        }
        if !ctx.host_alive() {
            self.destroy();
            return false;
        }
        if self.drag.is_dragging() {
            return false;
        }
        let Some(element) = self.element.upgrade() else {
            tracing::debug!(handle = self.handle.raw(), "element dropped by page");
            self.destroy();
            return false;
        };

        let target_box = element.bounding_box();
        if !target_box.is_laid_out() {
            return false;
        }
        let Some(parent) = element.positioning_parent() else {
            return false;
        };
        let Some(view) = self.overlay.as_mut() else {
            return false;
        };
        if view.parent != Some(parent.handle) {
            tracing::debug!(
                handle = self.handle.raw(),
                parent = parent.handle.raw(),
                "reattaching overlay"
            );
            view.parent = Some(parent.handle);
        }
        view.position = compute_overlay_position(target_box, parent.bounding_box, self.offset);
        true
    }

    /// Stop the tick, detach the overlay and drop any drag in progress.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.cancel();
        }
        self.ticker = None;
        self.overlay = None;
        self.drag.release();
        self.lifecycle = Lifecycle::Destroyed;
        tracing::debug!(handle = self.handle.raw(), "controller destroyed");
    }

    /// Reconcile the element's rate with the page-wide last speed.
    pub fn on_media_event(&mut self, ctx: &mut PageContext, event: MediaEvent) {
        if self.lifecycle != Lifecycle::Ready {
            return;
        }
        if !ctx.host_alive() {
            self.destroy();
            return;
        }
        let Some(element) = self.element.upgrade() else {
            return;
        };
        let rate = element.playback_rate();
        if rate != ctx.last_speed {
            match event {
                MediaEvent::Play => element.set_playback_rate(ctx.last_speed),
                MediaEvent::RateChange => {
                    ctx.last_speed = rate;
                    ctx.persist_last_speed();
                }
            }
        }
        self.refresh_speed(element.playback_rate());
    }

    pub fn refresh_speed(&mut self, rate: f64) {
        if let Some(view) = self.overlay.as_mut() {
            view.speed_text = format_speed(rate);
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        if let Some(view) = self.overlay.as_mut() {
            view.opacity = opacity;
        }
    }

    pub fn toggle_visibility(&mut self) {
        if let Some(view) = self.overlay.as_mut() {
            view.visible = !view.visible;
            tracing::debug!(handle = self.handle.raw(), visible = view.visible, "visibility toggled");
        }
    }

    /// Pointer pressed on this controller's overlay. Returns `true` when the
    /// event was consumed and must not reach the page.
    pub fn on_pointer_down(&mut self, button: u16, pointer: Point) -> bool {
        let Some(view) = self.overlay.as_mut() else {
            return false;
        };
        if !self.drag.press(button, pointer, view.position) {
            return false;
        }
        view.transitions_suppressed = true;
        true
    }

    pub fn on_pointer_move(&mut self, pointer: Point) -> bool {
        let Some(position) = self.drag.drag_to(pointer) else {
            return false;
        };
        if let Some(view) = self.overlay.as_mut() {
            view.position = position;
        }
        true
    }

    /// Finish a drag: persist the offset derived from where the overlay was
    /// dropped, then snap back onto the anchor.
    pub fn on_pointer_up(&mut self, ctx: &PageContext) -> bool {
        if !self.drag.release() {
            return false;
        }
        if !ctx.host_alive() {
            self.destroy();
            return true;
        }
        let Some(view) = self.overlay.as_mut() else {
            return true;
        };
        view.transitions_suppressed = false;

        let Some(element) = self.element.upgrade() else {
            return true;
        };
        if let Some(parent) = element.positioning_parent() {
            let offset = self.offset_from_overlay(&parent, element.bounding_box());
            self.offset = offset;
            tracing::debug!(handle = self.handle.raw(), ?offset, "drag committed");
            ctx.persist_offset(offset);
        }
        self.reanchor(ctx);
        true
    }

    fn offset_from_overlay(&self, parent: &ParentNode, target_box: Rect) -> PositionOffset {
        let position = self
            .overlay
            .as_ref()
            .map(|view| view.position)
            .unwrap_or_default();
        let corner = position.to_viewport(parent.bounding_box);
        // Only the top-left corner of the overlay feeds the offset.
        let overlay_box = Rect::new(corner.x, corner.y, 0.0, 0.0);
        compute_offset_from_drop(overlay_box, target_box)
    }

    /// Move the overlay back to the element's top-left corner.
    pub fn reset_position(&mut self, ctx: &PageContext) {
        if self.lifecycle != Lifecycle::Ready {
            return;
        }
        let Some(element) = self.element.upgrade() else {
            return;
        };
        let height = element.bounding_box().height;
        self.offset = PositionOffset {
            x: RESET_INSET,
            y: height - RESET_INSET,
        };
        ctx.persist_offset(self.offset);
        self.reanchor(ctx);
    }
}
