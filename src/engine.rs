use std::rc::Rc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::context::PageContext;
use crate::dispatch::{dispatch, Action};
use crate::geometry::Point;
use crate::host::{ElementHandle, HostContext, MediaElement};
use crate::hotkey::{format_key_code, is_modifier_key, KeyInput};
use crate::overlay::{ControllerConfig, Lifecycle, MediaEvent};
use crate::registry::{DomNode, MediaRegistry, MutationRecord};
use crate::settings::Settings;
use crate::store::LocalStore;

/// Messages sent to the page by other parts of the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InboundMessage {
    ResetPosition,
}

impl InboundMessage {
    /// Decode a raw message; anything unrecognised yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::debug!(%err, "ignoring inbound message");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed on the overlay belonging to `overlay_of`.
    Down {
        overlay_of: ElementHandle,
        button: u16,
        at: Point,
    },
    Move {
        at: Point,
    },
    Up {
        at: Point,
    },
}

/// Everything the content side of the extension does on one page.
pub struct PlaybackEngine<E: MediaElement> {
    ctx: PageContext,
    registry: MediaRegistry<E>,
    started: bool,
}

impl<E: MediaElement> PlaybackEngine<E> {
    pub fn new(
        store: Box<dyn LocalStore>,
        host: Rc<dyn HostContext>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            ctx: PageContext::new(Settings::default(), store, host),
            registry: MediaRegistry::new(config),
            started: false,
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn registry(&self) -> &MediaRegistry<E> {
        &self.registry
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Install the loaded settings, bind the media already on the page and
    /// begin watching for insertions.
    pub fn start(&mut self, settings: Settings, document: &DomNode<E>, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;
        self.ctx.settings = settings;
        self.ctx.restore_last_speed();
        let bound = self.registry.discover(document, &self.ctx, now);
        self.registry.observe();
        tracing::info!(bound, last_speed = self.ctx.last_speed, "playback overlay started");
    }

    pub fn handle_mutations(&mut self, batch: &[MutationRecord<E>], now: Instant) -> usize {
        self.registry.on_mutations(batch, &self.ctx, now)
    }

    /// Apply a change notification from the synced settings store.
    pub fn apply_settings_changes(&mut self, changes: &Map<String, Value>) {
        self.ctx.settings.apply_changes(changes);
        if changes.contains_key("opacity") {
            let opacity = self.ctx.settings.opacity;
            for controller in self.registry.controllers_mut() {
                controller.set_opacity(opacity);
            }
        }
    }

    /// Map a key press to an action on the best element. Returns the action
    /// that ran, if any.
    pub fn handle_key(&mut self, input: &KeyInput) -> Option<Action> {
        if input.target.is_editable() || !self.ctx.settings.enabled {
            return None;
        }
        if is_modifier_key(&input.code) {
            return None;
        }
        let action = self.ctx.settings.key_bindings.action_for(&input.code)?;
        let target = self.registry.select_best()?;
        let controller = self.registry.controller_mut(target.handle())?;
        if controller.lifecycle() != Lifecycle::Ready {
            return None;
        }
        tracing::debug!(key = format_key_code(&input.code), ?action, "hotkey");
        dispatch(action, target.as_ref(), controller, &self.ctx.settings);
        Some(action)
    }

    pub fn handle_message(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::ResetPosition => self.reset_best_position(),
        }
    }

    fn reset_best_position(&mut self) {
        let Some(target) = self.registry.select_best() else {
            return;
        };
        let Some(controller) = self.registry.controller_mut(target.handle()) else {
            return;
        };
        if controller.lifecycle() != Lifecycle::Ready {
            return;
        }
        controller.reset_position(&self.ctx);
    }

    /// Forward a play/ratechange notification from `element`.
    pub fn handle_media_event(&mut self, element: ElementHandle, event: MediaEvent) {
        if let Some(controller) = self.registry.controller_mut(element) {
            controller.on_media_event(&mut self.ctx, event);
        }
    }

    /// Returns `true` when the event was consumed by an overlay.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                overlay_of,
                button,
                at,
            } => self
                .registry
                .controller_mut(overlay_of)
                .is_some_and(|controller| controller.on_pointer_down(button, at)),
            PointerEvent::Move { at } => {
                let mut consumed = false;
                for controller in self.registry.controllers_mut() {
                    consumed |= controller.on_pointer_move(at);
                }
                consumed
            }
            PointerEvent::Up { .. } => {
                let mut consumed = false;
                for controller in self.registry.controllers_mut() {
                    consumed |= controller.on_pointer_up(&self.ctx);
                }
                consumed
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.registry.tick(&self.ctx, now);
    }

    /// Tear down the controller bound to `element`.
    pub fn remove(&mut self, element: ElementHandle) -> bool {
        self.registry.remove(element)
    }
}
