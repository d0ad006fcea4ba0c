use crate::geometry::PositionOffset;
use crate::host::HostContext;
use crate::settings::Settings;
use crate::store::LocalStore;
use std::rc::Rc;

/// Speed every element starts from until something changes it.
pub const NORMAL_SPEED: f64 = 1.0;

/// State shared by every controller on a page. Handlers receive it by
/// `&mut`, so the last writer wins.
pub struct PageContext {
    pub settings: Settings,
    pub last_speed: f64,
    store: Box<dyn LocalStore>,
    host: Rc<dyn HostContext>,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("settings", &self.settings)
            .field("last_speed", &self.last_speed)
            .field("host_alive", &self.host.is_alive())
            .finish_non_exhaustive()
    }
}

impl PageContext {
    pub fn new(settings: Settings, store: Box<dyn LocalStore>, host: Rc<dyn HostContext>) -> Self {
        Self {
            settings,
            last_speed: NORMAL_SPEED,
            store,
            host,
        }
    }

    pub fn host_alive(&self) -> bool {
        self.host.is_alive()
    }

    pub fn store(&self) -> &dyn LocalStore {
        self.store.as_ref()
    }

    /// Load the persisted last speed, keeping the current value when nothing
    /// is stored or the read fails.
    pub fn restore_last_speed(&mut self) {
        if !self.host_alive() {
            return;
        }
        match self.store.load_last_speed() {
            Ok(Some(speed)) => self.last_speed = speed,
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "failed to load last speed"),
        }
    }

    pub fn persist_offset(&self, offset: PositionOffset) {
        if !self.host_alive() {
            return;
        }
        if let Err(err) = self.store.save_position_offset(offset) {
            tracing::warn!(%err, "failed to persist overlay offset");
        }
    }

    pub fn persist_last_speed(&self) {
        if !self.host_alive() {
            return;
        }
        if let Err(err) = self.store.save_last_speed(self.last_speed) {
            tracing::warn!(%err, "failed to persist last speed");
        }
    }
}
