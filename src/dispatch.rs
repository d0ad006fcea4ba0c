use crate::host::MediaElement;
use crate::overlay::MediaController;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    DecreaseSpeed,
    IncreaseSpeed,
    ResetSpeed,
    Rewind,
    Advance,
    ToggleVisibility,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::DecreaseSpeed,
        Action::IncreaseSpeed,
        Action::ResetSpeed,
        Action::Rewind,
        Action::Advance,
        Action::ToggleVisibility,
    ];

    /// Whether the overlay's speed text must be refreshed afterwards.
    pub fn changes_speed(self) -> bool {
        matches!(
            self,
            Action::DecreaseSpeed | Action::IncreaseSpeed | Action::ResetSpeed
        )
    }
}

/// Apply `action` to `target` and its overlay.
pub fn dispatch<E: MediaElement>(
    action: Action,
    target: &E,
    controller: &mut MediaController<E>,
    settings: &Settings,
) {
    match action {
        Action::DecreaseSpeed => {
            let rate = (target.playback_rate() - settings.speed_step).max(MIN_SPEED);
            target.set_playback_rate(rate);
        }
        Action::IncreaseSpeed => {
            let rate = (target.playback_rate() + settings.speed_step).min(MAX_SPEED);
            target.set_playback_rate(rate);
        }
        Action::ResetSpeed => target.set_playback_rate(1.0),
        Action::Rewind => target.set_current_time(target.current_time() - settings.seek_interval),
        Action::Advance => target.set_current_time(target.current_time() + settings.seek_interval),
        Action::ToggleVisibility => controller.toggle_visibility(),
    }
    tracing::debug!(?action, handle = target.handle().raw(), "dispatched");

    if action.changes_speed() {
        controller.refresh_speed(target.playback_rate());
    }
}
