use crate::dispatch::Action;
use crate::hotkey::parse_key_code;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key code bound to each action. Every action always has a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBindings {
    #[serde(default = "default_decrease_speed_key")]
    pub decrease_speed: String,
    #[serde(default = "default_increase_speed_key")]
    pub increase_speed: String,
    #[serde(default = "default_reset_speed_key")]
    pub reset_speed: String,
    #[serde(default = "default_rewind_key")]
    pub rewind: String,
    #[serde(default = "default_advance_key")]
    pub advance: String,
    #[serde(default = "default_toggle_visibility_key")]
    pub toggle_visibility: String,
}

fn default_decrease_speed_key() -> String {
    "KeyA".into()
}

fn default_increase_speed_key() -> String {
    "KeyD".into()
}

fn default_reset_speed_key() -> String {
    "KeyR".into()
}

fn default_rewind_key() -> String {
    "KeyZ".into()
}

fn default_advance_key() -> String {
    "KeyX".into()
}

fn default_toggle_visibility_key() -> String {
    "KeyS".into()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            decrease_speed: default_decrease_speed_key(),
            increase_speed: default_increase_speed_key(),
            reset_speed: default_reset_speed_key(),
            rewind: default_rewind_key(),
            advance: default_advance_key(),
            toggle_visibility: default_toggle_visibility_key(),
        }
    }
}

impl KeyBindings {
    pub fn get(&self, action: Action) -> &str {
        match action {
            Action::DecreaseSpeed => &self.decrease_speed,
            Action::IncreaseSpeed => &self.increase_speed,
            Action::ResetSpeed => &self.reset_speed,
            Action::Rewind => &self.rewind,
            Action::Advance => &self.advance,
            Action::ToggleVisibility => &self.toggle_visibility,
        }
    }

    pub fn set(&mut self, action: Action, code: impl Into<String>) {
        let slot = match action {
            Action::DecreaseSpeed => &mut self.decrease_speed,
            Action::IncreaseSpeed => &mut self.increase_speed,
            Action::ResetSpeed => &mut self.reset_speed,
            Action::Rewind => &mut self.rewind,
            Action::Advance => &mut self.advance,
            Action::ToggleVisibility => &mut self.toggle_visibility,
        };
        *slot = code.into();
    }

    /// First action, in [`Action::ALL`] order, bound to `code`. Duplicate
    /// bindings are allowed; the later ones are unreachable.
    pub fn action_for(&self, code: &str) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| self.get(*action) == code)
    }

    /// Rewrite loosely written bindings (`a`, `space`) as key codes. Bindings
    /// that do not parse are kept verbatim.
    pub fn normalize(&mut self) {
        for action in Action::ALL {
            let current = self.get(action);
            if let Some(code) = parse_key_code(current) {
                if code != current {
                    tracing::debug!(?action, from = current, to = %code, "normalized key binding");
                    self.set(action, code);
                }
            }
        }
    }
}

/// Synced, user-editable settings. Field names on the wire are camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// When disabled, hotkeys are ignored.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// New overlays start hidden.
    #[serde(default)]
    pub start_hidden: bool,
    #[serde(default = "default_speed_step")]
    pub speed_step: f64,
    /// Seconds skipped by rewind/advance.
    #[serde(default = "default_seek_interval")]
    pub seek_interval: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

fn default_enabled() -> bool {
    true
}

fn default_speed_step() -> f64 {
    0.1
}

fn default_seek_interval() -> f64 {
    10.0
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            start_hidden: false,
            speed_step: default_speed_step(),
            seek_interval: default_seek_interval(),
            opacity: default_opacity(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Self = serde_json::from_str(&content)?;
        settings.key_bindings.normalize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply a change notification from the synced store in place. Each entry
    /// maps a top-level key to its new value; unknown keys and values that do
    /// not decode are skipped.
    pub fn apply_changes(&mut self, changes: &Map<String, Value>) {
        for (key, value) in changes {
            if let Err(err) = self.apply_change(key, value) {
                tracing::warn!(key = %key, %err, "ignoring settings change");
            }
        }
    }

    fn apply_change(&mut self, key: &str, value: &Value) -> anyhow::Result<()> {
        match key {
            "enabled" => self.enabled = serde_json::from_value(value.clone())?,
            "startHidden" => self.start_hidden = serde_json::from_value(value.clone())?,
            "speedStep" => self.speed_step = serde_json::from_value(value.clone())?,
            "seekInterval" => self.seek_interval = serde_json::from_value(value.clone())?,
            "opacity" => self.opacity = serde_json::from_value(value.clone())?,
            "keyBindings" => {
                let mut bindings: KeyBindings = serde_json::from_value(value.clone())?;
                bindings.normalize();
                self.key_bindings = bindings;
            }
            other => anyhow::bail!("unknown settings key '{other}'"),
        }
        tracing::debug!(key, "settings change applied");
        Ok(())
    }
}
