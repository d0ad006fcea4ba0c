use crate::geometry::PositionOffset;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub const LOCAL_STATE_FILE_NAME: &str = "local_state.json";

/// Per-profile state that survives reloads but is never synced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_offset: Option<PositionOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_speed: Option<f64>,
}

/// Keyed local storage. Reads of a missing key yield `None`; any `Err` is a
/// persistence failure the caller may swallow.
pub trait LocalStore {
    fn load_position_offset(&self) -> Result<Option<PositionOffset>>;
    fn save_position_offset(&self, offset: PositionOffset) -> Result<()>;
    fn load_last_speed(&self) -> Result<Option<f64>>;
    fn save_last_speed(&self, speed: f64) -> Result<()>;
}

/// Local state kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store placed in `dir` under [`LOCAL_STATE_FILE_NAME`].
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LOCAL_STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<LocalState> {
        if !self.path.exists() {
            return Ok(LocalState::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read local state file {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(LocalState::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize local state file {}", self.path.display()))
    }

    fn update(&self, apply: impl FnOnce(&mut LocalState)) -> Result<()> {
        let mut state = self.read()?;
        apply(&mut state);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create local state folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&state).context("serialize local state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write local state file {}", self.path.display()))
    }
}

impl LocalStore for JsonFileStore {
    fn load_position_offset(&self) -> Result<Option<PositionOffset>> {
        Ok(self.read()?.position_offset)
    }

    fn save_position_offset(&self, offset: PositionOffset) -> Result<()> {
        self.update(|state| state.position_offset = Some(offset))
    }

    fn load_last_speed(&self) -> Result<Option<f64>> {
        Ok(self.read()?.last_speed)
    }

    fn save_last_speed(&self, speed: f64) -> Result<()> {
        self.update(|state| state.last_speed = Some(speed))
    }
}

/// Volatile store for embedders without a backing file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<LocalState>,
}

impl MemoryStore {
    pub fn new(state: LocalState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn snapshot(&self) -> LocalState {
        *self.state.borrow()
    }
}

impl LocalStore for MemoryStore {
    fn load_position_offset(&self) -> Result<Option<PositionOffset>> {
        Ok(self.state.borrow().position_offset)
    }

    fn save_position_offset(&self, offset: PositionOffset) -> Result<()> {
        self.state.borrow_mut().position_offset = Some(offset);
        Ok(())
    }

    fn load_last_speed(&self) -> Result<Option<f64>> {
        Ok(self.state.borrow().last_speed)
    }

    fn save_last_speed(&self, speed: f64) -> Result<()> {
        self.state.borrow_mut().last_speed = Some(speed);
        Ok(())
    }
}
