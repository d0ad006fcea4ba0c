//! Playback speed overlay for page media elements: tracks every audio/video
//! element on a page, keeps a draggable speed indicator glued to each one and
//! routes hotkeys to the most relevant element.

pub mod context;
pub mod dispatch;
pub mod drag;
pub mod engine;
pub mod geometry;
pub mod host;
pub mod hotkey;
pub mod logging;
pub mod overlay;
pub mod registry;
pub mod settings;
pub mod store;
pub mod timer;

pub use engine::{InboundMessage, PlaybackEngine, PointerEvent};
pub use host::{ElementHandle, HostContext, HostProbe, MediaElement};
pub use settings::Settings;
