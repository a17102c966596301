pub mod annotator;
pub mod config;
pub mod confirm;
pub mod draw;
pub mod input;
pub mod shortcuts;
pub mod tagging;
pub mod workspace;

pub use annotator::{Annotator, PointerResponse};
pub use config::EditorConfig;
pub use confirm::Confirmation;
pub use draw::{DrawController, DrawOutcome, DrawState, Notice, PendingBox};
pub use input::InputEvent;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tagging::{TagEvent, TagOutcome, TagPrompt};
pub use workspace::{Mode, PendingAction, Response, Workspace};
