//! Editing layer on top of `lattice-core`: reversible commands, the
//! bounded undo/redo history, property serialization, prefab linkage,
//! and the [`EditorSession`] façade hosts drive.

pub mod clipboard;
pub mod command;
pub mod error;
pub mod events;
pub mod history;
pub mod metadata;
pub mod property;
pub mod resources;
pub mod session;

pub use clipboard::{CLIPBOARD_FORMAT, Clipboard, MemoryClipboard};
pub use command::{EditCommand, EditContext, PropertyTarget};
pub use error::{EditError, EditResult};
pub use events::{ContentKind, EditMode, EditorEvent, EventQueue};
pub use history::{DEFAULT_MAX_UNDO, History};
pub use metadata::{PropertyDescriptor, PropertyRegistry};
pub use property::{EditKind, PropertySnapshot, deserialize_property, serialize_property};
pub use resources::{Asset, AssetData, AssetStore, LoaderRuntime, ResourceError, ResourceLoader};
pub use session::{EditorSession, PendingEdit};
