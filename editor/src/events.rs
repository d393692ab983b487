//! Editor notifications.
//!
//! The session emits an [`EditorEvent`] for every state-affecting
//! action; delivery order matches call order. The queue is an injected
//! collaborator handle, not a process-wide bus — hosts drain it whenever
//! they refresh their UI.

use std::sync::{Arc, Mutex};

use lattice_core::{ComponentId, ObjectId};

/// Whether the session is editing a standalone scene or a prefab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Scene,
    Prefab,
}

/// The active manipulation tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditMode {
    Select,
    Translate,
    Rotate,
    Scale,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    SelectionChanged {
        selected: Vec<ObjectId>,
    },
    DirtyChanged {
        dirty: bool,
    },
    PropertyChanged {
        object: Option<ObjectId>,
        component: Option<ComponentId>,
        key: String,
    },
    EditModeChanged {
        mode: EditMode,
    },
    EditTypeChanged {
        content: ContentKind,
    },
    ComponentAdded {
        object: ObjectId,
        component: ComponentId,
    },
    ComponentRemoved {
        object: ObjectId,
        component: ComponentId,
    },
    HierarchyUpdated,
    GameObjectsAdded {
        objects: Vec<ObjectId>,
    },
    GameObjectsDeleted {
        objects: Vec<ObjectId>,
    },
    AssetSaved {
        url: String,
    },
}

/// Shared event sink. `send` only needs `&self`, so commands can emit
/// through the context while the scene is mutably borrowed.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    queue: Arc<Mutex<Vec<EditorEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, event: EditorEvent) {
        self.queue.lock().unwrap().push(event);
    }

    /// Takes all queued events in emission order.
    pub fn drain(&self) -> Vec<EditorEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap())
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }
}
