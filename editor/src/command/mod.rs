//! The command family: one reversible unit of edit per user operation.
//!
//! Each command is an owned payload of serializable snapshot data plus
//! the ids needed to re-resolve live targets at apply/revert time — no
//! live-object captures. The shared contract is `apply`/`revert`
//! against an [`EditContext`]; apply-then-revert restores the scene's
//! serialized state exactly.

mod group;
mod modify;
mod prefab;
mod structure;

pub use group::CommandGroup;
pub use modify::{ModifyAssetProperty, ModifyComponentProperty, ModifyObjectProperty};
pub use prefab::{ApplyPrefabInstance, BreakPrefabLinks, CreatePrefab, RevertPrefabInstance};
pub use structure::{
    AddComponent, CreateGameObjects, CreateKind, CreateRequest, DeleteGameObjects,
    DuplicateGameObjects, PasteGameObjects, RemoveComponent, ReorderGameObjects,
};

use lattice_core::{ComponentId, ObjectId, Scene};

use crate::error::EditResult;
use crate::events::EventQueue;
use crate::metadata::PropertyRegistry;
use crate::resources::AssetStore;

/// Everything a command may touch while applying or reverting.
pub struct EditContext<'a> {
    pub scene: &'a mut Scene,
    pub assets: &'a mut AssetStore,
    pub metadata: &'a PropertyRegistry,
    pub events: &'a EventQueue,
}

/// Identity of a property-edit target, used to key the session's
/// in-flight guard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyTarget {
    GameObject(ObjectId),
    Component {
        object: ObjectId,
        component: ComponentId,
    },
    Asset(String),
}

/// A reversible edit. One variant per user operation.
#[derive(Debug)]
pub enum EditCommand {
    ModifyObjectProperty(ModifyObjectProperty),
    ModifyComponentProperty(ModifyComponentProperty),
    ModifyAssetProperty(ModifyAssetProperty),
    CreateGameObjects(CreateGameObjects),
    AddComponent(AddComponent),
    RemoveComponent(RemoveComponent),
    DeleteGameObjects(DeleteGameObjects),
    PasteGameObjects(PasteGameObjects),
    DuplicateGameObjects(DuplicateGameObjects),
    ReorderGameObjects(ReorderGameObjects),
    BreakPrefabLinks(BreakPrefabLinks),
    CreatePrefab(CreatePrefab),
    ApplyPrefabInstance(ApplyPrefabInstance),
    RevertPrefabInstance(RevertPrefabInstance),
    Group(CommandGroup),
}

impl EditCommand {
    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        match self {
            Self::ModifyObjectProperty(c) => c.apply(ctx),
            Self::ModifyComponentProperty(c) => c.apply(ctx),
            Self::ModifyAssetProperty(c) => c.apply(ctx),
            Self::CreateGameObjects(c) => c.apply(ctx),
            Self::AddComponent(c) => c.apply(ctx),
            Self::RemoveComponent(c) => c.apply(ctx),
            Self::DeleteGameObjects(c) => c.apply(ctx),
            Self::PasteGameObjects(c) => c.apply(ctx),
            Self::DuplicateGameObjects(c) => c.apply(ctx),
            Self::ReorderGameObjects(c) => c.apply(ctx),
            Self::BreakPrefabLinks(c) => c.apply(ctx),
            Self::CreatePrefab(c) => c.apply(ctx),
            Self::ApplyPrefabInstance(c) => c.apply(ctx),
            Self::RevertPrefabInstance(c) => c.apply(ctx),
            Self::Group(c) => c.apply(ctx),
        }
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        match self {
            Self::ModifyObjectProperty(c) => c.revert(ctx),
            Self::ModifyComponentProperty(c) => c.revert(ctx),
            Self::ModifyAssetProperty(c) => c.revert(ctx),
            Self::CreateGameObjects(c) => c.revert(ctx),
            Self::AddComponent(c) => c.revert(ctx),
            Self::RemoveComponent(c) => c.revert(ctx),
            Self::DeleteGameObjects(c) => c.revert(ctx),
            Self::PasteGameObjects(c) => c.revert(ctx),
            Self::DuplicateGameObjects(c) => c.revert(ctx),
            Self::ReorderGameObjects(c) => c.revert(ctx),
            Self::BreakPrefabLinks(c) => c.revert(ctx),
            Self::CreatePrefab(c) => c.revert(ctx),
            Self::ApplyPrefabInstance(c) => c.revert(ctx),
            Self::RevertPrefabInstance(c) => c.revert(ctx),
            Self::Group(c) => c.revert(ctx),
        }
    }

    /// Short human-readable label for the history panel.
    pub fn description(&self) -> &str {
        match self {
            Self::ModifyObjectProperty(_) => "Modify object property",
            Self::ModifyComponentProperty(_) => "Modify component property",
            Self::ModifyAssetProperty(_) => "Modify asset property",
            Self::CreateGameObjects(_) => "Create objects",
            Self::AddComponent(_) => "Add component",
            Self::RemoveComponent(_) => "Remove component",
            Self::DeleteGameObjects(_) => "Delete objects",
            Self::PasteGameObjects(_) => "Paste objects",
            Self::DuplicateGameObjects(_) => "Duplicate objects",
            Self::ReorderGameObjects(_) => "Reorder objects",
            Self::BreakPrefabLinks(_) => "Break prefab links",
            Self::CreatePrefab(_) => "Create prefab",
            Self::ApplyPrefabInstance(_) => "Apply prefab instance",
            Self::RevertPrefabInstance(_) => "Revert prefab instance",
            Self::Group(g) => g.description(),
        }
    }
}
