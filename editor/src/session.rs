//! The editing session: scene, history, selection, and asset plumbing
//! behind one façade.
//!
//! Every mutation goes through the command history, so the host gets
//! undo/redo and change events without wiring them per operation. The
//! session also owns the in-flight guard for reference-kind property
//! edits, whose values resolve through the asset loader before they can
//! be written.

use std::collections::HashMap;

use lattice_core::{
    AssetReference, ComponentId, GameObject, ObjectId, Scene, find_asset_references, hierarchy,
    hierarchy::Placement, snapshot_node,
};

use crate::clipboard::{
    CLIPBOARD_FORMAT, Clipboard, MemoryClipboard, decode_payload, encode_payload,
};
use crate::command::{
    AddComponent, ApplyPrefabInstance, BreakPrefabLinks, CommandGroup, CreateGameObjects,
    CreatePrefab, CreateRequest, DeleteGameObjects, DuplicateGameObjects, EditCommand, EditContext,
    ModifyAssetProperty, ModifyComponentProperty, ModifyObjectProperty, PasteGameObjects,
    PropertyTarget, RemoveComponent, ReorderGameObjects, RevertPrefabInstance,
};
use crate::error::{EditError, EditResult};
use crate::events::{ContentKind, EditMode, EditorEvent, EventQueue};
use crate::history::History;
use crate::metadata::PropertyRegistry;
use crate::property::{EditKind, PropertySnapshot, referenced_urls, serialize_property};
use crate::resources::{AssetStore, ResourceError, ResourceLoader};

/// Token for a reference-kind property edit in flight.
///
/// The session hands one out per target at `begin_property_edit` and
/// honors at most one completion per token; completions carrying a
/// superseded generation are silently dropped.
#[derive(Debug)]
pub struct PendingEdit {
    target: PropertyTarget,
    key: String,
    kind: EditKind,
    generation: u64,
}

pub struct EditorSession {
    scene: Scene,
    content: ContentKind,
    content_url: Option<String>,
    history: History,
    dirty: bool,
    selection: Vec<ObjectId>,
    edit_mode: EditMode,
    events: EventQueue,
    clipboard: Box<dyn Clipboard>,
    assets: AssetStore,
    loader: Option<Box<dyn ResourceLoader>>,
    registry: PropertyRegistry,
    pending: HashMap<PropertyTarget, u64>,
    next_generation: u64,
}

impl EditorSession {
    pub fn new(assets: AssetStore) -> Self {
        Self {
            scene: Scene::new(),
            content: ContentKind::Scene,
            content_url: None,
            history: History::default(),
            dirty: false,
            selection: Vec::new(),
            edit_mode: EditMode::Select,
            events: EventQueue::new(),
            clipboard: Box::new(MemoryClipboard::new()),
            assets,
            loader: None,
            registry: PropertyRegistry::with_builtins(),
            pending: HashMap::new(),
            next_generation: 1,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_loader(mut self, loader: Box<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PropertyRegistry {
        &mut self.registry
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn content(&self) -> ContentKind {
        self.content
    }

    pub fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn game_objects_by_ids(&self, ids: &[ObjectId]) -> Vec<&GameObject> {
        ids.iter().filter_map(|&id| self.scene.object(id)).collect()
    }

    pub fn is_prefab_root(&self, id: ObjectId) -> bool {
        self.scene.object(id).is_some_and(GameObject::is_prefab_root)
    }

    pub fn is_prefab_child(&self, id: ObjectId) -> bool {
        self.scene.object(id).is_some_and(GameObject::is_prefab_child)
    }

    /// All live members of a prefab instance, root first, in display
    /// order.
    pub fn prefab_instance_members(&self, root: ObjectId) -> Vec<ObjectId> {
        self.scene
            .objects_in_display_order()
            .into_iter()
            .filter(|&id| {
                id == root
                    || self
                        .scene
                        .object(id)
                        .is_some_and(|o| o.extras.prefab_root_id == Some(root))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Session state changes outside the history
    // ------------------------------------------------------------------

    /// Replaces the edited content, resetting history, selection, and
    /// the dirty flag.
    pub fn open(&mut self, content: ContentKind, url: impl Into<String>) {
        self.content = content;
        self.content_url = Some(url.into());
        self.history.clear();
        self.pending.clear();
        self.selection.clear();
        self.set_dirty(false);
        self.events.send(EditorEvent::EditTypeChanged { content });
    }

    pub fn select(&mut self, ids: Vec<ObjectId>) {
        let selected: Vec<ObjectId> = ids
            .into_iter()
            .filter(|&id| self.scene.contains(id))
            .collect();
        if selected != self.selection {
            self.selection = selected.clone();
            self.events.send(EditorEvent::SelectionChanged { selected });
        }
    }

    pub fn change_edit_type(&mut self, content: ContentKind) {
        if self.content != content {
            self.content = content;
            self.events.send(EditorEvent::EditTypeChanged { content });
        }
    }

    pub fn change_edit_mode(&mut self, mode: EditMode) {
        if self.edit_mode != mode {
            self.edit_mode = mode;
            self.events.send(EditorEvent::EditModeChanged { mode });
        }
    }

    /// Marks the content as saved and announces it under its url.
    pub fn mark_saved(&mut self) {
        self.set_dirty(false);
        if let Some(url) = self.content_url.clone() {
            self.events.send(EditorEvent::AssetSaved { url });
        }
    }

    /// Reports every place in the scene that references the asset, so
    /// hosts can refresh after the asset changed on disk.
    pub fn update_asset(&mut self, url: &str) -> Vec<AssetReference> {
        let references = find_asset_references(&self.scene, url);
        log::debug!("asset {url} referenced from {} place(s)", references.len());
        references
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn push(&mut self, command: EditCommand) -> EditResult {
        let Self {
            scene,
            assets,
            registry,
            events,
            history,
            ..
        } = self;
        let mut ctx = EditContext {
            scene,
            assets,
            metadata: registry,
            events,
        };
        history.add(command, &mut ctx)?;
        self.set_dirty(true);
        Ok(())
    }

    pub fn undo(&mut self) -> EditResult<bool> {
        let Self {
            scene,
            assets,
            registry,
            events,
            history,
            ..
        } = self;
        let mut ctx = EditContext {
            scene,
            assets,
            metadata: registry,
            events,
        };
        let moved = history.undo(&mut ctx)?;
        if moved {
            self.set_dirty(true);
            self.prune_selection();
        }
        Ok(moved)
    }

    pub fn redo(&mut self) -> EditResult<bool> {
        let Self {
            scene,
            assets,
            registry,
            events,
            history,
            ..
        } = self;
        let mut ctx = EditContext {
            scene,
            assets,
            metadata: registry,
            events,
        };
        let moved = history.redo(&mut ctx)?;
        if moved {
            self.set_dirty(true);
            self.prune_selection();
        }
        Ok(moved)
    }

    // ------------------------------------------------------------------
    // Structure operations
    // ------------------------------------------------------------------

    pub fn create_game_objects(&mut self, requests: Vec<CreateRequest>) -> EditResult {
        self.push(EditCommand::CreateGameObjects(CreateGameObjects::new(
            requests,
        )))
    }

    pub fn add_component(&mut self, object: ObjectId, type_name: &str) -> EditResult {
        self.push(EditCommand::AddComponent(AddComponent::new(
            object, type_name,
        )))
    }

    pub fn remove_component(&mut self, object: ObjectId, component: ComponentId) -> EditResult {
        let command = RemoveComponent::capture(&self.scene, object, component)?;
        self.push(EditCommand::RemoveComponent(command))
    }

    /// Deletes the subtrees rooted at `targets`. Nodes nested under
    /// another target are dropped from the set; prefab members are
    /// unlinked first so the whole edit undoes as one entry.
    pub fn delete_game_objects(&mut self, targets: &[ObjectId]) -> EditResult {
        let top = hierarchy::filter_top_level(&self.scene, targets);
        let ordered = hierarchy::sort_for_hierarchy(&self.scene, &top);
        if ordered.is_empty() {
            return Ok(());
        }
        let break_targets = self.linked_non_roots(&ordered);
        let delete = DeleteGameObjects::capture(&self.scene, &ordered)?;
        let command = if break_targets.is_empty() {
            EditCommand::DeleteGameObjects(delete)
        } else {
            let unlink = BreakPrefabLinks::capture(&self.scene, &break_targets)?;
            EditCommand::Group(CommandGroup::new(
                "Delete objects",
                vec![
                    EditCommand::BreakPrefabLinks(unlink),
                    EditCommand::DeleteGameObjects(delete),
                ],
            ))
        };
        self.push(command)?;
        self.prune_selection();
        Ok(())
    }

    /// Moves `nodes` relative to `target`. A prefab member moving to a
    /// different parent, or into any node, loses its instance linkage
    /// as part of the same history entry.
    pub fn update_hierarchy(
        &mut self,
        nodes: &[ObjectId],
        target: ObjectId,
        placement: Placement,
    ) -> EditResult {
        let top = hierarchy::filter_top_level(&self.scene, nodes);
        let ordered = hierarchy::sort_for_hierarchy(&self.scene, &top);
        if ordered.is_empty() {
            return Ok(());
        }
        if !self.scene.contains(target) {
            return Err(EditError::TargetNotFound(format!("object {target}")));
        }
        let destination = match placement {
            Placement::Inside => Some(target),
            Placement::Before | Placement::After => self.scene.parent_of(target),
        };
        let break_targets: Vec<ObjectId> = ordered
            .iter()
            .copied()
            .filter(|&id| {
                self.scene.object(id).is_some_and(|o| {
                    o.is_prefab_child()
                        && !o.is_prefab_root()
                        && (self.scene.parent_of(id) != destination
                            || placement == Placement::Inside)
                })
            })
            .collect();
        let reorder = ReorderGameObjects::capture(&self.scene, ordered, target, placement)?;
        let command = if break_targets.is_empty() {
            EditCommand::ReorderGameObjects(reorder)
        } else {
            let unlink = BreakPrefabLinks::capture(&self.scene, &break_targets)?;
            EditCommand::Group(CommandGroup::new(
                "Reorder objects",
                vec![
                    EditCommand::BreakPrefabLinks(unlink),
                    EditCommand::ReorderGameObjects(reorder),
                ],
            ))
        };
        self.push(command)?;
        self.events.send(EditorEvent::HierarchyUpdated);
        Ok(())
    }

    pub fn duplicate_game_objects(&mut self, sources: &[ObjectId]) -> EditResult {
        let top = hierarchy::filter_top_level(&self.scene, sources);
        let ordered = hierarchy::sort_for_hierarchy(&self.scene, &top);
        if ordered.is_empty() {
            return Ok(());
        }
        self.push(EditCommand::DuplicateGameObjects(DuplicateGameObjects::new(
            ordered,
        )))
    }

    pub fn copy_game_objects(&mut self, sources: &[ObjectId]) -> EditResult {
        let top = hierarchy::filter_top_level(&self.scene, sources);
        let ordered = hierarchy::sort_for_hierarchy(&self.scene, &top);
        let snapshots = ordered
            .iter()
            .map(|&id| snapshot_node(&self.scene, id))
            .collect::<Result<Vec<_>, _>>()?;
        let payload = encode_payload(&snapshots)?;
        self.clipboard.write(payload, CLIPBOARD_FORMAT);
        Ok(())
    }

    pub fn paste_game_objects(&mut self, parent: Option<ObjectId>) -> EditResult {
        let Some(text) = self.clipboard.read(CLIPBOARD_FORMAT) else {
            log::debug!("paste requested with an empty clipboard");
            return Ok(());
        };
        let payloads = decode_payload(&text)?;
        if payloads.is_empty() {
            return Ok(());
        }
        self.push(EditCommand::PasteGameObjects(PasteGameObjects::new(
            parent, payloads,
        )))
    }

    // ------------------------------------------------------------------
    // Prefab operations
    // ------------------------------------------------------------------

    pub fn break_prefab_links(&mut self, targets: &[ObjectId]) -> EditResult {
        let command = BreakPrefabLinks::capture(&self.scene, targets)?;
        self.push(EditCommand::BreakPrefabLinks(command))
    }

    pub fn create_prefab(&mut self, source: ObjectId, url: &str) -> EditResult {
        let command = CreatePrefab::capture(&self.scene, source, url)?;
        self.push(EditCommand::CreatePrefab(command))
    }

    pub fn apply_prefab_instance(&mut self, instance_root: ObjectId) -> EditResult {
        let command = ApplyPrefabInstance::capture(&self.scene, instance_root)?;
        self.push(EditCommand::ApplyPrefabInstance(command))
    }

    pub fn revert_prefab_instance(&mut self, instance_root: ObjectId) -> EditResult {
        let command = RevertPrefabInstance::capture(&self.scene, instance_root)?;
        self.push(EditCommand::RevertPrefabInstance(command))
    }

    // ------------------------------------------------------------------
    // Property operations
    // ------------------------------------------------------------------

    /// Writes a built-in object property as one history entry.
    pub fn set_object_property(
        &mut self,
        object: ObjectId,
        key: &str,
        value: &lattice_core::PropertyValue,
    ) -> EditResult {
        let kind = self
            .registry
            .game_object_property(key)
            .ok_or_else(|| EditError::TargetNotFound(format!("object property {key}")))?
            .kind;
        let snapshot = serialize_property(value, kind, self.assets.resource_root())?;
        self.commit_property(PropertyTarget::GameObject(object), key, kind, snapshot)
    }

    /// Writes a component property as one history entry.
    pub fn set_component_property(
        &mut self,
        object: ObjectId,
        component: ComponentId,
        key: &str,
        value: &lattice_core::PropertyValue,
    ) -> EditResult {
        let type_name = self
            .scene
            .object(object)
            .and_then(|o| o.component(component))
            .map(|c| c.type_name().to_owned())
            .ok_or_else(|| EditError::TargetNotFound(format!("component {component}")))?;
        let kind = self
            .registry
            .component_property(&type_name, key)
            .ok_or_else(|| EditError::TargetNotFound(format!("property {type_name}.{key}")))?
            .kind;
        let snapshot = serialize_property(value, kind, self.assets.resource_root())?;
        self.commit_property(
            PropertyTarget::Component { object, component },
            key,
            kind,
            snapshot,
        )
    }

    /// Writes an asset property as one history entry.
    pub fn set_asset_property(
        &mut self,
        url: &str,
        key: &str,
        kind: EditKind,
        value: &lattice_core::PropertyValue,
    ) -> EditResult {
        let snapshot = serialize_property(value, kind, self.assets.resource_root())?;
        self.commit_property(PropertyTarget::Asset(url.to_owned()), key, kind, snapshot)
    }

    /// Starts a reference-kind property edit. At most one edit per
    /// target may be in flight.
    pub fn begin_property_edit(
        &mut self,
        target: PropertyTarget,
        key: &str,
        kind: EditKind,
    ) -> EditResult<PendingEdit> {
        if self.pending.contains_key(&target) {
            return Err(EditError::EditInFlight(format!("{target:?}")));
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending.insert(target.clone(), generation);
        Ok(PendingEdit {
            target,
            key: key.to_owned(),
            kind,
            generation,
        })
    }

    /// Finishes an in-flight edit with the resolved value. A token that
    /// was cancelled or superseded is dropped without touching the
    /// scene.
    pub fn complete_property_edit(
        &mut self,
        pending: PendingEdit,
        after: PropertySnapshot,
    ) -> EditResult {
        match self.pending.get(&pending.target) {
            Some(&generation) if generation == pending.generation => {}
            _ => {
                log::debug!("dropping stale property edit for {:?}", pending.target);
                return Ok(());
            }
        }
        self.pending.remove(&pending.target);
        self.commit_property(pending.target, &pending.key, pending.kind, after)
    }

    /// Abandons an in-flight edit without writing anything.
    pub fn cancel_property_edit(&mut self, pending: &PendingEdit) {
        if self.pending.get(&pending.target) == Some(&pending.generation) {
            self.pending.remove(&pending.target);
        }
    }

    fn commit_property(
        &mut self,
        target: PropertyTarget,
        key: &str,
        kind: EditKind,
        after: PropertySnapshot,
    ) -> EditResult {
        if self.pending.contains_key(&target) {
            return Err(EditError::EditInFlight(format!("{target:?}")));
        }
        self.prime_assets(&after)?;
        let command = {
            let Self {
                scene,
                assets,
                registry,
                events,
                ..
            } = self;
            let ctx = EditContext {
                scene,
                assets,
                metadata: registry,
                events,
            };
            match &target {
                PropertyTarget::GameObject(object) => EditCommand::ModifyObjectProperty(
                    ModifyObjectProperty::capture(&ctx, *object, key, after)?,
                ),
                PropertyTarget::Component { object, component } => {
                    EditCommand::ModifyComponentProperty(ModifyComponentProperty::capture(
                        &ctx, *object, *component, key, after,
                    )?)
                }
                PropertyTarget::Asset(url) => EditCommand::ModifyAssetProperty(
                    ModifyAssetProperty::capture(&ctx, url, key, kind, after)?,
                ),
            }
        };
        self.push(command)
    }

    /// Resolves every asset the snapshot references into the store, so
    /// the command's deserialization stays synchronous.
    fn prime_assets(&mut self, snapshot: &PropertySnapshot) -> EditResult {
        let urls = referenced_urls(snapshot, self.assets.resource_root());
        for url in urls {
            if self.assets.contains(&url) {
                continue;
            }
            let Some(loader) = self.loader.as_deref() else {
                return Err(EditError::ResourceResolution(ResourceError::NotFound(url)));
            };
            match loader.resolve(&url).recv() {
                Some(Ok(asset)) => self.assets.register(asset),
                Some(Err(err)) => return Err(EditError::ResourceResolution(err)),
                None => {
                    return Err(EditError::ResourceResolution(ResourceError::NotFound(url)));
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------

    fn set_dirty(&mut self, dirty: bool) {
        if self.dirty != dirty {
            self.dirty = dirty;
            self.events.send(EditorEvent::DirtyChanged { dirty });
        }
    }

    fn prune_selection(&mut self) {
        let selected: Vec<ObjectId> = self
            .selection
            .iter()
            .copied()
            .filter(|&id| self.scene.contains(id))
            .collect();
        if selected != self.selection {
            self.selection = selected.clone();
            self.events.send(EditorEvent::SelectionChanged { selected });
        }
    }

    fn linked_non_roots(&self, ids: &[ObjectId]) -> Vec<ObjectId> {
        ids.iter()
            .copied()
            .filter(|&id| {
                self.scene
                    .object(id)
                    .is_some_and(|o| o.is_prefab_child() && !o.is_prefab_root())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::PropertyValue;

    use crate::command::CreateKind;

    fn session() -> EditorSession {
        EditorSession::new(AssetStore::new("res://"))
    }

    fn spawn_pair(session: &mut EditorSession) -> (ObjectId, ObjectId) {
        let root = session.scene_mut().spawn("root");
        let child = session.scene_mut().spawn("child");
        session.scene_mut().insert_at(child, Some(root), 0).unwrap();
        (root, child)
    }

    #[test]
    fn mutations_mark_the_session_dirty() {
        let mut s = session();
        assert!(!s.is_dirty());
        s.create_game_objects(vec![CreateRequest {
            parent: None,
            kind: CreateKind::Empty,
        }])
        .unwrap();
        assert!(s.is_dirty());
        assert!(s
            .events()
            .drain()
            .contains(&EditorEvent::DirtyChanged { dirty: true }));

        s.mark_saved();
        assert!(!s.is_dirty());
    }

    #[test]
    fn delete_prunes_the_selection() {
        let mut s = session();
        let (root, child) = spawn_pair(&mut s);
        s.select(vec![root, child]);
        s.delete_game_objects(&[root]).unwrap();
        assert!(s.selection().is_empty());
        assert!(!s.scene().contains(child));
    }

    #[test]
    fn delete_inside_a_prefab_instance_is_one_undo_step() {
        let mut s = session();
        let (root, child) = spawn_pair(&mut s);
        s.create_prefab(root, "res://prefabs/pair.prefab").unwrap();
        assert!(s.is_prefab_child(child));

        s.delete_game_objects(&[child]).unwrap();
        assert!(!s.scene().contains(child));
        match s.history().last_command() {
            Some(EditCommand::Group(group)) => {
                assert!(matches!(
                    group.commands(),
                    [
                        EditCommand::BreakPrefabLinks(_),
                        EditCommand::DeleteGameObjects(_)
                    ]
                ));
            }
            other => panic!("expected a group entry, got {other:?}"),
        }

        assert!(s.undo().unwrap());
        assert!(s.scene().contains(child));
        assert!(s.is_prefab_child(child));
    }

    #[test]
    fn reparenting_a_prefab_member_breaks_its_link() {
        let mut s = session();
        let (root, child) = spawn_pair(&mut s);
        s.create_prefab(root, "res://prefabs/pair.prefab").unwrap();
        let outsider = s.scene_mut().spawn("outsider");

        s.update_hierarchy(&[child], outsider, Placement::Inside)
            .unwrap();
        assert_eq!(s.scene().parent_of(child), Some(outsider));
        assert!(!s.is_prefab_child(child));

        assert!(s.undo().unwrap());
        assert_eq!(s.scene().parent_of(child), Some(root));
        assert!(s.is_prefab_child(child));
    }

    #[test]
    fn copy_paste_round_trips_through_the_clipboard() {
        let mut s = session();
        let (root, _) = spawn_pair(&mut s);
        s.scene_mut().object_mut(root).unwrap().name = "pair".into();

        s.copy_game_objects(&[root]).unwrap();
        s.paste_game_objects(None).unwrap();

        let roots: Vec<String> = s
            .scene()
            .objects_in_display_order()
            .into_iter()
            .filter(|&id| s.scene().parent_of(id).is_none())
            .map(|id| s.scene().object(id).unwrap().name.clone())
            .collect();
        assert_eq!(roots, ["pair", "pair"]);
    }

    #[test]
    fn in_flight_guard_rejects_a_second_edit() {
        let mut s = session();
        let (root, _) = spawn_pair(&mut s);
        let target = PropertyTarget::GameObject(root);

        let pending = s
            .begin_property_edit(target.clone(), "name", EditKind::Text)
            .unwrap();
        assert!(matches!(
            s.begin_property_edit(target.clone(), "name", EditKind::Text),
            Err(EditError::EditInFlight(_))
        ));
        // Direct writes to the same target are refused too.
        assert!(matches!(
            s.set_object_property(root, "name", &PropertyValue::Text("blocked".into())),
            Err(EditError::EditInFlight(_))
        ));

        s.complete_property_edit(pending, PropertySnapshot::Plain(PropertyValue::Text("done".into())))
            .unwrap();
        assert_eq!(s.scene().object(root).unwrap().name, "done");
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut s = session();
        let (root, _) = spawn_pair(&mut s);
        let target = PropertyTarget::GameObject(root);

        let stale = s
            .begin_property_edit(target.clone(), "name", EditKind::Text)
            .unwrap();
        s.cancel_property_edit(&stale);
        let fresh = s
            .begin_property_edit(target.clone(), "name", EditKind::Text)
            .unwrap();

        s.complete_property_edit(stale, PropertySnapshot::Plain(PropertyValue::Text("old".into())))
            .unwrap();
        assert_eq!(s.scene().object(root).unwrap().name, "root");

        s.complete_property_edit(fresh, PropertySnapshot::Plain(PropertyValue::Text("new".into())))
            .unwrap();
        assert_eq!(s.scene().object(root).unwrap().name, "new");
    }

    #[test]
    fn reference_edit_fails_without_a_resolvable_asset() {
        let mut s = session();
        let (root, _) = spawn_pair(&mut s);
        let component = s
            .scene_mut()
            .add_component(root, "MeshRenderer", Vec::new())
            .unwrap();

        let result = s.set_component_property(
            root,
            component,
            "mesh",
            &PropertyValue::MeshRef {
                source: "res://meshes/rock.gltf".into(),
            },
        );
        assert!(matches!(result, Err(EditError::ResourceResolution(_))));
    }

    #[test]
    fn undo_restores_selection_validity() {
        let mut s = session();
        let (root, child) = spawn_pair(&mut s);
        s.delete_game_objects(&[root]).unwrap();
        assert!(s.undo().unwrap());
        assert!(s.scene().contains(root));
        assert!(s.scene().contains(child));
        assert!(s.redo().unwrap());
        assert!(!s.scene().contains(root));
    }
}
