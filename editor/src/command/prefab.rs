//! Prefab linkage commands.
//!
//! A prefab instance is tied to its template through extras markers:
//! the instance root carries the template url, every member carries a
//! back-reference to the root, and members and components carry linked
//! ids naming their counterpart in the template definition. These
//! commands create, break, and synchronize that linkage.

use lattice_core::{
    ComponentId, Extras, ObjectId, Scene, SerializedNode, snapshot_node,
};

use crate::command::EditContext;
use crate::error::{EditError, EditResult};
use crate::resources::Asset;

#[derive(Debug, Clone)]
struct LinkState {
    object: ObjectId,
    extras: Extras,
    component_links: Vec<(ComponentId, Option<String>)>,
}

fn capture_links(scene: &Scene, targets: &[ObjectId]) -> EditResult<Vec<LinkState>> {
    targets
        .iter()
        .map(|&id| {
            let obj = scene
                .object(id)
                .ok_or_else(|| EditError::TargetNotFound(format!("object {id}")))?;
            Ok(LinkState {
                object: id,
                extras: obj.extras.clone(),
                component_links: obj
                    .components()
                    .iter()
                    .map(|c| (c.id(), c.linked_id.clone()))
                    .collect(),
            })
        })
        .collect()
}

fn restore_links(ctx: &mut EditContext<'_>, states: &[LinkState]) -> EditResult {
    for state in states {
        let obj = ctx
            .scene
            .object_mut(state.object)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {}", state.object)))?;
        obj.extras = state.extras.clone();
        for (component, linked_id) in &state.component_links {
            if let Some(comp) = obj.component_mut(*component) {
                comp.linked_id = linked_id.clone();
            }
        }
    }
    Ok(())
}

/// Clears prefab linkage markers on the given nodes.
///
/// Grouped before any delete or reparent that would otherwise leave a
/// dangling link between a detached node and a prefab root it no longer
/// structurally matches.
#[derive(Debug)]
pub struct BreakPrefabLinks {
    captured: Vec<LinkState>,
}

impl BreakPrefabLinks {
    pub fn capture(scene: &Scene, targets: &[ObjectId]) -> EditResult<Self> {
        Ok(Self {
            captured: capture_links(scene, targets)?,
        })
    }

    /// Nodes whose linkage this command clears.
    pub fn targets(&self) -> Vec<ObjectId> {
        self.captured.iter().map(|s| s.object).collect()
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        for state in &self.captured {
            let obj = ctx
                .scene
                .object_mut(state.object)
                .ok_or_else(|| EditError::TargetNotFound(format!("object {}", state.object)))?;
            obj.extras.clear();
            for comp in obj.components_mut() {
                comp.linked_id = None;
            }
        }
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        restore_links(ctx, &self.captured)
    }
}

fn stamp_instance(
    ctx: &mut EditContext<'_>,
    definition: &SerializedNode,
    root: ObjectId,
    url: &str,
) -> EditResult {
    stamp_node(ctx, definition, root, url, true)
}

fn stamp_node(
    ctx: &mut EditContext<'_>,
    node: &SerializedNode,
    root: ObjectId,
    url: &str,
    is_root: bool,
) -> EditResult {
    let id = node.source_id;
    let obj = ctx
        .scene
        .object_mut(id)
        .ok_or_else(|| EditError::TargetNotFound(format!("object {id}")))?;
    if is_root {
        obj.extras.prefab = Some(url.to_owned());
        obj.extras.prefab_root_id = None;
    } else {
        obj.extras.prefab = None;
        obj.extras.prefab_root_id = Some(root);
    }
    obj.extras.linked_id = node.extras.linked_id.clone();
    for comp in &node.components {
        if let Some(live) = obj.component_mut(comp.source_id) {
            live.linked_id = comp.linked_id.clone();
        }
    }
    for child in &node.children {
        stamp_node(ctx, child, root, url, false)?;
    }
    Ok(())
}

fn assign_linked_ids(node: &mut SerializedNode, next: &mut u64) {
    node.extras.linked_id = Some(format!("n-{next}"));
    *next += 1;
    for comp in &mut node.components {
        comp.linked_id = Some(format!("c-{next}"));
        *next += 1;
    }
    for child in &mut node.children {
        assign_linked_ids(child, next);
    }
}

/// Materializes a prefab definition from a live subtree and links the
/// subtree to it as the first instance.
#[derive(Debug)]
pub struct CreatePrefab {
    source: ObjectId,
    url: String,
    definition: Option<SerializedNode>,
    prior: Vec<LinkState>,
}

impl CreatePrefab {
    pub fn capture(scene: &Scene, source: ObjectId, url: impl Into<String>) -> EditResult<Self> {
        let mut members = Vec::new();
        collect_subtree(scene, source, &mut members);
        let prior = capture_links(scene, &members)?;
        Ok(Self {
            source,
            url: url.into(),
            definition: None,
            prior,
        })
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        if self.definition.is_none() {
            let mut definition = snapshot_node(ctx.scene, self.source)?;
            let mut next = 1;
            assign_linked_ids(&mut definition, &mut next);
            self.definition = Some(definition);
        }
        // Kept from the first apply, so redo stamps identical linkage.
        let definition = self
            .definition
            .clone()
            .ok_or_else(|| EditError::InvalidState("prefab definition missing".into()))?;
        ctx.assets
            .register(Asset::prefab(self.url.clone(), definition.clone()));
        stamp_instance(ctx, &definition, self.source, &self.url)
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        ctx.assets.remove(&self.url);
        restore_links(ctx, &self.prior)
    }
}

fn collect_subtree(scene: &Scene, id: ObjectId, out: &mut Vec<ObjectId>) {
    out.push(id);
    for &child in scene.children_of(id) {
        collect_subtree(scene, child, out);
    }
}

/// Propagates a live instance's current state back into the shared
/// template definition. Other live instances are unaffected until they
/// are explicitly reverted or refreshed.
#[derive(Debug)]
pub struct ApplyPrefabInstance {
    instance_root: ObjectId,
    url: String,
    prior_definition: Option<SerializedNode>,
    new_definition: Option<SerializedNode>,
}

impl ApplyPrefabInstance {
    pub fn capture(scene: &Scene, instance_root: ObjectId) -> EditResult<Self> {
        let obj = scene
            .object(instance_root)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {instance_root}")))?;
        let url = obj.extras.prefab.clone().ok_or_else(|| {
            EditError::InvalidState(format!("object {instance_root} is not a prefab instance root"))
        })?;
        Ok(Self {
            instance_root,
            url,
            prior_definition: None,
            new_definition: None,
        })
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let asset = ctx
            .assets
            .get(&self.url)
            .ok_or_else(|| EditError::TargetNotFound(format!("asset {}", self.url)))?;
        if self.prior_definition.is_none() {
            self.prior_definition = asset.definition().cloned();
        }
        if self.new_definition.is_none() {
            self.new_definition = Some(snapshot_node(ctx.scene, self.instance_root)?);
        }
        let definition = self
            .new_definition
            .clone()
            .ok_or_else(|| EditError::InvalidState("instance snapshot missing".into()))?;
        let asset = ctx
            .assets
            .get_mut(&self.url)
            .ok_or_else(|| EditError::TargetNotFound(format!("asset {}", self.url)))?;
        asset.set_definition(definition);
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let prior = self
            .prior_definition
            .clone()
            .ok_or_else(|| EditError::InvalidState("prefab definition never captured".into()))?;
        let asset = ctx
            .assets
            .get_mut(&self.url)
            .ok_or_else(|| EditError::TargetNotFound(format!("asset {}", self.url)))?;
        asset.set_definition(prior);
        Ok(())
    }
}

/// Resets an instance's overridden values back to the template's
/// defaults, matching members and components by linked id. Objects and
/// components added to the instance after linking are left alone.
#[derive(Debug)]
pub struct RevertPrefabInstance {
    instance_root: ObjectId,
    url: String,
    prior: Option<SerializedNode>,
}

impl RevertPrefabInstance {
    pub fn capture(scene: &Scene, instance_root: ObjectId) -> EditResult<Self> {
        let obj = scene
            .object(instance_root)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {instance_root}")))?;
        let url = obj.extras.prefab.clone().ok_or_else(|| {
            EditError::InvalidState(format!("object {instance_root} is not a prefab instance root"))
        })?;
        Ok(Self {
            instance_root,
            url,
            prior: None,
        })
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        if self.prior.is_none() {
            self.prior = Some(snapshot_node(ctx.scene, self.instance_root)?);
        }
        let definition = ctx
            .assets
            .get(&self.url)
            .and_then(|a| a.definition())
            .cloned()
            .ok_or_else(|| EditError::TargetNotFound(format!("prefab asset {}", self.url)))?;
        write_defaults(ctx.scene, self.instance_root, &definition, true)
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let prior = self
            .prior
            .clone()
            .ok_or_else(|| EditError::InvalidState("instance state never captured".into()))?;
        // Snapshot source ids are the live ids, so restore is direct.
        restore_values(ctx.scene, &prior)
    }
}

/// Writes a definition node's values onto the live member matched by
/// linked id (the root is matched positionally).
fn write_defaults(
    scene: &mut Scene,
    instance_root: ObjectId,
    node: &SerializedNode,
    is_root: bool,
) -> EditResult {
    let live_id = if is_root {
        Some(instance_root)
    } else {
        node.extras
            .linked_id
            .as_deref()
            .and_then(|linked| find_member(scene, instance_root, linked))
    };
    if let Some(id) = live_id {
        let obj = scene
            .object_mut(id)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {id}")))?;
        obj.name = node.name.clone();
        obj.active = node.active;
        obj.transform.local = node.transform;
        for comp in &node.components {
            if let Some(linked) = comp.linked_id.as_deref()
                && let Some(live) = obj
                    .components_mut()
                    .iter_mut()
                    .find(|c| c.linked_id.as_deref() == Some(linked))
            {
                live.replace_properties(comp.properties.clone());
            }
        }
    }
    for child in &node.children {
        write_defaults(scene, instance_root, child, false)?;
    }
    Ok(())
}

fn find_member(scene: &Scene, instance_root: ObjectId, linked_id: &str) -> Option<ObjectId> {
    let mut members = Vec::new();
    collect_subtree(scene, instance_root, &mut members);
    members.into_iter().find(|&id| {
        scene
            .object(id)
            .is_some_and(|o| o.extras.linked_id.as_deref() == Some(linked_id))
    })
}

fn restore_values(scene: &mut Scene, node: &SerializedNode) -> EditResult {
    let obj = scene
        .object_mut(node.source_id)
        .ok_or_else(|| EditError::TargetNotFound(format!("object {}", node.source_id)))?;
    obj.name = node.name.clone();
    obj.active = node.active;
    obj.transform.local = node.transform;
    for comp in &node.components {
        if let Some(live) = obj.component_mut(comp.source_id) {
            live.replace_properties(comp.properties.clone());
        }
    }
    for child in &node.children {
        restore_values(scene, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::PropertyValue;

    use crate::events::EventQueue;
    use crate::metadata::PropertyRegistry;
    use crate::resources::AssetStore;

    const URL: &str = "res://prefabs/tree.prefab";

    struct Fixture {
        scene: Scene,
        assets: AssetStore,
        metadata: PropertyRegistry,
        events: EventQueue,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                assets: AssetStore::new("res://"),
                metadata: PropertyRegistry::with_builtins(),
                events: EventQueue::new(),
            }
        }

        fn ctx(&mut self) -> EditContext<'_> {
            EditContext {
                scene: &mut self.scene,
                assets: &mut self.assets,
                metadata: &self.metadata,
                events: &self.events,
            }
        }
    }

    fn tree(scene: &mut Scene) -> (ObjectId, ObjectId) {
        let root = scene.spawn("tree");
        let leaf = scene.spawn("leaf");
        scene.insert_at(leaf, Some(root), 0).unwrap();
        (root, leaf)
    }

    #[test]
    fn create_prefab_links_instance_and_registers_asset() {
        let mut f = Fixture::new();
        let (root, leaf) = tree(&mut f.scene);
        f.scene.add_component(leaf, "Light", Vec::new()).unwrap();

        let mut cmd = CreatePrefab::capture(&f.scene, root, URL).unwrap();
        cmd.apply(&mut f.ctx()).unwrap();

        assert!(f.assets.get(URL).unwrap().definition().is_some());
        let root_obj = f.scene.object(root).unwrap();
        assert!(root_obj.is_prefab_root());
        assert!(root_obj.extras.linked_id.is_some());
        let leaf_obj = f.scene.object(leaf).unwrap();
        assert_eq!(leaf_obj.extras.prefab_root_id, Some(root));
        assert!(leaf_obj.components()[0].linked_id.is_some());

        cmd.revert(&mut f.ctx()).unwrap();
        assert!(f.assets.get(URL).is_none());
        assert!(f.scene.object(root).unwrap().extras.is_empty());
        assert!(f.scene.object(leaf).unwrap().components()[0].linked_id.is_none());
    }

    #[test]
    fn break_links_clears_and_restores() {
        let mut f = Fixture::new();
        let (root, leaf) = tree(&mut f.scene);
        CreatePrefab::capture(&f.scene, root, URL)
            .unwrap()
            .apply(&mut f.ctx())
            .unwrap();
        let leaf_extras = f.scene.object(leaf).unwrap().extras.clone();

        let mut cmd = BreakPrefabLinks::capture(&f.scene, &[leaf]).unwrap();
        cmd.apply(&mut f.ctx()).unwrap();
        assert!(f.scene.object(leaf).unwrap().extras.is_empty());
        // The root is untouched.
        assert!(f.scene.object(root).unwrap().is_prefab_root());

        cmd.revert(&mut f.ctx()).unwrap();
        assert_eq!(f.scene.object(leaf).unwrap().extras, leaf_extras);
    }

    #[test]
    fn apply_instance_updates_definition_only() {
        let mut f = Fixture::new();
        let (root, leaf) = tree(&mut f.scene);
        CreatePrefab::capture(&f.scene, root, URL)
            .unwrap()
            .apply(&mut f.ctx())
            .unwrap();

        // A second live instance keeps its own state.
        let definition = f.assets.get(URL).unwrap().definition().cloned().unwrap();
        let second = lattice_core::instantiate(
            &mut f.scene,
            &definition,
            None,
            1,
            lattice_core::IdPolicy::Fresh,
        )
        .unwrap()
        .root;

        f.scene.object_mut(leaf).unwrap().name = "golden leaf".into();
        let mut cmd = ApplyPrefabInstance::capture(&f.scene, root).unwrap();
        cmd.apply(&mut f.ctx()).unwrap();

        let updated = f.assets.get(URL).unwrap().definition().unwrap();
        assert_eq!(updated.children[0].name, "golden leaf");
        let second_leaf = f.scene.children_of(second)[0];
        assert_eq!(f.scene.object(second_leaf).unwrap().name, "leaf");

        cmd.revert(&mut f.ctx()).unwrap();
        let restored = f.assets.get(URL).unwrap().definition().unwrap();
        assert_eq!(restored.children[0].name, "leaf");
    }

    #[test]
    fn revert_instance_resets_overrides_and_undoes() {
        let mut f = Fixture::new();
        let (root, leaf) = tree(&mut f.scene);
        f.scene
            .add_component(leaf, "Light", vec![("intensity".into(), PropertyValue::Number(1.0))])
            .unwrap();
        CreatePrefab::capture(&f.scene, root, URL)
            .unwrap()
            .apply(&mut f.ctx())
            .unwrap();

        // Override a property and a name on the live instance.
        f.scene.object_mut(leaf).unwrap().name = "burnt leaf".into();
        let comp = f.scene.object(leaf).unwrap().components()[0].id();
        f.scene
            .object_mut(leaf)
            .unwrap()
            .component_mut(comp)
            .unwrap()
            .set_property("intensity", PropertyValue::Number(9.0));

        let mut cmd = RevertPrefabInstance::capture(&f.scene, root).unwrap();
        cmd.apply(&mut f.ctx()).unwrap();
        assert_eq!(f.scene.object(leaf).unwrap().name, "leaf");
        assert_eq!(
            f.scene.object(leaf).unwrap().component(comp).unwrap().property("intensity"),
            Some(&PropertyValue::Number(1.0))
        );

        cmd.revert(&mut f.ctx()).unwrap();
        assert_eq!(f.scene.object(leaf).unwrap().name, "burnt leaf");
        assert_eq!(
            f.scene.object(leaf).unwrap().component(comp).unwrap().property("intensity"),
            Some(&PropertyValue::Number(9.0))
        );
    }
}
