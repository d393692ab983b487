//! Whole-object serialization: subtree snapshots and re-instantiation.
//!
//! A [`SerializedNode`] is a self-contained copy of an object subtree —
//! the form used for delete/undo capture, duplication, clipboard payloads
//! and prefab definitions. Instantiation spawns the tree back into a
//! scene, remapping internal object references through a source→new id
//! table; references pointing outside the snapshot are left unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::{ComponentId, ObjectId};
use crate::scene::{Component, Extras, GameObject, LocalTransform, Scene, SceneError, SceneResult};
use crate::value::PropertyValue;

/// A single component's serialized data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedComponent {
    /// Original component id, used for id preservation on restore.
    pub source_id: ComponentId,
    pub type_name: String,
    pub linked_id: Option<String>,
    pub properties: Vec<(String, PropertyValue)>,
}

impl SerializedComponent {
    pub fn capture(component: &Component) -> Self {
        Self {
            source_id: component.id(),
            type_name: component.type_name().to_owned(),
            linked_id: component.linked_id.clone(),
            properties: component.properties().to_vec(),
        }
    }
}

/// A serialized object subtree. Children are stored in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Original object id, used to build the remap table and for id
    /// preservation on restore.
    pub source_id: ObjectId,
    pub name: String,
    pub active: bool,
    pub transform: LocalTransform,
    pub extras: Extras,
    pub components: Vec<SerializedComponent>,
    pub children: Vec<SerializedNode>,
}

impl SerializedNode {
    /// Total number of nodes in the snapshot.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth-first search for a node by its prefab linked id.
    pub fn find_by_linked_id(&self, linked_id: &str) -> Option<&SerializedNode> {
        if self.extras.linked_id.as_deref() == Some(linked_id) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|c| c.find_by_linked_id(linked_id))
    }
}

/// Id handling when a snapshot is instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdPolicy {
    /// Keep source ids where still free (undo of a delete, history
    /// replay); a fresh id is substituted only on collision.
    Preserve,
    /// Always allocate fresh ids (paste, duplicate, prefab spawn).
    Fresh,
}

/// Captures the subtree rooted at `id`.
pub fn snapshot_node(scene: &Scene, id: ObjectId) -> SceneResult<SerializedNode> {
    let obj = scene.object(id).ok_or(SceneError::ObjectNotFound(id))?;
    let children = scene
        .children_of(id)
        .to_vec()
        .into_iter()
        .map(|child| snapshot_node(scene, child))
        .collect::<SceneResult<Vec<_>>>()?;
    Ok(SerializedNode {
        source_id: id,
        name: obj.name.clone(),
        active: obj.active,
        transform: obj.transform.local,
        extras: obj.extras.clone(),
        components: obj.components().iter().map(SerializedComponent::capture).collect(),
        children,
    })
}

/// Outcome of [`instantiate`]: the new root and every created id in
/// depth-first order (root first).
#[derive(Debug)]
pub struct Instantiated {
    pub root: ObjectId,
    pub created: Vec<ObjectId>,
}

/// Spawns the snapshot into `scene` under `parent` at sibling `index`.
///
/// Object references inside component properties (and prefab-root
/// back-references in extras) that point at snapshot members are
/// remapped to the new ids; references to objects outside the snapshot
/// are left as captured.
pub fn instantiate(
    scene: &mut Scene,
    snapshot: &SerializedNode,
    parent: Option<ObjectId>,
    index: usize,
    policy: IdPolicy,
) -> SceneResult<Instantiated> {
    if let Some(p) = parent
        && !scene.contains(p)
    {
        return Err(SceneError::ObjectNotFound(p));
    }

    // Pass 1: allocate an id per snapshot node.
    let mut mapping: HashMap<ObjectId, ObjectId> = HashMap::new();
    assign_ids(scene, snapshot, policy, &mut mapping);

    // Pass 2: build and register every object, remapping references.
    let mut created = Vec::with_capacity(snapshot.node_count());
    build_objects(scene, snapshot, policy, &mapping, &mut created);

    // Pass 3: wire the tree. The root goes to the requested position,
    // children are appended in snapshot order.
    let root = mapping[&snapshot.source_id];
    scene.insert_at(root, parent, index)?;
    attach_children(scene, snapshot, &mapping)?;

    Ok(Instantiated { root, created })
}

/// Rebuilds a removed component on `object` at `index` from a snapshot.
pub fn restore_component(
    scene: &mut Scene,
    object: ObjectId,
    snapshot: &SerializedComponent,
    index: usize,
    policy: IdPolicy,
) -> SceneResult<ComponentId> {
    if !scene.contains(object) {
        return Err(SceneError::ObjectNotFound(object));
    }
    let id = match policy {
        IdPolicy::Preserve => snapshot.source_id,
        IdPolicy::Fresh => scene.alloc_component_id(),
    };
    let mut component = Component::new(id, snapshot.type_name.clone(), snapshot.properties.clone());
    component.linked_id = snapshot.linked_id.clone();
    scene.insert_component_at(object, component, index)?;
    Ok(id)
}

fn assign_ids(
    scene: &mut Scene,
    node: &SerializedNode,
    policy: IdPolicy,
    mapping: &mut HashMap<ObjectId, ObjectId>,
) {
    let id = match policy {
        IdPolicy::Preserve if !scene.contains(node.source_id) => node.source_id,
        _ => scene.alloc_object_id(),
    };
    mapping.insert(node.source_id, id);
    for child in &node.children {
        assign_ids(scene, child, policy, mapping);
    }
}

fn build_objects(
    scene: &mut Scene,
    node: &SerializedNode,
    policy: IdPolicy,
    mapping: &HashMap<ObjectId, ObjectId>,
    created: &mut Vec<ObjectId>,
) {
    let id = mapping[&node.source_id];
    let mut obj = GameObject::new(id, node.name.clone());
    obj.active = node.active;
    obj.transform.local = node.transform;
    obj.extras = node.extras.clone();
    if let Some(root_ref) = obj.extras.prefab_root_id
        && let Some(&mapped) = mapping.get(&root_ref)
    {
        obj.extras.prefab_root_id = Some(mapped);
    }
    scene.register_detached(obj);
    created.push(id);

    for comp in &node.components {
        let comp_id = match policy {
            IdPolicy::Preserve => comp.source_id,
            IdPolicy::Fresh => scene.alloc_component_id(),
        };
        let properties = comp
            .properties
            .iter()
            .map(|(n, v)| (n.clone(), remap_value(v, mapping)))
            .collect();
        let mut component = Component::new(comp_id, comp.type_name.clone(), properties);
        component.linked_id = comp.linked_id.clone();
        // The owner was registered just above.
        let _ = scene.insert_component_at(id, component, usize::MAX);
    }

    for child in &node.children {
        build_objects(scene, child, policy, mapping, created);
    }
}

fn attach_children(
    scene: &mut Scene,
    node: &SerializedNode,
    mapping: &HashMap<ObjectId, ObjectId>,
) -> SceneResult {
    let parent = mapping[&node.source_id];
    for (i, child) in node.children.iter().enumerate() {
        scene.insert_at(mapping[&child.source_id], Some(parent), i)?;
        attach_children(scene, child, mapping)?;
    }
    Ok(())
}

fn remap_value(value: &PropertyValue, mapping: &HashMap<ObjectId, ObjectId>) -> PropertyValue {
    match value {
        PropertyValue::NodeRef(id) => {
            PropertyValue::NodeRef(mapping.get(id).copied().unwrap_or(*id))
        }
        PropertyValue::List(items) => {
            PropertyValue::List(items.iter().map(|v| remap_value(v, mapping)).collect())
        }
        PropertyValue::Record(fields) => PropertyValue::Record(
            fields
                .iter()
                .map(|(n, v)| (n.clone(), remap_value(v, mapping)))
                .collect(),
        ),
        other => other.clone(),
    }
}
