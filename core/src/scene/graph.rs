//! The scene arena.
//!
//! A [`Scene`] owns every [`GameObject`] and addresses them by stable id;
//! parent/child links are ids, so the forest invariant (no node is its
//! own ancestor) is enforced in exactly one place: [`Scene::insert_at`].
//!
//! Root-level objects keep an explicit display order (`root_order`), and
//! each object keeps its children ordered; both orders are significant
//! and survive every operation here.

use std::collections::HashMap;
use std::fmt;

use crate::id::{ComponentId, ObjectId};
use crate::scene::object::{Component, GameObject};
use crate::value::PropertyValue;

/// Errors from structural scene operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No object with this id exists in the scene.
    ObjectNotFound(ObjectId),
    /// The object exists but carries no such component.
    ComponentNotFound {
        object: ObjectId,
        component: ComponentId,
    },
    /// The requested move would make a node its own ancestor.
    StructuralCycle { node: ObjectId, target: ObjectId },
    /// An insertion index past the end of the destination child list.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectNotFound(id) => write!(f, "object {id} not found"),
            Self::ComponentNotFound { object, component } => {
                write!(f, "component {component} not found on object {object}")
            }
            Self::StructuralCycle { node, target } => {
                write!(f, "moving {node} under {target} would create a cycle")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "insertion index {index} out of range (len {len})")
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Result type for scene operations.
pub type SceneResult<T = ()> = Result<T, SceneError>;

/// An id-addressed forest of game objects.
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<ObjectId, GameObject>,
    root_order: Vec<ObjectId>,
    next_object: u64,
    next_component: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            root_order: Vec::new(),
            next_object: 1,
            next_component: 1,
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// Ordered root-level object ids.
    pub fn root_order(&self) -> &[ObjectId] {
        &self.root_order
    }

    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(&id).and_then(|o| o.transform.parent())
    }

    /// Ordered children of `id`, or an empty slice for unknown ids.
    pub fn children_of(&self, id: ObjectId) -> &[ObjectId] {
        self.objects
            .get(&id)
            .map(|o| o.transform.children())
            .unwrap_or(&[])
    }

    /// Index of `id` among its siblings: its position in the parent's
    /// child list, or in the root order for root-level objects.
    pub fn index_in_parent(&self, id: ObjectId) -> Option<usize> {
        let obj = self.objects.get(&id)?;
        let siblings = match obj.transform.parent() {
            Some(parent) => self.children_of(parent),
            None => &self.root_order,
        };
        siblings.iter().position(|&c| c == id)
    }

    /// Returns `true` if `ancestor` appears on the parent chain of `node`.
    /// An object is not its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: ObjectId, node: ObjectId) -> bool {
        let mut cursor = self.parent_of(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    /// Spawns an empty object at the end of the root order.
    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.alloc_object_id();
        self.objects.insert(id, GameObject::new(id, name));
        self.root_order.push(id);
        id
    }

    /// Registers a prebuilt object without attaching it anywhere.
    ///
    /// Used by snapshot instantiation, which attaches the node afterwards
    /// via [`insert_at`](Self::insert_at). The object's id counters are
    /// advanced past `obj.id()` so preserved ids never collide with
    /// freshly allocated ones.
    pub(crate) fn register_detached(&mut self, obj: GameObject) {
        self.next_object = self.next_object.max(obj.id().raw() + 1);
        for comp in obj.components() {
            self.next_component = self.next_component.max(comp.id().raw() + 1);
        }
        self.objects.insert(obj.id(), obj);
    }

    pub(crate) fn alloc_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object);
        self.next_object += 1;
        id
    }

    pub(crate) fn alloc_component_id(&mut self) -> ComponentId {
        let id = ComponentId::new(self.next_component);
        self.next_component += 1;
        id
    }

    /// Detaches `id` from its parent (or the root order), leaving it in
    /// the arena with no position. Callers must re-insert it.
    pub fn detach(&mut self, id: ObjectId) -> SceneResult {
        let parent = self
            .objects
            .get(&id)
            .ok_or(SceneError::ObjectNotFound(id))?
            .transform
            .parent();
        match parent {
            Some(p) => {
                if let Some(parent_obj) = self.objects.get_mut(&p) {
                    parent_obj.transform.children.retain(|&c| c != id);
                }
            }
            None => self.root_order.retain(|&c| c != id),
        }
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.transform.parent = None;
        }
        Ok(())
    }

    /// Moves `id` under `parent` (or to root level for `None`) at the
    /// given sibling index.
    ///
    /// Fails with [`SceneError::StructuralCycle`] if `parent` is `id`
    /// itself or any of its descendants; nothing is mutated on failure.
    pub fn insert_at(
        &mut self,
        id: ObjectId,
        parent: Option<ObjectId>,
        index: usize,
    ) -> SceneResult {
        if !self.contains(id) {
            return Err(SceneError::ObjectNotFound(id));
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(SceneError::ObjectNotFound(p));
            }
            if p == id || self.is_ancestor_of(id, p) {
                return Err(SceneError::StructuralCycle {
                    node: id,
                    target: p,
                });
            }
        }
        let len = match parent {
            Some(p) => self.children_of(p).len(),
            None => self.root_order.len(),
        };
        // The node may still be attached somewhere; its own slot does not
        // count toward the destination length once detached.
        let occupies_destination = self.parent_of(id) == parent && self.contains(id) && {
            match parent {
                Some(p) => self.children_of(p).contains(&id),
                None => self.root_order.contains(&id),
            }
        };
        let len = if occupies_destination { len - 1 } else { len };
        if index > len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }

        self.detach(id)?;
        match parent {
            Some(p) => {
                let parent_obj = self
                    .objects
                    .get_mut(&p)
                    .ok_or(SceneError::ObjectNotFound(p))?;
                parent_obj.transform.children.insert(index, id);
            }
            None => self.root_order.insert(index, id),
        }
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.transform.parent = parent;
        }
        Ok(())
    }

    /// Removes `id` and its whole subtree, returning the removed ids in
    /// depth-first order (root of the removed subtree first).
    pub fn remove_subtree(&mut self, id: ObjectId) -> SceneResult<Vec<ObjectId>> {
        if !self.contains(id) {
            return Err(SceneError::ObjectNotFound(id));
        }
        self.detach(id)?;
        let mut removed = Vec::new();
        self.collect_subtree(id, &mut removed);
        for rid in &removed {
            self.objects.remove(rid);
        }
        Ok(removed)
    }

    fn collect_subtree(&self, id: ObjectId, out: &mut Vec<ObjectId>) {
        out.push(id);
        for &child in self.children_of(id) {
            self.collect_subtree(child, out);
        }
    }

    /// All object ids in on-screen depth-first display order.
    pub fn objects_in_display_order(&self) -> Vec<ObjectId> {
        let mut out = Vec::with_capacity(self.objects.len());
        for &root in &self.root_order {
            self.collect_subtree(root, &mut out);
        }
        out
    }

    /// Attaches a new component of `type_name` with the given property
    /// bag, returning its id.
    pub fn add_component(
        &mut self,
        object: ObjectId,
        type_name: impl Into<String>,
        properties: Vec<(String, PropertyValue)>,
    ) -> SceneResult<ComponentId> {
        if !self.contains(object) {
            return Err(SceneError::ObjectNotFound(object));
        }
        let id = self.alloc_component_id();
        let comp = Component::new(id, type_name, properties);
        if let Some(obj) = self.objects.get_mut(&object) {
            obj.components.push(comp);
        }
        Ok(id)
    }

    /// Re-attaches a previously removed component at its original index.
    pub fn insert_component_at(
        &mut self,
        object: ObjectId,
        component: Component,
        index: usize,
    ) -> SceneResult {
        self.next_component = self.next_component.max(component.id().raw() + 1);
        let obj = self
            .objects
            .get_mut(&object)
            .ok_or(SceneError::ObjectNotFound(object))?;
        let index = index.min(obj.components.len());
        obj.components.insert(index, component);
        Ok(())
    }

    /// Detaches a component, returning its index and the component.
    pub fn remove_component(
        &mut self,
        object: ObjectId,
        component: ComponentId,
    ) -> SceneResult<(usize, Component)> {
        let obj = self
            .objects
            .get_mut(&object)
            .ok_or(SceneError::ObjectNotFound(object))?;
        let index = obj
            .components
            .iter()
            .position(|c| c.id() == component)
            .ok_or(SceneError::ComponentNotFound { object, component })?;
        Ok((index, obj.components.remove(index)))
    }

    /// Finds the object owning a component.
    pub fn component_owner(&self, component: ComponentId) -> Option<ObjectId> {
        self.objects
            .values()
            .find(|o| o.component(component).is_some())
            .map(|o| o.id())
    }
}
