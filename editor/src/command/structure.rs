//! Structural commands: create, delete, paste, duplicate, component
//! attach/detach, and hierarchy reordering.
//!
//! Commands that mint new objects (create, paste, duplicate) use fresh
//! ids on first apply, then re-snapshot what they built so a later redo
//! re-materializes the same ids — history entries recorded after them
//! keep resolving.

use lattice_core::{
    ComponentId, IdPolicy, ObjectId, Scene, SerializedComponent, SerializedNode, hierarchy,
    instantiate, restore_component, snapshot_node,
};

use crate::command::EditContext;
use crate::error::{EditError, EditResult};
use crate::events::EditorEvent;

pub use lattice_core::hierarchy::Placement;

/// Template selected when creating a new object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateKind {
    Empty,
    Mesh,
    Camera,
    Light,
}

impl CreateKind {
    fn object_name(&self) -> &'static str {
        match self {
            Self::Empty => "Game Object",
            Self::Mesh => "Mesh",
            Self::Camera => "Camera",
            Self::Light => "Light",
        }
    }

    fn component_types(&self) -> &'static [&'static str] {
        match self {
            Self::Empty => &[],
            Self::Mesh => &["MeshRenderer"],
            Self::Camera => &["Camera"],
            Self::Light => &["Light"],
        }
    }
}

/// One object to create: its template and destination parent.
#[derive(Clone, Debug)]
pub struct CreateRequest {
    pub parent: Option<ObjectId>,
    pub kind: CreateKind,
}

#[derive(Debug)]
struct Materialized {
    snapshot: SerializedNode,
    parent: Option<ObjectId>,
    index: usize,
}

fn remove_created(
    ctx: &mut EditContext<'_>,
    created: &[ObjectId],
) -> EditResult {
    for &root in created.iter().rev() {
        ctx.scene.remove_subtree(root)?;
    }
    ctx.events.send(EditorEvent::GameObjectsDeleted {
        objects: created.to_vec(),
    });
    Ok(())
}

fn rematerialize(
    ctx: &mut EditContext<'_>,
    materialized: &[Materialized],
) -> EditResult<Vec<ObjectId>> {
    let mut created = Vec::with_capacity(materialized.len());
    for m in materialized {
        let out = instantiate(ctx.scene, &m.snapshot, m.parent, m.index, IdPolicy::Preserve)?;
        created.push(out.root);
    }
    Ok(created)
}

/// Instantiates new objects from per-parent create templates.
#[derive(Debug)]
pub struct CreateGameObjects {
    requests: Vec<CreateRequest>,
    materialized: Vec<Materialized>,
    created: Vec<ObjectId>,
}

impl CreateGameObjects {
    pub fn new(requests: Vec<CreateRequest>) -> Self {
        Self {
            requests,
            materialized: Vec::new(),
            created: Vec::new(),
        }
    }

    pub fn created(&self) -> &[ObjectId] {
        &self.created
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        if self.materialized.is_empty() {
            let mut created = Vec::with_capacity(self.requests.len());
            for request in &self.requests {
                if let Some(parent) = request.parent
                    && !ctx.scene.contains(parent)
                {
                    // Nothing is kept from a partially failed first apply.
                    for &id in created.iter().rev() {
                        let _ = ctx.scene.remove_subtree(id);
                    }
                    return Err(EditError::TargetNotFound(format!("parent {parent}")));
                }
                let id = ctx.scene.spawn(request.kind.object_name());
                if let Some(parent) = request.parent {
                    let index = ctx.scene.children_of(parent).len();
                    ctx.scene.insert_at(id, Some(parent), index)?;
                }
                for type_name in request.kind.component_types() {
                    let properties = ctx.metadata.default_properties(type_name);
                    ctx.scene.add_component(id, *type_name, properties)?;
                }
                created.push(id);
            }
            self.materialized = created
                .iter()
                .map(|&id| {
                    Ok(Materialized {
                        snapshot: snapshot_node(ctx.scene, id)?,
                        parent: ctx.scene.parent_of(id),
                        index: ctx.scene.index_in_parent(id).unwrap_or(0),
                    })
                })
                .collect::<EditResult<Vec<_>>>()?;
            self.created = created;
        } else {
            self.created = rematerialize(ctx, &self.materialized)?;
        }
        ctx.events.send(EditorEvent::GameObjectsAdded {
            objects: self.created.clone(),
        });
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        remove_created(ctx, &self.created)
    }
}

/// Attaches a component of a named type with its default property bag.
#[derive(Debug)]
pub struct AddComponent {
    object: ObjectId,
    type_name: String,
    component: Option<ComponentId>,
    materialized: Option<(SerializedComponent, usize)>,
}

impl AddComponent {
    pub fn new(object: ObjectId, type_name: impl Into<String>) -> Self {
        Self {
            object,
            type_name: type_name.into(),
            component: None,
            materialized: None,
        }
    }

    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let component = match &self.materialized {
            Some((snapshot, index)) => {
                restore_component(ctx.scene, self.object, snapshot, *index, IdPolicy::Preserve)?
            }
            None => {
                let properties = ctx.metadata.default_properties(&self.type_name);
                let id = ctx
                    .scene
                    .add_component(self.object, self.type_name.clone(), properties)?;
                let obj = ctx
                    .scene
                    .object(self.object)
                    .ok_or_else(|| EditError::TargetNotFound(format!("object {}", self.object)))?;
                let index = obj.components().len() - 1;
                let snapshot = obj
                    .component(id)
                    .map(SerializedComponent::capture)
                    .ok_or_else(|| {
                        EditError::TargetNotFound(format!("component {id} on object {}", self.object))
                    })?;
                self.materialized = Some((snapshot, index));
                id
            }
        };
        self.component = Some(component);
        ctx.events.send(EditorEvent::ComponentAdded {
            object: self.object,
            component,
        });
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let component = self
            .component
            .ok_or_else(|| EditError::InvalidState("component never applied".into()))?;
        ctx.scene.remove_component(self.object, component)?;
        ctx.events.send(EditorEvent::ComponentRemoved {
            object: self.object,
            component,
        });
        Ok(())
    }
}

/// Detaches a component, keeping a full snapshot for revert.
#[derive(Debug)]
pub struct RemoveComponent {
    object: ObjectId,
    component: ComponentId,
    snapshot: SerializedComponent,
    index: usize,
}

impl RemoveComponent {
    /// Captures the component's serialized form up front, so revert can
    /// rebuild it even long after the live component is gone.
    pub fn capture(scene: &Scene, object: ObjectId, component: ComponentId) -> EditResult<Self> {
        let obj = scene
            .object(object)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {object}")))?;
        let index = obj
            .components()
            .iter()
            .position(|c| c.id() == component)
            .ok_or_else(|| {
                EditError::TargetNotFound(format!("component {component} on object {object}"))
            })?;
        let snapshot = SerializedComponent::capture(&obj.components()[index]);
        Ok(Self {
            object,
            component,
            snapshot,
            index,
        })
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        ctx.scene.remove_component(self.object, self.component)?;
        ctx.events.send(EditorEvent::ComponentRemoved {
            object: self.object,
            component: self.component,
        });
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        restore_component(
            ctx.scene,
            self.object,
            &self.snapshot,
            self.index,
            IdPolicy::Preserve,
        )?;
        ctx.events.send(EditorEvent::ComponentAdded {
            object: self.object,
            component: self.component,
        });
        Ok(())
    }
}

/// Removes subtrees, keeping their snapshots and positions for revert.
#[derive(Debug)]
pub struct DeleteGameObjects {
    captured: Vec<Materialized>,
    targets: Vec<ObjectId>,
}

impl DeleteGameObjects {
    /// `targets` must be top-level-filtered and in display order; the
    /// session guarantees both.
    pub fn capture(scene: &Scene, targets: &[ObjectId]) -> EditResult<Self> {
        let captured = targets
            .iter()
            .map(|&id| {
                Ok(Materialized {
                    snapshot: snapshot_node(scene, id)?,
                    parent: scene.parent_of(id),
                    index: scene
                        .index_in_parent(id)
                        .ok_or(lattice_core::SceneError::ObjectNotFound(id))?,
                })
            })
            .collect::<Result<Vec<_>, lattice_core::SceneError>>()?;
        Ok(Self {
            captured,
            targets: targets.to_vec(),
        })
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        // Reverse display order keeps earlier sibling indices valid.
        for &id in self.targets.iter().rev() {
            ctx.scene.remove_subtree(id)?;
        }
        ctx.events.send(EditorEvent::GameObjectsDeleted {
            objects: self.targets.clone(),
        });
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let created = rematerialize(ctx, &self.captured)?;
        ctx.events.send(EditorEvent::GameObjectsAdded { objects: created });
        Ok(())
    }
}

/// Spawns clipboard payloads under a target parent.
#[derive(Debug)]
pub struct PasteGameObjects {
    parent: Option<ObjectId>,
    payloads: Vec<SerializedNode>,
    materialized: Vec<Materialized>,
    created: Vec<ObjectId>,
}

impl PasteGameObjects {
    pub fn new(parent: Option<ObjectId>, payloads: Vec<SerializedNode>) -> Self {
        Self {
            parent,
            payloads,
            materialized: Vec::new(),
            created: Vec::new(),
        }
    }

    pub fn created(&self) -> &[ObjectId] {
        &self.created
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        if self.materialized.is_empty() {
            if let Some(parent) = self.parent
                && !ctx.scene.contains(parent)
            {
                return Err(EditError::TargetNotFound(format!("parent {parent}")));
            }
            let base = match self.parent {
                Some(parent) => ctx.scene.children_of(parent).len(),
                None => ctx.scene.root_order().len(),
            };
            let mut created = Vec::with_capacity(self.payloads.len());
            for (i, payload) in self.payloads.iter().enumerate() {
                let out = instantiate(ctx.scene, payload, self.parent, base + i, IdPolicy::Fresh)?;
                created.push(out.root);
            }
            self.materialized = created
                .iter()
                .enumerate()
                .map(|(i, &id)| {
                    Ok(Materialized {
                        snapshot: snapshot_node(ctx.scene, id)?,
                        parent: self.parent,
                        index: base + i,
                    })
                })
                .collect::<EditResult<Vec<_>>>()?;
            self.created = created;
        } else {
            self.created = rematerialize(ctx, &self.materialized)?;
        }
        ctx.events.send(EditorEvent::GameObjectsAdded {
            objects: self.created.clone(),
        });
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        remove_created(ctx, &self.created)
    }
}

/// Deep-clones subtrees, placing each clone right after its source.
#[derive(Debug)]
pub struct DuplicateGameObjects {
    sources: Vec<ObjectId>,
    materialized: Vec<Materialized>,
    created: Vec<ObjectId>,
}

impl DuplicateGameObjects {
    /// `sources` must be top-level-filtered and in display order.
    pub fn new(sources: Vec<ObjectId>) -> Self {
        Self {
            sources,
            materialized: Vec::new(),
            created: Vec::new(),
        }
    }

    pub fn created(&self) -> &[ObjectId] {
        &self.created
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        if self.materialized.is_empty() {
            let mut created = Vec::with_capacity(self.sources.len());
            for &source in &self.sources {
                let snapshot = snapshot_node(ctx.scene, source)?;
                let parent = ctx.scene.parent_of(source);
                let index = ctx
                    .scene
                    .index_in_parent(source)
                    .ok_or(lattice_core::SceneError::ObjectNotFound(source))?
                    + 1;
                let out = instantiate(ctx.scene, &snapshot, parent, index, IdPolicy::Fresh)?;
                created.push(out.root);
            }
            self.materialized = created
                .iter()
                .map(|&id| {
                    Ok(Materialized {
                        snapshot: snapshot_node(ctx.scene, id)?,
                        parent: ctx.scene.parent_of(id),
                        index: ctx.scene.index_in_parent(id).unwrap_or(0),
                    })
                })
                .collect::<EditResult<Vec<_>>>()?;
            self.created = created;
        } else {
            self.created = rematerialize(ctx, &self.materialized)?;
        }
        ctx.events.send(EditorEvent::GameObjectsAdded {
            objects: self.created.clone(),
        });
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        remove_created(ctx, &self.created)
    }
}

/// Moves a set of nodes relative to a target node.
#[derive(Debug)]
pub struct ReorderGameObjects {
    nodes: Vec<ObjectId>,
    target: ObjectId,
    placement: Placement,
    prior: Vec<(ObjectId, Option<ObjectId>, usize)>,
}

impl ReorderGameObjects {
    /// Captures each node's current parent and sibling index.
    pub fn capture(
        scene: &Scene,
        nodes: Vec<ObjectId>,
        target: ObjectId,
        placement: Placement,
    ) -> EditResult<Self> {
        let prior = nodes
            .iter()
            .map(|&id| {
                let index = scene
                    .index_in_parent(id)
                    .ok_or(lattice_core::SceneError::ObjectNotFound(id))?;
                Ok((id, scene.parent_of(id), index))
            })
            .collect::<Result<Vec<_>, lattice_core::SceneError>>()?;
        Ok(Self {
            nodes,
            target,
            placement,
            prior,
        })
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        hierarchy::reorder(ctx.scene, &self.nodes, self.target, self.placement)?;
        ctx.events.send(EditorEvent::HierarchyUpdated);
        Ok(())
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        for &(id, _, _) in &self.prior {
            ctx.scene.detach(id)?;
        }
        // Ascending prior indices keep every later insertion valid.
        let mut restores = self.prior.clone();
        restores.sort_by_key(|&(_, _, index)| index);
        for (id, parent, index) in restores {
            ctx.scene.insert_at(id, parent, index)?;
        }
        ctx.events.send(EditorEvent::HierarchyUpdated);
        Ok(())
    }
}
