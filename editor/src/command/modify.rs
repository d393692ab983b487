//! Property modification commands.
//!
//! All three variants share the same shape: the target id, the property
//! key, its edit kind, and pre/post snapshots taken through the codec.
//! Apply writes the post snapshot, revert writes the pre snapshot, both
//! honoring a custom setter when the property's metadata declares one.

use lattice_core::{ComponentId, ObjectId, PropertyValue};

use crate::command::EditContext;
use crate::error::{EditError, EditResult};
use crate::events::EditorEvent;
use crate::property::{EditKind, PropertySnapshot, deserialize_property, serialize_property};

/// Edits a built-in game-object property (name, active, transform
/// fields).
#[derive(Debug)]
pub struct ModifyObjectProperty {
    object: ObjectId,
    key: String,
    kind: EditKind,
    before: PropertySnapshot,
    after: PropertySnapshot,
}

impl ModifyObjectProperty {
    /// Captures the current value as the pre-snapshot.
    pub fn capture(
        ctx: &EditContext<'_>,
        object: ObjectId,
        key: &str,
        after: PropertySnapshot,
    ) -> EditResult<Self> {
        let descriptor = ctx
            .metadata
            .game_object_property(key)
            .ok_or_else(|| EditError::TargetNotFound(format!("game object property {key:?}")))?;
        let current = ctx
            .scene
            .object(object)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {object}")))?
            .property(key)
            .ok_or_else(|| EditError::TargetNotFound(format!("game object property {key:?}")))?;
        let before = serialize_property(&current, descriptor.kind, ctx.assets.resource_root())?;
        Ok(Self {
            object,
            key: key.to_owned(),
            kind: descriptor.kind,
            before,
            after,
        })
    }

    fn write(&self, ctx: &mut EditContext<'_>, snapshot: &PropertySnapshot) -> EditResult {
        let mut value = deserialize_property(snapshot, self.kind, ctx.assets)?;
        if let Some(descriptor) = ctx.metadata.game_object_property(&self.key)
            && let Some(setter) = descriptor.setter
        {
            value = setter(value);
        }
        let obj = ctx
            .scene
            .object_mut(self.object)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {}", self.object)))?;
        if !obj.set_property(&self.key, value) {
            return Err(EditError::InvalidState(format!(
                "object property {:?} rejected the value",
                self.key
            )));
        }
        ctx.events.send(EditorEvent::PropertyChanged {
            object: Some(self.object),
            component: None,
            key: self.key.clone(),
        });
        Ok(())
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let after = self.after.clone();
        self.write(ctx, &after)
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let before = self.before.clone();
        self.write(ctx, &before)
    }
}

/// Edits a property in a component's bag.
#[derive(Debug)]
pub struct ModifyComponentProperty {
    object: ObjectId,
    component: ComponentId,
    key: String,
    kind: EditKind,
    before: PropertySnapshot,
    after: PropertySnapshot,
}

impl ModifyComponentProperty {
    pub fn capture(
        ctx: &EditContext<'_>,
        object: ObjectId,
        component: ComponentId,
        key: &str,
        after: PropertySnapshot,
    ) -> EditResult<Self> {
        let comp = ctx
            .scene
            .object(object)
            .and_then(|o| o.component(component))
            .ok_or_else(|| {
                EditError::TargetNotFound(format!("component {component} on object {object}"))
            })?;
        let descriptor = ctx
            .metadata
            .component_property(comp.type_name(), key)
            .ok_or_else(|| {
                EditError::TargetNotFound(format!(
                    "property {key:?} of component type {}",
                    comp.type_name()
                ))
            })?;
        let current = comp
            .property(key)
            .cloned()
            .unwrap_or(PropertyValue::Null);
        let before = serialize_property(&current, descriptor.kind, ctx.assets.resource_root())?;
        Ok(Self {
            object,
            component,
            key: key.to_owned(),
            kind: descriptor.kind,
            before,
            after,
        })
    }

    fn write(&self, ctx: &mut EditContext<'_>, snapshot: &PropertySnapshot) -> EditResult {
        let mut value = deserialize_property(snapshot, self.kind, ctx.assets)?;
        let obj = ctx
            .scene
            .object_mut(self.object)
            .ok_or_else(|| EditError::TargetNotFound(format!("object {}", self.object)))?;
        let comp = obj.component_mut(self.component).ok_or_else(|| {
            EditError::TargetNotFound(format!(
                "component {} on object {}",
                self.component, self.object
            ))
        })?;
        if let Some(descriptor) = ctx.metadata.component_property(comp.type_name(), &self.key)
            && let Some(setter) = descriptor.setter
        {
            value = setter(value);
        }
        comp.set_property(&self.key, value);
        ctx.events.send(EditorEvent::PropertyChanged {
            object: Some(self.object),
            component: Some(self.component),
            key: self.key.clone(),
        });
        Ok(())
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let after = self.after.clone();
        self.write(ctx, &after)
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let before = self.before.clone();
        self.write(ctx, &before)
    }
}

/// Edits a property in an asset's bag.
#[derive(Debug)]
pub struct ModifyAssetProperty {
    url: String,
    key: String,
    kind: EditKind,
    before: PropertySnapshot,
    after: PropertySnapshot,
}

impl ModifyAssetProperty {
    pub fn capture(
        ctx: &EditContext<'_>,
        url: &str,
        key: &str,
        kind: EditKind,
        after: PropertySnapshot,
    ) -> EditResult<Self> {
        let asset = ctx
            .assets
            .get(url)
            .ok_or_else(|| EditError::TargetNotFound(format!("asset {url}")))?;
        let current = asset.property(key).cloned().unwrap_or(PropertyValue::Null);
        let before = serialize_property(&current, kind, ctx.assets.resource_root())?;
        Ok(Self {
            url: url.to_owned(),
            key: key.to_owned(),
            kind,
            before,
            after,
        })
    }

    fn write(&self, ctx: &mut EditContext<'_>, snapshot: &PropertySnapshot) -> EditResult {
        let value = deserialize_property(snapshot, self.kind, ctx.assets)?;
        let asset = ctx
            .assets
            .get_mut(&self.url)
            .ok_or_else(|| EditError::TargetNotFound(format!("asset {}", self.url)))?;
        asset.set_property(&self.key, value);
        ctx.events.send(EditorEvent::PropertyChanged {
            object: None,
            component: None,
            key: self.key.clone(),
        });
        Ok(())
    }

    pub fn apply(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let after = self.after.clone();
        self.write(ctx, &after)
    }

    pub fn revert(&mut self, ctx: &mut EditContext<'_>) -> EditResult {
        let before = self.before.clone();
        self.write(ctx, &before)
    }
}
