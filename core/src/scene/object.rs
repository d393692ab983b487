//! Game object, component, and transform data types.
//!
//! All math values use plain arrays (`[f32; 3]`, `[f32; 4]`) to keep the
//! core crate free of a math library dependency.

use serde::{Deserialize, Serialize};

use crate::id::{ComponentId, ObjectId};
use crate::value::PropertyValue;

/// Local transform decomposed into translation, rotation, and scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl LocalTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Prefab linkage metadata carried by every game object.
///
/// A **prefab root** has `prefab` set to the template's asset url. A
/// **prefab child** has `prefab_root_id` pointing back at its instance
/// root. `linked_id` ties an object (or component) to the corresponding
/// element of the template definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extras {
    /// Template asset url, set only on the instance root.
    pub prefab: Option<String>,
    /// Instance root of the prefab this object belongs to.
    pub prefab_root_id: Option<ObjectId>,
    /// Identity of the matching element in the template definition.
    pub linked_id: Option<String>,
}

impl Extras {
    /// Returns `true` if no linkage markers are set.
    pub fn is_empty(&self) -> bool {
        self.prefab.is_none() && self.prefab_root_id.is_none() && self.linked_id.is_none()
    }

    /// Clears every linkage marker.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Typed data attached to a game object.
///
/// Components carry an ordered property bag instead of concrete Rust
/// fields; the editor's property metadata registry maps each property
/// name to its edit kind and optional custom setter.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    id: ComponentId,
    type_name: String,
    /// Ties this component to a prefab template element, if any.
    pub linked_id: Option<String>,
    properties: Vec<(String, PropertyValue)>,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        type_name: impl Into<String>,
        properties: Vec<(String, PropertyValue)>,
    ) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            linked_id: None,
            properties,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Ordered view of the property bag.
    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Writes a property, appending it if the name is new. Returns the
    /// previous value if one existed.
    pub fn set_property(
        &mut self,
        name: &str,
        value: PropertyValue,
    ) -> Option<PropertyValue> {
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| n == name) {
            Some(std::mem::replace(&mut slot.1, value))
        } else {
            self.properties.push((name.to_owned(), value));
            None
        }
    }

    /// Replaces the whole property bag, preserving order of the new bag.
    pub fn replace_properties(&mut self, properties: Vec<(String, PropertyValue)>) {
        self.properties = properties;
    }
}

/// The tree-positioning facet of a game object.
///
/// The child list order is display order and is significant; every scene
/// operation preserves it. A child does not own its parent — both links
/// are ids resolved through the scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transform {
    pub local: LocalTransform,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
}

impl Transform {
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Ordered child ids.
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
}

/// A scene-graph entity: id, components, transform, prefab extras.
#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    id: ObjectId,
    pub name: String,
    pub active: bool,
    pub transform: Transform,
    pub extras: Extras,
    pub(crate) components: Vec<Component>,
}

impl GameObject {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            transform: Transform::default(),
            extras: Extras::default(),
            components: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    pub fn components_mut(&mut self) -> &mut [Component] {
        &mut self.components
    }

    /// Finds the component tied to a prefab template element.
    pub fn component_by_linked_id(&self, linked_id: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.linked_id.as_deref() == Some(linked_id))
    }

    /// Reads a built-in object property by name.
    ///
    /// The built-ins are `name`, `active`, `translation`, `rotation`, and
    /// `scale`; component properties live in the component bags instead.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "name" => Some(PropertyValue::Text(self.name.clone())),
            "active" => Some(PropertyValue::Bool(self.active)),
            "translation" => Some(PropertyValue::Vector3(self.transform.local.translation)),
            "rotation" => Some(PropertyValue::Quaternion(self.transform.local.rotation)),
            "scale" => Some(PropertyValue::Vector3(self.transform.local.scale)),
            _ => None,
        }
    }

    /// Writes a built-in object property. Returns `false` when the name
    /// is unknown or the value shape does not match the field.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> bool {
        match (name, value) {
            ("name", PropertyValue::Text(v)) => self.name = v,
            ("active", PropertyValue::Bool(v)) => self.active = v,
            ("translation", PropertyValue::Vector3(v)) => {
                self.transform.local.translation = v;
            }
            ("rotation", PropertyValue::Quaternion(v)) => self.transform.local.rotation = v,
            ("scale", PropertyValue::Vector3(v)) => self.transform.local.scale = v,
            _ => return false,
        }
        true
    }

    /// `true` if this object is the root of an instantiated prefab.
    pub fn is_prefab_root(&self) -> bool {
        self.extras.prefab.is_some()
    }

    /// `true` if this object's identity is tied to a prefab instance root.
    pub fn is_prefab_child(&self) -> bool {
        self.extras.prefab_root_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: u64) -> GameObject {
        GameObject::new(ObjectId::new(id), "obj")
    }

    #[test]
    fn builtin_properties_round_trip() {
        let mut obj = object(1);
        assert!(obj.set_property("translation", PropertyValue::Vector3([1.0, 2.0, 3.0])));
        assert_eq!(
            obj.property("translation"),
            Some(PropertyValue::Vector3([1.0, 2.0, 3.0]))
        );
        assert!(obj.set_property("name", PropertyValue::Text("renamed".into())));
        assert_eq!(obj.name, "renamed");
    }

    #[test]
    fn builtin_property_shape_mismatch_rejected() {
        let mut obj = object(1);
        assert!(!obj.set_property("translation", PropertyValue::Number(3.0)));
        assert!(!obj.set_property("unknown", PropertyValue::Null));
    }

    #[test]
    fn component_property_bag_preserves_order() {
        let mut comp = Component::new(
            ComponentId::new(1),
            "Light",
            vec![
                ("color".into(), PropertyValue::Color([1.0; 4])),
                ("intensity".into(), PropertyValue::Number(2.0)),
            ],
        );
        comp.set_property("intensity", PropertyValue::Number(5.0));
        let names: Vec<&str> = comp.properties().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["color", "intensity"]);
        assert_eq!(
            comp.property("intensity"),
            Some(&PropertyValue::Number(5.0))
        );
    }

    #[test]
    fn extras_clear_removes_all_markers() {
        let mut extras = Extras {
            prefab: Some("prefabs/tree.prefab".into()),
            prefab_root_id: Some(ObjectId::new(7)),
            linked_id: Some("n-7".into()),
        };
        assert!(!extras.is_empty());
        extras.clear();
        assert!(extras.is_empty());
    }
}
