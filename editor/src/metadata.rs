//! Property metadata: explicit per-type descriptor tables.
//!
//! Instead of runtime reflection, every editable type declares its
//! properties up front as [`PropertyDescriptor`]s. The session consults
//! the registry by name before building a property-edit command; the
//! modify commands honor a descriptor's custom setter when one is
//! declared.

use std::collections::HashMap;

use lattice_core::PropertyValue;

use crate::property::EditKind;

/// Normalizes an incoming value before it is written to the target.
pub type PropertySetter = fn(PropertyValue) -> PropertyValue;

#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: EditKind,
    pub setter: Option<PropertySetter>,
    /// Initial value when the owning component is created.
    pub default: PropertyValue,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, kind: EditKind, default: PropertyValue) -> Self {
        Self {
            name: name.into(),
            kind,
            setter: None,
            default,
        }
    }

    pub fn with_setter(mut self, setter: PropertySetter) -> Self {
        self.setter = Some(setter);
        self
    }
}

fn normalize_quaternion(value: PropertyValue) -> PropertyValue {
    match value {
        PropertyValue::Quaternion(q) => {
            let len = q.iter().map(|c| c * c).sum::<f32>().sqrt();
            if len > f32::EPSILON {
                PropertyValue::Quaternion([q[0] / len, q[1] / len, q[2] / len, q[3] / len])
            } else {
                PropertyValue::Quaternion([0.0, 0.0, 0.0, 1.0])
            }
        }
        other => other,
    }
}

/// Maps type names to their property descriptor tables.
#[derive(Debug)]
pub struct PropertyRegistry {
    game_object: Vec<PropertyDescriptor>,
    components: HashMap<String, Vec<PropertyDescriptor>>,
}

impl PropertyRegistry {
    /// Registry with the built-in game-object descriptors and the stock
    /// component types.
    pub fn with_builtins() -> Self {
        let game_object = vec![
            PropertyDescriptor::new("name", EditKind::Text, PropertyValue::Text(String::new())),
            PropertyDescriptor::new("active", EditKind::Checkbox, PropertyValue::Bool(true)),
            PropertyDescriptor::new(
                "translation",
                EditKind::Vector3,
                PropertyValue::Vector3([0.0; 3]),
            ),
            PropertyDescriptor::new(
                "rotation",
                EditKind::Quaternion,
                PropertyValue::Quaternion([0.0, 0.0, 0.0, 1.0]),
            )
            .with_setter(normalize_quaternion),
            PropertyDescriptor::new("scale", EditKind::Vector3, PropertyValue::Vector3([1.0; 3])),
        ];

        let mut registry = Self {
            game_object,
            components: HashMap::new(),
        };
        registry.register_component_type("MeshRenderer", vec![
            PropertyDescriptor::new("mesh", EditKind::Mesh, PropertyValue::Null),
            PropertyDescriptor::new(
                "materials",
                EditKind::MaterialArray,
                PropertyValue::MaterialList(Vec::new()),
            ),
            PropertyDescriptor::new("castShadows", EditKind::Checkbox, PropertyValue::Bool(true)),
        ]);
        registry.register_component_type("Light", vec![
            PropertyDescriptor::new("intensity", EditKind::Number, PropertyValue::Number(1.0)),
            PropertyDescriptor::new("color", EditKind::Color, PropertyValue::Color([1.0; 4])),
        ]);
        registry.register_component_type("Camera", vec![
            PropertyDescriptor::new("fov", EditKind::Number, PropertyValue::Number(60.0)),
            PropertyDescriptor::new("near", EditKind::Number, PropertyValue::Number(0.1)),
            PropertyDescriptor::new("far", EditKind::Number, PropertyValue::Number(1000.0)),
            PropertyDescriptor::new(
                "viewport",
                EditKind::Rect,
                PropertyValue::Rect([0.0, 0.0, 1.0, 1.0]),
            ),
        ]);
        registry
    }

    /// Declares (or replaces) the descriptor table of a component type.
    pub fn register_component_type(
        &mut self,
        type_name: impl Into<String>,
        descriptors: Vec<PropertyDescriptor>,
    ) {
        self.components.insert(type_name.into(), descriptors);
    }

    pub fn game_object_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.game_object.iter().find(|d| d.name == name)
    }

    pub fn component_property(&self, type_name: &str, name: &str) -> Option<&PropertyDescriptor> {
        self.components
            .get(type_name)?
            .iter()
            .find(|d| d.name == name)
    }

    pub fn component_descriptors(&self, type_name: &str) -> Option<&[PropertyDescriptor]> {
        self.components.get(type_name).map(Vec::as_slice)
    }

    /// Fresh property bag for a newly created component of `type_name`.
    pub fn default_properties(&self, type_name: &str) -> Vec<(String, PropertyValue)> {
        self.components
            .get(type_name)
            .map(|descriptors| {
                descriptors
                    .iter()
                    .map(|d| (d.name.clone(), d.default.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
