//! Format-agnostic property value representation.
//!
//! [`PropertyValue`] is the intermediate form every editable field of a
//! game object or component is expressed in. The editor's property codec
//! converts between these values and flat snapshots; the reference walker
//! traverses them looking for asset references.

use serde::{Deserialize, Serialize};

use crate::id::ObjectId;

/// A live property value on a game object, component, or asset.
///
/// Scalar, text, and boolean values pass through the codec unchanged.
/// The structured math values (`Vector*`, `Quaternion`, `Color`, `Rect`)
/// carry their own serialized form. Reference values (`AssetRef`,
/// `MaterialList`, `MeshRef`) name external resources by url and resolve
/// back through the resource loader; `NodeRef` points at another object
/// in the same scene and is remapped when a snapshot is instantiated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Null,
    Number(f64),
    Bool(bool),
    Text(String),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Vector4([f32; 4]),
    /// Quaternion [x, y, z, w].
    Quaternion([f32; 4]),
    /// RGBA color, components in 0..=1.
    Color([f32; 4]),
    /// Rectangle [x, y, w, h].
    Rect([f32; 4]),
    /// Ordered sequence of plain values. Recursed into without cycle
    /// protection — only identity-bearing nodes are cycle-guarded.
    List(Vec<PropertyValue>),
    /// Flat record of named plain values. Same recursion rule as `List`.
    Record(Vec<(String, PropertyValue)>),
    /// Reference to an external asset by absolute url.
    AssetRef(String),
    /// Ordered material references by absolute url.
    MaterialList(Vec<String>),
    /// A mesh wrapper referencing its loaded source by absolute url.
    MeshRef { source: String },
    /// Reference to another object in the same scene.
    NodeRef(ObjectId),
}

impl PropertyValue {
    /// Type name used by the `{typeName, inner}` snapshot form of the
    /// structured math values. `None` for every other variant.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Vector2(_) => Some("Vector2"),
            Self::Vector3(_) => Some("Vector3"),
            Self::Vector4(_) => Some("Vector4"),
            Self::Quaternion(_) => Some("Quaternion"),
            Self::Color(_) => Some("Color"),
            Self::Rect(_) => Some("Rect"),
            _ => None,
        }
    }

    /// Returns `true` if this value (not its children) is a reference to
    /// the asset at `url`.
    pub fn references_asset(&self, url: &str) -> bool {
        match self {
            Self::AssetRef(u) => u == url,
            Self::MeshRef { source } => source == url,
            _ => false,
        }
    }
}
