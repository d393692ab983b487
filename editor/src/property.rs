//! Property codec: converts live property values to and from flat,
//! serializable snapshots, keyed by a closed set of edit kinds.
//!
//! Scalar, text, boolean, and plain-list values pass through unchanged.
//! Structured math values snapshot as `{type_name, components}`.
//! Reference kinds (shader, material array, mesh) snapshot to urls
//! relative to the resource root and resolve back through the asset
//! store; the session primes the store before a command built from a
//! reference-kind snapshot is applied.

use serde::{Deserialize, Serialize};

use lattice_core::PropertyValue;

use crate::error::{EditError, EditResult};
use crate::resources::AssetStore;

/// How a property is represented and edited. Closed tag set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    Number,
    Text,
    Checkbox,
    Vector2,
    Vector3,
    Vector4,
    Quaternion,
    Color,
    Rect,
    Shader,
    List,
    MaterialArray,
    Mesh,
    // Declared by metadata but with no snapshot representation. The
    // codec must fail on these rather than invent a placeholder.
    Material,
    GameObject,
    Transform,
    Sound,
    Array,
}

impl EditKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Vector2 => "vector2",
            Self::Vector3 => "vector3",
            Self::Vector4 => "vector4",
            Self::Quaternion => "quaternion",
            Self::Color => "color",
            Self::Rect => "rect",
            Self::Shader => "shader",
            Self::List => "list",
            Self::MaterialArray => "material-array",
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::GameObject => "game-object",
            Self::Transform => "transform",
            Self::Sound => "sound",
            Self::Array => "array",
        }
    }

    /// Kinds whose snapshots name external resources and need the asset
    /// store primed before deserialization.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Shader | Self::MaterialArray | Self::Mesh)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            Self::Material | Self::GameObject | Self::Transform | Self::Sound | Self::Array
        )
    }
}

/// Flat, serializable form of a single property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertySnapshot {
    /// Pass-through value (scalar, text, boolean, plain list).
    Plain(PropertyValue),
    /// Structured math value as `{type_name, components}`.
    Typed { type_name: String, data: Vec<f32> },
    /// Shader reference, url relative to the resource root.
    AssetUrl(String),
    /// Ordered material references, urls relative to the resource root.
    MaterialUrls(Vec<String>),
    /// Mesh source reference, url relative to the resource root.
    MeshUrl(String),
}

fn strip_root(url: &str, root: &str) -> String {
    url.strip_prefix(root).unwrap_or(url).to_owned()
}

fn mismatch(kind: EditKind, value: &PropertyValue) -> EditError {
    EditError::InvalidState(format!(
        "value {value:?} does not match edit kind {}",
        kind.name()
    ))
}

/// Snapshots a live value under the given edit kind.
///
/// Fails with [`EditError::UnsupportedPropertyKind`] for the declared
/// but unsupported kinds, and with `InvalidState` when the value's shape
/// does not fit the kind.
pub fn serialize_property(
    value: &PropertyValue,
    kind: EditKind,
    resource_root: &str,
) -> EditResult<PropertySnapshot> {
    let typed = |data: &[f32]| PropertySnapshot::Typed {
        // Supported structured kinds always carry a type name.
        type_name: value.type_name().unwrap_or_default().to_owned(),
        data: data.to_vec(),
    };
    match (kind, value) {
        (EditKind::Number, PropertyValue::Number(_))
        | (EditKind::Number, PropertyValue::Null)
        | (EditKind::Text, PropertyValue::Text(_))
        | (EditKind::Checkbox, PropertyValue::Bool(_))
        | (EditKind::List, PropertyValue::List(_)) => Ok(PropertySnapshot::Plain(value.clone())),
        // An unassigned reference snapshots (and restores) as null.
        (EditKind::Shader | EditKind::MaterialArray | EditKind::Mesh, PropertyValue::Null) => {
            Ok(PropertySnapshot::Plain(PropertyValue::Null))
        }
        (EditKind::Vector2, PropertyValue::Vector2(v)) => Ok(typed(v)),
        (EditKind::Vector3, PropertyValue::Vector3(v)) => Ok(typed(v)),
        (EditKind::Vector4, PropertyValue::Vector4(v)) => Ok(typed(v)),
        (EditKind::Quaternion, PropertyValue::Quaternion(v)) => Ok(typed(v)),
        (EditKind::Color, PropertyValue::Color(v)) => Ok(typed(v)),
        (EditKind::Rect, PropertyValue::Rect(v)) => Ok(typed(v)),
        (EditKind::Shader, PropertyValue::AssetRef(url)) => {
            Ok(PropertySnapshot::AssetUrl(strip_root(url, resource_root)))
        }
        (EditKind::MaterialArray, PropertyValue::MaterialList(urls)) => {
            Ok(PropertySnapshot::MaterialUrls(
                urls.iter().map(|u| strip_root(u, resource_root)).collect(),
            ))
        }
        (EditKind::Mesh, PropertyValue::MeshRef { source }) => {
            Ok(PropertySnapshot::MeshUrl(strip_root(source, resource_root)))
        }
        (kind, _) if !kind.is_supported() => Err(EditError::UnsupportedPropertyKind(kind)),
        (kind, value) => Err(mismatch(kind, value)),
    }
}

fn fixed<const N: usize>(kind: EditKind, data: &[f32]) -> EditResult<[f32; N]> {
    data.try_into().map_err(|_| {
        EditError::InvalidState(format!(
            "{} snapshot carries {} components, expected {N}",
            kind.name(),
            data.len()
        ))
    })
}

fn resolve_url(rel: &str, assets: &AssetStore) -> EditResult<String> {
    let root = assets.resource_root();
    let url = if assets.contains(rel) {
        rel.to_owned()
    } else {
        format!("{root}{rel}")
    };
    if assets.contains(&url) {
        Ok(url)
    } else {
        Err(EditError::ResourceResolution(
            crate::resources::ResourceError::NotFound(url),
        ))
    }
}

/// Rebuilds a live value from its snapshot.
///
/// Reference kinds resolve against the asset store, which the caller
/// must have primed; a missing asset is a [`ResourceError::NotFound`]
/// wrapped in [`EditError::ResourceResolution`].
///
/// [`ResourceError::NotFound`]: crate::resources::ResourceError::NotFound
pub fn deserialize_property(
    snapshot: &PropertySnapshot,
    kind: EditKind,
    assets: &AssetStore,
) -> EditResult<PropertyValue> {
    if !kind.is_supported() {
        return Err(EditError::UnsupportedPropertyKind(kind));
    }
    match (kind, snapshot) {
        (
            EditKind::Number | EditKind::Text | EditKind::Checkbox | EditKind::List,
            PropertySnapshot::Plain(value),
        ) => Ok(value.clone()),
        (EditKind::Vector2, PropertySnapshot::Typed { data, .. }) => {
            Ok(PropertyValue::Vector2(fixed(kind, data)?))
        }
        (EditKind::Vector3, PropertySnapshot::Typed { data, .. }) => {
            Ok(PropertyValue::Vector3(fixed(kind, data)?))
        }
        (EditKind::Vector4, PropertySnapshot::Typed { data, .. }) => {
            Ok(PropertyValue::Vector4(fixed(kind, data)?))
        }
        (EditKind::Quaternion, PropertySnapshot::Typed { data, .. }) => {
            Ok(PropertyValue::Quaternion(fixed(kind, data)?))
        }
        (EditKind::Color, PropertySnapshot::Typed { data, .. }) => {
            Ok(PropertyValue::Color(fixed(kind, data)?))
        }
        (EditKind::Rect, PropertySnapshot::Typed { data, .. }) => {
            Ok(PropertyValue::Rect(fixed(kind, data)?))
        }
        (
            EditKind::Shader | EditKind::MaterialArray | EditKind::Mesh,
            PropertySnapshot::Plain(PropertyValue::Null),
        ) => Ok(PropertyValue::Null),
        (EditKind::Shader, PropertySnapshot::AssetUrl(rel)) => {
            Ok(PropertyValue::AssetRef(resolve_url(rel, assets)?))
        }
        (EditKind::MaterialArray, PropertySnapshot::MaterialUrls(rels)) => {
            // Order of the material list is significant and preserved.
            let urls = rels
                .iter()
                .map(|rel| resolve_url(rel, assets))
                .collect::<EditResult<Vec<_>>>()?;
            Ok(PropertyValue::MaterialList(urls))
        }
        (EditKind::Mesh, PropertySnapshot::MeshUrl(rel)) => Ok(PropertyValue::MeshRef {
            source: resolve_url(rel, assets)?,
        }),
        (kind, snapshot) => Err(EditError::InvalidState(format!(
            "snapshot {snapshot:?} does not match edit kind {}",
            kind.name()
        ))),
    }
}

/// Absolute urls a snapshot will resolve through, for priming the store
/// before deserialization.
pub fn referenced_urls(snapshot: &PropertySnapshot, resource_root: &str) -> Vec<String> {
    let absolute = |rel: &str| {
        if rel.starts_with(resource_root) {
            rel.to_owned()
        } else {
            format!("{resource_root}{rel}")
        }
    };
    match snapshot {
        PropertySnapshot::AssetUrl(rel) | PropertySnapshot::MeshUrl(rel) => vec![absolute(rel)],
        PropertySnapshot::MaterialUrls(rels) => rels.iter().map(|r| absolute(r)).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Asset;

    const ROOT: &str = "res://";

    fn primed_store() -> AssetStore {
        let mut store = AssetStore::new(ROOT);
        store.register(Asset::shader("res://shaders/pbr.shader"));
        store.register(Asset::material("res://materials/stone.mat"));
        store.register(Asset::material("res://materials/wood.mat"));
        store.register(Asset::mesh_source("res://meshes/rock.mesh"));
        store
    }

    #[test]
    fn plain_kinds_round_trip() {
        let store = primed_store();
        for (value, kind) in [
            (PropertyValue::Number(2.5), EditKind::Number),
            (PropertyValue::Text("hello".into()), EditKind::Text),
            (PropertyValue::Bool(true), EditKind::Checkbox),
            (
                PropertyValue::List(vec![PropertyValue::Number(1.0), PropertyValue::Text("x".into())]),
                EditKind::List,
            ),
        ] {
            let snap = serialize_property(&value, kind, ROOT).unwrap();
            assert_eq!(deserialize_property(&snap, kind, &store).unwrap(), value);
        }
    }

    #[test]
    fn structured_kinds_round_trip_as_typed() {
        let store = primed_store();
        let value = PropertyValue::Quaternion([0.0, 0.7071, 0.0, 0.7071]);
        let snap = serialize_property(&value, EditKind::Quaternion, ROOT).unwrap();
        assert_eq!(snap, PropertySnapshot::Typed {
            type_name: "Quaternion".into(),
            data: vec![0.0, 0.7071, 0.0, 0.7071],
        });
        assert_eq!(
            deserialize_property(&snap, EditKind::Quaternion, &store).unwrap(),
            value
        );
    }

    #[test]
    fn shader_snapshots_to_relative_url() {
        let store = primed_store();
        let value = PropertyValue::AssetRef("res://shaders/pbr.shader".into());
        let snap = serialize_property(&value, EditKind::Shader, ROOT).unwrap();
        assert_eq!(snap, PropertySnapshot::AssetUrl("shaders/pbr.shader".into()));
        assert_eq!(
            deserialize_property(&snap, EditKind::Shader, &store).unwrap(),
            value
        );
    }

    #[test]
    fn material_array_preserves_order() {
        let store = primed_store();
        let value = PropertyValue::MaterialList(vec![
            "res://materials/wood.mat".into(),
            "res://materials/stone.mat".into(),
        ]);
        let snap = serialize_property(&value, EditKind::MaterialArray, ROOT).unwrap();
        assert_eq!(
            snap,
            PropertySnapshot::MaterialUrls(vec![
                "materials/wood.mat".into(),
                "materials/stone.mat".into()
            ])
        );
        assert_eq!(
            deserialize_property(&snap, EditKind::MaterialArray, &store).unwrap(),
            value
        );
    }

    #[test]
    fn mesh_resolves_into_fresh_wrapper() {
        let store = primed_store();
        let value = PropertyValue::MeshRef {
            source: "res://meshes/rock.mesh".into(),
        };
        let snap = serialize_property(&value, EditKind::Mesh, ROOT).unwrap();
        assert_eq!(snap, PropertySnapshot::MeshUrl("meshes/rock.mesh".into()));
        assert_eq!(deserialize_property(&snap, EditKind::Mesh, &store).unwrap(), value);
    }

    #[test]
    fn unsupported_kinds_fail_closed() {
        for kind in [
            EditKind::Material,
            EditKind::GameObject,
            EditKind::Transform,
            EditKind::Sound,
            EditKind::Array,
        ] {
            assert!(!kind.is_supported());
            assert_eq!(
                serialize_property(&PropertyValue::Null, kind, ROOT),
                Err(EditError::UnsupportedPropertyKind(kind))
            );
        }
    }

    #[test]
    fn value_shape_mismatch_rejected() {
        let err = serialize_property(&PropertyValue::Bool(true), EditKind::Vector3, ROOT);
        assert!(matches!(err, Err(EditError::InvalidState(_))));
    }

    #[test]
    fn unresolved_reference_reports_resolution_failure() {
        let store = primed_store();
        let snap = PropertySnapshot::AssetUrl("shaders/unknown.shader".into());
        assert!(matches!(
            deserialize_property(&snap, EditKind::Shader, &store),
            Err(EditError::ResourceResolution(_))
        ));
    }

    #[test]
    fn referenced_urls_are_absolute() {
        let snap = PropertySnapshot::MaterialUrls(vec![
            "materials/wood.mat".into(),
            "res://materials/stone.mat".into(),
        ]);
        assert_eq!(referenced_urls(&snap, ROOT), vec![
            "res://materials/wood.mat".to_owned(),
            "res://materials/stone.mat".to_owned(),
        ]);
        assert!(referenced_urls(&PropertySnapshot::Plain(PropertyValue::Null), ROOT).is_empty());
    }
}
