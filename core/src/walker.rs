//! Cycle-safe asset reference walker.
//!
//! When an asset is edited or reimported, every place in the scene that
//! holds a reference to it must be refreshed. The walker scans object
//! extras and component property bags for matching urls, following
//! object references with a per-call visited set so reference cycles
//! between objects terminate. Plain containers (`List`, `Record`) are
//! recursed into without guarding — they carry values, not identity.

use std::collections::HashSet;

use crate::id::{ComponentId, ObjectId};
use crate::scene::Scene;
use crate::value::PropertyValue;

/// The scene element holding a matching reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceOwner {
    /// The object itself references the asset (a prefab instance root
    /// whose template url matches).
    Object(ObjectId),
    /// A component property references the asset.
    Component {
        object: ObjectId,
        component: ComponentId,
    },
}

impl ReferenceOwner {
    pub fn object(&self) -> ObjectId {
        match self {
            Self::Object(id) => *id,
            Self::Component { object, .. } => *object,
        }
    }
}

/// One discovered reference: who holds it and under which property key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetReference {
    pub owner: ReferenceOwner,
    /// Property name holding the reference; `"prefab"` for instance
    /// roots matched through their extras.
    pub key: String,
}

/// Finds every reference to the asset at `url`.
///
/// Results come back in display order. A matching value is recorded and
/// not recursed into; ids absent from the scene (dangling `NodeRef`s)
/// are skipped.
pub fn find_asset_references(scene: &Scene, url: &str) -> Vec<AssetReference> {
    let mut visited = HashSet::new();
    let mut refs = Vec::new();
    for id in scene.objects_in_display_order() {
        visit_object(scene, id, url, &mut visited, &mut refs);
    }
    refs
}

fn visit_object(
    scene: &Scene,
    id: ObjectId,
    url: &str,
    visited: &mut HashSet<ObjectId>,
    refs: &mut Vec<AssetReference>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(obj) = scene.object(id) else {
        return;
    };

    if obj.extras.prefab.as_deref() == Some(url) {
        refs.push(AssetReference {
            owner: ReferenceOwner::Object(id),
            key: "prefab".to_owned(),
        });
    }

    for component in obj.components() {
        let owner = ReferenceOwner::Component {
            object: id,
            component: component.id(),
        };
        for (key, value) in component.properties() {
            let mut matched = false;
            scan_value(scene, value, url, visited, refs, &mut matched);
            if matched {
                refs.push(AssetReference {
                    owner,
                    key: key.clone(),
                });
            }
        }
    }
}

fn scan_value(
    scene: &Scene,
    value: &PropertyValue,
    url: &str,
    visited: &mut HashSet<ObjectId>,
    refs: &mut Vec<AssetReference>,
    matched: &mut bool,
) {
    match value {
        PropertyValue::AssetRef(u) => *matched |= u == url,
        PropertyValue::MeshRef { source } => *matched |= source == url,
        PropertyValue::MaterialList(urls) => *matched |= urls.iter().any(|u| u == url),
        PropertyValue::List(items) => {
            for item in items {
                scan_value(scene, item, url, visited, refs, matched);
            }
        }
        PropertyValue::Record(fields) => {
            for (_, field) in fields {
                scan_value(scene, field, url, visited, refs, matched);
            }
        }
        PropertyValue::NodeRef(id) => visit_object(scene, *id, url, visited, refs),
        _ => {}
    }
}
