//! End-to-end session scenarios across commands, history, prefabs, and
//! asset resolution.

use lattice_core::{IoHandle, ObjectId, PropertyValue, SerializedNode, snapshot_node};
use lattice_core::hierarchy::Placement;
use lattice_editor::command::{CreateKind, CreateRequest};
use lattice_editor::{
    Asset, AssetStore, EditKind, EditorSession, PropertySnapshot, PropertyTarget, LoaderRuntime,
    ResourceError, ResourceLoader,
};

fn session() -> EditorSession {
    let _ = env_logger::builder().is_test(true).try_init();
    EditorSession::new(AssetStore::new("res://"))
}

/// Serialized form of every root subtree, in display order.
fn fingerprint(session: &EditorSession) -> Vec<SerializedNode> {
    session
        .scene()
        .objects_in_display_order()
        .into_iter()
        .filter(|&id| session.scene().parent_of(id).is_none())
        .map(|id| snapshot_node(session.scene(), id).unwrap())
        .collect()
}

fn roots(session: &EditorSession) -> Vec<ObjectId> {
    session
        .scene()
        .objects_in_display_order()
        .into_iter()
        .filter(|&id| session.scene().parent_of(id).is_none())
        .collect()
}

#[test]
fn editing_scenario_round_trips_through_undo_and_redo() {
    let mut s = session();

    s.create_game_objects(vec![
        CreateRequest {
            parent: None,
            kind: CreateKind::Light,
        },
        CreateRequest {
            parent: None,
            kind: CreateKind::Empty,
        },
    ])
    .unwrap();
    let &[light, holder] = roots(&s).as_slice() else {
        panic!("expected two roots");
    };

    s.set_object_property(light, "name", &PropertyValue::Text("sun".into()))
        .unwrap();
    s.update_hierarchy(&[light], holder, Placement::Inside)
        .unwrap();
    s.duplicate_game_objects(&[holder]).unwrap();
    let copy = *roots(&s).last().unwrap();
    s.delete_game_objects(&[copy]).unwrap();

    let final_state = fingerprint(&s);
    let steps = {
        let mut n = 0;
        while s.undo().unwrap() {
            n += 1;
        }
        n
    };
    assert_eq!(steps, 5);
    assert!(fingerprint(&s).is_empty());

    for _ in 0..steps {
        assert!(s.redo().unwrap());
    }
    assert!(!s.redo().unwrap());
    assert_eq!(fingerprint(&s), final_state);
}

#[test]
fn apply_then_undo_leaves_serialized_state_untouched() {
    let mut s = session();
    s.create_game_objects(vec![CreateRequest {
        parent: None,
        kind: CreateKind::Mesh,
    }])
    .unwrap();
    let root = roots(&s)[0];
    let before = fingerprint(&s);

    s.set_object_property(root, "translation", &PropertyValue::Vector3([4.0, 0.0, -2.0]))
        .unwrap();
    assert_ne!(fingerprint(&s), before);
    assert!(s.undo().unwrap());
    assert_eq!(fingerprint(&s), before);
}

#[test]
fn prefab_apply_updates_the_template_and_undoes() {
    let mut s = session();
    let root = s.scene_mut().spawn("rig");
    let arm = s.scene_mut().spawn("arm");
    s.scene_mut().insert_at(arm, Some(root), 0).unwrap();

    s.create_prefab(root, "res://prefabs/rig.prefab").unwrap();
    s.set_object_property(arm, "name", &PropertyValue::Text("left arm".into()))
        .unwrap();
    s.apply_prefab_instance(root).unwrap();

    let definition = s
        .assets()
        .get("res://prefabs/rig.prefab")
        .and_then(Asset::definition)
        .cloned()
        .unwrap();
    assert_eq!(definition.children[0].name, "left arm");

    assert!(s.undo().unwrap());
    let definition = s
        .assets()
        .get("res://prefabs/rig.prefab")
        .and_then(Asset::definition)
        .cloned()
        .unwrap();
    assert_eq!(definition.children[0].name, "arm");
}

struct RuntimeLoader {
    runtime: LoaderRuntime,
}

impl ResourceLoader for RuntimeLoader {
    fn resolve(&self, url: &str) -> IoHandle<Result<Asset, ResourceError>> {
        let url = url.to_owned();
        self.runtime.run(async move { Ok(Asset::mesh_source(url)) })
    }

    fn resource_root(&self) -> &str {
        "res://"
    }
}

#[test]
fn reference_edit_resolves_through_the_loader() {
    let mut s = session().with_loader(Box::new(RuntimeLoader {
        runtime: LoaderRuntime::new(),
    }));
    let object = s.scene_mut().spawn("rock");
    let component = s
        .scene_mut()
        .add_component(object, "MeshRenderer", Vec::new())
        .unwrap();

    let pending = s
        .begin_property_edit(
            PropertyTarget::Component { object, component },
            "mesh",
            EditKind::Mesh,
        )
        .unwrap();
    s.complete_property_edit(pending, PropertySnapshot::MeshUrl("meshes/rock.gltf".into()))
        .unwrap();

    assert!(s.assets().contains("res://meshes/rock.gltf"));
    let value = s
        .scene()
        .object(object)
        .unwrap()
        .component(component)
        .unwrap()
        .property("mesh")
        .cloned();
    assert_eq!(
        value,
        Some(PropertyValue::MeshRef {
            source: "res://meshes/rock.gltf".into()
        })
    );

    // Undo restores the previous value through the same codec.
    assert!(s.undo().unwrap());
    let value = s
        .scene()
        .object(object)
        .unwrap()
        .component(component)
        .unwrap()
        .property("mesh")
        .cloned();
    assert_eq!(value, Some(PropertyValue::Null));
}

#[test]
fn copy_paste_preserves_subtree_shape() {
    let mut s = session();
    let root = s.scene_mut().spawn("squad");
    for name in ["a", "b", "c"] {
        let child = s.scene_mut().spawn(name);
        let end = s.scene_mut().children_of(root).len();
        s.scene_mut().insert_at(child, Some(root), end).unwrap();
    }

    s.copy_game_objects(&[root]).unwrap();
    s.paste_game_objects(None).unwrap();

    let pasted = *roots(&s).last().unwrap();
    assert_ne!(pasted, root);
    let names: Vec<String> = s
        .scene()
        .children_of(pasted)
        .iter()
        .map(|&id| s.scene().object(id).unwrap().name.clone())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn undo_labels_read_most_recent_first() {
    let mut s = session();
    s.create_game_objects(vec![CreateRequest {
        parent: None,
        kind: CreateKind::Empty,
    }])
    .unwrap();
    let root = roots(&s)[0];
    s.set_object_property(root, "name", &PropertyValue::Text("hero".into()))
        .unwrap();

    let labels: Vec<&str> = s.history().undo_descriptions().collect();
    assert_eq!(labels, ["Modify object property", "Create objects"]);
}
