//! Scene data model shared by the editor: the object/component arena,
//! hierarchy ordering, subtree snapshots, the asset reference walker,
//! and the background-loading handle.

mod id;
mod io;
mod value;
mod walker;

pub mod hierarchy;
pub mod scene;
pub mod snapshot;

pub use id::{ComponentId, ObjectId};
pub use io::IoHandle;
pub use scene::{
    Component, Extras, GameObject, LocalTransform, Scene, SceneError, SceneResult, Transform,
};
pub use snapshot::{
    IdPolicy, Instantiated, SerializedComponent, SerializedNode, instantiate, restore_component,
    snapshot_node,
};
pub use value::PropertyValue;
pub use walker::{AssetReference, ReferenceOwner, find_asset_references};
