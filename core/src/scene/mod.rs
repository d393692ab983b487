//! Scene graph data model: the id arena and its object/component types.

mod graph;
mod object;

pub use graph::{Scene, SceneError, SceneResult};
pub use object::{Component, Extras, GameObject, LocalTransform, Transform};
