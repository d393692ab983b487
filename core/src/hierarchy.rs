//! Hierarchy ordering: index paths, display order, and reordering.
//!
//! The editor needs a total order over arbitrary object sets — the exact
//! on-screen depth-first display order — before any bulk operation that
//! must not invalidate sibling indices mid-operation (multi-delete,
//! multi-paste, copy). That order is derived from per-object index paths.

use std::cmp::Ordering;

use crate::id::ObjectId;
use crate::scene::{Scene, SceneError, SceneResult};

/// Where to place moved nodes relative to the reorder target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Just before the target, in the target's parent list.
    Before,
    /// As the target's last children.
    Inside,
    /// Just after the target, in the target's parent list.
    After,
}

/// Tree-position path of `id`, root-to-leaf.
///
/// Each entry is the index of a node among its parent's children; the
/// top-most ancestor contributes its index in the scene's root order.
/// Returns `None` for ids not present in the scene.
pub fn path_of(scene: &Scene, id: ObjectId) -> Option<Vec<usize>> {
    if !scene.contains(id) {
        return None;
    }
    let mut path = Vec::new();
    let mut cursor = id;
    loop {
        path.push(scene.index_in_parent(cursor)?);
        match scene.parent_of(cursor) {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    path.reverse();
    Some(path)
}

/// Compares two index paths: first differing entry decides; a strict
/// prefix (an ancestor) sorts before its descendants.
pub fn compare_paths(a: &[usize], b: &[usize]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Sorts `ids` into on-screen depth-first display order.
///
/// Ids missing from the scene are dropped.
pub fn sort_for_hierarchy(scene: &Scene, ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut paths: Vec<(ObjectId, Vec<usize>)> = ids
        .iter()
        .filter_map(|&id| path_of(scene, id).map(|p| (id, p)))
        .collect();
    paths.sort_by(|(_, a), (_, b)| compare_paths(a, b));
    paths.into_iter().map(|(id, _)| id).collect()
}

/// Removes every id that has an ancestor also present in the set,
/// leaving only topologically top-level selections.
///
/// Required before recursive operations (copy, delete, duplicate) so a
/// subtree is never processed twice. Input order of survivors is kept.
pub fn filter_top_level(scene: &Scene, ids: &[ObjectId]) -> Vec<ObjectId> {
    ids.iter()
        .copied()
        .filter(|&id| {
            ids.iter()
                .all(|&other| other == id || !scene.is_ancestor_of(other, id))
        })
        .collect()
}

/// Moves `nodes` relative to `target`.
///
/// Every node is detached first; the whole set is then re-inserted, in
/// reverse input order, at the insertion index computed from `placement`
/// — which preserves the moved set's relative order as given.
///
/// Fails with [`SceneError::StructuralCycle`] before any mutation if the
/// destination parent is one of the moved nodes or a descendant of one.
pub fn reorder(
    scene: &mut Scene,
    nodes: &[ObjectId],
    target: ObjectId,
    placement: Placement,
) -> SceneResult {
    if !scene.contains(target) {
        return Err(SceneError::ObjectNotFound(target));
    }
    let destination = match placement {
        Placement::Inside => Some(target),
        Placement::Before | Placement::After => scene.parent_of(target),
    };
    for &node in nodes {
        if !scene.contains(node) {
            return Err(SceneError::ObjectNotFound(node));
        }
        // Positioning a node relative to itself is a structural violation
        // of the same class as a cycle: the anchor vanishes mid-move.
        if node == target {
            return Err(SceneError::StructuralCycle { node, target });
        }
        if let Some(dest) = destination
            && (dest == node || scene.is_ancestor_of(node, dest))
        {
            return Err(SceneError::StructuralCycle { node, target });
        }
    }

    for &node in nodes {
        scene.detach(node)?;
    }

    let index = match placement {
        Placement::Inside => scene.children_of(target).len(),
        Placement::Before | Placement::After => {
            let base = match destination {
                Some(parent) => scene
                    .children_of(parent)
                    .iter()
                    .position(|&c| c == target),
                None => scene.root_order().iter().position(|&c| c == target),
            }
            .ok_or(SceneError::ObjectNotFound(target))?;
            if placement == Placement::After { base + 1 } else { base }
        }
    };

    for &node in nodes.iter().rev() {
        scene.insert_at(node, destination, index)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root0[a[a0, a1], b], root1
    struct Fixture {
        scene: Scene,
        root0: ObjectId,
        a: ObjectId,
        a0: ObjectId,
        a1: ObjectId,
        b: ObjectId,
        root1: ObjectId,
    }

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let root0 = scene.spawn("root0");
        let root1 = scene.spawn("root1");
        let a = scene.spawn("a");
        let b = scene.spawn("b");
        let a0 = scene.spawn("a0");
        let a1 = scene.spawn("a1");
        scene.insert_at(a, Some(root0), 0).unwrap();
        scene.insert_at(b, Some(root0), 1).unwrap();
        scene.insert_at(a0, Some(a), 0).unwrap();
        scene.insert_at(a1, Some(a), 1).unwrap();
        Fixture {
            scene,
            root0,
            a,
            a0,
            a1,
            b,
            root1,
        }
    }

    #[test]
    fn path_of_root_and_child() {
        let mut scene = Scene::new();
        let _r0 = scene.spawn("r0");
        let _r1 = scene.spawn("r1");
        let r2 = scene.spawn("r2");
        let child = scene.spawn("child");
        scene.insert_at(child, Some(r2), 0).unwrap();

        assert_eq!(path_of(&scene, r2), Some(vec![2]));
        assert_eq!(path_of(&scene, child), Some(vec![2, 0]));
    }

    #[test]
    fn compare_first_difference_wins() {
        assert_eq!(compare_paths(&[0, 5], &[1, 0]), Ordering::Less);
        assert_eq!(compare_paths(&[2], &[1, 9, 9]), Ordering::Greater);
    }

    #[test]
    fn ancestor_precedes_descendants() {
        // A strict prefix is an ancestor and sorts first.
        assert_eq!(compare_paths(&[1, 2], &[1, 2, 0]), Ordering::Less);
        assert_eq!(compare_paths(&[1, 2, 0], &[1, 2]), Ordering::Greater);
        assert_eq!(compare_paths(&[3, 1], &[3, 1]), Ordering::Equal);
    }

    #[test]
    fn sort_yields_display_order() {
        let f = fixture();
        let sorted = sort_for_hierarchy(&f.scene, &[f.root1, f.a1, f.b, f.root0, f.a0]);
        assert_eq!(sorted, vec![f.root0, f.a0, f.a1, f.b, f.root1]);
    }

    #[test]
    fn sort_matches_scene_display_order() {
        let f = fixture();
        let all = f.scene.objects_in_display_order();
        let mut shuffled = all.clone();
        shuffled.reverse();
        assert_eq!(sort_for_hierarchy(&f.scene, &shuffled), all);
    }

    #[test]
    fn filter_drops_covered_descendants() {
        let f = fixture();
        // a covers a0; root0 covers both a and b; root1 stands alone.
        assert_eq!(
            filter_top_level(&f.scene, &[f.a, f.a0, f.root1]),
            vec![f.a, f.root1]
        );
        assert_eq!(
            filter_top_level(&f.scene, &[f.root0, f.a, f.b, f.a1]),
            vec![f.root0]
        );
    }

    #[test]
    fn filter_parent_child_pair() {
        let f = fixture();
        assert_eq!(filter_top_level(&f.scene, &[f.a, f.a0]), vec![f.a]);
    }

    #[test]
    fn reorder_before_keeps_set_order() {
        let mut f = fixture();
        reorder(&mut f.scene, &[f.a0, f.a1], f.b, Placement::Before).unwrap();
        assert_eq!(f.scene.children_of(f.root0), &[f.a, f.a0, f.a1, f.b]);
        assert_eq!(f.scene.parent_of(f.a0), Some(f.root0));
    }

    #[test]
    fn reorder_after_target() {
        let mut f = fixture();
        reorder(&mut f.scene, &[f.a0], f.b, Placement::After).unwrap();
        assert_eq!(f.scene.children_of(f.root0), &[f.a, f.b, f.a0]);
    }

    #[test]
    fn reorder_inside_appends_as_last_children() {
        let mut f = fixture();
        reorder(&mut f.scene, &[f.b, f.root1], f.a, Placement::Inside).unwrap();
        assert_eq!(f.scene.children_of(f.a), &[f.a0, f.a1, f.b, f.root1]);
        assert_eq!(f.scene.parent_of(f.root1), Some(f.a));
        assert_eq!(f.scene.root_order(), &[f.root0]);
    }

    #[test]
    fn reorder_to_root_level() {
        let mut f = fixture();
        reorder(&mut f.scene, &[f.a0], f.root1, Placement::After).unwrap();
        assert_eq!(f.scene.root_order(), &[f.root0, f.root1, f.a0]);
        assert_eq!(f.scene.parent_of(f.a0), None);
    }

    #[test]
    fn reorder_into_own_descendant_fails_cleanly() {
        let mut f = fixture();
        let before = f.scene.objects_in_display_order();
        let err = reorder(&mut f.scene, &[f.root0], f.a0, Placement::Inside).unwrap_err();
        assert!(matches!(err, SceneError::StructuralCycle { .. }));
        assert_eq!(f.scene.objects_in_display_order(), before);
    }

    #[test]
    fn reorder_before_own_child_fails() {
        let mut f = fixture();
        let err = reorder(&mut f.scene, &[f.a], f.a0, Placement::Before).unwrap_err();
        assert!(matches!(err, SceneError::StructuralCycle { .. }));
    }
}
