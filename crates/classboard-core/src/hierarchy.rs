//! Zone containment.
//!
//! Containment is stored on the objects themselves: a zone lists its members in
//! `children`, and each member points back through `parent_zone_id`. The
//! functions here are the only code that edits either side, and they always
//! edit both, so for every zone `Z`: `c ∈ Z.children ⇔ c.parent_zone_id == Z.id`.
//!
//! Unresolvable ids and invalid targets are silent no-ops (`false` / empty).

use crate::objects::{ObjectId, SceneObject};
use crate::scene::SceneStore;
use std::collections::HashSet;

/// Link `child_id` into `zone_id` at `index` (clamped; `None` appends).
///
/// Moves the child out of any other zone first. Re-linking into the same zone
/// moves it to the new index. Rejects non-zone targets, self-links and links
/// that would make a zone its own descendant.
pub fn link(scene: &mut SceneStore, child_id: &str, zone_id: &str, index: Option<usize>) -> bool {
    if child_id == zone_id || !scene.contains(child_id) {
        return false;
    }
    match scene.get(zone_id) {
        Some(obj) if obj.is_zone() => {}
        Some(_) => {
            log::warn!("Refusing to link {} into non-zone {}", child_id, zone_id);
            return false;
        }
        None => return false,
    }
    if descendants(scene, child_id).iter().any(|d| d == zone_id) {
        log::warn!("Refusing to link zone {} into its own descendant {}", child_id, zone_id);
        return false;
    }

    let current_parent = scene.get(child_id).and_then(|c| c.base().parent_zone_id.clone());
    if current_parent.is_some() {
        unlink(scene, child_id);
    }

    if let Some(zone) = scene.get_mut(zone_id).and_then(SceneObject::as_zone_mut) {
        zone.insert_child(child_id.to_string(), index);
    }
    if let Some(child) = scene.get_mut(child_id) {
        child.base_mut().parent_zone_id = Some(zone_id.to_string());
    }
    true
}

/// Remove `child_id` from its zone. Returns false if it had no parent.
pub fn unlink(scene: &mut SceneStore, child_id: &str) -> bool {
    let Some(parent_id) = scene.get(child_id).and_then(|c| c.base().parent_zone_id.clone()) else {
        return false;
    };
    if let Some(zone) = scene.get_mut(&parent_id).and_then(SceneObject::as_zone_mut) {
        zone.remove_child(child_id);
    }
    if let Some(child) = scene.get_mut(child_id) {
        child.base_mut().parent_zone_id = None;
    }
    true
}

/// All transitive members of a zone, pre-order. Empty for non-zones.
///
/// Guarded against cycles: each id is visited at most once.
pub fn descendants(scene: &SceneStore, id: &str) -> Vec<ObjectId> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(id.to_string());
    collect_descendants(scene, id, &mut visited, &mut out);
    out
}

fn collect_descendants(
    scene: &SceneStore,
    id: &str,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<ObjectId>,
) {
    let Some(zone) = scene.get(id).and_then(SceneObject::as_zone) else {
        return;
    };
    for child in &zone.children {
        if !visited.insert(child.clone()) {
            log::warn!("Containment cycle at {} under zone {}", child, id);
            continue;
        }
        out.push(child.clone());
        collect_descendants(scene, child, visited, out);
    }
}

/// Resolved members of a zone in layout order.
pub fn zone_members<'a>(scene: &'a SceneStore, zone_id: &str) -> Vec<&'a SceneObject> {
    scene
        .get(zone_id)
        .and_then(SceneObject::as_zone)
        .map(|z| z.children.iter().filter_map(|c| scene.get(c)).collect())
        .unwrap_or_default()
}

/// Expand `ids` with every object sharing a group tag with one of them.
///
/// One pass: groups reached only through another group's members are not followed.
/// Unresolved ids are dropped; the result has no duplicates.
pub fn group_closure(scene: &SceneStore, ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    let mut closure = Vec::new();
    let mut groups = Vec::new();

    for id in ids {
        let Some(obj) = scene.get(id) else { continue };
        if seen.insert(id.clone()) {
            closure.push(id.clone());
        }
        if let Some(g) = &obj.base().group_id {
            if !groups.contains(g) {
                groups.push(g.clone());
            }
        }
    }
    for group in &groups {
        for member in scene.group_members(group) {
            if seen.insert(member.clone()) {
                closure.push(member);
            }
        }
    }
    closure
}

/// Break every containment link touching `id`: its own children are orphaned
/// (they keep their position) and it leaves its parent.
///
/// Returns the orphaned child ids.
pub fn detach(scene: &mut SceneStore, id: &str) -> Vec<ObjectId> {
    let children = scene
        .get(id)
        .and_then(SceneObject::as_zone)
        .map(|z| z.children.clone())
        .unwrap_or_default();

    let mut orphaned = Vec::new();
    for child in children {
        let points_here = scene
            .get(&child)
            .is_some_and(|c| c.base().parent_zone_id.as_deref() == Some(id));
        if points_here {
            unlink(scene, &child);
            orphaned.push(child);
        } else if let Some(zone) = scene.get_mut(id).and_then(SceneObject::as_zone_mut) {
            zone.remove_child(&child);
        }
    }
    unlink(scene, id);
    orphaned
}

/// Replace a zone's member order wholesale.
///
/// Unresolved, duplicate and cycle-forming ids are skipped; previous members
/// missing from `children` are unlinked. Returns false if `zone_id` is not a zone.
pub fn reorder_children(scene: &mut SceneStore, zone_id: &str, children: &[ObjectId]) -> bool {
    let Some(previous) = scene.get(zone_id).and_then(SceneObject::as_zone).map(|z| z.children.clone())
    else {
        return false;
    };
    for old in previous.iter().filter(|c| !children.contains(c)) {
        if scene.get(old).is_some_and(|o| o.base().parent_zone_id.as_deref() == Some(zone_id)) {
            unlink(scene, old);
        } else if let Some(zone) = scene.get_mut(zone_id).and_then(SceneObject::as_zone_mut) {
            zone.remove_child(old);
        }
    }
    let mut placed = HashSet::new();
    let mut slot = 0;
    for id in children {
        if !placed.insert(id) {
            continue;
        }
        if link(scene, id, zone_id, Some(slot)) {
            slot += 1;
        }
    }
    true
}

/// What [`delete_many`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    /// Removed ids, in closure order.
    pub deleted: Vec<ObjectId>,
    /// Former members of deleted zones, now top-level.
    pub orphaned: Vec<ObjectId>,
    /// Surviving zones that lost a member.
    pub parent_zones: Vec<ObjectId>,
}

/// Delete `ids` together with their group closure.
///
/// Deleted zones orphan their members rather than deleting them. Deleted ids
/// also leave the selection.
pub fn delete_many(scene: &mut SceneStore, ids: &[ObjectId]) -> DeleteOutcome {
    let closure = group_closure(scene, ids);
    let doomed: HashSet<&ObjectId> = closure.iter().collect();
    let mut outcome = DeleteOutcome::default();

    for id in &closure {
        if let Some(parent) = scene.get(id).and_then(|o| o.base().parent_zone_id.clone()) {
            if !doomed.contains(&parent) && !outcome.parent_zones.contains(&parent) {
                outcome.parent_zones.push(parent);
            }
        }
        for child in detach(scene, id) {
            if !doomed.contains(&child) {
                outcome.orphaned.push(child);
            }
        }
    }
    for id in &closure {
        if scene.remove_raw(id).is_some() {
            outcome.deleted.push(id.clone());
        }
    }
    outcome
}

/// Clear group tags carried by a single remaining object.
///
/// Returns the ids whose tag was cleared.
pub fn prune_singleton_groups(scene: &mut SceneStore) -> Vec<ObjectId> {
    let mut counts: std::collections::HashMap<String, Vec<ObjectId>> = Default::default();
    for obj in scene.objects() {
        if let Some(g) = &obj.base().group_id {
            counts.entry(g.clone()).or_default().push(obj.id().to_string());
        }
    }
    let mut cleared = Vec::new();
    for members in counts.into_values().filter(|m| m.len() == 1) {
        for id in members {
            if let Some(obj) = scene.get_mut(&id) {
                obj.base_mut().group_id = None;
                cleared.push(id);
            }
        }
    }
    cleared
}

/// Check the bidirectional containment invariant over the whole scene.
pub fn is_consistent(scene: &SceneStore) -> bool {
    for obj in scene.objects() {
        if let Some(zone) = obj.as_zone() {
            let mut seen = HashSet::new();
            for c in &zone.children {
                if !seen.insert(c) {
                    return false;
                }
                let back = scene.get(c).and_then(|o| o.base().parent_zone_id.as_deref());
                if back != Some(obj.id()) {
                    return false;
                }
            }
        }
        if let Some(parent) = &obj.base().parent_zone_id {
            let listed = scene
                .get(parent)
                .and_then(SceneObject::as_zone)
                .is_some_and(|z| z.contains_child(obj.id()));
            if !listed {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Note, Zone, ZoneKind};

    fn note(scene: &mut SceneStore, id: &str) {
        let mut n = Note::new(10.0, 10.0, id);
        n.base.id = id.to_string();
        scene.insert(SceneObject::Note(n));
    }

    fn zone(scene: &mut SceneStore, id: &str) {
        let mut z = Zone::new(0.0, 0.0, id, ZoneKind::Plain);
        z.base.id = id.to_string();
        scene.insert(SceneObject::Zone(z));
    }

    fn children(scene: &SceneStore, id: &str) -> Vec<String> {
        scene.get(id).and_then(SceneObject::as_zone).unwrap().children.clone()
    }

    fn ids(list: &[&str]) -> Vec<ObjectId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_link_sets_both_sides() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        note(&mut scene, "a");

        assert!(link(&mut scene, "a", "z", None));
        assert_eq!(children(&scene, "z"), vec!["a"]);
        assert_eq!(scene.get("a").unwrap().base().parent_zone_id.as_deref(), Some("z"));
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_link_moves_between_zones() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z1");
        zone(&mut scene, "z2");
        note(&mut scene, "a");

        link(&mut scene, "a", "z1", None);
        link(&mut scene, "a", "z2", None);

        assert!(children(&scene, "z1").is_empty());
        assert_eq!(children(&scene, "z2"), vec!["a"]);
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_link_index_clamped_and_reorders() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        for id in ["a", "b", "c"] {
            note(&mut scene, id);
            link(&mut scene, id, "z", None);
        }
        link(&mut scene, "c", "z", Some(0));
        assert_eq!(children(&scene, "z"), vec!["c", "a", "b"]);

        link(&mut scene, "c", "z", Some(100));
        assert_eq!(children(&scene, "z"), vec!["a", "b", "c"]);
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_link_rejects_invalid_targets() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        note(&mut scene, "a");
        note(&mut scene, "b");

        assert!(!link(&mut scene, "a", "b", None));
        assert!(!link(&mut scene, "a", "missing", None));
        assert!(!link(&mut scene, "missing", "z", None));
        assert!(!link(&mut scene, "z", "z", None));
        assert!(scene.get("a").unwrap().base().parent_zone_id.is_none());
    }

    #[test]
    fn test_link_rejects_cycle() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "outer");
        zone(&mut scene, "inner");
        assert!(link(&mut scene, "inner", "outer", None));
        assert!(!link(&mut scene, "outer", "inner", None));
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_unlink() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        note(&mut scene, "a");
        link(&mut scene, "a", "z", None);

        assert!(unlink(&mut scene, "a"));
        assert!(!unlink(&mut scene, "a"));
        assert!(children(&scene, "z").is_empty());
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "root");
        zone(&mut scene, "sub");
        note(&mut scene, "a");
        note(&mut scene, "b");
        link(&mut scene, "sub", "root", None);
        link(&mut scene, "b", "root", None);
        link(&mut scene, "a", "sub", None);

        assert_eq!(descendants(&scene, "root"), vec!["sub", "a", "b"]);
        assert!(descendants(&scene, "a").is_empty());
    }

    #[test]
    fn test_descendants_survives_corrupt_cycle() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z1");
        zone(&mut scene, "z2");
        // Forge a cycle behind the hierarchy's back.
        scene.get_mut("z1").unwrap().as_zone_mut().unwrap().children.push("z2".into());
        scene.get_mut("z2").unwrap().as_zone_mut().unwrap().children.push("z1".into());

        assert_eq!(descendants(&scene, "z1"), vec!["z2"]);
    }

    #[test]
    fn test_delete_zone_orphans_members() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        note(&mut scene, "a");
        note(&mut scene, "b");
        link(&mut scene, "a", "z", None);
        link(&mut scene, "b", "z", None);
        scene.get_mut("a").unwrap().base_mut().x = 123.0;

        let outcome = delete_many(&mut scene, &ids(&["z"]));

        assert_eq!(outcome.deleted, vec!["z"]);
        assert_eq!(outcome.orphaned, vec!["a", "b"]);
        assert!(!scene.contains("z"));
        assert!(scene.get("a").unwrap().base().parent_zone_id.is_none());
        assert!(scene.get("b").unwrap().base().parent_zone_id.is_none());
        assert_eq!(scene.get("a").unwrap().base().x, 123.0);
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_delete_member_only_removes_member() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        note(&mut scene, "a");
        note(&mut scene, "b");
        link(&mut scene, "a", "z", None);
        link(&mut scene, "b", "z", None);

        let outcome = delete_many(&mut scene, &ids(&["a"]));

        assert_eq!(outcome.parent_zones, vec!["z"]);
        assert_eq!(children(&scene, "z"), vec!["b"]);
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_group_cascade() {
        let mut scene = SceneStore::new();
        for id in ["a", "b", "c", "d"] {
            note(&mut scene, id);
        }
        for id in ["a", "b", "c"] {
            scene.get_mut(id).unwrap().base_mut().group_id = Some("g1".into());
        }
        scene.select("b");

        let outcome = delete_many(&mut scene, &ids(&["a"]));

        assert_eq!(outcome.deleted, vec!["a", "b", "c"]);
        assert!(scene.contains("d"));
        assert!(!scene.is_selected("b"));
    }

    #[test]
    fn test_group_closure_single_pass() {
        let mut scene = SceneStore::new();
        for id in ["a", "b", "c"] {
            note(&mut scene, id);
        }
        scene.get_mut("a").unwrap().base_mut().group_id = Some("g1".into());
        scene.get_mut("b").unwrap().base_mut().group_id = Some("g1".into());
        scene.get_mut("c").unwrap().base_mut().group_id = Some("g2".into());

        assert_eq!(group_closure(&scene, &ids(&["a", "missing"])), vec!["a", "b"]);
    }

    #[test]
    fn test_delete_zone_with_grouped_member() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        note(&mut scene, "a");
        note(&mut scene, "b");
        link(&mut scene, "a", "z", None);
        scene.get_mut("z").unwrap().base_mut().group_id = Some("g".into());
        scene.get_mut("a").unwrap().base_mut().group_id = Some("g".into());

        let outcome = delete_many(&mut scene, &ids(&["z"]));

        assert_eq!(outcome.deleted, vec!["z", "a"]);
        assert!(outcome.orphaned.is_empty());
        assert!(scene.contains("b"));
        assert!(is_consistent(&scene));
    }

    #[test]
    fn test_reorder_children() {
        let mut scene = SceneStore::new();
        zone(&mut scene, "z");
        zone(&mut scene, "other");
        for id in ["a", "b", "c", "d"] {
            note(&mut scene, id);
        }
        link(&mut scene, "a", "z", None);
        link(&mut scene, "b", "z", None);
        link(&mut scene, "c", "z", None);
        link(&mut scene, "d", "other", None);

        assert!(reorder_children(&mut scene, "z", &ids(&["c", "missing", "d", "a", "c"])));

        assert_eq!(children(&scene, "z"), vec!["c", "d", "a"]);
        assert!(children(&scene, "other").is_empty());
        assert!(scene.get("b").unwrap().base().parent_zone_id.is_none());
        assert!(is_consistent(&scene));
        assert!(!reorder_children(&mut scene, "a", &[]));
    }

    #[test]
    fn test_mixed_edits_keep_containment_symmetric() {
        use crate::placement::JitterRng;

        let zones = ["z0", "z1", "z2", "z3"];
        let notes = ["n0", "n1", "n2", "n3", "n4", "n5"];
        let all: Vec<&str> = zones.iter().chain(notes.iter()).copied().collect();
        let mut scene = SceneStore::new();
        let mut rng = JitterRng::new(2024);
        let mut pick = |n: usize| (rng.next_u64() % n as u64) as usize;

        for step in 0..400 {
            match pick(5) {
                0 => {
                    let index = if pick(2) == 0 { None } else { Some(pick(4)) };
                    link(&mut scene, all[pick(all.len())], zones[pick(zones.len())], index);
                }
                1 => {
                    unlink(&mut scene, all[pick(all.len())]);
                }
                2 => {
                    // Includes duplicates, missing ids and the zone itself.
                    let order: Vec<ObjectId> =
                        (0..pick(5)).map(|_| all[pick(all.len())].to_string()).collect();
                    reorder_children(&mut scene, zones[pick(zones.len())], &order);
                }
                3 => {
                    delete_many(&mut scene, &ids(&[all[pick(all.len())]]));
                }
                _ => {
                    for id in &all {
                        if scene.contains(id) {
                            continue;
                        }
                        if id.starts_with('z') {
                            zone(&mut scene, id);
                        } else {
                            note(&mut scene, id);
                            if pick(3) == 0 {
                                scene.get_mut(id).unwrap().base_mut().group_id = Some("g".into());
                            }
                        }
                    }
                }
            }
            assert!(is_consistent(&scene), "containment broken after step {}", step);
            for z in zones {
                let mut current = scene.get(z).and_then(|o| o.base().parent_zone_id.clone());
                let mut hops = 0;
                while let Some(parent) = current {
                    assert_ne!(parent, z, "zone {} contains itself after step {}", z, step);
                    hops += 1;
                    assert!(hops <= zones.len(), "parent chain loops after step {}", step);
                    current = scene.get(&parent).and_then(|o| o.base().parent_zone_id.clone());
                }
            }
        }
    }

    #[test]
    fn test_prune_singleton_groups() {
        let mut scene = SceneStore::new();
        note(&mut scene, "a");
        note(&mut scene, "b");
        note(&mut scene, "c");
        scene.get_mut("a").unwrap().base_mut().group_id = Some("solo".into());
        scene.get_mut("b").unwrap().base_mut().group_id = Some("pair".into());
        scene.get_mut("c").unwrap().base_mut().group_id = Some("pair".into());

        assert_eq!(prune_singleton_groups(&mut scene), vec!["a"]);
        assert!(scene.get("a").unwrap().base().group_id.is_none());
        assert!(scene.get("b").unwrap().base().group_id.is_some());
    }
}
