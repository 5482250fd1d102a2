//! Zone layout engine.
//!
//! Layout is a pure function of a zone, its members in `children` order and an
//! optional drag ghost: identical inputs always produce identical positions and
//! height, which lets every peer replay the same arrangement. [`update`] is the
//! only part that writes the result back into the scene.

mod columns;
mod flow;
mod freeform;

use crate::config::LayoutConfig;
use crate::hierarchy;
use crate::objects::{ObjectId, SceneObject, Zone, ZoneKind};
use crate::scene::SceneStore;
use kurbo::Point;

/// A drag in progress: `object` previewed at `index` in the member list.
///
/// Ghosts feed the computation only; they never mutate the real object.
#[derive(Debug, Clone)]
pub struct Ghost {
    pub object: SceneObject,
    pub index: usize,
}

/// One entry fed to a strategy, with zone-relative coordinates.
#[derive(Debug, Clone)]
pub(crate) struct LayoutItem {
    pub id: ObjectId,
    pub rel: Point,
    pub w: f64,
    pub h: f64,
    /// Semantic column hint for CER zones.
    pub column: Option<usize>,
    pub is_ghost: bool,
}

impl LayoutItem {
    fn from_object(obj: &SceneObject, zone_origin: Point, is_ghost: bool) -> Self {
        let base = obj.base();
        Self {
            id: base.id.clone(),
            rel: Point::new(base.x - zone_origin.x, base.y - zone_origin.y),
            w: base.w,
            h: base.height(),
            column: obj.semantic_column(),
            is_ghost,
        }
    }
}

/// Output of a strategy: zone-relative positions (same order as the items) and content height.
#[derive(Debug, Clone)]
pub(crate) struct Arrangement {
    pub positions: Vec<Point>,
    pub content_height: f64,
}

/// Computed layout for a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Scene-space top-left for each real member, in layout order.
    pub positions: Vec<(ObjectId, Point)>,
    /// Preview position of the ghost, when one was supplied.
    pub ghost: Option<Point>,
    /// Zone height after the minimum-height clamp.
    pub height: f64,
}

/// Compute member positions and zone height.
///
/// A ghost counts as a drag in progress, so freeform zones may shrink.
pub fn compute(
    zone: &Zone,
    members: &[&SceneObject],
    ghost: Option<&Ghost>,
    config: &LayoutConfig,
) -> LayoutResult {
    arrange_zone(zone, members, ghost, ghost.is_some(), config)
}

fn arrange_zone(
    zone: &Zone,
    members: &[&SceneObject],
    ghost: Option<&Ghost>,
    dragged: bool,
    config: &LayoutConfig,
) -> LayoutResult {
    let origin = zone.base.origin();
    let ghost_id = ghost.map(|g| g.object.id());

    let mut items: Vec<LayoutItem> = members
        .iter()
        .filter(|m| Some(m.id()) != ghost_id)
        .map(|m| LayoutItem::from_object(m, origin, false))
        .collect();
    if let Some(g) = ghost {
        let at = g.index.min(items.len());
        items.insert(at, LayoutItem::from_object(&g.object, origin, true));
    }

    let arrangement = match zone.zone_kind {
        ZoneKind::Plain => flow::arrange(&items, zone.base.w, config.header_height, config),
        ZoneKind::ExitTicket => flow::arrange(
            &items,
            zone.base.w,
            config.header_height + config.exit_ticket_header,
            config,
        ),
        ZoneKind::Columns3 => columns::arrange(&items, zone.base.w, config),
        ZoneKind::Freeform => freeform::arrange(&items, zone.base.h, dragged, config),
    };

    let offset = origin.to_vec2();
    let mut positions = Vec::with_capacity(items.len());
    let mut ghost_point = None;
    for (item, rel) in items.iter().zip(arrangement.positions) {
        let abs = rel + offset;
        if item.is_ghost {
            ghost_point = Some(abs);
        } else {
            positions.push((item.id.clone(), abs));
        }
    }

    LayoutResult {
        positions,
        ghost: ghost_point,
        height: arrangement.content_height.max(config.min_zone_height),
    }
}

/// Layout for a zone in the scene, without applying it.
pub fn preview(
    scene: &SceneStore,
    zone_id: &str,
    ghost: Option<&Ghost>,
    config: &LayoutConfig,
) -> Option<LayoutResult> {
    preview_zone(scene, zone_id, ghost, ghost.is_some(), config)
}

fn preview_zone(
    scene: &SceneStore,
    zone_id: &str,
    ghost: Option<&Ghost>,
    dragged: bool,
    config: &LayoutConfig,
) -> Option<LayoutResult> {
    let zone = scene.get(zone_id)?.as_zone()?;
    let members = hierarchy::zone_members(scene, zone_id);
    Some(arrange_zone(zone, &members, ghost, dragged, config))
}

/// What [`update`] changed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutUpdate {
    pub result: LayoutResult,
    /// Members whose position changed.
    pub moved: Vec<ObjectId>,
    /// Whether the zone height was written.
    pub resized: bool,
}

impl LayoutUpdate {
    /// Ids of every object that changed, zone first.
    pub fn changed_ids(&self, zone_id: &str) -> Vec<ObjectId> {
        let mut ids = Vec::with_capacity(self.moved.len() + 1);
        if self.resized {
            ids.push(zone_id.to_string());
        }
        ids.extend(self.moved.iter().cloned());
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && !self.resized
    }
}

/// Recompute a zone's layout and write positions and height back.
///
/// The ghost, if any, only shapes the arrangement of the real members. Height
/// is written only when it differs from the current one by more than the
/// debounce threshold.
pub fn update(
    scene: &mut SceneStore,
    zone_id: &str,
    ghost: Option<&Ghost>,
    config: &LayoutConfig,
) -> Option<LayoutUpdate> {
    write_back(scene, zone_id, ghost, ghost.is_some(), config)
}

/// Like [`update`] after a member was dragged: freeform zones may shrink to
/// fit their members.
pub fn update_after_drag(
    scene: &mut SceneStore,
    zone_id: &str,
    config: &LayoutConfig,
) -> Option<LayoutUpdate> {
    write_back(scene, zone_id, None, true, config)
}

fn write_back(
    scene: &mut SceneStore,
    zone_id: &str,
    ghost: Option<&Ghost>,
    dragged: bool,
    config: &LayoutConfig,
) -> Option<LayoutUpdate> {
    let result = preview_zone(scene, zone_id, ghost, dragged, config)?;

    let mut moved = Vec::new();
    for (id, point) in &result.positions {
        if let Some(obj) = scene.get_mut(id) {
            let base = obj.base_mut();
            if base.x != point.x || base.y != point.y {
                base.x = point.x;
                base.y = point.y;
                moved.push(id.clone());
            }
        }
    }

    let mut resized = false;
    if let Some(zone) = scene.get_mut(zone_id) {
        let base = zone.base_mut();
        let old = base.h.unwrap_or(0.0);
        if (result.height - old).abs() > config.height_debounce {
            base.h = Some(result.height);
            resized = true;
        }
    }

    Some(LayoutUpdate { result, moved, resized })
}

/// Insertion index for a drop at `point`.
///
/// Scans members in order (skipping `exclude`) and returns the index of the
/// first whose vertical centre is below the point while the point is left of
/// its right edge. Appends when nothing matches.
pub fn insertion_index(members: &[&SceneObject], point: Point, exclude: Option<&str>) -> usize {
    let candidates: Vec<&&SceneObject> =
        members.iter().filter(|m| Some(m.id()) != exclude).collect();
    candidates
        .iter()
        .position(|m| {
            let b = m.bounds();
            b.center().y > point.y && point.x < b.x1
        })
        .unwrap_or(candidates.len())
}
