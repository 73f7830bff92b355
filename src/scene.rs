//! In-memory scene of the open page: regions, lines and the selection.
//!
//! Everything here is synchronous and local. The persistence gateway merges
//! server results back in through [`SceneStore::assign_region_id`] and friends.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Line, LocalId, Region, Selection, ShapeRef};

/// Shape counts for the open page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageStats {
    pub regions_total: usize,
    pub lines_total: usize,
    /// Region count per type name
    pub regions_by_type: BTreeMap<String, usize>,
}

/// Regions and lines of one page, in insertion (= drawing) order.
#[derive(Debug, Default)]
pub struct SceneStore {
    regions: Vec<Region>,
    lines: Vec<Line>,
    selection: Selection,
    next_local: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh local id. Ids are never reused, even across pages.
    pub fn allocate_id(&mut self) -> LocalId {
        self.next_local += 1;
        LocalId(self.next_local)
    }

    /// Replace the whole scene in one step.
    ///
    /// Lines whose owner is not among `regions` are dropped with a warning.
    pub fn load_page(&mut self, regions: Vec<Region>, lines: Vec<Line>) {
        let (kept, orphans): (Vec<Line>, Vec<Line>) = lines
            .into_iter()
            .partition(|line| regions.iter().any(|r| r.local == line.region));
        for orphan in &orphans {
            log::warn!(
                "Dropping line {:?}: owning region {} is not on the page",
                orphan.id,
                orphan.region
            );
        }

        self.regions = regions;
        self.lines = kept;
        self.selection = Selection::None;
        log::debug!(
            "Scene loaded: {} regions, {} lines",
            self.regions.len(),
            self.lines.len()
        );
    }

    /// Drop all shapes and the selection.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.lines.clear();
        self.selection = Selection::None;
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.lines.is_empty()
    }

    pub fn region(&self, local: LocalId) -> Option<&Region> {
        self.regions.iter().find(|r| r.local == local)
    }

    pub fn region_mut(&mut self, local: LocalId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.local == local)
    }

    pub fn line(&self, local: LocalId) -> Option<&Line> {
        self.lines.iter().find(|l| l.local == local)
    }

    pub fn line_mut(&mut self, local: LocalId) -> Option<&mut Line> {
        self.lines.iter_mut().find(|l| l.local == local)
    }

    /// Look up a region by server id. Unsaved regions are not addressable.
    pub fn get_region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id.as_deref() == Some(id))
    }

    /// Look up a line by server id.
    pub fn get_line(&self, id: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.id.as_deref() == Some(id))
    }

    /// Insert a region, or replace the one with the same local id in place.
    pub fn upsert_region(&mut self, region: Region) {
        match self.regions.iter_mut().find(|r| r.local == region.local) {
            Some(existing) => *existing = region,
            None => self.regions.push(region),
        }
    }

    /// Insert or replace a line. Returns false (and changes nothing) if the
    /// owning region is not in the scene.
    pub fn upsert_line(&mut self, line: Line) -> bool {
        if self.region(line.region).is_none() {
            log::warn!(
                "Refusing line {}: owning region {} does not exist",
                line.local,
                line.region
            );
            return false;
        }
        match self.lines.iter_mut().find(|l| l.local == line.local) {
            Some(existing) => *existing = line,
            None => self.lines.push(line),
        }
        true
    }

    /// Remove a region together with all of its lines.
    pub fn remove_region(&mut self, local: LocalId) -> Option<(Region, Vec<Line>)> {
        let index = self.regions.iter().position(|r| r.local == local)?;
        let region = self.regions.remove(index);

        let (owned, rest): (Vec<Line>, Vec<Line>) =
            std::mem::take(&mut self.lines).into_iter().partition(|l| l.region == local);
        self.lines = rest;

        let selected_gone = match self.selection.shape() {
            Some((ShapeRef::Region(id), _)) => id == local,
            Some((ShapeRef::Line(id), _)) => owned.iter().any(|l| l.local == id),
            None => false,
        };
        if selected_gone {
            self.selection = Selection::None;
        }

        Some((region, owned))
    }

    pub fn remove_line(&mut self, local: LocalId) -> Option<Line> {
        let index = self.lines.iter().position(|l| l.local == local)?;
        if self.selection.line() == Some(local) {
            self.selection = Selection::None;
        }
        Some(self.lines.remove(index))
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection. A selection naming a missing shape or vertex
    /// clears it instead.
    pub fn set_selection(&mut self, selection: Selection) {
        if self.selection_is_valid(&selection) {
            self.selection = selection;
        } else {
            log::warn!("Ignoring selection of missing shape: {:?}", selection);
            self.selection = Selection::None;
        }
    }

    fn selection_is_valid(&self, selection: &Selection) -> bool {
        match selection {
            Selection::None => true,
            Selection::Region(id) => self.region(*id).is_some(),
            Selection::Line { id, .. } => self.line(*id).is_some(),
            Selection::Point(handle) => match handle.shape {
                ShapeRef::Region(id) => self
                    .region(id)
                    .is_some_and(|r| !handle.baseline && handle.index < r.points.len()),
                ShapeRef::Line(id) => self
                    .line(id)
                    .is_some_and(|l| handle.index < l.point_array(handle.baseline).len()),
            },
        }
    }

    /// Record the server id of a region. Returns false if it is gone.
    pub fn assign_region_id(&mut self, local: LocalId, id: impl Into<String>) -> bool {
        match self.region_mut(local) {
            Some(region) => {
                region.id = Some(id.into());
                true
            }
            None => false,
        }
    }

    /// Record the server id of a line. Returns false if it is gone.
    pub fn assign_line_id(&mut self, local: LocalId, id: impl Into<String>) -> bool {
        match self.line_mut(local) {
            Some(line) => {
                line.id = Some(id.into());
                true
            }
            None => false,
        }
    }

    pub fn stats(&self) -> PageStats {
        let mut by_type = BTreeMap::new();
        for region in &self.regions {
            *by_type.entry(region.kind.name().to_string()).or_insert(0) += 1;
        }
        PageStats {
            regions_total: self.regions.len(),
            lines_total: self.lines.len(),
            regions_by_type: by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, PointHandle, RegionType};

    fn square(x: f64) -> Vec<Point> {
        vec![
            Point::new(x, 0.0),
            Point::new(x + 10.0, 0.0),
            Point::new(x + 10.0, 10.0),
            Point::new(x, 10.0),
        ]
    }

    fn populated() -> (SceneStore, LocalId, LocalId, LocalId, LocalId) {
        let mut scene = SceneStore::new();
        let r1 = scene.allocate_id();
        let r2 = scene.allocate_id();
        let l1 = scene.allocate_id();
        let l2 = scene.allocate_id();
        scene.load_page(
            vec![
                Region::new(r1, RegionType::Text, square(0.0)).with_id("r1"),
                Region::new(r2, RegionType::Table, square(20.0)).with_id("r2"),
            ],
            vec![
                Line::new(l1, r1, vec![Point::new(1.0, 1.0), Point::new(9.0, 1.0)]),
                Line::new(l2, r1, vec![Point::new(1.0, 5.0), Point::new(9.0, 5.0)]),
            ],
        );
        (scene, r1, r2, l1, l2)
    }

    #[test]
    fn local_ids_are_unique() {
        let mut scene = SceneStore::new();
        let a = scene.allocate_id();
        scene.clear();
        let b = scene.allocate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn load_drops_orphan_lines() {
        let mut scene = SceneStore::new();
        let r = scene.allocate_id();
        let l = scene.allocate_id();
        let orphan = scene.allocate_id();
        scene.load_page(
            vec![Region::new(r, RegionType::Text, square(0.0))],
            vec![
                Line::new(l, r, vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]),
                Line::new(orphan, LocalId(999), vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]),
            ],
        );
        assert_eq!(scene.lines().len(), 1);
        assert!(scene.line(orphan).is_none());
    }

    #[test]
    fn remove_region_cascades() {
        let (mut scene, r1, r2, l1, _) = populated();
        scene.set_selection(Selection::Line { id: l1, baseline: false });

        let (region, lines) = scene.remove_region(r1).unwrap();
        assert_eq!(region.local, r1);
        assert_eq!(lines.len(), 2);
        assert!(scene.lines().is_empty());
        assert!(scene.region(r2).is_some());
        assert!(scene.selection().is_none());
    }

    #[test]
    fn unsaved_regions_are_not_addressable_by_id() {
        let (mut scene, _, _, _, _) = populated();
        let fresh = scene.allocate_id();
        scene.upsert_region(Region::new(fresh, RegionType::Text, square(40.0)));

        assert_eq!(scene.get_region("r2").map(|r| r.kind.clone()), Some(RegionType::Table));
        assert_eq!(scene.regions().iter().filter(|r| r.id.is_none()).count(), 1);

        assert!(scene.assign_region_id(fresh, "r3"));
        assert_eq!(scene.get_region("r3").map(|r| r.local), Some(fresh));
    }

    #[test]
    fn upsert_line_requires_owner() {
        let (mut scene, _, _, _, _) = populated();
        let l = scene.allocate_id();
        let line = Line::new(l, LocalId(12345), vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(!scene.upsert_line(line));
        assert!(scene.line(l).is_none());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let (mut scene, r1, r2, _, _) = populated();
        let mut moved = scene.region(r1).unwrap().clone();
        moved.points[0] = Point::new(-5.0, -5.0);
        scene.upsert_region(moved);
        assert_eq!(scene.regions()[0].local, r1);
        assert_eq!(scene.regions()[1].local, r2);
        assert_eq!(scene.regions()[0].points[0], Point::new(-5.0, -5.0));
    }

    #[test]
    fn invalid_point_selection_is_cleared() {
        let (mut scene, r1, _, _, _) = populated();
        scene.set_selection(Selection::Point(PointHandle {
            shape: ShapeRef::Region(r1),
            index: 17,
            baseline: false,
        }));
        assert!(scene.selection().is_none());

        let valid = Selection::Point(PointHandle {
            shape: ShapeRef::Region(r1),
            index: 2,
            baseline: false,
        });
        scene.set_selection(valid);
        assert_eq!(scene.selection(), valid);
    }

    #[test]
    fn stats_count_by_type() {
        let (scene, _, _, _, _) = populated();
        let stats = scene.stats();
        assert_eq!(stats.regions_total, 2);
        assert_eq!(stats.lines_total, 2);
        assert_eq!(stats.regions_by_type.get("TextRegion"), Some(&1));
        assert_eq!(stats.regions_by_type.get("TableRegion"), Some(&1));
    }
}
