//! Mines on the shared mine orbit
//!
//! Mines spread themselves evenly around their orbit. Whenever the
//! population changes the dispatcher lays out one slot per mine, anchored at
//! the newest mine, matches mines to slots greedily by circular distance and
//! hands out one new target per tick. A mine with a target speeds up in
//! proportion to how far behind its slot it is, brakes near it, and snaps
//! onto it using the interception rule.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::intercept::{StepOutcome, resolve_step};
use super::orbit::Orbit;
use super::path::PathTable;
use super::walker::PathWalker;
use crate::consts::*;
use crate::{circular_distance, forward_distance};

pub type MineId = u32;

/// A single mine
#[derive(Debug, Clone)]
pub struct Mine {
    pub id: MineId,
    walker: PathWalker,
    /// Slot being chased; it keeps orbiting at base speed
    target: Option<PathWalker>,
    target_speed_multiplier: f32,
}

impl Mine {
    fn new(id: MineId, path: Arc<PathTable>, index: usize, speed: f32) -> Self {
        Self {
            id,
            walker: PathWalker::new(path, index, speed),
            target: None,
            target_speed_multiplier: 1.0,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.walker.index()
    }

    pub fn position(&self) -> Vec2 {
        self.walker.position()
    }

    pub fn scale(&self) -> f32 {
        self.walker.scale()
    }

    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.walker.speed_multiplier
    }

    /// Slot the mine is currently chasing
    pub fn target_index(&self) -> Option<usize> {
        self.target.as_ref().map(PathWalker::index)
    }

    fn len(&self) -> usize {
        self.walker.table().len()
    }

    fn catch_up_multiplier(&self, target: usize) -> f32 {
        let len = self.len();
        let diff = forward_distance(self.index(), target, len) as f32;
        let full_speed_distance = len as f32 * MINE_FULL_SPEED_DISTANCE_RATIO;
        let ratio = if full_speed_distance > 0.0 {
            (diff / full_speed_distance).min(1.0)
        } else {
            0.0
        };
        1.0 + (MINE_MAX_SPEED_MULTIPLIER - 1.0) * ratio
    }

    /// Start chasing `target`, or stop chasing with `None`
    pub fn set_target(&mut self, target: Option<usize>) {
        match target {
            Some(index) => {
                let index = index % self.len().max(1);
                self.target_speed_multiplier = self.catch_up_multiplier(index);
                let path = self.walker.table().clone();
                self.target = Some(PathWalker::new(path, index, self.walker.speed));
            }
            None => {
                self.target = None;
                self.target_speed_multiplier = 1.0;
            }
        }
    }

    /// Advance one tick; returns true when the mine reached its slot
    pub fn tick(&mut self, delta_ms: f32) -> bool {
        let len = self.len();
        if len == 0 {
            return false;
        }

        let multiplier = self.walker.speed_multiplier;
        if self.target.is_some() || (multiplier - self.target_speed_multiplier).abs() > 0.001 {
            let blend = (MINE_ACCELERATION * delta_ms).clamp(0.0, 1.0);
            self.walker.speed_multiplier += (self.target_speed_multiplier - multiplier) * blend;
        }

        let Some(target) = self.target.as_mut() else {
            self.walker.advance(delta_ms);
            return false;
        };
        target.advance(delta_ms);
        let target = target.index();

        let diff = forward_distance(self.index(), target, len) as f32;
        let braking_distance = len as f32 * MINE_BRAKING_DISTANCE_RATIO;
        if diff < braking_distance {
            let brake_ratio = (diff / braking_distance).max(MINE_MIN_BRAKE_RATIO);
            self.target_speed_multiplier = 1.0 + (MINE_MAX_SPEED_MULTIPLIER - 1.0) * brake_ratio;
        }

        let steps = self.walker.take_steps(delta_ms);
        match resolve_step(len, self.index(), steps, target) {
            StepOutcome::Intercepted { index, overshoot } => {
                self.walker.snap_to(index, overshoot);
                self.walker.speed_multiplier = 1.0;
                self.set_target(None);
                true
            }
            StepOutcome::Moved { index } => {
                self.walker.set_index(index);
                false
            }
        }
    }
}

/// A mine matched to a target slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub mine_id: MineId,
    pub slot: usize,
}

/// Owns the mines of one orbit and spaces them evenly
#[derive(Debug, Clone)]
pub struct MineDispatcher {
    path: Arc<PathTable>,
    speed: f32,
    mines: Vec<Mine>,
    slots: Vec<usize>,
    assignments: Vec<Assignment>,
    /// Next assignment to hand out
    cursor: usize,
    /// How far the slots have orbited since they were laid out
    drift: PathWalker,
    next_id: MineId,
}

impl MineDispatcher {
    pub fn new(orbit: &Orbit) -> Self {
        Self::with_path(orbit.path.clone(), orbit.speed)
    }

    pub fn with_path(path: Arc<PathTable>, speed: f32) -> Self {
        Self {
            drift: PathWalker::new(path.clone(), 0, speed),
            path,
            speed,
            mines: Vec::new(),
            slots: Vec::new(),
            assignments: Vec::new(),
            cursor: 0,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.mines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    pub fn mines(&self) -> &[Mine] {
        &self.mines
    }

    pub fn mine(&self, id: MineId) -> Option<&Mine> {
        self.mines.iter().find(|m| m.id == id)
    }

    /// Current slot layout (one per mine)
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Assignments not yet handed to their mines
    pub fn pending(&self) -> usize {
        self.assignments.len() - self.cursor
    }

    /// Add one mine at `index` on the orbit
    pub fn add_mine(&mut self, index: usize) -> MineId {
        let id = self.spawn(index);
        self.redistribute();
        id
    }

    /// Drop a batch of `count` mines starting at `index`, `spacing` samples apart
    pub fn deliver(&mut self, index: usize, count: usize, spacing: usize) -> Vec<MineId> {
        let ids: Vec<MineId> = (0..count).map(|i| self.spawn(index + i * spacing)).collect();
        if !ids.is_empty() {
            log::info!("Delivered {} mines at orbit index {}", ids.len(), index);
            self.redistribute();
        }
        ids
    }

    /// Remove a mine; returns false if it was not present
    pub fn remove_mine(&mut self, id: MineId) -> bool {
        let Some(pos) = self.mines.iter().position(|m| m.id == id) else {
            return false;
        };
        self.mines.remove(pos);
        self.redistribute();
        true
    }

    fn spawn(&mut self, index: usize) -> MineId {
        let id = self.next_id;
        self.next_id += 1;
        self.mines.push(Mine::new(id, self.path.clone(), index, self.speed));
        id
    }

    /// Lay out slots anchored at the newest mine and match every mine to one
    fn redistribute(&mut self) {
        self.cursor = 0;
        self.drift = PathWalker::new(self.path.clone(), 0, self.speed);
        self.slots.clear();
        self.assignments.clear();

        let len = self.path.len();
        // Mines are kept in spawn order, so the last one is the newest survivor
        let Some(anchor) = self.mines.last().map(Mine::index) else {
            return;
        };
        if len == 0 {
            return;
        }

        let step = len as f32 / self.mines.len() as f32;
        self.slots = (0..self.mines.len())
            .map(|i| (anchor + (i as f32 * step).ceil() as usize) % len)
            .collect();

        // Greedy nearest free slot, mines in spawn order
        let mut claimed = vec![false; self.slots.len()];
        for mine in &self.mines {
            let best = self
                .slots
                .iter()
                .enumerate()
                .filter(|(i, _)| !claimed[*i])
                .min_by_key(|(_, slot)| circular_distance(mine.index(), **slot, len))
                .map(|(i, _)| i);
            if let Some(i) = best {
                claimed[i] = true;
                self.assignments.push(Assignment {
                    mine_id: mine.id,
                    slot: self.slots[i],
                });
            }
        }
        log::debug!("Mines redistributed: {} slots anchored at {}", self.slots.len(), anchor);
    }

    /// Advance slots and mines; returns the ids of mines that reached their slot
    pub fn tick(&mut self, delta_ms: f32) -> Vec<MineId> {
        self.drift.advance(delta_ms);

        if let Some(assignment) = self.assignments.get(self.cursor).copied() {
            let target = (assignment.slot + self.drift.index()) % self.path.len().max(1);
            if let Some(mine) = self.mines.iter_mut().find(|m| m.id == assignment.mine_id) {
                mine.set_target(Some(target));
            }
            self.cursor += 1;
        }

        self.mines
            .iter_mut()
            .filter_map(|mine| mine.tick(delta_ms).then_some(mine.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orbit::OrbitSet;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn dispatcher() -> MineDispatcher {
        let orbits = OrbitSet::standard().unwrap();
        MineDispatcher::new(&orbits.mines)
    }

    fn assert_conflict_free(d: &MineDispatcher) {
        assert_eq!(d.slots().len(), d.len());
        assert_eq!(d.assignments().len(), d.len());
        let slots: HashSet<usize> = d.assignments().iter().map(|a| a.slot).collect();
        assert_eq!(slots.len(), d.len());
        let mines: HashSet<MineId> = d.assignments().iter().map(|a| a.mine_id).collect();
        assert_eq!(mines.len(), d.len());
    }

    #[test]
    fn test_empty_dispatcher_is_noop() {
        let mut d = dispatcher();
        assert!(d.tick(16.0).is_empty());
        assert!(d.slots().is_empty());
        assert!(d.deliver(10, 0, 5).is_empty());
        assert!(!d.remove_mine(99));
    }

    #[test]
    fn test_slots_anchor_on_newest_mine() {
        let mut d = dispatcher();
        let len = d.path.len();
        d.deliver(100, 3, 5);
        assert_eq!(d.slots()[0], 110);
        assert_eq!(d.slots()[1], (110 + (len as f32 / 3.0).ceil() as usize) % len);
        assert_conflict_free(&d);
    }

    #[test]
    fn test_greedy_assignment_order() {
        let mut d = dispatcher();
        let ids = d.deliver(100, 3, 5);
        // First mine takes the closest slot (the anchor), others take what is left
        assert_eq!(d.assignments()[0], Assignment { mine_id: ids[0], slot: 110 });
        assert_eq!(d.assignments()[2].mine_id, ids[2]);
    }

    #[test]
    fn test_one_assignment_per_tick() {
        let mut d = dispatcher();
        d.deliver(0, 3, 5);
        assert_eq!(d.pending(), 3);
        d.tick(16.0);
        assert_eq!(d.pending(), 2);
        d.tick(16.0);
        d.tick(16.0);
        assert_eq!(d.pending(), 0);
        d.tick(16.0);
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn test_removal_reanchors_on_survivor() {
        let mut d = dispatcher();
        let first = d.add_mine(50);
        let second = d.add_mine(900);
        assert!(d.remove_mine(second));
        assert_eq!(d.slots(), &[d.mine(first).unwrap().index()]);
        assert_conflict_free(&d);
    }

    #[test]
    fn test_mines_spread_evenly() {
        let mut d = dispatcher();
        let len = d.path.len();
        d.deliver(200, 3, 5);
        for _ in 0..4000 {
            d.tick(16.0);
        }
        assert!(d.mines().iter().all(|m| m.target_index().is_none()));
        assert!(d.mines().iter().all(|m| m.speed_multiplier() == 1.0));
        let indices: Vec<usize> = d.mines().iter().map(Mine::index).collect();
        for i in 0..indices.len() {
            for j in (i + 1)..indices.len() {
                assert!(circular_distance(indices[i], indices[j], len) >= len / 3 - 4);
            }
        }
    }

    #[test]
    fn test_target_slot_drifts_with_orbit() {
        let d = dispatcher();
        let mut mine = Mine::new(1, d.path.clone(), 0, ORBIT_MINES_SPEED);
        mine.set_target(Some(800));
        // Base speed is 0.05 samples/ms, so the slot moves one sample every 20 ms
        mine.tick(20.0);
        assert_eq!(mine.target_index(), Some(801));
        mine.tick(10.0);
        mine.tick(10.0);
        assert_eq!(mine.target_index(), Some(802));
    }

    #[test]
    fn test_dispatcher_hands_out_drifted_slot() {
        let mut d = dispatcher();
        d.add_mine(0);
        d.add_mine(400);
        // Slots laid out at redistribution drift before the second assignment
        d.tick(20.0);
        let second = d.assignments()[1];
        d.tick(20.0);
        let target = d.mine(second.mine_id).unwrap().target_index().unwrap();
        // Two samples of dispatcher drift, then one from the mine's own tick
        assert_eq!(target, (second.slot + 3) % d.path.len());
    }

    #[test]
    fn test_mine_arrival_resets_multiplier() {
        let d = dispatcher();
        let mut mine = Mine::new(1, d.path.clone(), 0, ORBIT_MINES_SPEED);
        mine.set_target(Some(40));
        assert!(mine.target_speed_multiplier > 1.0);
        let mut arrived = false;
        for _ in 0..2000 {
            if mine.tick(16.0) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(mine.speed_multiplier(), 1.0);
        assert!(mine.target_index().is_none());
    }

    proptest! {
        #[test]
        fn prop_assignments_conflict_free(
            ops in proptest::collection::vec((any::<bool>(), 0usize..1697, 0usize..8), 1..40),
        ) {
            let mut d = dispatcher();
            for (add, index, pick) in ops {
                if add || d.is_empty() {
                    d.add_mine(index);
                } else {
                    let id = d.mines()[pick % d.len()].id;
                    d.remove_mine(id);
                }
                d.tick(16.0);
                prop_assert_eq!(d.slots().len(), d.len());
                let slots: HashSet<usize> = d.assignments().iter().map(|a| a.slot).collect();
                prop_assert_eq!(slots.len(), d.len());
                prop_assert_eq!(d.assignments().len(), d.len());
            }
        }
    }
}
