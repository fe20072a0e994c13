//! Connected groups of same-colored cells.
//!
//! Groups live in a per-tick arena owned by the grid. Cells refer to their
//! group by [`GroupIndex`]; the whole arena is thrown away and rebuilt on
//! every recomputation, so an index is only meaningful until the next one.
//!
//! # Algorithm
//!
//! A single streaming union pass in increasing id order. For every tile,
//! each same-colored orthogonal neighbor is joined:
//!
//! - neither has a group: start a new group with both
//! - one has a group: the other joins it
//! - both have different groups: the smaller is merged into the larger
//!
//! Merged-away groups are dropped and the arena is compacted at the end.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::types::{CellId, Color, MIN_CHAIN_SIZE};

/// Position of a group inside the current arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupIndex(usize);

impl GroupIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Maximal 4-connected set of cells sharing one color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    color: Color,
    members: Vec<CellId>,
}

impl Group {
    fn with_pair(color: Color, a: CellId, b: CellId) -> Self {
        Self {
            color,
            members: vec![a, b],
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn members(&self) -> &[CellId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.members.contains(&id)
    }

    /// Large enough to be cleared by the next move
    pub fn is_chain(&self) -> bool {
        self.len() >= MIN_CHAIN_SIZE
    }
}

/// Orthogonal neighbors of `index` in a row-major `width x height` array.
///
/// Order is left, up, right, down; edge and corner cells get fewer.
pub fn neighbors(index: usize, width: usize, height: usize) -> ArrayVec<usize, 4> {
    let mut out = ArrayVec::new();
    let col = index % width;
    if col != 0 {
        out.push(index - 1);
    }
    if index >= width {
        out.push(index - width);
    }
    if col + 1 != width {
        out.push(index + 1);
    }
    if index + width < width * height {
        out.push(index + width);
    }
    out
}

/// Arena of the groups found by the latest recomputation
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    groups: Vec<Group>,
}

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: GroupIndex) -> Option<&Group> {
        self.groups.get(index.get())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups big enough to clear
    pub fn chain_count(&self) -> usize {
        self.groups.iter().filter(|g| g.is_chain()).count()
    }

    /// Size of the group a cell belongs to (0 when it has none)
    pub fn size_of(&self, index: Option<GroupIndex>) -> usize {
        index
            .and_then(|i| self.get(i))
            .map(Group::len)
            .unwrap_or(0)
    }

    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }

    /// Rebuild the arena from the cell colors and relink every cell.
    pub(crate) fn rebuild(&mut self, cells: &mut [Cell], width: usize, height: usize) {
        self.groups.clear();
        for cell in cells.iter_mut() {
            cell.set_group(None);
        }

        for index in 0..cells.len() {
            let color = cells[index].color();
            if !color.is_solid() {
                continue;
            }
            for n in neighbors(index, width, height) {
                if cells[n].color() != color {
                    continue;
                }
                self.join(cells, index, n);
            }
        }

        self.compact(cells);
    }

    fn join(&mut self, cells: &mut [Cell], a: usize, b: usize) {
        match (cells[a].group(), cells[b].group()) {
            (None, None) => {
                let index = GroupIndex::new(self.groups.len());
                self.groups
                    .push(Group::with_pair(cells[a].color(), cells[a].id(), cells[b].id()));
                cells[a].set_group(Some(index));
                cells[b].set_group(Some(index));
            }
            (Some(g), None) => {
                self.groups[g.get()].members.push(cells[b].id());
                cells[b].set_group(Some(g));
            }
            (None, Some(g)) => {
                self.groups[g.get()].members.push(cells[a].id());
                cells[a].set_group(Some(g));
            }
            (Some(ga), Some(gb)) if ga != gb => {
                let (keep, drop) = if self.groups[ga.get()].len() >= self.groups[gb.get()].len() {
                    (ga, gb)
                } else {
                    (gb, ga)
                };
                let moved = std::mem::take(&mut self.groups[drop.get()].members);
                for id in &moved {
                    cells[id.index()].set_group(Some(keep));
                }
                self.groups[keep.get()].members.extend(moved);
            }
            _ => {}
        }
    }

    /// Drop emptied groups and renumber the survivors densely.
    fn compact(&mut self, cells: &mut [Cell]) {
        let mut remap: Vec<Option<GroupIndex>> = Vec::with_capacity(self.groups.len());
        let mut next = 0usize;
        for group in &self.groups {
            if group.is_empty() {
                remap.push(None);
            } else {
                remap.push(Some(GroupIndex::new(next)));
                next += 1;
            }
        }
        if next == self.groups.len() {
            return;
        }

        self.groups.retain(|g| !g.is_empty());
        for cell in cells.iter_mut() {
            if let Some(old) = cell.group() {
                cell.set_group(remap[old.get()]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;

    fn cells_from(colors: &[Color]) -> Vec<Cell> {
        colors
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let mut cell = Cell::new(CellId::from_index(i));
                if c != Color::None {
                    cell.fill(c, Origin::Settled);
                }
                cell
            })
            .collect()
    }

    #[test]
    fn test_neighbors_corner_and_center() {
        assert_eq!(neighbors(0, 3, 3).as_slice(), &[1, 3]);
        assert_eq!(neighbors(4, 3, 3).as_slice(), &[3, 1, 5, 7]);
        assert_eq!(neighbors(8, 3, 3).as_slice(), &[7, 5]);
    }

    #[test]
    fn test_neighbors_do_not_wrap_rows() {
        // Index 2 is the end of row 0 in a 3-wide grid; 3 starts row 1.
        assert!(!neighbors(2, 3, 3).contains(&3));
        assert!(!neighbors(3, 3, 3).contains(&2));
    }

    #[test]
    fn test_single_tiles_form_no_group() {
        use Color::*;
        let mut cells = cells_from(&[Red, Blue, Blue, Red]);
        let mut set = GroupSet::new();
        set.rebuild(&mut cells, 2, 2);
        assert!(set.is_empty());
        assert!(cells.iter().all(|c| c.group().is_none()));
    }

    #[test]
    fn test_merge_through_late_bridge() {
        use Color::*;
        // r . r
        // r r r
        // Cells 0 and 2 start separate groups that meet through row 1.
        let mut cells = cells_from(&[Red, None, Red, Red, Red, Red]);
        let mut set = GroupSet::new();
        set.rebuild(&mut cells, 3, 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.chain_count(), 1);
        let g = cells[0].group().unwrap();
        assert_eq!(set.get(g).unwrap().len(), 5);
        assert!(cells.iter().filter(|c| c.color() == Red).all(|c| c.group() == Some(g)));
    }

    #[test]
    fn test_removed_cells_never_group() {
        use Color::*;
        let mut cells = cells_from(&[Red, Red, Red, Red]);
        cells[1].mark_removed();
        cells[3].mark_removed();
        let mut set = GroupSet::new();
        set.rebuild(&mut cells, 2, 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(GroupIndex::new(0)).unwrap().len(), 2);
        assert_eq!(set.chain_count(), 0);
    }
}
