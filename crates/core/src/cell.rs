//! A single grid slot.

use serde::{Deserialize, Serialize};

use crate::group::GroupIndex;
use crate::types::{CellId, Color, Origin};

/// One slot of the grid.
///
/// The id is fixed; color, origin and group describe the content currently
/// sitting in the slot. An empty cell always has no group and a settled
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    color: Color,
    origin: Origin,
    pending_removal: bool,
    #[serde(skip)]
    group: Option<GroupIndex>,
}

impl Cell {
    /// Empty cell
    pub fn new(id: CellId) -> Self {
        Self {
            id,
            color: Color::None,
            origin: Origin::Settled,
            pending_removal: false,
            group: None,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Group membership from the latest recomputation
    pub fn group(&self) -> Option<GroupIndex> {
        self.group
    }

    /// True while the cell shows the `Removed` marker of the current tick
    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// No tile and no removal marker
    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// A moving tile may land here
    pub fn is_vacant(&self) -> bool {
        self.color.is_vacant()
    }

    pub(crate) fn clear(&mut self) {
        self.color = Color::None;
        self.origin = Origin::Settled;
        self.pending_removal = false;
        self.group = None;
    }

    pub(crate) fn mark_removed(&mut self) {
        self.color = Color::Removed;
        self.origin = Origin::Settled;
        self.pending_removal = true;
        self.group = None;
    }

    pub(crate) fn fill(&mut self, color: Color, origin: Origin) {
        self.color = color;
        self.origin = origin;
        self.pending_removal = false;
        self.group = None;
    }

    pub(crate) fn set_origin(&mut self, origin: Origin) {
        self.origin = origin;
    }

    pub(crate) fn set_group(&mut self, group: Option<GroupIndex>) {
        self.group = group;
    }

    /// Copy without the per-tick group link (restore snapshots)
    pub(crate) fn detached(&self) -> Self {
        Self {
            group: None,
            ..*self
        }
    }
}
