//! Multi-select and hover state of one view.
//!
//! Selection is keyed by [`PointId`] so it survives reloads that reorder or
//! filter the points; it is stored in the order selections happened.

use std::collections::HashMap;

use crate::data::points::{Point, PointId};

/// External grouping used for tree-linked hover (`point id -> group key`).
pub type GroupLookup = HashMap<PointId, String>;

// ─────────────────────────────────────────────────────────────────────────────
// SelectionState
// ─────────────────────────────────────────────────────────────────────────────

/// Selected ids in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    ids: Vec<PointId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns `true` if it is selected afterwards.
    pub fn toggle(&mut self, id: &PointId) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.clone());
            true
        }
    }

    /// Append without checking membership.
    ///
    /// Range selection uses this on purpose: selecting an overlapping range
    /// twice records the shared ids twice.
    pub fn push(&mut self, id: PointId) {
        self.ids.push(id);
    }

    /// Add `id` unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, id: PointId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &PointId) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids in the order they were selected.
    pub fn ids(&self) -> &[PointId] {
        &self.ids
    }
}

/// Ids of `points` whose numeric value lies in `[lower, upper]`, in point
/// order. Non-numeric values never match.
pub fn ids_in_range(points: &[Point], lower: f64, upper: f64) -> Vec<PointId> {
    points
        .iter()
        .filter(|p| {
            p.value
                .as_f64()
                .is_some_and(|v| v >= lower && v <= upper)
        })
        .map(|p| p.id.clone())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// HoverState
// ─────────────────────────────────────────────────────────────────────────────

/// Transient hover of one view; replaced wholesale on every hover event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    None,
    /// Hovered point indices of the current load.
    Points(Vec<usize>),
    /// Hovered external group (e.g. a tree node), resolved to indices.
    Group { key: String, members: Vec<usize> },
}

/// Per-point hover styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverClass {
    /// No hover active.
    Normal,
    /// Something else is hovered.
    Faded,
    Hovered,
}

impl HoverState {
    /// Hover by indices; an empty list clears.
    pub fn points(indices: Vec<usize>) -> Self {
        if indices.is_empty() {
            HoverState::None
        } else {
            HoverState::Points(indices)
        }
    }

    /// Hover every point whose id maps to `key` in `groups`.
    pub fn group(key: &str, points: &[Point], groups: &GroupLookup) -> Self {
        let members = points
            .iter()
            .enumerate()
            .filter(|(_, p)| groups.get(&p.id).is_some_and(|g| g == key))
            .map(|(i, _)| i)
            .collect();
        HoverState::Group {
            key: key.to_string(),
            members,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, HoverState::None)
    }

    pub fn class_of(&self, index: usize) -> HoverClass {
        match self {
            HoverState::None => HoverClass::Normal,
            HoverState::Points(members) | HoverState::Group { members, .. } => {
                if members.contains(&index) {
                    HoverClass::Hovered
                } else {
                    HoverClass::Faded
                }
            }
        }
    }

    /// Indices currently highlighted.
    pub fn hovered(&self) -> &[usize] {
        match self {
            HoverState::None => &[],
            HoverState::Points(members) | HoverState::Group { members, .. } => members,
        }
    }
}
