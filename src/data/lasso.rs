//! Lasso selection mode and gesture ownership.
//!
//! A view's pointer gestures belong either to pan/zoom or to the lasso, never
//! both: [`GestureOwner`] is derived from the lasso phase, so the invariant
//! holds by construction.
//!
//! ```text
//! Disabled --enable--> Armed --down--> Drawing --up--> Resolved --> Armed
//!     ^                  |                |
//!     +-----disable------+-----disable----+
//! ```

/// Lasso state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LassoPhase {
    Disabled,
    Armed,
    Drawing,
    /// Transient: between pointer-up and re-arming.
    Resolved,
}

/// Which input mode owns pointer gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOwner {
    PanZoom,
    Lasso,
}

/// Live classification of a point during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LassoClass {
    /// No drag in progress.
    Unclassified,
    Enclosed,
    NotEnclosed,
}

/// Result of a finished drag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LassoOutcome {
    /// Indices (into the positions passed to the drag) that ended enclosed.
    pub enclosed: Vec<usize>,
    /// Whether the path was auto-closed.
    pub closed: bool,
}

#[derive(Debug, Clone)]
pub struct Lasso {
    phase: LassoPhase,
    close_distance: f32,
    /// Invisible hit-test layer covering the plot area while armed.
    hit_area: Option<[f32; 2]>,
    path: Vec<[f32; 2]>,
    /// Points the pointer passed over during the current drag.
    touched: Vec<bool>,
    classes: Vec<LassoClass>,
}

impl Lasso {
    pub fn new(close_distance: f32) -> Self {
        Self {
            phase: LassoPhase::Disabled,
            close_distance,
            hit_area: None,
            path: Vec::new(),
            touched: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn phase(&self) -> LassoPhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.phase != LassoPhase::Disabled
    }

    pub fn gesture_owner(&self) -> GestureOwner {
        if self.is_enabled() {
            GestureOwner::Lasso
        } else {
            GestureOwner::PanZoom
        }
    }

    pub fn hit_area(&self) -> Option<[f32; 2]> {
        self.hit_area
    }

    pub fn path(&self) -> &[[f32; 2]] {
        &self.path
    }

    pub fn classes(&self) -> &[LassoClass] {
        &self.classes
    }

    pub fn class_of(&self, index: usize) -> LassoClass {
        self.classes.get(index).copied().unwrap_or(LassoClass::Unclassified)
    }

    /// Take gesture ownership and install a hit-test layer of `size`.
    /// Returns `false` if already enabled.
    pub fn enable(&mut self, size: [f32; 2]) -> bool {
        if self.is_enabled() {
            return false;
        }
        self.phase = LassoPhase::Armed;
        self.hit_area = Some(size);
        true
    }

    /// Give gestures back to pan/zoom, discarding any drag in progress.
    /// Returns `false` if already disabled.
    pub fn disable(&mut self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if self.phase == LassoPhase::Drawing {
            tracing::debug!(path_len = self.path.len(), "Lasso drag discarded by mode switch");
        }
        self.phase = LassoPhase::Disabled;
        self.hit_area = None;
        self.reset_drag();
        true
    }

    fn reset_drag(&mut self) {
        self.path.clear();
        self.touched.clear();
        self.classes.clear();
    }

    /// Start a drag at `pos` over `point_count` points.
    pub fn pointer_down(&mut self, pos: [f32; 2], point_count: usize) -> bool {
        if self.phase != LassoPhase::Armed {
            return false;
        }
        self.phase = LassoPhase::Drawing;
        self.path.clear();
        self.path.push(pos);
        self.touched = vec![false; point_count];
        self.classes = vec![LassoClass::NotEnclosed; point_count];
        true
    }

    /// Extend the path and reclassify every point.
    ///
    /// `positions`/`radius` are the current on-screen centers and hit radius.
    pub fn pointer_move(&mut self, pos: [f32; 2], positions: &[[f32; 2]], radius: f32) -> bool {
        if self.phase != LassoPhase::Drawing {
            return false;
        }
        self.path.push(pos);
        self.classify(positions, radius);
        true
    }

    /// Whether the free end is close enough to the start to auto-close.
    pub fn is_closed(&self) -> bool {
        match (self.path.first(), self.path.last()) {
            (Some(a), Some(b)) if self.path.len() > 2 => distance(*a, *b) <= self.close_distance,
            _ => false,
        }
    }

    /// Classify points against the current path. Re-running it with the same
    /// inputs yields the same classes.
    pub fn classify(&mut self, positions: &[[f32; 2]], radius: f32) {
        if self.phase != LassoPhase::Drawing {
            return;
        }
        if self.touched.len() != positions.len() {
            self.touched.resize(positions.len(), false);
        }
        if let Some(&tip) = self.path.last() {
            for (i, p) in positions.iter().enumerate() {
                if distance(*p, tip) <= radius {
                    self.touched[i] = true;
                }
            }
        }
        let closed = self.is_closed();
        self.classes = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.touched[i] || (closed && point_in_polygon(*p, &self.path)) {
                    LassoClass::Enclosed
                } else {
                    LassoClass::NotEnclosed
                }
            })
            .collect();
    }

    /// Finish the drag. Returns the enclosed points and re-arms the lasso.
    pub fn pointer_up(&mut self, positions: &[[f32; 2]], radius: f32) -> Option<LassoOutcome> {
        if self.phase != LassoPhase::Drawing {
            return None;
        }
        self.classify(positions, radius);
        self.phase = LassoPhase::Resolved;
        let outcome = LassoOutcome {
            enclosed: self
                .classes
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == LassoClass::Enclosed)
                .map(|(i, _)| i)
                .collect(),
            closed: self.is_closed(),
        };
        self.reset_drag();
        self.phase = LassoPhase::Armed;
        Some(outcome)
    }
}

fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Even-odd ray cast against the polygon implicitly closed from the last
/// vertex back to the first.
pub fn point_in_polygon(p: [f32; 2], poly: &[[f32; 2]]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = (poly[i][0], poly[i][1]);
        let (xj, yj) = (poly[j][0], poly[j][1]);
        if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_drag(lasso: &mut Lasso, positions: &[[f32; 2]]) -> LassoOutcome {
        assert!(lasso.pointer_down([0.0, 0.0], positions.len()));
        for pos in [[100.0, 0.0], [100.0, 100.0], [0.0, 100.0], [0.0, 10.0]] {
            lasso.pointer_move(pos, positions, 1.0);
        }
        lasso.pointer_up(positions, 1.0).unwrap()
    }

    #[test]
    fn ownership_follows_mode() {
        let mut l = Lasso::new(75.0);
        assert_eq!(l.gesture_owner(), GestureOwner::PanZoom);
        assert!(l.enable([400.0, 300.0]));
        assert_eq!(l.gesture_owner(), GestureOwner::Lasso);
        assert_eq!(l.hit_area(), Some([400.0, 300.0]));
        assert!(!l.enable([1.0, 1.0]));
        assert!(l.disable());
        assert_eq!(l.gesture_owner(), GestureOwner::PanZoom);
        assert_eq!(l.hit_area(), None);
        assert!(!l.disable());
    }

    #[test]
    fn closed_square_encloses_inner_points() {
        let mut l = Lasso::new(75.0);
        l.enable([200.0, 200.0]);
        let positions = [[50.0, 50.0], [150.0, 50.0], [10.0, 90.0]];
        let out = square_drag(&mut l, &positions);
        assert!(out.closed);
        assert_eq!(out.enclosed, vec![0, 2]);
        assert_eq!(l.phase(), LassoPhase::Armed);
        assert!(l.classes().is_empty());
    }

    #[test]
    fn open_path_only_keeps_touched_points() {
        let mut l = Lasso::new(75.0);
        l.enable([500.0, 500.0]);
        let positions = [[200.0, 2.0], [50.0, 50.0]];
        l.pointer_down([0.0, 0.0], 2);
        l.pointer_move([200.0, 0.0], &positions, 5.0);
        l.pointer_move([400.0, 0.0], &positions, 5.0);
        let out = l.pointer_up(&positions, 5.0).unwrap();
        assert!(!out.closed);
        assert_eq!(out.enclosed, vec![0]);
    }

    #[test]
    fn pointer_down_requires_armed() {
        let mut l = Lasso::new(75.0);
        assert!(!l.pointer_down([0.0, 0.0], 3));
        assert!(l.pointer_up(&[], 1.0).is_none());
    }

    #[test]
    fn disable_mid_drag_discards_path() {
        let mut l = Lasso::new(75.0);
        l.enable([100.0, 100.0]);
        l.pointer_down([0.0, 0.0], 1);
        l.pointer_move([10.0, 10.0], &[[5.0, 5.0]], 1.0);
        assert_eq!(l.phase(), LassoPhase::Drawing);
        l.disable();
        assert_eq!(l.phase(), LassoPhase::Disabled);
        assert!(l.path().is_empty());
        assert_eq!(l.class_of(0), LassoClass::Unclassified);
    }

    #[test]
    fn reclassification_is_idempotent() {
        let mut l = Lasso::new(75.0);
        l.enable([200.0, 200.0]);
        let positions = [[50.0, 50.0], [150.0, 150.0]];
        l.pointer_down([0.0, 0.0], 2);
        for pos in [[100.0, 0.0], [100.0, 100.0], [0.0, 100.0]] {
            l.pointer_move(pos, &positions, 1.0);
        }
        let first = l.classes().to_vec();
        l.classify(&positions, 1.0);
        l.classify(&positions, 1.0);
        assert_eq!(l.classes(), first.as_slice());
        assert_eq!(first, vec![LassoClass::Enclosed, LassoClass::NotEnclosed]);
    }

    #[test]
    fn polygon_test_basics() {
        let tri = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        assert!(point_in_polygon([2.0, 2.0], &tri));
        assert!(!point_in_polygon([8.0, 8.0], &tri));
        assert!(!point_in_polygon([1.0, 1.0], &tri[..2]));
    }
}
