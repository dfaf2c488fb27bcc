//! Render driver: reconciles a view's data against drawn elements and paints
//! them through an abstract [`DrawSurface`].
//!
//! Three layers are joined by position, like a keyless data join: points,
//! tree nodes and tree edges. Entering elements appear at their target,
//! surviving ones move there (animated after a data load), leaving ones are
//! dropped. Positions are kept in data space and projected on every paint, so
//! a zoom or pan repositions everything at once. Edge endpoints are looked up
//! from the current node positions on each paint.

use egui::{Align2, Color32, Stroke};

use crate::data::lasso::LassoClass;
use crate::data::legend::{GradientStop, LegendModel};
use crate::data::points::{PointId, TreeEdge};
use crate::data::selection::HoverClass;
use crate::scatter::{DrawnPoints, ScatterView};

const GRID_COLOR: Color32 = Color32::from_gray(225);
const AXIS_TEXT: Color32 = Color32::from_gray(90);
const SELECTED_STROKE: Stroke = Stroke {
    width: 1.5,
    color: Color32::BLACK,
};
const HOVER_STROKE: Stroke = Stroke {
    width: 1.0,
    color: Color32::from_gray(40),
};
const LASSO_CANDIDATE_STROKE: Stroke = Stroke {
    width: 1.0,
    color: Color32::from_rgb(0xFF, 0x8C, 0x00),
};
const LASSO_PATH: Stroke = Stroke {
    width: 1.5,
    color: Color32::from_gray(70),
};
/// Alpha factor of points faded by someone else's hover.
const FADED_ALPHA: f32 = 0.3;
const FONT_SIZE: f32 = 10.0;

// ─────────────────────────────────────────────────────────────────────────────
// DrawSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Drawing primitives the driver needs. Coordinates are plot-area pixels with
/// the origin at the top-left of the plotting area.
pub trait DrawSurface {
    /// Restrict subsequent drawing to the plotting area (`true`) or allow the
    /// margins (`false`).
    fn set_clipped(&mut self, clipped: bool);
    fn line(&mut self, from: [f32; 2], to: [f32; 2], stroke: Stroke);
    fn circle(&mut self, center: [f32; 2], radius: f32, fill: Color32, stroke: Stroke);
    fn rect(&mut self, rect: [f32; 4], fill: Color32);
    /// Horizontal gradient across `rect`; stop offsets are percent.
    fn gradient_rect(&mut self, rect: [f32; 4], stops: &[GradientStop]);
    fn polyline(&mut self, points: &[[f32; 2]], closed: bool, stroke: Stroke);
    fn text(&mut self, pos: [f32; 2], align: Align2, text: &str, size: f32, color: Color32);
    /// Framed text box whose bottom center sits at `anchor`.
    fn tooltip(&mut self, anchor: [f32; 2], text: &str);
}

// ─────────────────────────────────────────────────────────────────────────────
// Element layers
// ─────────────────────────────────────────────────────────────────────────────

/// Enter/update/exit counts of one layer join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// Join counts for all three layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub points: JoinStats,
    pub nodes: JoinStats,
    pub edges: JoinStats,
}

/// Data-space position moving from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    from: [f64; 2],
    to: [f64; 2],
}

impl Tween {
    fn fixed(p: [f64; 2]) -> Self {
        Self { from: p, to: p }
    }

    fn at(&self, t: f64) -> [f64; 2] {
        [
            self.from[0] + (self.to[0] - self.from[0]) * t,
            self.from[1] + (self.to[1] - self.from[1]) * t,
        ]
    }
}

#[derive(Debug, Clone)]
struct PointElement {
    /// Id bound to the element.
    id: PointId,
    pos: Tween,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    start: f64,
    duration: f64,
}

impl Transition {
    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ease_cubic_in_out(((now - self.start) / self.duration).clamp(0.0, 1.0))
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Positional join of `current` against `target_len` new items.
fn join<T>(
    current: &mut Vec<T>,
    target_len: usize,
    mut update: impl FnMut(usize, &mut T),
    mut enter: impl FnMut(usize) -> T,
) -> JoinStats {
    let kept = current.len().min(target_len);
    let stats = JoinStats {
        entered: target_len - kept,
        updated: kept,
        exited: current.len() - kept,
    };
    current.truncate(kept);
    for (i, el) in current.iter_mut().enumerate() {
        update(i, el);
    }
    for i in kept..target_len {
        current.push(enter(i));
    }
    stats
}

// ─────────────────────────────────────────────────────────────────────────────
// RenderDriver
// ─────────────────────────────────────────────────────────────────────────────

/// Drawn state of one view.
#[derive(Debug, Default)]
pub struct RenderDriver {
    points: Vec<PointElement>,
    nodes: Vec<Tween>,
    edges: Vec<TreeEdge>,
    seen_revision: u64,
    transition: Option<Transition>,
}

impl RenderDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn progress(&self, now: f64) -> f64 {
        self.transition.map_or(1.0, |t| t.progress(now))
    }

    /// Whether a position transition is still running at `now`.
    pub fn is_animating(&self, now: f64) -> bool {
        self.transition
            .is_some_and(|t| now < t.start + t.duration)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Id bound to the drawn point element `index`.
    pub fn bound_id(&self, index: usize) -> Option<&PointId> {
        self.points.get(index).map(|p| &p.id)
    }

    /// Data-space position of point element `index` at `now`.
    pub fn point_position(&self, index: usize, now: f64) -> Option<[f64; 2]> {
        let t = self.progress(now);
        self.points.get(index).map(|p| p.pos.at(t))
    }

    /// Point elements where they are drawn at `now`, with their bound ids.
    pub fn drawn_points(&self, view: &ScatterView, now: f64) -> DrawnPoints {
        let t = self.progress(now);
        let scales = view.scales();
        let (positions, ids) = self
            .points
            .iter()
            .map(|el| {
                let [x, y] = el.pos.at(t);
                (scales.project(x, y), el.id.clone())
            })
            .unzip();
        DrawnPoints { positions, ids }
    }

    pub fn node_position(&self, index: usize, now: f64) -> Option<[f64; 2]> {
        let t = self.progress(now);
        self.nodes.get(index).map(|n| n.at(t))
    }

    /// Reconcile against the view if its data changed since the last sync.
    /// Returns the join counts when a reconcile happened.
    pub fn sync(&mut self, view: &ScatterView, now: f64) -> Option<ReconcileStats> {
        if view.data_revision() == self.seen_revision {
            return None;
        }
        self.seen_revision = view.data_revision();
        Some(self.reconcile(view, now, true))
    }

    /// Join the three layers against the view's data. With `animate`, moved
    /// elements transition from where they are at `now`.
    pub fn reconcile(&mut self, view: &ScatterView, now: f64, animate: bool) -> ReconcileStats {
        // Interrupt a running transition where it currently is.
        let t = self.progress(now);
        let data = view.data();

        let points = join(
            &mut self.points,
            data.points.len(),
            |i, el| {
                let p = &data.points[i];
                el.id = p.id.clone();
                el.pos = Tween {
                    from: el.pos.at(t),
                    to: [p.x, p.y],
                };
            },
            |i| {
                let p = &data.points[i];
                PointElement {
                    id: p.id.clone(),
                    pos: Tween::fixed([p.x, p.y]),
                }
            },
        );
        let nodes = join(
            &mut self.nodes,
            data.tree_points.len(),
            |i, el| {
                let n = data.tree_points[i];
                *el = Tween {
                    from: el.at(t),
                    to: [n.x, n.y],
                };
            },
            |i| {
                let n = data.tree_points[i];
                Tween::fixed([n.x, n.y])
            },
        );
        let edges = join(
            &mut self.edges,
            data.tree_edges.len(),
            |i, el| *el = data.tree_edges[i],
            |i| data.tree_edges[i],
        );

        let duration = view.config().transition_secs();
        self.transition = if animate && duration > 0.0 {
            Some(Transition {
                start: now,
                duration,
            })
        } else {
            for el in &mut self.points {
                el.pos = Tween::fixed(el.pos.to);
            }
            for n in &mut self.nodes {
                *n = Tween::fixed(n.to);
            }
            None
        };

        let stats = ReconcileStats {
            points,
            nodes,
            edges,
        };
        tracing::debug!(view = %view.name(), ?stats, animate, "Reconciled elements");
        stats
    }

    /// Paint the whole view at time `now` (seconds).
    pub fn paint(&self, view: &ScatterView, surface: &mut dyn DrawSurface, now: f64) {
        let t = self.progress(now);
        let scales = view.scales();
        let config = view.config();

        // Grid and axes.
        surface.set_clipped(false);
        let (w, h) = (scales.width(), scales.height());
        for tick in scales.x_ticks() {
            surface.line([tick.pixel, 0.0], [tick.pixel, tick.grid_len], Stroke::new(1.0, GRID_COLOR));
            surface.text([tick.pixel, h + 4.0], Align2::CENTER_TOP, &tick.label, FONT_SIZE, AXIS_TEXT);
        }
        for tick in scales.y_ticks() {
            surface.line([0.0, tick.pixel], [tick.grid_len, tick.pixel], Stroke::new(1.0, GRID_COLOR));
            surface.text([-4.0, tick.pixel], Align2::RIGHT_CENTER, &tick.label, FONT_SIZE, AXIS_TEXT);
        }
        surface.line([0.0, h], [w, h], Stroke::new(1.0, AXIS_TEXT));
        surface.line([0.0, 0.0], [0.0, h], Stroke::new(1.0, AXIS_TEXT));

        surface.set_clipped(true);

        // Points.
        let radius = view.radius() as f32;
        let points = view.points();
        for (i, el) in self.points.iter().enumerate() {
            let Some(point) = points.get(i) else { continue };
            let [x, y] = el.pos.at(t);
            let mut alpha = view.opacity(i);
            let hover = view.hover().class_of(i);
            if hover == HoverClass::Faded {
                alpha *= FADED_ALPHA;
            }
            let fill = view.mapping().color(&point.value).gamma_multiply(alpha);
            let stroke = if view.lasso().class_of(i) == LassoClass::Enclosed {
                LASSO_CANDIDATE_STROKE
            } else if hover == HoverClass::Hovered {
                HOVER_STROKE
            } else if view.is_selected(i) {
                SELECTED_STROKE
            } else {
                Stroke::NONE
            };
            surface.circle(scales.project(x, y), radius, fill, stroke);
        }

        // Tree nodes and edges share one color.
        let [r, g, b] = config.tree_color;
        let tree_color = Color32::from_rgb(r, g, b);
        for n in &self.nodes {
            let [x, y] = n.at(t);
            surface.circle(scales.project(x, y), config.tree_node_radius, tree_color, Stroke::NONE);
        }
        for edge in &self.edges {
            let (Some(a), Some(b)) = (self.nodes.get(edge.from), self.nodes.get(edge.to)) else {
                continue;
            };
            let (a, b) = (a.at(t), b.at(t));
            surface.line(
                scales.project(a[0], a[1]),
                scales.project(b[0], b[1]),
                Stroke::new(config.tree_edge_width, tree_color),
            );
        }

        // Lasso path.
        let lasso = view.lasso();
        if lasso.path().len() > 1 {
            surface.polyline(lasso.path(), lasso.is_closed(), LASSO_PATH);
        }

        // Legend / colorbar.
        match view.legend() {
            LegendModel::Hidden => {}
            LegendModel::Swatches(swatches) => {
                for s in swatches {
                    surface.rect(s.rect, s.color);
                    let [x, y, sw, sh] = s.rect;
                    surface.text([x + sw / 2.0, y + sh + 2.0], Align2::CENTER_TOP, &s.label, FONT_SIZE, Color32::BLACK);
                }
            }
            LegendModel::Gradient(bar) => {
                surface.gradient_rect(bar.rect, &bar.stops);
                for label in [&bar.low, &bar.high] {
                    surface.text(label.pos, Align2::LEFT_BOTTOM, &label.text, FONT_SIZE, Color32::BLACK);
                }
            }
        }

        // Tooltip above the hovered point.
        if let Some(tip) = view.tooltip() {
            if let Some([x, y]) = self.points.get(tip.index).map(|el| el.pos.at(t)) {
                let [px, py] = scales.project(x, y);
                surface.tooltip([px, py - radius - config.tooltip_offset], &tip.text);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RecordingSurface
// ─────────────────────────────────────────────────────────────────────────────

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line { from: [f32; 2], to: [f32; 2], stroke: Stroke, clipped: bool },
    Circle { center: [f32; 2], radius: f32, fill: Color32, stroke: Stroke },
    Rect { rect: [f32; 4], fill: Color32 },
    Gradient { rect: [f32; 4], stops: Vec<GradientStop> },
    Polyline { points: Vec<[f32; 2]>, closed: bool },
    Text { pos: [f32; 2], text: String },
    Tooltip { anchor: [f32; 2], text: String },
}

/// Surface that records calls instead of drawing; for headless checks.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    clipped: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circles(&self) -> Vec<&DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Lines drawn inside the plotting area (tree edges).
    pub fn clipped_lines(&self) -> Vec<([f32; 2], [f32; 2])> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line {
                    from, to, clipped: true, ..
                } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn set_clipped(&mut self, clipped: bool) {
        self.clipped = clipped;
    }

    fn line(&mut self, from: [f32; 2], to: [f32; 2], stroke: Stroke) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            stroke,
            clipped: self.clipped,
        });
    }

    fn circle(&mut self, center: [f32; 2], radius: f32, fill: Color32, stroke: Stroke) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn rect(&mut self, rect: [f32; 4], fill: Color32) {
        self.commands.push(DrawCommand::Rect { rect, fill });
    }

    fn gradient_rect(&mut self, rect: [f32; 4], stops: &[GradientStop]) {
        self.commands.push(DrawCommand::Gradient {
            rect,
            stops: stops.to_vec(),
        });
    }

    fn polyline(&mut self, points: &[[f32; 2]], closed: bool, _stroke: Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            closed,
        });
    }

    fn text(&mut self, pos: [f32; 2], _align: Align2, text: &str, _size: f32, _color: Color32) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
        });
    }

    fn tooltip(&mut self, anchor: [f32; 2], text: &str) {
        self.commands.push(DrawCommand::Tooltip {
            anchor,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScatterConfig;
    use crate::data::points::{Point, ScatterData, TreePoint};
    use crate::scatter::ScatterController;

    fn controller() -> ScatterController {
        ScatterController::new("render", ScatterConfig::with_keys(), 400.0, 400.0)
    }

    fn data(n: usize) -> ScatterData {
        ScatterData::new(
            (0..n)
                .map(|i| Point::new(i as f64 * 0.5, 0.0, i as f64, format!("p{i}")))
                .collect(),
        )
    }

    #[test]
    fn join_counts_enter_update_exit() {
        let c = controller();
        let mut driver = RenderDriver::new();
        c.set_data(data(3), false);
        let stats = c.with_view(|v| driver.sync(v, 0.0)).unwrap();
        assert_eq!(stats.points, JoinStats { entered: 3, updated: 0, exited: 0 });

        c.set_data(data(2), false);
        let stats = c.with_view(|v| driver.sync(v, 5.0)).unwrap();
        assert_eq!(stats.points, JoinStats { entered: 0, updated: 2, exited: 1 });
        assert_eq!(driver.point_count(), 2);

        // Nothing changed: no reconcile.
        assert!(c.with_view(|v| driver.sync(v, 6.0)).is_none());
    }

    #[test]
    fn reload_animates_for_the_configured_duration() {
        let c = controller();
        let mut driver = RenderDriver::new();
        c.set_data(ScatterData::new(vec![Point::new(0.0, 0.0, 1.0, "a")]), false);
        c.with_view(|v| driver.sync(v, 0.0));
        c.set_data(ScatterData::new(vec![Point::new(1.0, 1.0, 1.0, "a")]), false);
        c.with_view(|v| driver.sync(v, 10.0));

        assert!(driver.is_animating(10.5));
        let mid = driver.point_position(0, 10.5).unwrap();
        assert!((mid[0] - 0.5).abs() < 1e-9);
        assert!(!driver.is_animating(11.0));
        assert_eq!(driver.point_position(0, 11.0), Some([1.0, 1.0]));
    }

    #[test]
    fn immediate_reconcile_jumps_to_target() {
        let c = controller();
        let mut driver = RenderDriver::new();
        c.set_data(ScatterData::new(vec![Point::new(0.0, 0.0, 1.0, "a")]), false);
        c.with_view(|v| driver.reconcile(v, 0.0, false));
        c.set_data(ScatterData::new(vec![Point::new(1.0, 1.0, 1.0, "b")]), false);
        c.with_view(|v| driver.reconcile(v, 0.0, false));
        assert!(!driver.is_animating(0.0));
        assert_eq!(driver.point_position(0, 0.0), Some([1.0, 1.0]));
        assert_eq!(driver.bound_id(0), Some(&PointId::from("b")));
    }

    #[test]
    fn edges_follow_nodes_and_skip_missing() {
        let c = controller();
        let mut driver = RenderDriver::new();
        c.set_data(
            data(1).with_tree(
                vec![TreePoint { x: -1.0, y: 0.0 }, TreePoint { x: 1.0, y: 0.0 }],
                vec![TreeEdge { from: 0, to: 1 }, TreeEdge { from: 1, to: 5 }],
            ),
            false,
        );
        let mut surface = RecordingSurface::new();
        c.with_view(|v| {
            driver.sync(v, 0.0);
            driver.paint(v, &mut surface, 2.0);
        });
        assert_eq!(surface.clipped_lines(), vec![([100.0, 200.0], [300.0, 200.0])]);
        // One point plus two tree nodes.
        assert_eq!(surface.circles().len(), 3);
    }

    #[test]
    fn paint_includes_colorbar_labels_and_tooltip() {
        let c = controller();
        let mut driver = RenderDriver::new();
        c.set_data(
            ScatterData::new(vec![
                Point::new(0.0, 0.0, 1.0, "a"),
                Point::new(1.0, 1.0, 5.0, "b"),
                Point::new(2.0, 2.0, 9.0, "c"),
            ]),
            false,
        );
        c.hover_point(0).unwrap();
        let mut surface = RecordingSurface::new();
        c.with_view(|v| {
            driver.sync(v, 0.0);
            driver.paint(v, &mut surface, 1.0);
        });
        let texts = surface.texts();
        assert!(texts.contains(&"1.16"));
        assert!(texts.contains(&"8.84"));
        assert!(surface.commands.iter().any(|cmd| matches!(
            cmd,
            DrawCommand::Gradient { stops, .. } if stops.len() == 3
        )));
        assert!(surface.commands.iter().any(|cmd| matches!(
            cmd,
            DrawCommand::Tooltip { text, anchor } if text == "a: 1" && *anchor == [200.0, 185.0]
        )));
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
    }
}
