//! The scatter view core and its shareable handle.
//!
//! [`ScatterView`] owns everything one view knows: the current load, the
//! derived color mapping and legend, selection, hover, lasso and zoom state.
//! [`ScatterController`] is the cheap, clonable handle the dashboard and the
//! egui panel talk to. It locks the view for local work and releases the lock
//! before notifying linked views, so a cycle that leads back here re-enters
//! cleanly and is stopped by the token gate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::config::ScatterConfig;
use crate::data::color_scale::{point_radius, ColorMapping, ContinuousStats};
use crate::data::lasso::{GestureOwner, Lasso, LassoClass, LassoPhase};
use crate::data::legend::LegendModel;
use crate::data::points::{Point, PointId, ScatterData};
use crate::data::scale::ViewScales;
use crate::data::selection::{ids_in_range, GroupLookup, HoverState, SelectionState};
use crate::error::{Error, Result};
use crate::events::{DataLoadMeta, EventController, EventKind, ScatterEvent, ViewChangeMeta};
use crate::sync::{HoverTarget, LinkSet, LinkedView, SyncToken, TokenCheck, TokenGate};

/// What the next frame has to do, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    /// Fill, opacity or hover styling changed.
    Restyle,
    /// Scales changed: every element is re-projected immediately.
    Reposition,
    /// Data was replaced: reconcile elements and animate to new positions.
    Reload,
}

/// Hover tooltip of a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub index: usize,
    pub text: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// ScatterView
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ScatterView {
    name: String,
    config: ScatterConfig,
    data: ScatterData,
    categorical: bool,
    mapping: ColorMapping,
    stats: Option<ContinuousStats>,
    legend: LegendModel,
    radius: f64,
    scales: ViewScales,
    selection: SelectionState,
    hover: HoverState,
    tooltip: Option<Tooltip>,
    lasso: Lasso,
    gate: TokenGate,
    selection_links: LinkSet,
    hover_links: LinkSet,
    opacities: Vec<f32>,
    opacity_revision: u64,
    data_revision: u64,
    pending: Option<Redraw>,
    events: EventController,
}

impl ScatterView {
    fn new(name: &str, config: ScatterConfig, width: f32, height: f32) -> Self {
        let scales = ViewScales::new(&config, width, height);
        let lasso = Lasso::new(config.lasso_close_distance);
        Self {
            name: name.to_string(),
            config,
            data: ScatterData::default(),
            categorical: false,
            mapping: ColorMapping::default(),
            stats: None,
            legend: LegendModel::Hidden,
            radius: point_radius(0),
            scales,
            selection: SelectionState::new(),
            hover: HoverState::None,
            tooltip: None,
            lasso,
            gate: TokenGate::default(),
            selection_links: LinkSet::default(),
            hover_links: LinkSet::default(),
            opacities: Vec::new(),
            opacity_revision: 0,
            data_revision: 0,
            pending: None,
            events: EventController::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    pub fn data(&self) -> &ScatterData {
        &self.data
    }

    pub fn points(&self) -> &[Point] {
        &self.data.points
    }

    pub fn is_categorical(&self) -> bool {
        self.categorical
    }

    pub fn mapping(&self) -> &ColorMapping {
        &self.mapping
    }

    pub fn stats(&self) -> Option<&ContinuousStats> {
        self.stats.as_ref()
    }

    pub fn legend(&self) -> &LegendModel {
        &self.legend
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn scales(&self) -> &ViewScales {
        &self.scales
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn lasso(&self) -> &Lasso {
        &self.lasso
    }

    /// Per-point opacity of the current load.
    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn opacity(&self, index: usize) -> f32 {
        self.opacities.get(index).copied().unwrap_or(1.0)
    }

    /// Incremented each time the computed opacities actually change.
    pub fn opacity_revision(&self) -> u64 {
        self.opacity_revision
    }

    /// Incremented on every data load.
    pub fn data_revision(&self) -> u64 {
        self.data_revision
    }

    pub fn pending_redraw(&self) -> Option<Redraw> {
        self.pending
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.data
            .id_at(index)
            .is_some_and(|id| self.selection.contains(id))
    }

    /// Points in plot-area pixels under the current zoom.
    pub fn projected_points(&self) -> Vec<[f32; 2]> {
        self.data
            .points
            .iter()
            .map(|p| self.scales.project(p.x, p.y))
            .collect()
    }

    /// Nearest point within its radius of `pos`.
    pub fn point_at(&self, pos: [f32; 2]) -> Option<usize> {
        nearest_within(
            self.data.points.iter().map(|p| self.scales.project(p.x, p.y)),
            pos,
            self.radius as f32,
        )
    }

    /// Nearest tree node within its radius of `pos`.
    pub fn tree_node_at(&self, pos: [f32; 2]) -> Option<usize> {
        nearest_within(
            self.data.tree_points.iter().map(|t| self.scales.project(t.x, t.y)),
            pos,
            self.config.tree_node_radius,
        )
    }

    fn request(&mut self, redraw: Redraw) {
        self.pending = Some(self.pending.map_or(redraw, |p| p.max(redraw)));
    }

    fn visible_meta(&self) -> ViewChangeMeta {
        let [x0, x1] = self.scales.visible_x();
        let [y0, y1] = self.scales.visible_y();
        ViewChangeMeta {
            x_range: (x0, x1),
            y_range: (y0, y1),
            k: self.scales.zoom().k,
        }
    }

    // ── Data load ───────────────────────────────────────────────────────

    fn load(&mut self, data: ScatterData, categorical: bool) {
        self.radius = point_radius(data.points.len());
        self.categorical = categorical;
        if categorical {
            self.stats = None;
            self.mapping = ColorMapping::categorical(data.points.iter().map(|p| &p.value));
        } else {
            self.stats = ContinuousStats::from_points(&data.points);
            self.mapping = self
                .stats
                .as_ref()
                .map(ColorMapping::continuous)
                .unwrap_or_default();
            if self.stats.is_none() && !data.points.is_empty() {
                tracing::warn!(view = %self.name, "No numeric values in continuous load, using default colors");
            }
        }
        for (i, edge) in data.tree_edges.iter().enumerate() {
            if data.edge_endpoints(edge).is_none() {
                tracing::warn!(
                    view = %self.name,
                    edge = i,
                    from = edge.from,
                    to = edge.to,
                    nodes = data.tree_points.len(),
                    "Tree edge references a missing node and will not be drawn"
                );
            }
        }
        // The index may now hold a different point.
        self.tooltip = None;
        self.data = data;
        self.data_revision += 1;
        self.rebuild_legend();
        self.refresh_opacity();
        self.request(Redraw::Reload);

        tracing::info!(
            view = %self.name,
            points = self.data.points.len(),
            tree_nodes = self.data.tree_points.len(),
            tree_edges = self.data.tree_edges.len(),
            categorical,
            radius = self.radius,
            "Data loaded"
        );
        let mut evt = ScatterEvent::new(EventKind::DATA_LOADED);
        evt.data_load = Some(DataLoadMeta {
            point_count: self.data.points.len(),
            tree_nodes: self.data.tree_points.len(),
            tree_edges: self.data.tree_edges.len(),
            categorical,
            radius: self.radius,
        });
        self.events.emit(evt);
    }

    fn rebuild_legend(&mut self) {
        let width = self.scales.width();
        self.legend = if self.categorical {
            LegendModel::swatches(&self.mapping, &self.config, width)
        } else {
            LegendModel::gradient(&self.mapping, self.stats.as_ref(), &self.config, width)
        };
    }

    // ── Selection ───────────────────────────────────────────────────────

    fn compute_opacities(&self) -> Vec<f32> {
        if self.selection.is_empty() {
            return vec![1.0; self.data.points.len()];
        }
        let selected: HashSet<&PointId> = self.selection.ids().iter().collect();
        self.data
            .points
            .iter()
            .map(|p| {
                if selected.contains(&p.id) {
                    1.0
                } else {
                    self.config.unselected_opacity
                }
            })
            .collect()
    }

    /// Re-diff point opacity against the selection. Returns `true` (and bumps
    /// the revision) only when something changed.
    fn refresh_opacity(&mut self) -> bool {
        let next = self.compute_opacities();
        if next == self.opacities {
            return false;
        }
        self.opacities = next;
        self.opacity_revision += 1;
        self.request(Redraw::Restyle);
        true
    }

    fn toggle_local(&mut self, id: &PointId, token: SyncToken) {
        if self.data.index_of(id).is_none() {
            tracing::debug!(view = %self.name, %id, %token, "Selected id not in current load, forwarding only");
            return;
        }
        let now_selected = self.selection.toggle(id);
        self.refresh_opacity();
        tracing::debug!(view = %self.name, %id, %token, now_selected, "Selection toggled");
        self.events.emit(
            ScatterEvent::new(EventKind::SELECT)
                .with_token(token)
                .with_ids(vec![id.clone()]),
        );
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.refresh_opacity();
        self.events.emit(ScatterEvent::new(EventKind::SELECTION_CLEARED));
    }

    fn select_range(&mut self, lower: f64, upper: f64) -> Vec<PointId> {
        let ids = ids_in_range(&self.data.points, lower, upper);
        for id in &ids {
            self.selection.push(id.clone());
        }
        self.refresh_opacity();
        tracing::debug!(view = %self.name, lower, upper, matched = ids.len(), "Range selected");
        self.events
            .emit(ScatterEvent::new(EventKind::RANGE_SELECTED).with_ids(ids.clone()));
        ids
    }

    // ── Hover ───────────────────────────────────────────────────────────

    fn apply_hover(&mut self, target: &HoverTarget, token: SyncToken) {
        match target {
            HoverTarget::Ids(ids) => {
                self.hover = HoverState::points(self.data.indices_of(ids));
                self.events.emit(
                    ScatterEvent::new(EventKind::HOVER)
                        .with_token(token)
                        .with_ids(ids.clone()),
                );
            }
            HoverTarget::Group { key, groups } => {
                self.hover = match key {
                    Some(k) => HoverState::group(k, &self.data.points, groups),
                    None => HoverState::None,
                };
                let mut evt = ScatterEvent::new(EventKind::HOVER_GROUP).with_token(token);
                evt.group = key.clone();
                evt.ids = self
                    .hover
                    .hovered()
                    .iter()
                    .filter_map(|&i| self.data.id_at(i).cloned())
                    .collect();
                self.events.emit(evt);
            }
        }
        self.request(Redraw::Restyle);
    }

    // ── Lasso ───────────────────────────────────────────────────────────

    fn set_lasso_mode(&mut self, enable: bool) -> bool {
        let changed = if enable {
            self.lasso.enable([self.scales.width(), self.scales.height()])
        } else {
            self.lasso.disable()
        };
        if changed {
            tracing::info!(view = %self.name, enabled = enable, "Lasso mode switched");
            let kind = if enable {
                EventKind::LASSO_ENABLED
            } else {
                EventKind::LASSO_DISABLED
            };
            self.events.emit(ScatterEvent::new(kind));
            self.request(Redraw::Restyle);
        }
        changed
    }

    /// Points at their target positions, bound to the current load's ids.
    fn target_points(&self) -> DrawnPoints {
        DrawnPoints {
            positions: self.projected_points(),
            ids: self.data.points.iter().map(|p| p.id.clone()).collect(),
        }
    }

    fn lasso_move(&mut self, pos: [f32; 2], drawn: &DrawnPoints) -> bool {
        let moved = self
            .lasso
            .pointer_move(pos, &drawn.positions, self.radius as f32);
        if moved {
            self.request(Redraw::Restyle);
        }
        moved
    }

    fn lasso_finish(&mut self, drawn: &DrawnPoints) -> Vec<PointId> {
        let Some(outcome) = self
            .lasso
            .pointer_up(&drawn.positions, self.radius as f32)
        else {
            return Vec::new();
        };
        // Resolve by the id bound to each enclosed element.
        let ids: Vec<PointId> = outcome
            .enclosed
            .iter()
            .filter_map(|&i| drawn.ids.get(i).cloned())
            .collect();
        let added = ids
            .iter()
            .filter(|id| self.selection.insert((*id).clone()))
            .count();
        self.refresh_opacity();
        self.request(Redraw::Restyle);
        tracing::debug!(
            view = %self.name,
            enclosed = ids.len(),
            added,
            closed = outcome.closed,
            "Lasso resolved"
        );
        let mut kinds = EventKind::LASSO_COMPLETED;
        if added > 0 {
            kinds |= EventKind::SELECT;
        }
        self.events.emit(ScatterEvent::new(kinds).with_ids(ids.clone()));
        ids
    }

    // ── Zoom / pan ──────────────────────────────────────────────────────

    fn view_changed(&mut self, kind: EventKind) {
        self.request(Redraw::Reposition);
        let mut evt = ScatterEvent::new(kind);
        evt.view_change = Some(self.visible_meta());
        self.events.emit(evt);
    }
}

fn nearest_within<I>(centers: I, pos: [f32; 2], radius: f32) -> Option<usize>
where
    I: Iterator<Item = [f32; 2]>,
{
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in centers.enumerate() {
        let d2 = (c[0] - pos[0]).powi(2) + (c[1] - pos[1]).powi(2);
        if d2 <= radius * radius && best.map_or(true, |(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

/// Point elements as drawn: on-screen centers (plot-area pixels) and the id
/// bound to each element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawnPoints {
    pub positions: Vec<[f32; 2]>,
    pub ids: Vec<PointId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ScatterController
// ─────────────────────────────────────────────────────────────────────────────

/// Shareable handle to one scatter view.
#[derive(Clone)]
pub struct ScatterController {
    inner: Arc<Mutex<ScatterView>>,
    /// Readable without the lock.
    name: Arc<str>,
}

impl ScatterController {
    /// A new, empty view with a plotting area of `width` x `height` pixels.
    pub fn new(name: &str, config: ScatterConfig, width: f32, height: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScatterView::new(name, config, width, height))),
            name: Arc::from(name),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScatterView> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the current view state.
    pub fn with_view<R>(&self, f: impl FnOnce(&ScatterView) -> R) -> R {
        f(&self.lock())
    }

    /// Weak link for registering this view in another view's link set.
    pub fn downgrade(&self) -> ScatterLink {
        ScatterLink {
            inner: Arc::downgrade(&self.inner),
            name: Arc::clone(&self.name),
        }
    }

    pub fn events(&self) -> EventController {
        self.lock().events.clone()
    }

    pub fn name(&self) -> String {
        self.name.to_string()
    }

    // ── Data ────────────────────────────────────────────────────────────

    /// Replace the data. Recomputes color mapping, statistics, legend and
    /// radius, and schedules an animated redraw. Selection and hover persist.
    pub fn set_data(&self, data: ScatterData, categorical: bool) {
        self.lock().load(data, categorical);
    }

    // ── Selection ───────────────────────────────────────────────────────

    /// Toggle the point at `index` of the current load and broadcast the
    /// change to selection links. A fresh token is generated when `token` is
    /// `None`.
    pub fn set_selected(&self, index: usize, token: Option<SyncToken>) -> Result<()> {
        let id = {
            let view = self.lock();
            view.data
                .id_at(index)
                .cloned()
                .ok_or(Error::PointIndexOutOfRange {
                    index,
                    len: view.data.points.len(),
                })?
        };
        self.set_selected_id(&id, token);
        Ok(())
    }

    /// Toggle `id` and broadcast.
    ///
    /// A token this view already processed only re-diffs opacity: the toggle
    /// and the broadcast happen once per token.
    pub fn set_selected_id(&self, id: &PointId, token: Option<SyncToken>) {
        let token = SyncToken::or_fresh(token);
        let links = {
            let mut view = self.lock();
            match view.gate.admit(token) {
                TokenCheck::Fresh => {
                    view.toggle_local(id, token);
                    Some(view.selection_links.snapshot())
                }
                TokenCheck::Duplicate => {
                    let changed = view.refresh_opacity();
                    tracing::trace!(view = %view.name, %token, changed, "Duplicate selection token");
                    None
                }
            }
        };
        if let Some(links) = links {
            tracing::debug!(%token, links = links.len(), "Broadcasting selection");
            for link in links {
                link.linked_select(id, token);
            }
        }
    }

    /// Selected ids in selection order.
    pub fn get_selected_ids(&self) -> Vec<PointId> {
        self.lock().selection.ids().to_vec()
    }

    /// Empty the selection; every point returns to full opacity. Not
    /// broadcast.
    pub fn clear_selection(&self) {
        self.lock().clear_selection();
    }

    /// Add every point with a numeric value in `[lower, upper]` and return
    /// the matched ids. Existing members are not de-duplicated.
    pub fn select_range(&self, lower: f64, upper: f64) -> Vec<PointId> {
        self.lock().select_range(lower, upper)
    }

    /// Click on a tree node: selects by the node's index.
    pub fn click_tree_node(&self, index: usize) -> Result<()> {
        self.set_selected(index, None)
    }

    // ── Hover ───────────────────────────────────────────────────────────

    /// Replace the hover with the points at `indices` (empty clears) and
    /// broadcast to hover links.
    pub fn set_hovered(&self, indices: &[usize], token: Option<SyncToken>) -> Result<()> {
        let ids = {
            let view = self.lock();
            let len = view.data.points.len();
            indices
                .iter()
                .map(|&index| {
                    view.data
                        .id_at(index)
                        .cloned()
                        .ok_or(Error::PointIndexOutOfRange { index, len })
                })
                .collect::<Result<Vec<_>>>()?
        };
        self.hover(HoverTarget::Ids(ids), token);
        Ok(())
    }

    /// Highlight all points whose id maps to `key` in `groups` and fade the
    /// rest; `None` clears fading. `groups` is not kept.
    pub fn set_hovered_by_group(&self, key: Option<&str>, groups: &GroupLookup, token: Option<SyncToken>) {
        self.hover(
            HoverTarget::Group {
                key: key.map(str::to_string),
                groups: Arc::new(groups.clone()),
            },
            token,
        );
    }

    fn hover(&self, target: HoverTarget, token: Option<SyncToken>) {
        let token = SyncToken::or_fresh(token);
        let links = {
            let mut view = self.lock();
            if view.gate.admit(token) == TokenCheck::Duplicate {
                tracing::trace!(view = %view.name, %token, "Duplicate hover token");
                return;
            }
            view.apply_hover(&target, token);
            view.hover_links.snapshot()
        };
        if !links.is_empty() {
            tracing::debug!(%token, links = links.len(), cleared = target.is_clear(), "Broadcasting hover");
        }
        for link in links {
            link.linked_hover(&target, token);
        }
    }

    /// Pointer entered point `index`: show its tooltip and hover it.
    pub fn hover_point(&self, index: usize) -> Result<()> {
        {
            let mut view = self.lock();
            let point = view.data.points.get(index).ok_or(Error::PointIndexOutOfRange {
                index,
                len: view.data.points.len(),
            })?;
            let text = point.tooltip();
            view.tooltip = Some(Tooltip { index, text });
        }
        self.set_hovered(&[index], None)
    }

    /// Pointer left the hovered point: hide the tooltip and clear hover.
    pub fn unhover_point(&self) {
        self.lock().tooltip = None;
        self.hover(HoverTarget::clear(), None);
    }

    // ── Lasso ───────────────────────────────────────────────────────────

    /// Switch gesture ownership between pan/zoom and the lasso. Disabling
    /// mid-drag discards the drag.
    pub fn enable_lasso_mode(&self, enable: bool) -> bool {
        self.lock().set_lasso_mode(enable)
    }

    pub fn gesture_owner(&self) -> GestureOwner {
        self.lock().lasso.gesture_owner()
    }

    pub fn lasso_phase(&self) -> LassoPhase {
        self.lock().lasso.phase()
    }

    pub fn lasso_class(&self, index: usize) -> LassoClass {
        self.lock().lasso.class_of(index)
    }

    /// Start a lasso drag at `pos` (plot-area pixels).
    pub fn lasso_pointer_down(&self, pos: [f32; 2]) -> bool {
        let mut view = self.lock();
        let n = view.data.points.len();
        view.lasso.pointer_down(pos, n)
    }

    /// Extend the drag, classifying points at their target positions.
    pub fn lasso_pointer_move(&self, pos: [f32; 2]) -> bool {
        let mut view = self.lock();
        let drawn = view.target_points();
        view.lasso_move(pos, &drawn)
    }

    /// Extend the drag, classifying points where they are drawn right now
    /// (mid-transition they differ from the targets).
    pub fn lasso_pointer_move_drawn(&self, pos: [f32; 2], drawn: &DrawnPoints) -> bool {
        self.lock().lasso_move(pos, drawn)
    }

    /// Finish the drag: enclosed points join the selection. Returns the
    /// enclosed ids.
    pub fn lasso_pointer_up(&self) -> Vec<PointId> {
        let mut view = self.lock();
        let drawn = view.target_points();
        view.lasso_finish(&drawn)
    }

    /// Finish the drag against the drawn elements; enclosed elements are
    /// resolved through their bound ids.
    pub fn lasso_pointer_up_drawn(&self, drawn: &DrawnPoints) -> Vec<PointId> {
        self.lock().lasso_finish(drawn)
    }

    // ── Zoom / pan ──────────────────────────────────────────────────────

    /// Zoom by `factor` about `anchor`. Ignored while the lasso owns
    /// gestures.
    pub fn zoom_at(&self, factor: f64, anchor: [f32; 2]) -> bool {
        let mut view = self.lock();
        if view.lasso.gesture_owner() != GestureOwner::PanZoom {
            return false;
        }
        let changed = view.scales.zoom_at(factor, anchor);
        if changed {
            view.view_changed(EventKind::ZOOM);
        }
        changed
    }

    /// Pan by a pixel delta. Ignored while the lasso owns gestures.
    pub fn pan_by(&self, dx: f32, dy: f32) -> bool {
        let mut view = self.lock();
        if view.lasso.gesture_owner() != GestureOwner::PanZoom {
            return false;
        }
        let changed = view.scales.pan_by(dx, dy);
        if changed {
            view.view_changed(EventKind::PAN);
        }
        changed
    }

    pub fn reset_zoom(&self) {
        let mut view = self.lock();
        view.scales.reset_zoom();
        view.view_changed(EventKind::ZOOM);
    }

    /// Resize the plotting area. The legend is re-laid out against the new
    /// width.
    pub fn resize(&self, width: f32, height: f32) -> bool {
        let mut view = self.lock();
        if !view.scales.resize(width, height) {
            return false;
        }
        view.rebuild_legend();
        if view.lasso.is_enabled() {
            // Re-install the hit layer at the new size.
            view.lasso.disable();
            view.lasso.enable([width, height]);
        }
        view.request(Redraw::Reposition);
        true
    }

    /// Consume the pending redraw request.
    pub fn take_redraw(&self) -> Option<Redraw> {
        self.lock().pending.take()
    }

    // ── Links ───────────────────────────────────────────────────────────

    /// Notify `other` of every selection this view makes.
    pub fn add_selection_link(&self, other: &ScatterController) {
        self.add_selection_link_view(Arc::new(other.downgrade()));
    }

    /// Notify `other` of every hover change in this view.
    pub fn add_hover_link(&self, other: &ScatterController) {
        self.add_hover_link_view(Arc::new(other.downgrade()));
    }

    /// Register any [`LinkedView`] (heatmap, tree, ...) for selections.
    pub fn add_selection_link_view(&self, view: Arc<dyn LinkedView>) {
        self.lock().selection_links.push(view);
    }

    pub fn add_hover_link_view(&self, view: Arc<dyn LinkedView>) {
        self.lock().hover_links.push(view);
    }
}

impl std::fmt::Debug for ScatterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScatterController")
            .field("name", &self.name)
            .finish()
    }
}

impl LinkedView for ScatterController {
    fn linked_select(&self, id: &PointId, token: SyncToken) {
        self.set_selected_id(id, Some(token));
    }

    fn linked_hover(&self, target: &HoverTarget, token: SyncToken) {
        self.hover(target.clone(), Some(token));
    }
}

/// Non-owning link to a scatter view; a dropped view is skipped.
#[derive(Clone)]
pub struct ScatterLink {
    inner: Weak<Mutex<ScatterView>>,
    name: Arc<str>,
}

impl ScatterLink {
    fn upgrade(&self) -> Option<ScatterController> {
        self.inner.upgrade().map(|inner| ScatterController {
            inner,
            name: Arc::clone(&self.name),
        })
    }
}

impl LinkedView for ScatterLink {
    fn linked_select(&self, id: &PointId, token: SyncToken) {
        match self.upgrade() {
            Some(view) => view.linked_select(id, token),
            None => tracing::debug!(view = %self.name, %token, "Linked view dropped, skipping selection"),
        }
    }

    fn linked_hover(&self, target: &HoverTarget, token: SyncToken) {
        if let Some(view) = self.upgrade() {
            view.linked_hover(target, token);
        }
    }
}
