//! egui front end of a scatter view: input handling and an egui-backed
//! [`DrawSurface`].

use egui::epaint::CornerRadius;
use egui::{pos2, vec2, Align2, Color32, FontId, Mesh, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui};

use super::panel_trait::{Panel, PanelState};
use crate::data::lasso::GestureOwner;
use crate::data::legend::GradientStop;
use crate::render::{DrawSurface, RenderDriver};
use crate::scatter::ScatterController;

/// Zoom factor per scrolled point.
const SCROLL_ZOOM_SPEED: f32 = 0.002;
const TOOLTIP_PADDING: f32 = 4.0;
const TOOLTIP_FILL: Color32 = Color32::from_rgba_premultiplied(250, 250, 250, 235);

// ─────────────────────────────────────────────────────────────────────────────
// EguiSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Paints onto an egui [`Painter`]. Plot-area coordinates are offset by the
/// plot rect's origin.
pub struct EguiSurface {
    full: Painter,
    plot: Painter,
    origin: Pos2,
    clipped: bool,
}

impl EguiSurface {
    /// `painter` covers the whole widget (margins included); `plot_rect` is
    /// the plotting area inside it.
    pub fn new(painter: &Painter, plot_rect: Rect) -> Self {
        Self {
            full: painter.clone(),
            plot: painter.with_clip_rect(plot_rect),
            origin: plot_rect.min,
            clipped: false,
        }
    }

    fn painter(&self) -> &Painter {
        if self.clipped {
            &self.plot
        } else {
            &self.full
        }
    }

    fn pos(&self, p: [f32; 2]) -> Pos2 {
        self.origin + vec2(p[0], p[1])
    }

    fn rect_of(&self, r: [f32; 4]) -> Rect {
        Rect::from_min_size(self.pos([r[0], r[1]]), vec2(r[2], r[3]))
    }
}

impl DrawSurface for EguiSurface {
    fn set_clipped(&mut self, clipped: bool) {
        self.clipped = clipped;
    }

    fn line(&mut self, from: [f32; 2], to: [f32; 2], stroke: Stroke) {
        let seg = [self.pos(from), self.pos(to)];
        self.painter().line_segment(seg, stroke);
    }

    fn circle(&mut self, center: [f32; 2], radius: f32, fill: Color32, stroke: Stroke) {
        let c = self.pos(center);
        self.painter().circle(c, radius, fill, stroke);
    }

    fn rect(&mut self, rect: [f32; 4], fill: Color32) {
        let r = self.rect_of(rect);
        self.painter().rect_filled(r, CornerRadius::ZERO, fill);
    }

    fn gradient_rect(&mut self, rect: [f32; 4], stops: &[GradientStop]) {
        let r = self.rect_of(rect);
        let mut mesh = Mesh::default();
        for pair in stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let x0 = r.min.x + r.width() * a.offset as f32 / 100.0;
            let x1 = r.min.x + r.width() * b.offset as f32 / 100.0;
            let c0 = a.color.gamma_multiply(a.opacity);
            let c1 = b.color.gamma_multiply(b.opacity);
            let base = mesh.vertices.len() as u32;
            mesh.colored_vertex(pos2(x0, r.min.y), c0);
            mesh.colored_vertex(pos2(x1, r.min.y), c1);
            mesh.colored_vertex(pos2(x1, r.max.y), c1);
            mesh.colored_vertex(pos2(x0, r.max.y), c0);
            mesh.add_triangle(base, base + 1, base + 2);
            mesh.add_triangle(base, base + 2, base + 3);
        }
        if !mesh.is_empty() {
            self.painter().add(Shape::mesh(mesh));
        }
    }

    fn polyline(&mut self, points: &[[f32; 2]], closed: bool, stroke: Stroke) {
        let pts: Vec<Pos2> = points.iter().map(|p| self.pos(*p)).collect();
        let shape = if closed {
            Shape::closed_line(pts, stroke)
        } else {
            Shape::line(pts, stroke)
        };
        self.painter().add(shape);
    }

    fn text(&mut self, pos: [f32; 2], align: Align2, text: &str, size: f32, color: Color32) {
        let p = self.pos(pos);
        self.painter()
            .text(p, align, text, FontId::proportional(size), color);
    }

    fn tooltip(&mut self, anchor: [f32; 2], text: &str) {
        let anchor = self.pos(anchor);
        let painter = &self.full;
        let galley = painter.layout_no_wrap(
            text.to_string(),
            FontId::proportional(12.0),
            Color32::from_gray(20),
        );
        let size = galley.size() + vec2(2.0 * TOOLTIP_PADDING, 2.0 * TOOLTIP_PADDING);
        let frame = Rect::from_min_size(pos2(anchor.x - size.x / 2.0, anchor.y - size.y), size);
        painter.rect_filled(frame, CornerRadius::same(3), TOOLTIP_FILL);
        painter.rect_stroke(
            frame,
            CornerRadius::same(3),
            Stroke::new(1.0, Color32::from_gray(160)),
            egui::StrokeKind::Inside,
        );
        painter.galley(
            frame.min + vec2(TOOLTIP_PADDING, TOOLTIP_PADDING),
            galley,
            Color32::from_gray(20),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScatterPanel
// ─────────────────────────────────────────────────────────────────────────────

/// One scatter view as an egui panel.
pub struct ScatterPanel {
    title: String,
    state: PanelState,
    controller: ScatterController,
    driver: RenderDriver,
    /// Point currently under the pointer.
    hovered: Option<usize>,
}

impl ScatterPanel {
    pub fn new(title: impl Into<String>, controller: ScatterController) -> Self {
        Self {
            title: title.into(),
            state: PanelState { visible: true },
            controller,
            driver: RenderDriver::new(),
            hovered: None,
        }
    }

    pub fn controller(&self) -> &ScatterController {
        &self.controller
    }

    fn render_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let mut lasso = self.controller.gesture_owner() == GestureOwner::Lasso;
            if ui
                .toggle_value(&mut lasso, "Lasso")
                .on_hover_text("Draw a path to select points")
                .changed()
            {
                self.controller.enable_lasso_mode(lasso);
            }

            ui.separator();

            if ui.button("Reset zoom").clicked() {
                self.controller.reset_zoom();
            }
            if ui.button("Clear selection").clicked() {
                self.controller.clear_selection();
            }

            ui.separator();

            let selected = self.controller.with_view(|v| v.selection().len());
            ui.label(format!("Selected: {selected}"));
        });
    }

    fn render_plot(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let margins = self.controller.with_view(|v| v.config().margins);
        let plot_rect = Rect::from_min_max(
            rect.min + vec2(margins.left, margins.top),
            rect.max - vec2(margins.right, margins.bottom),
        );
        if plot_rect.width() <= 0.0 || plot_rect.height() <= 0.0 {
            return;
        }
        self.controller.resize(plot_rect.width(), plot_rect.height());

        let local = |p: Pos2| [p.x - plot_rect.min.x, p.y - plot_rect.min.y];

        match self.controller.gesture_owner() {
            GestureOwner::PanZoom => {
                if let Some(pointer) = response.hover_pos() {
                    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                    if scroll != 0.0 {
                        let factor = f64::from((scroll * SCROLL_ZOOM_SPEED).exp());
                        self.controller.zoom_at(factor, local(pointer));
                    }
                }
                if response.dragged() {
                    let delta = response.drag_delta();
                    self.controller.pan_by(delta.x, delta.y);
                }
            }
            GestureOwner::Lasso => {
                // Classify against the elements as drawn, not their targets.
                let now = ui.input(|i| i.time);
                let driver = &self.driver;
                let drawn = self.controller.with_view(|v| driver.drawn_points(v, now));
                if response.drag_started() {
                    if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                        self.controller.lasso_pointer_down(local(origin));
                    }
                }
                if response.dragged() {
                    if let Some(pointer) = response.interact_pointer_pos() {
                        self.controller.lasso_pointer_move_drawn(local(pointer), &drawn);
                    }
                }
                if response.drag_stopped() {
                    let enclosed = self.controller.lasso_pointer_up_drawn(&drawn);
                    tracing::debug!(view = %self.title, count = enclosed.len(), "Lasso finished");
                }
            }
        }

        let under_pointer = response
            .hover_pos()
            .and_then(|p| self.controller.with_view(|v| v.point_at(local(p))));
        if under_pointer != self.hovered {
            if self.hovered.is_some() {
                self.controller.unhover_point();
            }
            if let Some(index) = under_pointer {
                if let Err(e) = self.controller.hover_point(index) {
                    tracing::warn!(view = %self.title, error = %e, "Hover failed");
                }
            }
            self.hovered = under_pointer;
        }

        if response.clicked() {
            if let Some(p) = response.interact_pointer_pos() {
                let pos = local(p);
                let (point, node) = self
                    .controller
                    .with_view(|v| (v.point_at(pos), v.tree_node_at(pos)));
                let result = match (point, node) {
                    (Some(i), _) => self.controller.set_selected(i, None),
                    (None, Some(n)) => self.controller.click_tree_node(n),
                    (None, None) => Ok(()),
                };
                if let Err(e) = result {
                    tracing::warn!(view = %self.title, error = %e, "Selection failed");
                }
            }
        }

        let now = ui.input(|i| i.time);
        let painter = ui.painter_at(rect);
        let mut surface = EguiSurface::new(&painter, plot_rect);
        let driver = &mut self.driver;
        self.controller.with_view(|v| {
            if let Some(stats) = driver.sync(v, now) {
                tracing::trace!(?stats, "Reconciled drawn elements");
            }
            driver.paint(v, &mut surface, now);
        });

        let redraw = self.controller.take_redraw();
        if redraw.is_some() || self.driver.is_animating(now) {
            ui.ctx().request_repaint();
        }
    }
}

impl Panel for ScatterPanel {
    fn name(&self) -> &str {
        &self.title
    }

    fn state(&self) -> &PanelState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_menu(&mut self, ui: &mut Ui) {
        ui.menu_button(self.title.clone(), |ui| {
            if ui.button("Reset zoom").clicked() {
                self.controller.reset_zoom();
                ui.close();
            }
            if ui.button("Clear selection").clicked() {
                self.controller.clear_selection();
                ui.close();
            }
        });
    }

    fn render_panel(&mut self, ui: &mut Ui) {
        self.render_controls(ui);
        ui.separator();
        self.render_plot(ui);
    }
}
