use eframe::egui;

use crate::panels::panel_trait::Panel;
use crate::panels::scatter_ui::ScatterPanel;
use crate::store::{DashboardStore, MainView, StatusPatch};

const MAIN_VIEWS: [(MainView, &str); 3] = [
    (MainView::SignatureProjection, "Signatures"),
    (MainView::PcAnnotator, "PC annotator"),
    (MainView::Tree, "Tree"),
];

/// Linked scatter panels side by side, with an optional dashboard status bar.
pub struct DashboardApp {
    pub panels: Vec<ScatterPanel>,
    pub store: Option<DashboardStore>,
}

impl DashboardApp {
    pub fn new(panels: Vec<ScatterPanel>) -> Self {
        Self {
            panels,
            store: None,
        }
    }

    pub fn with_store(mut self, store: DashboardStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ui_embed(&mut self, ui: &mut egui::Ui) {
        self.render_status(ui);
        self.render_menu(ui);
        ui.separator();
        self.render_panels(ui);
    }

    fn render_status(&mut self, ui: &mut egui::Ui) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let mut patch = None;
        let mut back = false;
        ui.horizontal(|ui| {
            let current = store.status().main_view;
            for (view, label) in MAIN_VIEWS {
                if ui.selectable_label(current == view, label).clicked() && current != view {
                    patch = Some(StatusPatch {
                        main_view: Some(view),
                        ..Default::default()
                    });
                }
            }
            ui.separator();
            let status = store.status();
            if !status.plotted_item.is_empty() {
                ui.label(format!("Plotted: {}", status.plotted_item));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                back = ui
                    .add_enabled(store.history_len() > 0, egui::Button::new("Back"))
                    .clicked();
            });
        });

        if let Some(patch) = patch {
            match store.update(patch) {
                Ok((change, plan)) => {
                    tracing::debug!(keys = ?change.keys, requests = plan.requests().len(), "Status updated");
                    store.notify(&change);
                }
                Err(e) => tracing::warn!(error = %e, "Status update rejected"),
            }
        }
        if back {
            if let Some(change) = store.go_back() {
                store.notify(&change);
            }
        }
    }

    fn render_menu(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for p in self.panels.iter_mut() {
                let mut visible = p.state().visible;
                if ui.toggle_value(&mut visible, p.name().to_string()).changed() {
                    p.state_mut().visible = visible;
                }
            }
            ui.separator();
            for p in self.panels.iter_mut().filter(|p| p.state().visible) {
                p.render_menu(ui);
            }
        });
    }

    fn render_panels(&mut self, ui: &mut egui::Ui) {
        let mut visible: Vec<&mut ScatterPanel> =
            self.panels.iter_mut().filter(|p| p.state().visible).collect();
        if visible.is_empty() {
            ui.label("No panel active");
            return;
        }
        let n = visible.len();
        ui.columns(n, |cols| {
            for (col, p) in cols.iter_mut().zip(visible.iter_mut()) {
                col.push_id(p.name().to_string(), |ui| p.render_panel(ui));
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui_embed(ui);
        });
    }
}

/// Open a native window showing `app`.
pub fn run_dashboard(
    app: DashboardApp,
    title: Option<&str>,
    native_options: Option<eframe::NativeOptions>,
) -> eframe::Result<()> {
    let title = title.unwrap_or("ColorScatter").to_string();
    let opts = native_options.unwrap_or_default();
    tracing::info!(%title, panels = app.panels.len(), "Starting dashboard");
    eframe::run_native(&title, opts, Box::new(|_cc| Ok(Box::new(app))))
}
