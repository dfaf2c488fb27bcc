use egui::Ui;

#[derive(Debug, Clone, Copy, Default)]
pub struct PanelState {
    pub visible: bool,
}

pub trait Panel {
    fn name(&self) -> &str;
    fn state(&self) -> &PanelState;
    fn state_mut(&mut self) -> &mut PanelState;

    // Optional hooks with default empty impls
    fn render_menu(&mut self, _ui: &mut Ui) {}
    fn render_panel(&mut self, _ui: &mut Ui) {}
}
