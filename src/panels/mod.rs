pub mod panel_trait;
pub mod scatter_ui;

pub use panel_trait::{Panel, PanelState};
pub use scatter_ui::{EguiSurface, ScatterPanel};
