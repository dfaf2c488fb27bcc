//! ColorScatter crate root: re-exports and module wiring.
//!
//! An interactive 2D scatter of projected points, built on egui/eframe:
//! - `scatter`: view state, selection, hover, lasso and zoom behind a shareable controller
//! - `sync`: token-deduplicated propagation of selection and hover across linked views
//! - `render`: reconciles drawn elements with the data and paints them
//! - `store`: dashboard status with change-driven data request planning
//! - `panels` / `app`: egui panels and the eframe application shell

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod logging;
pub mod panels;
pub mod render;
pub mod scatter;
pub mod store;
pub mod sync;

// Public re-exports for a compact external API
pub use app::{run_dashboard, DashboardApp};
pub use config::{Margins, ScatterConfig};
pub use data::lasso::{GestureOwner, LassoClass, LassoPhase};
pub use data::points::{Point, PointId, PointValue, ScatterData, TreeEdge, TreePoint};
pub use data::selection::GroupLookup;
pub use error::{Error, Result};
pub use events::{EventController, EventFilter, EventKind, ScatterEvent};
pub use logging::init_logging;
pub use panels::{EguiSurface, Panel, PanelState, ScatterPanel};
pub use render::{DrawSurface, RecordingSurface, RenderDriver};
pub use scatter::{DrawnPoints, Redraw, ScatterController, ScatterLink, ScatterView};
pub use store::{DashboardStatus, DashboardStore, StatusPatch};
pub use sync::{HoverTarget, LinkedView, SyncToken};
