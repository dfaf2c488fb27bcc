//! Configuration for a scatter view.
//!
//! Every layout and interaction constant lives here so embedders can tune a
//! panel without touching the core. The struct round-trips through YAML or
//! JSON (see [`ScatterConfig::load`]).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Margins
// ─────────────────────────────────────────────────────────────────────────────

/// Space reserved around the plotting area (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 40.0,
            right: 20.0,
            top: 20.0,
            bottom: 20.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScatterConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration shared by the scatter core, the render driver and the egui
/// panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Draw the continuous colorbar.
    pub colorbar_enabled: bool,
    /// Draw the categorical legend.
    pub legend_enabled: bool,
    pub margins: Margins,
    /// Colorbar box size `[width, height]`.
    pub colorbar_size: [f32; 2],
    /// Legend box size `[width, height]`.
    pub legend_size: [f32; 2],
    /// Initial data-space domain of the x axis.
    pub x_domain: [f64; 2],
    /// Initial data-space domain of the y axis.
    pub y_domain: [f64; 2],
    /// Allowed zoom factor range `[min, max]`.
    pub scale_extent: [f64; 2],
    /// Approximate number of x-axis ticks.
    pub x_ticks: usize,
    /// Approximate number of y-axis ticks.
    pub y_ticks: usize,
    /// Pixel distance under which an open lasso path is auto-closed.
    pub lasso_close_distance: f32,
    /// Duration of the position transition after a full data load.
    pub transition_ms: u64,
    /// Opacity of unselected points while a selection exists.
    pub unselected_opacity: f32,
    pub tree_node_radius: f32,
    pub tree_color: [u8; 3],
    pub tree_edge_width: f32,
    /// Vertical offset of the tooltip above the hovered point.
    pub tooltip_offset: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            colorbar_enabled: false,
            legend_enabled: false,
            margins: Margins::default(),
            colorbar_size: [200.0, 20.0],
            legend_size: [200.0, 20.0],
            x_domain: [-2.0, 2.0],
            y_domain: [-2.0, 2.0],
            scale_extent: [0.2, 32.0],
            x_ticks: 10,
            y_ticks: 5,
            lasso_close_distance: 75.0,
            transition_ms: 1000,
            unselected_opacity: 0.4,
            tree_node_radius: 5.0,
            tree_color: [0x55, 0x55, 0x55],
            tree_edge_width: 2.0,
            tooltip_offset: 10.0,
        }
    }
}

impl ScatterConfig {
    /// Config with both the colorbar and the legend switched on.
    pub fn with_keys() -> Self {
        Self {
            colorbar_enabled: true,
            legend_enabled: true,
            ..Self::default()
        }
    }

    /// Load from a YAML (`.yaml`/`.yml`) or JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        tracing::debug!(path = %path.display(), "Loaded scatter config");
        Ok(config)
    }

    /// Save as YAML or JSON depending on the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Transition duration in seconds.
    pub fn transition_secs(&self) -> f64 {
        self.transition_ms as f64 / 1000.0
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: ScatterConfig = serde_yaml::from_str("legend_enabled: true\nlasso_close_distance: 50\n").unwrap();
        assert!(cfg.legend_enabled);
        assert!(!cfg.colorbar_enabled);
        assert_eq!(cfg.lasso_close_distance, 50.0);
        assert_eq!(cfg.scale_extent, [0.2, 32.0]);
    }

    #[test]
    fn save_and_load_json() {
        let dir = std::env::temp_dir().join(format!("colorscatter-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scatter.json");
        let mut cfg = ScatterConfig::with_keys();
        cfg.transition_ms = 250;
        cfg.save(&path).unwrap();
        let loaded = ScatterConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!((loaded.transition_secs() - 0.25).abs() < 1e-12);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bad_json_is_an_error() {
        let dir = std::env::temp_dir().join(format!("colorscatter-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ScatterConfig::load(&path),
            Err(crate::Error::Json(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
