//! Legend and colorbar models.
//!
//! Categorical mappings produce a row of swatches; continuous mappings produce
//! a horizontal gradient strip with the low/high bound labels. Both are laid
//! out in plot-area pixels at the top-right corner, 10px from the edges.

use egui::Color32;

use crate::config::ScatterConfig;
use crate::data::color_scale::{ColorMapping, ContinuousStats};

/// Opacity of every colorbar gradient stop.
pub const COLORBAR_STOP_OPACITY: f32 = 0.8;
/// Distance of the legend/colorbar box from the top-right corner.
const INSET: f32 = 10.0;

/// One category swatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub label: String,
    pub color: Color32,
    /// Box of the swatch: `[x, y, width, height]`.
    pub rect: [f32; 4],
}

/// A gradient stop of the colorbar (`offset` in percent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: u32,
    pub color: Color32,
    pub opacity: f32,
}

/// A positioned text label.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundLabel {
    pub text: String,
    pub pos: [f32; 2],
}

/// Continuous colorbar.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub rect: [f32; 4],
    pub stops: Vec<GradientStop>,
    pub low: BoundLabel,
    pub high: BoundLabel,
}

/// Visual key for the current color mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LegendModel {
    /// Nothing to show (disabled, or no data to describe).
    #[default]
    Hidden,
    Swatches(Vec<Swatch>),
    Gradient(Colorbar),
}

impl LegendModel {
    /// Swatch legend for a categorical mapping; hidden when the legend is
    /// disabled or there are no categories.
    pub fn swatches(mapping: &ColorMapping, config: &ScatterConfig, plot_width: f32) -> Self {
        let ColorMapping::Categorical { domain, .. } = mapping else {
            return LegendModel::Hidden;
        };
        if !config.legend_enabled || domain.is_empty() {
            return LegendModel::Hidden;
        }
        let [width, height] = config.legend_size;
        let incr = width / domain.len() as f32;
        let x0 = plot_width - width - INSET;
        let swatches = domain
            .iter()
            .enumerate()
            .map(|(i, key)| Swatch {
                label: key.clone(),
                color: mapping.category_color(key),
                rect: [x0 + i as f32 * incr, INSET, incr, height],
            })
            .collect();
        LegendModel::Swatches(swatches)
    }

    /// Gradient colorbar for a continuous mapping; hidden when the colorbar is
    /// disabled or there are no statistics.
    pub fn gradient(
        mapping: &ColorMapping,
        stats: Option<&ContinuousStats>,
        config: &ScatterConfig,
        plot_width: f32,
    ) -> Self {
        let colors = mapping.gradient_colors();
        let Some(stats) = stats else {
            return LegendModel::Hidden;
        };
        if !config.colorbar_enabled || colors.len() < 2 {
            return LegendModel::Hidden;
        }
        let [width, height] = config.colorbar_size;
        let x = plot_width - width - INSET;
        let last = (colors.len() - 1) as f32;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, c)| GradientStop {
                offset: ((100.0 / last) * i as f32).floor() as u32,
                color: *c,
                opacity: COLORBAR_STOP_OPACITY,
            })
            .collect();
        // Labels sit under the bar: low at its left edge, high 10px before
        // its right edge.
        let label_y = INSET + height + 10.0;
        LegendModel::Gradient(Colorbar {
            rect: [x, INSET, width, height],
            stops,
            low: BoundLabel {
                text: stats.label_low(),
                pos: [x.trunc(), label_y],
            },
            high: BoundLabel {
                text: stats.label_high(),
                pos: [x.trunc() + width.trunc() - 10.0, label_y],
            },
        })
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, LegendModel::Hidden)
    }

    pub fn swatch_count(&self) -> usize {
        match self {
            LegendModel::Swatches(s) => s.len(),
            _ => 0,
        }
    }
}
