//! Color mapping derived from a value column.
//!
//! Categorical values get a qualitative palette (10 or 20 colors); continuous
//! values get a three-stop gradient anchored at the 2nd percentile, the mean
//! and the 98th percentile of the whole distribution. The module also owns the
//! point radius heuristic since it is recomputed from the same load.

use std::cmp::Ordering;

use egui::Color32;

use crate::data::points::{Point, PointValue};

// ─────────────────────────────────────────────────────────────────────────────
// Palettes
// ─────────────────────────────────────────────────────────────────────────────

/// Ten-color qualitative palette.
pub const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Twenty-color qualitative palette (dark/light pairs).
pub const CATEGORY20: [Color32; 20] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(174, 199, 232),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(255, 187, 120),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(152, 223, 138),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(255, 152, 150),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(197, 176, 213),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(196, 156, 148),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(247, 182, 210),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(199, 199, 199),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(219, 219, 141),
    Color32::from_rgb(23, 190, 207),
    Color32::from_rgb(158, 218, 229),
];

/// Gradient colors for continuous values: low, mid, high.
pub const GRADIENT_LOW: Color32 = Color32::from_rgb(0x48, 0xD1, 0xCC);
pub const GRADIENT_MID: Color32 = Color32::from_rgb(0x7C, 0xFC, 0x00);
pub const GRADIENT_HIGH: Color32 = Color32::from_rgb(0xFF, 0x00, 0x00);

/// Which qualitative palette a categorical mapping uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Category10,
    Category20,
}

impl PaletteKind {
    /// Palette for `distinct` categories.
    pub fn for_count(distinct: usize) -> Self {
        if distinct <= 10 {
            PaletteKind::Category10
        } else {
            PaletteKind::Category20
        }
    }

    pub fn colors(&self) -> &'static [Color32] {
        match self {
            PaletteKind::Category10 => &CATEGORY10,
            PaletteKind::Category20 => &CATEGORY20,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ColorMapping
// ─────────────────────────────────────────────────────────────────────────────

/// A gradient anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub value: f64,
    pub color: Color32,
}

/// `value -> color`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorMapping {
    /// One palette slot per distinct (sorted) category key.
    Categorical {
        palette: PaletteKind,
        domain: Vec<String>,
    },
    /// Piecewise-linear RGB gradient, clamped at both ends.
    Continuous { stops: Vec<ColorStop> },
}

impl Default for ColorMapping {
    /// Placeholder mapping used until data arrives.
    fn default() -> Self {
        ColorMapping::Continuous {
            stops: vec![
                ColorStop { value: 0.0, color: Color32::from_rgb(0, 0, 255) },
                ColorStop { value: 0.5, color: Color32::from_rgb(0, 128, 0) },
                ColorStop { value: 1.0, color: Color32::from_rgb(255, 0, 0) },
            ],
        }
    }
}

impl ColorMapping {
    /// Build a categorical mapping from the distinct keys of `values`.
    pub fn categorical<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a PointValue>,
    {
        let domain = distinct_sorted(values);
        ColorMapping::Categorical {
            palette: PaletteKind::for_count(domain.len()),
            domain,
        }
    }

    /// Build a continuous mapping from distribution statistics.
    pub fn continuous(stats: &ContinuousStats) -> Self {
        ColorMapping::Continuous {
            stops: vec![
                ColorStop { value: stats.low, color: GRADIENT_LOW },
                ColorStop { value: stats.mid, color: GRADIENT_MID },
                ColorStop { value: stats.high, color: GRADIENT_HIGH },
            ],
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, ColorMapping::Categorical { .. })
    }

    /// Color of a point value.
    pub fn color(&self, value: &PointValue) -> Color32 {
        match self {
            ColorMapping::Categorical { .. } => self.category_color(&value.category_key()),
            ColorMapping::Continuous { stops } => match value.as_f64() {
                Some(v) => interpolate(stops, v),
                None => Color32::GRAY,
            },
        }
    }

    /// Palette slot of a category key; palettes repeat past their length.
    pub fn category_color(&self, key: &str) -> Color32 {
        match self {
            ColorMapping::Categorical { palette, domain } => {
                let colors = palette.colors();
                match domain.iter().position(|k| k == key) {
                    Some(i) => colors[i % colors.len()],
                    None => Color32::GRAY,
                }
            }
            ColorMapping::Continuous { .. } => Color32::GRAY,
        }
    }

    /// Gradient colors in stop order (empty for categorical mappings).
    pub fn gradient_colors(&self) -> Vec<Color32> {
        match self {
            ColorMapping::Continuous { stops } => stops.iter().map(|s| s.color).collect(),
            ColorMapping::Categorical { .. } => Vec::new(),
        }
    }
}

/// Piecewise interpolation between stops with end clamping.
///
/// Stops are expected ascending; a mean falling outside the percentile band
/// still yields a color (segments are located by bisection on the upper
/// anchors and `t` is clamped per segment).
fn interpolate(stops: &[ColorStop], v: f64) -> Color32 {
    match stops {
        [] => Color32::GRAY,
        [only] => only.color,
        _ => {
            let last = stops.len() - 1;
            // Bisect right over the inner anchors, like a polylinear scale.
            let mut seg = 0;
            while seg < last - 1 && stops[seg + 1].value <= v {
                seg += 1;
            }
            let (a, b) = (stops[seg], stops[seg + 1]);
            let span = b.value - a.value;
            let t = if span == 0.0 { 0.0 } else { ((v - a.value) / span).clamp(0.0, 1.0) };
            lerp_rgb(a.color, b.color, t)
        }
    }
}

fn lerp_rgb(a: Color32, b: Color32, t: f64) -> Color32 {
    let ch = |x: u8, y: u8| -> u8 {
        (x as f64 + (y as f64 - x as f64) * t).round().clamp(0.0, 255.0) as u8
    };
    Color32::from_rgb(ch(a.r(), b.r()), ch(a.g(), b.g()), ch(a.b(), b.b()))
}

/// Distinct category keys: numeric keys first in numeric order, then the
/// remaining keys lexicographically. The result depends only on the set of
/// keys, not on their input order.
pub fn distinct_sorted<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a PointValue>,
{
    let mut keys: Vec<String> = Vec::new();
    for v in values {
        let k = v.category_key();
        if !keys.contains(&k) {
            keys.push(k);
        }
    }
    keys.sort_by(|a, b| compare_keys(a, b));
    keys
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        // "1" and "1.0" are distinct keys with equal values.
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics
// ─────────────────────────────────────────────────────────────────────────────

/// Anchors of the continuous gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousStats {
    /// 2nd percentile.
    pub low: f64,
    /// Arithmetic mean of all values.
    pub mid: f64,
    /// 98th percentile.
    pub high: f64,
}

impl ContinuousStats {
    /// Statistics over the numeric values of `points`; `None` when there are
    /// none.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut values: Vec<f64> = points.iter().filter_map(|p| p.value.as_f64()).collect();
        Self::from_values(&mut values)
    }

    /// Sorts `values` in place.
    pub fn from_values(values: &mut [f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Some(Self {
            low: quantile_sorted(values, 0.02)?,
            mid: mean(values)?,
            high: quantile_sorted(values, 0.98)?,
        })
    }

    pub fn label_low(&self) -> String {
        format_bound(self.low)
    }

    pub fn label_high(&self) -> String {
        format_bound(self.high)
    }
}

/// Linear-interpolated quantile of an ascending slice (`p` in `[0, 1]`).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = (n - 1) as f64 * p + 1.0;
    let hi = h.floor() as usize;
    let e = h - hi as f64;
    let v = sorted[hi.saturating_sub(1).min(n - 1)];
    if e > 0.0 && hi < n {
        Some(v + e * (sorted[hi] - v))
    } else {
        Some(v)
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Two decimals with trailing zeros stripped: `2.50 -> "2.5"`, `3.00 -> "3"`.
pub fn format_bound(v: f64) -> String {
    let fixed = format!("{:.2}", v);
    match fixed.parse::<f64>() {
        Ok(r) if r == 0.0 => "0".to_string(),
        Ok(r) => format!("{}", r),
        Err(_) => fixed,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point radius
// ─────────────────────────────────────────────────────────────────────────────

pub const MAX_RADIUS: f64 = 5.0;
pub const MIN_RADIUS: f64 = 2.0;

/// Point radius for a load of `n` points: log-linear through (100, 5) and
/// (2000, 2), clamped to `[2, 5]`.
pub fn point_radius(n: usize) -> f64 {
    let m = (MIN_RADIUS - MAX_RADIUS) / (2000f64.log10() - 100f64.log10());
    let b = MAX_RADIUS - m * 100f64.log10();
    let r = m * (n as f64).log10() + b;
    r.max(MIN_RADIUS).min(MAX_RADIUS)
}
