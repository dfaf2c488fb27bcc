//! Geometry: data-space to view-space mapping with zoom/pan and tick generation.
//!
//! The base scales map the configured data domain onto the pixel extent of
//! the plotting area. A [`ZoomTransform`] (uniform scale `k`, translation
//! `tx`/`ty`) is applied on top, so `view = k * base(data) + t`. Both axes are
//! independently invertible.

use serde::{Deserialize, Serialize};

use crate::config::ScatterConfig;

/// Upper bound on the ticks one axis produces.
const MAX_TICKS: usize = 1000;

// ─────────────────────────────────────────────────────────────────────────────
// LinearScale
// ─────────────────────────────────────────────────────────────────────────────

/// A linear map from a `domain` interval onto a `range` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let span = self.domain[1] - self.domain[0];
        let t = if span == 0.0 { 0.0 } else { (v - self.domain[0]) / span };
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    pub fn invert(&self, px: f64) -> f64 {
        let span = self.range[1] - self.range[0];
        let t = if span == 0.0 { 0.0 } else { (px - self.range[0]) / span };
        self.domain[0] + t * (self.domain[1] - self.domain[0])
    }

    /// Roughly `count` human-friendly tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain[0] <= self.domain[1] {
            (self.domain[0], self.domain[1])
        } else {
            (self.domain[1], self.domain[0])
        };
        let step = tick_step(lo, hi, count);
        if !(step > 0.0) || !step.is_finite() {
            return Vec::new();
        }
        let start = (lo / step).ceil();
        let stop = (hi / step).floor();
        // Past 2^53 consecutive multiples are no longer representable.
        if start + 1.0 == start || stop < start {
            return Vec::new();
        }
        let n = ((stop - start) as usize).min(MAX_TICKS - 1) + 1;
        (0..n).map(|k| (start + k as f64) * step).collect()
    }
}

/// 1-2-5 tick step for `count` ticks across `[lo, hi]`.
fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let span = hi - lo;
    if span <= 0.0 || count == 0 {
        return 0.0;
    }
    let m = count as f64;
    let mut step = 10f64.powf((span / m).log10().floor());
    let err = m / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    step
}

// ─────────────────────────────────────────────────────────────────────────────
// ZoomTransform
// ─────────────────────────────────────────────────────────────────────────────

/// Continuous zoom/pan state driven by gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            k: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewScales
// ─────────────────────────────────────────────────────────────────────────────

/// A tick with its pixel position and the grid line length across the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub pixel: f32,
    pub grid_len: f32,
    pub label: String,
}

/// Both axes of one view plus the zoom transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewScales {
    x: LinearScale,
    y: LinearScale,
    zoom: ZoomTransform,
    scale_extent: [f64; 2],
    width: f32,
    height: f32,
    x_tick_count: usize,
    y_tick_count: usize,
}

impl ViewScales {
    /// Scales for a plotting area of `width` x `height` pixels.
    pub fn new(config: &ScatterConfig, width: f32, height: f32) -> Self {
        Self {
            x: LinearScale::new(config.x_domain, [0.0, width as f64]),
            y: LinearScale::new(config.y_domain, [height as f64, 0.0]),
            zoom: ZoomTransform::default(),
            scale_extent: config.scale_extent,
            width,
            height,
            x_tick_count: config.x_ticks,
            y_tick_count: config.y_ticks,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    /// Resize the pixel extent, keeping the zoom transform.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.x.range = [0.0, width as f64];
        self.y.range = [height as f64, 0.0];
        true
    }

    pub fn project_x(&self, x: f64) -> f32 {
        (self.zoom.k * self.x.map(x) + self.zoom.tx) as f32
    }

    pub fn project_y(&self, y: f64) -> f32 {
        (self.zoom.k * self.y.map(y) + self.zoom.ty) as f32
    }

    /// Data coordinates to view pixels (origin top-left of the plotting area).
    pub fn project(&self, x: f64, y: f64) -> [f32; 2] {
        [self.project_x(x), self.project_y(y)]
    }

    pub fn invert_x(&self, px: f32) -> f64 {
        self.x.invert((px as f64 - self.zoom.tx) / self.zoom.k)
    }

    pub fn invert_y(&self, py: f32) -> f64 {
        self.y.invert((py as f64 - self.zoom.ty) / self.zoom.k)
    }

    pub fn invert(&self, px: f32, py: f32) -> [f64; 2] {
        [self.invert_x(px), self.invert_y(py)]
    }

    /// Multiply the zoom factor by `factor` keeping the data point under
    /// `anchor` fixed. The resulting factor is clamped to the scale extent.
    /// Returns `true` when the transform changed.
    pub fn zoom_at(&mut self, factor: f64, anchor: [f32; 2]) -> bool {
        if !(factor > 0.0) || !factor.is_finite() {
            return false;
        }
        let k0 = self.zoom.k;
        let k1 = (k0 * factor).clamp(self.scale_extent[0], self.scale_extent[1]);
        if k1 == k0 {
            return false;
        }
        let (ax, ay) = (anchor[0] as f64, anchor[1] as f64);
        self.zoom.tx = ax - (ax - self.zoom.tx) * k1 / k0;
        self.zoom.ty = ay - (ay - self.zoom.ty) * k1 / k0;
        self.zoom.k = k1;
        true
    }

    /// Translate the view by a pixel delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        self.zoom.tx += dx as f64;
        self.zoom.ty += dy as f64;
        true
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = ZoomTransform::default();
    }

    /// Currently visible data domain of the x axis.
    pub fn visible_x(&self) -> [f64; 2] {
        [self.invert_x(0.0), self.invert_x(self.width)]
    }

    /// Currently visible data domain of the y axis (bottom, top).
    pub fn visible_y(&self) -> [f64; 2] {
        [self.invert_y(self.height), self.invert_y(0.0)]
    }

    /// X ticks; grid lines span the full view height.
    pub fn x_ticks(&self) -> Vec<Tick> {
        let visible = LinearScale::new(self.visible_x(), [0.0, self.width as f64]);
        let values = visible.ticks(self.x_tick_count);
        let labels = tick_labels(&values);
        values
            .into_iter()
            .zip(labels)
            .map(|(value, label)| Tick {
                value,
                pixel: self.project_x(value),
                grid_len: self.height,
                label,
            })
            .collect()
    }

    /// Y ticks; grid lines span the full view width.
    pub fn y_ticks(&self) -> Vec<Tick> {
        let visible = LinearScale::new(self.visible_y(), [self.height as f64, 0.0]);
        let values = visible.ticks(self.y_tick_count);
        let labels = tick_labels(&values);
        values
            .into_iter()
            .zip(labels)
            .map(|(value, label)| Tick {
                value,
                pixel: self.project_y(value),
                grid_len: self.width,
                label,
            })
            .collect()
    }
}

/// Format tick values with just enough decimals for the tick spacing.
fn tick_labels(values: &[f64]) -> Vec<String> {
    let step = match values {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    };
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10()).ceil().max(0.0) as usize
    } else {
        0
    };
    values
        .iter()
        .map(|v| {
            let s = format!("{:.*}", decimals, v);
            if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
                s[1..].to_string()
            } else {
                s
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scales() -> ViewScales {
        ViewScales::new(&ScatterConfig::default(), 400.0, 200.0)
    }

    #[test]
    fn ticks_on_default_domain() {
        let s = LinearScale::new([-2.0, 2.0], [0.0, 400.0]);
        assert_eq!(s.ticks(4), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn ticks_terminate_on_large_offset_domains() {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let far = LinearScale::new([1e16, 1e16 + 4.0], [0.0, 400.0]).ticks(10);
            let wide = LinearScale::new([0.0, 1e300], [0.0, 400.0]).ticks(10);
            let _ = tx.send((far.len(), wide.len()));
        });
        let (far, wide) = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("tick generation did not finish");
        assert!(far <= MAX_TICKS);
        assert!(wide > 0 && wide <= MAX_TICKS);
    }

    #[test]
    fn base_projection_maps_domain_to_extent() {
        let s = scales();
        assert_eq!(s.project(-2.0, -2.0), [0.0, 200.0]);
        assert_eq!(s.project(2.0, 2.0), [400.0, 0.0]);
        assert_eq!(s.project(0.0, 0.0), [200.0, 100.0]);
    }

    #[test]
    fn projection_is_invertible_under_zoom_and_pan() {
        let mut s = scales();
        s.zoom_at(3.0, [120.0, 80.0]);
        s.pan_by(-17.0, 9.0);
        let [px, py] = s.project(0.7, -1.3);
        let [x, y] = s.invert(px, py);
        assert!((x - 0.7).abs() < 1e-4);
        assert!((y + 1.3).abs() < 1e-4);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut s = scales();
        let anchor = [100.0, 50.0];
        let before = s.invert(anchor[0], anchor[1]);
        assert!(s.zoom_at(2.0, anchor));
        let after = s.invert(anchor[0], anchor[1]);
        assert!((before[0] - after[0]).abs() < 1e-9);
        assert!((before[1] - after[1]).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped_to_extent() {
        let mut s = scales();
        s.zoom_at(1000.0, [0.0, 0.0]);
        assert_eq!(s.zoom().k, 32.0);
        assert!(!s.zoom_at(2.0, [0.0, 0.0]));
        s.zoom_at(1e-6, [0.0, 0.0]);
        assert!((s.zoom().k - 0.2).abs() < 1e-12);
    }

    #[test]
    fn ticks_follow_one_two_five() {
        let scale = LinearScale::new([-2.0, 2.0], [0.0, 400.0]);
        let ticks = scale.ticks(10);
        assert_eq!(ticks.first().copied(), Some(-2.0));
        assert_eq!(ticks.last().copied(), Some(2.0));
        assert!((ticks[1] - ticks[0] - 0.5).abs() < 1e-12);
        let ys = scale.ticks(5);
        assert_eq!(ys, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn tick_grid_spans_view() {
        let s = scales();
        let xt = s.x_ticks();
        assert!(!xt.is_empty());
        assert!(xt.iter().all(|t| t.grid_len == 200.0));
        let yt = s.y_ticks();
        assert!(yt.iter().all(|t| t.grid_len == 400.0));
        assert!(yt.iter().any(|t| t.label == "0"));
    }
}
