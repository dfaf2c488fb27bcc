//! Point, tree-node and tree-edge data supplied by the orchestration layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable cross-view identity of a point (e.g. a sample name).
///
/// Point positions in the data vector are ephemeral; every join between views
/// goes through this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub String);

impl PointId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId(s.to_string())
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        PointId(s)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The color-driving value of a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Number(f64),
    Label(String),
}

impl PointValue {
    /// Numeric view of the value. Labels that parse as numbers count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PointValue::Number(v) if !v.is_nan() => Some(*v),
            PointValue::Number(_) => None,
            PointValue::Label(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        }
    }

    /// Key used for categorical grouping.
    pub fn category_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointValue::Number(v) => write!(f, "{}", v),
            PointValue::Label(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PointValue {
    fn from(v: f64) -> Self {
        PointValue::Number(v)
    }
}

impl From<&str> for PointValue {
    fn from(s: &str) -> Self {
        PointValue::Label(s.to_string())
    }
}

/// One plotted observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub value: PointValue,
    pub id: PointId,
}

impl Point {
    pub fn new(x: f64, y: f64, value: impl Into<PointValue>, id: impl Into<PointId>) -> Self {
        Self {
            x,
            y,
            value: value.into(),
            id: id.into(),
        }
    }

    /// Tooltip text shown while the point is hovered.
    pub fn tooltip(&self) -> String {
        format!("{}: {}", self.id, self.value)
    }
}

/// A node of the overlay tree (e.g. a cluster centroid), indexed by position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreePoint {
    pub x: f64,
    pub y: f64,
}

/// An overlay edge between two [`TreePoint`] positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEdge {
    pub from: usize,
    pub to: usize,
}

/// Everything one `set_data` call replaces.
#[derive(Debug, Clone, Default)]
pub struct ScatterData {
    pub points: Vec<Point>,
    pub tree_points: Vec<TreePoint>,
    pub tree_edges: Vec<TreeEdge>,
}

impl ScatterData {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    pub fn with_tree(mut self, tree_points: Vec<TreePoint>, tree_edges: Vec<TreeEdge>) -> Self {
        self.tree_points = tree_points;
        self.tree_edges = tree_edges;
        self
    }

    /// Position of the first point carrying `id`.
    pub fn index_of(&self, id: &PointId) -> Option<usize> {
        self.points.iter().position(|p| &p.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<&PointId> {
        self.points.get(index).map(|p| &p.id)
    }

    /// All positions whose id is in `ids`.
    pub fn indices_of<'a, I>(&self, ids: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a PointId>,
    {
        let wanted: std::collections::HashSet<&PointId> = ids.into_iter().collect();
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| wanted.contains(&p.id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Endpoints of an edge, resolved against the current node positions.
    pub fn edge_endpoints(&self, edge: &TreeEdge) -> Option<(TreePoint, TreePoint)> {
        Some((*self.tree_points.get(edge.from)?, *self.tree_points.get(edge.to)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_view_of_values() {
        assert_eq!(PointValue::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(PointValue::from(" 7 ").as_f64(), Some(7.0));
        assert_eq!(PointValue::from("cluster1").as_f64(), None);
        assert_eq!(PointValue::Number(f64::NAN).as_f64(), None);
    }

    #[test]
    fn tooltip_uses_id_and_value() {
        let p = Point::new(0.0, 0.0, 5.0, "b");
        assert_eq!(p.tooltip(), "b: 5");
        let q = Point::new(0.0, 0.0, "T cell", "c");
        assert_eq!(q.tooltip(), "c: T cell");
    }

    #[test]
    fn id_lookups() {
        let data = ScatterData::new(vec![
            Point::new(0.0, 0.0, 1.0, "a"),
            Point::new(1.0, 1.0, 5.0, "b"),
            Point::new(2.0, 2.0, 9.0, "c"),
        ]);
        assert_eq!(data.index_of(&"b".into()), Some(1));
        assert_eq!(data.index_of(&"zz".into()), None);
        let ids: Vec<PointId> = vec!["c".into(), "a".into()];
        assert_eq!(data.indices_of(&ids), vec![0, 2]);
    }

    #[test]
    fn edge_with_missing_node_has_no_endpoints() {
        let data = ScatterData::default().with_tree(
            vec![TreePoint { x: 0.0, y: 0.0 }, TreePoint { x: 1.0, y: 1.0 }],
            vec![TreeEdge { from: 0, to: 1 }, TreeEdge { from: 1, to: 4 }],
        );
        assert!(data.edge_endpoints(&data.tree_edges[0]).is_some());
        assert!(data.edge_endpoints(&data.tree_edges[1]).is_none());
    }
}
