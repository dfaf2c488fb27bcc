//! Demo: two linked scatter views
//!
//! What it demonstrates
//! - One data set shown twice: colored by a continuous score and by cluster.
//! - Selection and hover linked in both directions; a click in either view
//!   toggles the point in both.
//! - Lasso selection (toggle "Lasso" in a panel's toolbar).
//! - Subscribing to selection events from a background thread.
//!
//! How to run
//! ```bash
//! cargo run --example linked_views
//! ```

use colorscatter::{
    init_logging, run_dashboard, DashboardApp, DashboardStatus, DashboardStore, EventFilter,
    EventKind, Point, ScatterConfig, ScatterController, ScatterData, ScatterPanel, TreeEdge,
    TreePoint,
};

const CLUSTERS: usize = 4;
const PER_CLUSTER: usize = 60;

fn points(label_by_cluster: bool) -> Vec<Point> {
    let mut out = Vec::with_capacity(CLUSTERS * PER_CLUSTER);
    for c in 0..CLUSTERS {
        let angle = c as f64 * std::f64::consts::TAU / CLUSTERS as f64;
        let (cx, cy) = (angle.cos(), angle.sin());
        for i in 0..PER_CLUSTER {
            let t = i as f64 * 2.399963;
            let r = 0.35 * (i as f64 / PER_CLUSTER as f64).sqrt();
            let x = cx + r * t.cos();
            let y = cy + r * t.sin();
            let id = format!("cell{}", c * PER_CLUSTER + i);
            let p = if label_by_cluster {
                Point::new(x, y, format!("cluster{c}").as_str(), id)
            } else {
                Point::new(x, y, x * y + 0.1 * c as f64, id)
            };
            out.push(p);
        }
    }
    out
}

fn main() -> eframe::Result<()> {
    init_logging(None);

    let score = ScatterController::new("score", ScatterConfig::with_keys(), 400.0, 400.0);
    let cluster = ScatterController::new("cluster", ScatterConfig::with_keys(), 400.0, 400.0);

    let tree_points = (0..CLUSTERS)
        .map(|c| {
            let angle = c as f64 * std::f64::consts::TAU / CLUSTERS as f64;
            TreePoint {
                x: 0.5 * angle.cos(),
                y: 0.5 * angle.sin(),
            }
        })
        .chain(std::iter::once(TreePoint { x: 0.0, y: 0.0 }))
        .collect::<Vec<_>>();
    let tree_edges = (0..CLUSTERS)
        .map(|c| TreeEdge { from: CLUSTERS, to: c })
        .collect::<Vec<_>>();

    score.set_data(ScatterData::new(points(false)), false);
    cluster.set_data(
        ScatterData::new(points(true)).with_tree(tree_points, tree_edges),
        true,
    );

    score.add_selection_link(&cluster);
    cluster.add_selection_link(&score);
    score.add_hover_link(&cluster);
    cluster.add_hover_link(&score);

    let rx = score
        .events()
        .subscribe(EventFilter::only(EventKind::SELECT | EventKind::LASSO_COMPLETED));
    std::thread::spawn(move || {
        while let Ok(evt) = rx.recv() {
            let ids: Vec<&str> = evt.ids.iter().map(|id| id.as_str()).collect();
            println!("[{}] token={:?} ids={ids:?}", evt.kinds, evt.token);
        }
    });

    let app = DashboardApp::new(vec![
        ScatterPanel::new("Score", score),
        ScatterPanel::new("Cluster", cluster),
    ])
    .with_store(DashboardStore::new(DashboardStatus::default()));

    run_dashboard(app, Some("ColorScatter linked views"), None)
}
