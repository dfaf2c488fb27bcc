use colorscatter::panels::*;
use colorscatter::{ScatterConfig, ScatterController};

fn panel(title: &str) -> ScatterPanel {
    let ctrl = ScatterController::new(title, ScatterConfig::default(), 300.0, 200.0);
    ScatterPanel::new(title, ctrl)
}

fn visible_names(panels: &[ScatterPanel]) -> Vec<&str> {
    panels
        .iter()
        .filter(|p| p.state().visible)
        .map(|p| p.name())
        .collect()
}

#[test]
fn new_panel_is_visible() {
    let p = panel("Score");
    assert_eq!(p.name(), "Score");
    assert!(p.state().visible);
    assert_eq!(p.controller().name(), "Score");
}

#[test]
fn state_mut_hides_panel() {
    let mut panels = vec![panel("Score"), panel("Cluster")];
    panels[0].state_mut().visible = false;
    assert_eq!(visible_names(&panels), vec!["Cluster"]);
    panels[1].state_mut().visible = false;
    assert!(visible_names(&panels).is_empty());
    panels[0].state_mut().visible = true;
    assert_eq!(visible_names(&panels), vec!["Score"]);
}
