use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use colorscatter::data::legend::LegendModel;
use colorscatter::data::selection::HoverClass;
use colorscatter::{
    EventFilter, EventKind, GestureOwner, GroupLookup, HoverTarget, LinkedView, Point, PointId,
    ScatterConfig, ScatterController, ScatterData, SyncToken,
};

fn three_points() -> ScatterData {
    ScatterData::new(vec![
        Point::new(0.0, 0.0, 1.0, "a"),
        Point::new(1.0, 1.0, 5.0, "b"),
        Point::new(2.0, 2.0, 9.0, "c"),
    ])
}

fn view(name: &str) -> ScatterController {
    let v = ScatterController::new(name, ScatterConfig::with_keys(), 400.0, 400.0);
    v.set_data(three_points(), false);
    v
}

fn ids(names: &[&str]) -> Vec<PointId> {
    names.iter().map(|n| PointId::from(*n)).collect()
}

// Records every call it receives.
#[derive(Default)]
struct Recorder {
    selects: Mutex<Vec<(PointId, SyncToken)>>,
    hovers: Mutex<Vec<(HoverTarget, SyncToken)>>,
}

impl LinkedView for Recorder {
    fn linked_select(&self, id: &PointId, token: SyncToken) {
        self.selects.lock().unwrap().push((id.clone(), token));
    }

    fn linked_hover(&self, target: &HoverTarget, token: SyncToken) {
        self.hovers.lock().unwrap().push((target.clone(), token));
    }
}

#[test]
fn cyclic_link_updates_each_view_once() {
    let a = view("a");
    let b = view("b");
    a.add_selection_link(&b);
    b.add_selection_link(&a);

    let rx_b = b.events().subscribe(EventFilter::only(EventKind::SELECT));
    let rev_a = a.with_view(|v| v.opacity_revision());
    let rev_b = b.with_view(|v| v.opacity_revision());

    a.set_selected(1, None).unwrap();

    assert_eq!(a.get_selected_ids(), ids(&["b"]));
    assert_eq!(b.get_selected_ids(), ids(&["b"]));
    assert_eq!(a.with_view(|v| v.opacity_revision()), rev_a + 1);
    assert_eq!(b.with_view(|v| v.opacity_revision()), rev_b + 1);
    assert_eq!(rx_b.try_iter().count(), 1);

    // Toggling again from the other side deselects in both.
    b.set_selected(1, None).unwrap();
    assert!(a.get_selected_ids().is_empty());
    assert!(b.get_selected_ids().is_empty());
}

#[test]
fn diamond_reaches_the_sink_once() {
    let a = view("a");
    let b = view("b");
    let c = view("c");
    let d = view("d");
    a.add_selection_link(&b);
    a.add_selection_link(&c);
    b.add_selection_link(&d);
    c.add_selection_link(&d);

    let sink = Arc::new(Recorder::default());
    d.add_selection_link_view(sink.clone());

    a.set_selected(2, None).unwrap();

    for v in [&a, &b, &c, &d] {
        assert_eq!(v.get_selected_ids(), ids(&["c"]), "view {}", v.name());
    }
    let calls = sink.selects.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PointId::from("c"));
}

#[test]
fn forwarded_token_is_the_originating_one() {
    let a = view("a");
    let sink = Arc::new(Recorder::default());
    a.add_selection_link_view(sink.clone());
    a.add_hover_link_view(sink.clone());

    let token = SyncToken::fresh();
    a.set_selected(0, Some(token)).unwrap();
    a.set_hovered(&[1], Some(SyncToken::fresh())).unwrap();

    let selects = sink.selects.lock().unwrap();
    assert_eq!(selects.as_slice(), &[(PointId::from("a"), token)]);
    let hovers = sink.hovers.lock().unwrap();
    assert_eq!(hovers.len(), 1);
    assert_eq!(hovers[0].0, HoverTarget::Ids(ids(&["b"])));
}

#[test]
fn unknown_id_is_forwarded_but_not_selected() {
    let a = view("a");
    let b = ScatterController::new("b", ScatterConfig::default(), 400.0, 400.0);
    b.set_data(ScatterData::new(vec![Point::new(0.0, 0.0, 1.0, "z")]), false);
    let c = view("c");
    a.add_selection_link(&b);
    b.add_selection_link(&c);

    a.set_selected(0, None).unwrap();

    assert!(b.get_selected_ids().is_empty());
    assert_eq!(c.get_selected_ids(), ids(&["a"]));
}

#[test]
fn dropped_linked_view_is_skipped() {
    let a = view("a");
    {
        let b = view("b");
        a.add_selection_link(&b);
    }
    a.set_selected(0, None).unwrap();
    assert_eq!(a.get_selected_ids(), ids(&["a"]));
}

#[test]
fn hover_propagates_and_clears() {
    let a = view("a");
    let b = view("b");
    a.add_hover_link(&b);
    b.add_hover_link(&a);

    a.hover_point(0).unwrap();
    b.with_view(|v| {
        assert_eq!(v.hover().hovered(), &[0]);
        assert_eq!(v.hover().class_of(1), HoverClass::Faded);
        // Only the originating view shows a tooltip.
        assert!(v.tooltip().is_none());
    });

    a.unhover_point();
    b.with_view(|v| assert!(!v.hover().is_active()));
}

#[test]
fn group_hover_highlights_members_only() {
    let a = view("a");
    let b = view("b");
    a.add_hover_link(&b);

    let groups: GroupLookup = HashMap::from([
        (PointId::from("a"), "cluster1".to_string()),
        (PointId::from("b"), "cluster2".to_string()),
    ]);
    a.set_hovered_by_group(Some("cluster1"), &groups, None);

    for v in [&a, &b] {
        v.with_view(|s| {
            assert_eq!(s.hover().class_of(0), HoverClass::Hovered);
            assert_eq!(s.hover().class_of(1), HoverClass::Faded);
            assert_eq!(s.hover().class_of(2), HoverClass::Faded);
        });
    }

    a.set_hovered_by_group(None, &groups, None);
    b.with_view(|s| assert_eq!(s.hover().class_of(1), HoverClass::Normal));
}

#[test]
fn load_builds_gradient_legend() {
    let v = view("legend");
    v.with_view(|s| {
        let LegendModel::Gradient(bar) = s.legend() else {
            panic!("expected a colorbar, got {:?}", s.legend());
        };
        assert_eq!(bar.stops.len(), 3);
        assert_eq!(bar.low.text, "1.16");
        assert_eq!(bar.high.text, "8.84");
        assert_eq!(s.radius(), 5.0);
    });
}

#[test]
fn range_selection_and_clear() {
    let v = view("range");
    assert_eq!(v.select_range(2.0, 9.0), ids(&["b", "c"]));
    assert_eq!(v.get_selected_ids(), ids(&["b", "c"]));
    v.with_view(|s| assert_eq!(s.opacities(), &[0.4, 1.0, 1.0]));
    v.clear_selection();
    assert!(v.get_selected_ids().is_empty());
}

#[test]
fn selection_survives_reload() {
    let v = view("reload");
    v.set_selected(2, None).unwrap();
    v.set_data(
        ScatterData::new(vec![
            Point::new(0.5, 0.5, 2.0, "c"),
            Point::new(1.5, 1.5, 3.0, "d"),
        ]),
        false,
    );
    assert_eq!(v.get_selected_ids(), ids(&["c"]));
    v.with_view(|s| assert_eq!(s.opacities(), &[1.0, 0.4]));
}

#[test]
fn lasso_and_pan_zoom_are_exclusive() {
    let v = view("lasso");
    let rx = v
        .events()
        .subscribe(EventFilter::only(EventKind::LASSO_ENABLED | EventKind::LASSO_DISABLED));

    assert_eq!(v.gesture_owner(), GestureOwner::PanZoom);
    assert!(v.enable_lasso_mode(true));
    assert!(!v.enable_lasso_mode(true));
    assert_eq!(v.gesture_owner(), GestureOwner::Lasso);
    assert!(!v.zoom_at(2.0, [10.0, 10.0]));

    // Disabling mid-drag discards the drag.
    assert!(v.lasso_pointer_down([150.0, 250.0]));
    v.lasso_pointer_move([350.0, 250.0]);
    assert!(v.enable_lasso_mode(false));
    assert!(v.lasso_pointer_up().is_empty());
    assert!(v.get_selected_ids().is_empty());
    assert!(v.zoom_at(2.0, [10.0, 10.0]));

    let kinds: Vec<EventKind> = rx.try_iter().map(|e| e.kinds).collect();
    assert_eq!(kinds, vec![EventKind::LASSO_ENABLED, EventKind::LASSO_DISABLED]);
}
