use colorscatter::store::{
    ConsumerGroup, DashboardStatus, DashboardStore, DataRequest, MainView, PlottedItemKind,
    StatusKeys, StatusPatch,
};

#[test]
fn projection_change_in_tree_view() {
    let mut store = DashboardStore::new(DashboardStatus {
        main_view: MainView::Tree,
        ..Default::default()
    });
    let rx: Vec<_> = ConsumerGroup::ALL.iter().map(|g| store.subscribe(*g)).collect();

    let (change, plan) = store
        .update(StatusPatch {
            plotted_projection: Some("UMAP".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(change.changed(StatusKeys::PLOTTED_PROJECTION));

    let expected = DataRequest::TreeCoordinates {
        filter_group: "fano".into(),
        projection: "UMAP".into(),
    };
    assert_eq!(plan.requests(), &[expected.clone()]);
    assert_eq!(plan.waits_for(ConsumerGroup::Right), vec![&expected]);
    assert_eq!(plan.waits_for(ConsumerGroup::UpperLeft), vec![&expected]);
    assert!(plan.waits_for(ConsumerGroup::LowerLeft).is_empty());

    store.notify(&change);
    for r in &rx {
        let got: Vec<_> = r.try_iter().collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].status.plotted_projection, "UMAP");
    }
}

#[test]
fn signature_item_fetches_scores_and_info_once() {
    let mut store = DashboardStore::default();
    let (_, plan) = store
        .update(StatusPatch::item("CD8", PlottedItemKind::Signature))
        .unwrap();
    assert_eq!(
        plan.requests(),
        &[
            DataRequest::SignatureScores { name: "CD8".into() },
            DataRequest::SignatureInfo { name: "CD8".into() },
        ]
    );
    store.record_signature_info("CD8");

    // Switching to a gene and back reuses the cached info.
    store
        .update(StatusPatch::item("GZMB", PlottedItemKind::Gene))
        .unwrap();
    let (_, plan) = store
        .update(StatusPatch::item("CD8", PlottedItemKind::Signature))
        .unwrap();
    assert_eq!(plan.requests(), &[DataRequest::SignatureScores { name: "CD8".into() }]);
}

#[test]
fn unchanged_patch_is_not_recorded() {
    let mut store = DashboardStore::default();
    let (change, plan) = store
        .update(StatusPatch {
            filter_group: Some("fano".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(change.is_empty());
    assert!(plan.is_empty());
    assert_eq!(store.history_len(), 0);
}

#[test]
fn back_restores_previous_status() {
    let mut store = DashboardStore::default();
    store
        .update(StatusPatch {
            main_view: Some(MainView::PcAnnotator),
            ..Default::default()
        })
        .unwrap();
    store
        .update(StatusPatch {
            plotted_pc: Some("PC 3".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(store.history_len(), 2);

    let change = store.go_back().unwrap();
    assert!(change.changed(StatusKeys::PLOTTED_PC));
    assert_eq!(store.status().plotted_pc, "");
    assert_eq!(store.status().main_view, MainView::PcAnnotator);

    store.go_back().unwrap();
    assert_eq!(store.status(), &DashboardStatus::default());
    assert!(store.go_back().is_none());
}
