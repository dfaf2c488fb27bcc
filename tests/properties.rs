use colorscatter::data::color_scale::{point_radius, ColorMapping, ContinuousStats, PaletteKind};
use colorscatter::{Point, ScatterConfig, ScatterController, ScatterData};
use proptest::prelude::*;

fn controller(n: usize) -> ScatterController {
    let points = (0..n)
        .map(|i| Point::new(i as f64 * 0.1, 0.0, i as f64, format!("p{i}")))
        .collect();
    let v = ScatterController::new("prop", ScatterConfig::default(), 400.0, 400.0);
    v.set_data(ScatterData::new(points), false);
    v
}

/// `k` distinct keys mixing numbers, number-led labels and plain labels.
fn mixed_keys(k: usize) -> Vec<String> {
    (0..k)
        .map(|i| match i % 3 {
            0 => (i * 7).to_string(),
            1 => format!("{i}x"),
            _ => format!("c{i}"),
        })
        .collect()
}

fn categorical(keys: &[String]) -> ScatterController {
    let points = keys
        .iter()
        .enumerate()
        .map(|(i, key)| Point::new(i as f64 * 0.01, 0.0, key.as_str(), format!("p{i}")))
        .collect();
    let v = ScatterController::new("cat", ScatterConfig::with_keys(), 400.0, 400.0);
    v.set_data(ScatterData::new(points), true);
    v
}

proptest! {
    #[test]
    fn categorical_palette_and_legend_follow_key_count(
        (keys, shuffled) in (1usize..40).prop_flat_map(|k| {
            let keys = mixed_keys(k);
            (Just(keys.clone()), Just(keys).prop_shuffle())
        })
    ) {
        let k = keys.len();
        let a = categorical(&keys);
        let b = categorical(&shuffled);
        let (mapping, swatches) = a.with_view(|s| (s.mapping().clone(), s.legend().swatch_count()));
        let expected = if k <= 10 { PaletteKind::Category10 } else { PaletteKind::Category20 };
        let ColorMapping::Categorical { palette, domain } = &mapping else {
            panic!("expected a categorical mapping");
        };
        prop_assert_eq!(*palette, expected);
        prop_assert_eq!(domain.len(), k);
        prop_assert_eq!(swatches, k);
        // Same key set, same assignment, whatever the input order.
        prop_assert_eq!(b.with_view(|s| s.mapping().clone()), mapping);
    }

    #[test]
    fn radius_is_bounded_and_non_increasing(n in 1usize..100_000, step in 1usize..1000) {
        let r = point_radius(n);
        prop_assert!((2.0..=5.0).contains(&r));
        prop_assert!(point_radius(n + step) <= r);
    }

    #[test]
    fn toggling_twice_restores_selection(picks in prop::collection::vec(0usize..8, 0..20)) {
        let v = controller(8);
        for &i in picks.iter().chain(picks.iter()) {
            v.set_selected(i, None).unwrap();
        }
        prop_assert!(v.get_selected_ids().is_empty());
        v.with_view(|s| assert!(s.opacities().iter().all(|o| *o == 1.0)));
    }

    #[test]
    fn zoom_stays_within_extent(
        factors in prop::collection::vec(0.01f64..50.0, 1..30),
        x in 0f32..400.0,
        y in 0f32..400.0,
    ) {
        let v = controller(3);
        for f in factors {
            v.zoom_at(f, [x, y]);
        }
        let k = v.with_view(|s| s.scales().zoom().k);
        let [lo, hi] = ScatterConfig::default().scale_extent;
        prop_assert!(k >= lo && k <= hi);
    }

    #[test]
    fn quantiles_are_ordered(mut values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let stats = ContinuousStats::from_values(&mut values).unwrap();
        prop_assert!(stats.low <= stats.high);
        prop_assert!(stats.low >= min - 1e-6 && stats.high <= max + 1e-6);
        prop_assert!(stats.mid >= min - 1e-6 && stats.mid <= max + 1e-6);
    }
}
