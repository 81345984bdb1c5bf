//! Property-based tests for the normalization pipeline.

use meteo_normalizer::models::{
    batch_to_rows, float_column, rows_to_batch, Feature, FeatureStat, FeatureStatistics, RawRow,
};
use meteo_normalizer::{inverse_normalize, normalize};
use proptest::prelude::*;

fn statistics() -> FeatureStatistics {
    FeatureStatistics::new()
        .with(Feature::Tavg, FeatureStat::new(9.4, 6.1))
        .with(Feature::Tmin, FeatureStat::new(5.2, 5.7))
        .with(Feature::Tmax, FeatureStat::new(13.8, 6.9))
        .with(Feature::Snow, FeatureStat::mean_only(3.1))
        .with(Feature::Wspd, FeatureStat::new(14.6, 7.3))
        .with(Feature::Pres, FeatureStat::new(1014.2, 8.8))
}

/// Strategy for rows inside physical limits.
fn raw_row_strategy() -> impl Strategy<Value = RawRow> {
    (
        (-40.0..45.0_f64, -45.0..40.0_f64, -35.0..50.0_f64),
        (0.0..300.0_f64, 0.0..2000.0_f64, 0.0..360.0_f64),
        (0.0..150.0_f64, 950.0..1060.0_f64),
    )
        .prop_map(|((tavg, tmin, tmax), (prcp, snow, wdir), (wspd, pres))| {
            RawRow::new(tavg, tmin, tmax, prcp, snow, wdir, wspd, pres)
        })
}

fn close(got: f64, want: f64) -> bool {
    (got - want).abs() <= 1e-9 * want.abs().max(1.0)
}

proptest! {
    #[test]
    fn prop_round_trip_restores_values(rows in prop::collection::vec(raw_row_strategy(), 1..40)) {
        let stats = statistics();
        let batch = rows_to_batch(&rows).unwrap();
        let restored = inverse_normalize(&normalize(&batch, &stats).unwrap(), &stats).unwrap();
        let restored: Vec<RawRow> = batch_to_rows(&restored).unwrap();

        for (got, want) in restored.iter().zip(&rows) {
            prop_assert!(close(got.tavg, want.tavg));
            prop_assert!(close(got.tmin, want.tmin));
            prop_assert!(close(got.tmax, want.tmax));
            prop_assert!(close(got.prcp, want.prcp));
            prop_assert!(close(got.snow, want.snow));
            prop_assert!(close(got.wspd, want.wspd));
            prop_assert!(close(got.pres, want.pres));

            // 359.9999999999 may come back as 0, which is the same bearing
            let diff = (got.wdir - want.wdir).abs();
            prop_assert!(diff <= 1e-9 || (360.0 - diff) <= 1e-9, "{} vs {}", got.wdir, want.wdir);
            prop_assert!((0.0..360.0).contains(&got.wdir));
        }
    }

    #[test]
    fn prop_precipitation_order_is_preserved(a in 0.0..500.0_f64, b in 0.0..500.0_f64) {
        let rows = vec![
            RawRow::new(10.0, 5.0, 15.0, a, 0.0, 90.0, 10.0, 1010.0),
            RawRow::new(10.0, 5.0, 15.0, b, 0.0, 90.0, 10.0, 1010.0),
        ];
        let out = normalize(&rows_to_batch(&rows).unwrap(), &statistics()).unwrap();
        let prcp = float_column(&out, "prcp").unwrap();

        // Below this gap the two outputs may round to the same float
        if (b - a).abs() > 1e-9 {
            prop_assert_eq!(a < b, prcp.value(0) < prcp.value(1));
        } else {
            prop_assert!((prcp.value(0) - prcp.value(1)).abs() <= (b - a).abs() + 1e-15);
        }
        prop_assert!(prcp.value(0) >= 0.0);
    }

    #[test]
    fn prop_wind_direction_wraps_by_full_turns(deg in 0.0..360.0_f64, turns in -3i32..4) {
        let stats = statistics();
        let shifted = deg + 360.0 * turns as f64;
        let rows = vec![
            RawRow::new(10.0, 5.0, 15.0, 0.0, 0.0, deg, 10.0, 1010.0),
            RawRow::new(10.0, 5.0, 15.0, 0.0, 0.0, shifted, 10.0, 1010.0),
        ];
        let out = normalize(&rows_to_batch(&rows).unwrap(), &stats).unwrap();

        let sin = float_column(&out, "sin_wdir").unwrap();
        let cos = float_column(&out, "cos_wdir").unwrap();
        prop_assert!((sin.value(0) - sin.value(1)).abs() < 1e-9);
        prop_assert!((cos.value(0) - cos.value(1)).abs() < 1e-9);
        prop_assert!((sin.value(0).powi(2) + cos.value(0).powi(2) - 1.0).abs() < 1e-12);
    }
}
