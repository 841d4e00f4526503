use chrono::{DateTime, Duration, TimeZone, Utc};

use markers::filter::base_angles_deg;
use markers::{
    aggregate_extrema, aggregate_extrema_angle, features_to_markers, filter_by_drop,
    filter_by_duration, filter_events_based_on_angle, flatten, get_extrema_features,
    get_peak_features, FeatureTriple, MarkerType, Sample,
};

fn at(idx: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap() + Duration::days(idx)
}

fn sample(idx: i64, value: f64) -> Sample {
    Sample::new(at(idx), value)
}

fn series(values: &[f64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| sample(i as i64, *v))
        .collect()
}

fn noisy_series(seed: u64, len: usize) -> Vec<Sample> {
    let mut state = seed;
    let values: Vec<f64> = (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 1000) as f64 / 1000.0
        })
        .collect();
    series(&values)
}

#[test]
fn feature_sequence_is_made_of_ordered_triples() {
    for seed in 1..20u64 {
        let s = noisy_series(seed, 60);
        for max_number in [1usize, 3, 7, 100] {
            for sorted in [true, false] {
                let features = get_extrema_features(&s, max_number, None, None, sorted);
                let flat = flatten(&features);
                assert_eq!(flat.len() % 3, 0);
                assert_eq!(flat.len(), features.len() * 3);
                assert!(features.len() <= max_number);
                assert!(
                    flat.windows(2).all(|p| p[0].date <= p[1].date),
                    "dates must not decrease (seed {seed}, n {max_number})"
                );
            }
        }
    }
}

#[test]
fn bounding_maxima_may_lie_outside_the_window() {
    let s = series(&[0.5, 0.9, 0.2, 0.8, 0.1, 0.7, 0.6]);
    let features = get_extrema_features(&s, 5, Some(at(4)), Some(at(6)), true);
    assert_eq!(features.len(), 1);
    assert_eq!(features[0], FeatureTriple::new(s[3], s[4], s[5]));

    let all = get_extrema_features(&s, 5, None, None, true);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], FeatureTriple::new(s[1], s[2], s[3]));
}

#[test]
fn peak_features_reuse_the_minimum_path() {
    let s = series(&[0.5, 0.9, 0.2, 0.8, 0.1]);
    let features = get_peak_features(&s, 5, None, None, true);
    assert_eq!(
        features,
        vec![
            FeatureTriple::new(s[0], s[1], s[2]),
            FeatureTriple::new(s[2], s[3], s[4]),
        ]
    );
}

fn split_event(separator: f64) -> Vec<FeatureTriple> {
    vec![
        FeatureTriple::new(sample(0, 1.0), sample(2, 0.2), sample(4, separator)),
        FeatureTriple::new(sample(4, separator), sample(6, 0.3), sample(8, 1.0)),
    ]
}

#[test]
fn value_aggregation_joins_shallow_splits() {
    let features = split_event(0.5);

    let merged = aggregate_extrema(&features, 0.25, false);
    assert_eq!(
        merged,
        vec![FeatureTriple::new(sample(0, 1.0), sample(2, 0.2), sample(8, 1.0))]
    );

    let kept = aggregate_extrema(&features, 0.1, false);
    assert_eq!(kept, features);
}

#[test]
fn value_aggregation_percentage_scales_with_event_height() {
    let features = split_event(0.5);
    assert_eq!(aggregate_extrema(&features, 0.3, true).len(), 1);
    assert_eq!(aggregate_extrema(&features, 0.2, true).len(), 2);
}

#[test]
fn value_aggregation_ignores_triples_without_shared_bound() {
    let features = vec![
        FeatureTriple::new(sample(0, 1.0), sample(2, 0.2), sample(4, 0.5)),
        FeatureTriple::new(sample(5, 0.5), sample(6, 0.3), sample(8, 1.0)),
    ];
    assert_eq!(aggregate_extrema(&features, 10.0, false), features);
    assert!(aggregate_extrema(&[], 1.0, false).is_empty());
}

#[test]
fn angle_aggregation_joins_flat_bends_only() {
    let shallow = split_event(0.5);
    let merged = aggregate_extrema_angle(&shallow, 135.0);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].left, shallow[0].left);
    assert_eq!(merged[0].right, shallow[1].right);

    let tall = split_event(1.0);
    assert_eq!(aggregate_extrema_angle(&tall, 135.0), tall);
}

#[test]
fn angle_aggregation_needs_two_events() {
    let single = vec![FeatureTriple::new(sample(0, 1.0), sample(2, 0.2), sample(4, 0.9))];
    assert_eq!(aggregate_extrema_angle(&single, 135.0), single);
}

#[test]
fn duration_and_drop_filters() {
    let features = vec![
        FeatureTriple::new(sample(0, 1.0), sample(2, 0.5), sample(4, 0.9)),
        FeatureTriple::new(sample(4, 0.9), sample(10, 0.1), sample(16, 1.0)),
    ];

    let long = filter_by_duration(&features, 5.0);
    assert_eq!(long, vec![features[1]]);

    let deep = filter_by_drop(&features, 0.6);
    assert_eq!(deep, vec![features[1]]);

    assert!(filter_by_drop(&features, 2.0).is_empty());
    assert_eq!(filter_by_duration(&features, 4.0), features);
}

#[test]
fn angle_filter_drops_lopsided_events() {
    let symmetric = FeatureTriple::new(sample(0, 1.0), sample(5, 0.0), sample(10, 1.0));
    let lopsided = FeatureTriple::new(sample(0, 1.0), sample(1, 0.0), sample(10, 0.2));

    let (left, right) = base_angles_deg(&lopsided).expect("non degenerate");
    assert!(left < 60.0 && right < 60.0);

    let kept = filter_events_based_on_angle(&[symmetric, lopsided], 60.0);
    assert_eq!(kept, vec![symmetric]);
    assert!(filter_events_based_on_angle(&[symmetric], 70.0).is_empty());
}

#[test]
fn triples_convert_one_to_one_into_markers() {
    let features = split_event(0.5);
    let markers = features_to_markers(&features, &MarkerType::Drop);

    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].start_date, at(0));
    assert_eq!(markers[0].main_date, at(2));
    assert_eq!(markers[0].stop_date, at(4));
    assert_eq!(markers[0].values, [1.0, 0.2, 0.5]);
    assert_eq!(markers[1].marker_type, MarkerType::Drop);
}
