use chrono::{DateTime, TimeZone, Utc};

use markers::{
    aggregate, confirm, merge, ActionKind, AggregatorAction, DataError, Marker, MarkerAggregator,
    MarkerMap, MarkerType,
};

fn day(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, month, day, 0, 0, 0).unwrap()
}

fn span(
    kind: MarkerType,
    start: DateTime<Utc>,
    main: DateTime<Utc>,
    stop: DateTime<Utc>,
) -> Marker {
    Marker::new(start, main, stop, [0.8, 0.4, 0.8], kind).expect("valid span")
}

fn drop(start: DateTime<Utc>, main: DateTime<Utc>, stop: DateTime<Utc>) -> Marker {
    span(MarkerType::Drop, start, main, stop)
}

fn peak(start: DateTime<Utc>, main: DateTime<Utc>, stop: DateTime<Utc>) -> Marker {
    span(MarkerType::Peak, start, main, stop)
}

fn bounds(markers: &[Marker]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    markers.iter().map(|x| (x.start_date, x.stop_date)).collect()
}

#[test]
fn merge_splits_container_around_inner_marker() {
    let outer = drop(day(1, 1), day(1, 6), day(1, 10));
    let inner = peak(day(1, 5), day(1, 6), day(1, 8));

    let merged = merge(&[outer], &[inner.clone()]).expect("valid trims");
    assert_eq!(
        bounds(&merged),
        vec![
            (day(1, 1), day(1, 5)),
            (day(1, 5), day(1, 8)),
            (day(1, 8), day(1, 10)),
        ]
    );
    assert_eq!(merged[0].main_date, day(1, 3));
    assert_eq!(merged[1], inner);
    assert_eq!(merged[2].main_date, day(1, 9));
    assert!(merged.windows(2).all(|p| p[0].precedes(&p[1])));
}

#[test]
fn merge_keeps_disjoint_markers_untouched() {
    let a = drop(day(1, 1), day(1, 3), day(1, 5));
    let b = peak(day(2, 1), day(2, 3), day(2, 5));

    let merged = merge(&[a.clone()], &[b.clone()]).expect("valid trims");
    assert_eq!(merged, vec![a.clone(), b.clone()]);

    let merged = merge(&[b.clone()], &[a.clone()]).expect("valid trims");
    assert_eq!(merged, vec![a, b]);
}

#[test]
fn merge_drops_covered_markers_and_trims_partial_ones() {
    let covered = drop(day(1, 5), day(1, 6), day(1, 8));
    let cover = peak(day(1, 1), day(1, 5), day(1, 10));
    assert_eq!(merge(&[covered], &[cover.clone()]).expect("valid trims"), vec![cover]);

    let first = vec![
        drop(day(1, 1), day(1, 4), day(1, 8)),
        drop(day(1, 12), day(1, 15), day(1, 20)),
    ];
    let second = vec![peak(day(1, 6), day(1, 10), day(1, 14))];
    let merged = merge(&first, &second).expect("valid trims");
    assert_eq!(
        bounds(&merged),
        vec![
            (day(1, 1), day(1, 6)),
            (day(1, 6), day(1, 14)),
            (day(1, 14), day(1, 20)),
        ]
    );
    assert!(merged.windows(2).all(|p| p[0].precedes(&p[1])));
}

#[test]
fn confirm_returns_supported_subset() {
    let first = vec![
        drop(day(1, 1), day(1, 5), day(1, 10)),
        drop(day(2, 1), day(2, 5), day(2, 10)),
    ];
    let second = vec![peak(day(1, 5), day(1, 12), day(1, 20))];

    assert_eq!(confirm(&first, &second, 2), vec![first[0].clone()]);
    assert!(confirm(&first, &second, 5).is_empty());
    assert!(confirm(&first, &[], 0).is_empty());
    assert!(confirm(&[], &second, 0).is_empty());
}

#[test]
fn aggregate_keeps_every_input_once() {
    let first = vec![
        drop(day(1, 1), day(1, 5), day(1, 10)),
        drop(day(3, 1), day(3, 3), day(3, 5)),
    ];
    let second = vec![
        peak(day(1, 5), day(1, 12), day(1, 20)),
        peak(day(2, 1), day(2, 3), day(2, 5)),
    ];

    let out = aggregate(&first, &second, 0);
    assert_eq!(
        bounds(&out),
        vec![
            (day(1, 1), day(1, 20)),
            (day(2, 1), day(2, 5)),
            (day(3, 1), day(3, 5)),
        ]
    );
    assert_eq!(out[0].marker_type.to_string(), "drop-peak");
    assert!(!out[0].has_values());
    assert_eq!(out[1], second[1]);
    assert_eq!(out[2], first[1]);
}

#[test]
fn aggregate_resolves_shared_match_by_overlap() {
    let first = vec![
        drop(day(1, 1), day(1, 5), day(1, 10)),
        drop(day(1, 5), day(1, 9), day(1, 14)),
    ];
    let second = vec![
        peak(day(1, 1), day(1, 2), day(1, 3)),
        peak(day(1, 6), day(1, 9), day(1, 12)),
    ];

    let out = aggregate(&first, &second, 0);
    assert_eq!(out.len(), 3);
    // The loser keeps its own bounds and does not fall back on the other peak.
    assert_eq!(out[0], first[0]);
    assert_eq!(out[1], second[0]);
    assert_eq!(bounds(&out[2..]), vec![(day(1, 5), day(1, 14))]);
    assert!(out[2].marker_type.is_composite());
}

#[test]
fn aggregate_tie_goes_to_earlier_marker() {
    let first = vec![
        drop(day(1, 1), day(1, 5), day(1, 10)),
        drop(day(1, 3), day(1, 7), day(1, 12)),
    ];
    let second = vec![peak(day(1, 5), day(1, 7), day(1, 9))];

    let out = aggregate(&first, &second, 0);
    assert_eq!(out.len(), 2);
    assert_eq!(bounds(&out[..1]), vec![(day(1, 1), day(1, 10))]);
    assert!(out[0].marker_type.is_composite());
    assert_eq!(out[1], first[1]);
}

#[test]
fn aggregate_three_claimants_only_the_largest_overlap_merges() {
    let target = vec![peak(day(1, 10), day(1, 15), day(1, 20))];

    // Overlaps 5, 3, 4 days: the later 4-day claim does not displace the holder.
    let first = vec![
        drop(day(1, 5), day(1, 8), day(1, 15)),
        drop(day(1, 7), day(1, 9), day(1, 13)),
        drop(day(1, 16), day(1, 20), day(1, 24)),
    ];
    let out = aggregate(&first, &target, 0);
    assert_eq!(out.len(), 3);
    assert_eq!(bounds(&out[..1]), vec![(day(1, 5), day(1, 20))]);
    assert!(out[0].marker_type.is_composite());
    assert_eq!(out[1], first[1]);
    assert_eq!(out[2], first[2]);

    // Overlaps 3, 5, 4 days: the middle claim takes over and keeps the target.
    let first = vec![
        drop(day(1, 7), day(1, 9), day(1, 13)),
        drop(day(1, 8), day(1, 10), day(1, 15)),
        drop(day(1, 16), day(1, 20), day(1, 24)),
    ];
    let out = aggregate(&first, &target, 0);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], first[0]);
    assert_eq!(bounds(&out[1..2]), vec![(day(1, 8), day(1, 20))]);
    assert_eq!(out[2], first[2]);
    assert_eq!(out.iter().filter(|x| x.marker_type.is_composite()).count(), 1);
}

#[test]
fn aggregate_passes_through_when_one_side_is_empty() {
    let markers = vec![drop(day(1, 1), day(1, 5), day(1, 10))];
    assert_eq!(aggregate(&markers, &[], 0), markers);
    assert_eq!(aggregate(&[], &markers, 0), markers);
}

fn marker_map() -> MarkerMap {
    let mut map = MarkerMap::new();
    map.insert(
        "ndvi".to_string(),
        vec![
            drop(day(1, 1), day(1, 5), day(1, 10)),
            drop(day(3, 1), day(3, 3), day(3, 5)),
        ],
    );
    map.insert("vv".to_string(), vec![peak(day(1, 5), day(1, 12), day(1, 20))]);
    map
}

fn action(kind: ActionKind, signals: &[&str], outname: Option<&str>) -> AggregatorAction {
    AggregatorAction::new(
        kind,
        signals.iter().map(|x| x.to_string()).collect(),
        0,
        outname.map(str::to_string),
    )
    .expect("valid action")
}

#[test]
fn aggregator_without_actions_returns_first_signal() {
    let map = marker_map();
    let out = MarkerAggregator::default().aggregate(&map).expect("no actions");
    assert_eq!(out, map["ndvi"]);

    let empty = MarkerAggregator::default().aggregate(&MarkerMap::new()).expect("no actions");
    assert!(empty.is_empty());
}

#[test]
fn aggregator_chains_actions_through_working_lists() {
    let aggregator = MarkerAggregator::new(vec![
        action(ActionKind::Confirm, &["ndvi", "vv"], Some("confirmed")),
        action(ActionKind::Aggregate, &["vv"], None),
        action(ActionKind::Confirm, &["confirmed"], None),
    ]);

    let out = aggregator.aggregate(&marker_map()).expect("valid actions");
    assert_eq!(bounds(&out), vec![(day(1, 1), day(1, 20))]);
    assert_eq!(out[0].marker_type.to_string(), "drop-peak");
}

#[test]
fn aggregator_treats_missing_signal_as_empty() {
    let aggregator = MarkerAggregator::new(vec![action(ActionKind::Confirm, &["missing"], None)]);
    let out = aggregator.aggregate(&marker_map()).expect("valid actions");
    assert!(out.is_empty());

    let aggregator = MarkerAggregator::new(vec![action(ActionKind::Merge, &["missing"], None)]);
    let out = aggregator.aggregate(&marker_map()).expect("valid actions");
    assert_eq!(out, marker_map()["ndvi"]);
}

#[test]
fn action_signal_count_is_checked() {
    let err = AggregatorAction::new(
        ActionKind::Merge,
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        0,
        None,
    )
    .expect_err("three signals");
    assert!(matches!(err, DataError::InvalidSignals { count: 3, .. }));

    let err = AggregatorAction::new(ActionKind::Confirm, Vec::new(), 0, None)
        .expect_err("no signal");
    assert!(matches!(err, DataError::InvalidSignals { count: 0, .. }));
}
