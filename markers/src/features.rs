use chrono::{DateTime, Utc};

use crate::constant::MarkerType;
use crate::extrema::{get_first_maxima_after, get_first_maxima_before, get_minima};
use crate::marker::Marker;
use crate::series::{negate, Sample};
use crate::utils::{approx_eq_f64, days_between};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureTriple {
    pub left: Sample,
    pub center: Sample,
    pub right: Sample,
}

impl FeatureTriple {
    pub fn new(left: Sample, center: Sample, right: Sample) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    pub fn span_days(&self) -> f64 {
        days_between(self.left.date, self.right.date)
    }

    pub fn height(&self) -> f64 {
        self.left.value.max(self.right.value) - self.center.value
    }

    pub fn samples(&self) -> [Sample; 3] {
        [self.left, self.center, self.right]
    }

    pub fn shares_boundary(&self, next: &FeatureTriple) -> bool {
        self.right.date == next.left.date && approx_eq_f64(self.right.value, next.left.value)
    }

    pub fn absorb(&self, next: &FeatureTriple) -> FeatureTriple {
        let center = if next.center.value < self.center.value {
            next.center
        } else {
            self.center
        };
        FeatureTriple::new(self.left, center, next.right)
    }

    pub fn negated(&self) -> FeatureTriple {
        FeatureTriple::new(self.left.negated(), self.center.negated(), self.right.negated())
    }
}

pub fn flatten(features: &[FeatureTriple]) -> Vec<Sample> {
    features.iter().flat_map(|x| x.samples()).collect()
}

/// Bounding maxima are searched over the whole series and may fall outside the window.
pub fn get_extrema_features(
    series: &[Sample],
    max_number: usize,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    sorted: bool,
) -> Vec<FeatureTriple> {
    let minima = get_minima(series, max_number, start, stop, sorted);
    let mut features = Vec::with_capacity(minima.len());
    for (i, center) in minima.iter().enumerate() {
        let floor = i.checked_sub(1).map(|p| minima[p].date);
        let ceiling = minima.get(i + 1).map(|x| x.date);
        let left = bound_before(series, center, floor);
        let right = bound_after(series, center, ceiling);
        features.push(FeatureTriple::new(left, *center, right));
    }
    features
}

pub fn get_peak_features(
    series: &[Sample],
    max_number: usize,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    sorted: bool,
) -> Vec<FeatureTriple> {
    get_extrema_features(&negate(series), max_number, start, stop, sorted)
        .iter()
        .map(FeatureTriple::negated)
        .collect()
}

// A strict maximum beyond the neighbouring selected minimum is replaced by the
// highest sample between the two minima, earliest on ties. With no strict
// maximum towards a series edge, the highest sample closest to the center wins.
fn bound_before(series: &[Sample], center: &Sample, floor: Option<DateTime<Utc>>) -> Sample {
    let fallback = get_first_maxima_before(series, 1, center.date).last().copied();
    let strict = fallback.filter(|x| series.first().is_some_and(|first| first.date != x.date));
    let bound = match (strict, floor) {
        (Some(candidate), Some(floor)) if candidate.date <= floor => {
            highest_between(series, Some(floor), Some(center.date), false)
        }
        (Some(candidate), _) => Some(candidate),
        (None, Some(floor)) => highest_between(series, Some(floor), Some(center.date), false),
        (None, None) => highest_between(series, None, Some(center.date), true),
    };
    bound.or(fallback).unwrap_or(*center)
}

fn bound_after(series: &[Sample], center: &Sample, ceiling: Option<DateTime<Utc>>) -> Sample {
    let fallback = get_first_maxima_after(series, 1, center.date).first().copied();
    let strict = fallback.filter(|x| series.last().is_some_and(|last| last.date != x.date));
    let bound = match (strict, ceiling) {
        (Some(candidate), Some(ceiling)) if candidate.date >= ceiling => {
            highest_between(series, Some(center.date), Some(ceiling), false)
        }
        (Some(candidate), _) => Some(candidate),
        (None, Some(ceiling)) => highest_between(series, Some(center.date), Some(ceiling), false),
        (None, None) => highest_between(series, Some(center.date), None, false),
    };
    bound.or(fallback).unwrap_or(*center)
}

fn highest_between(
    series: &[Sample],
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    latest: bool,
) -> Option<Sample> {
    series
        .iter()
        .filter(|x| after.is_none_or(|a| x.date > a) && before.is_none_or(|b| x.date < b))
        .filter(|x| x.value.is_finite())
        .fold(None, |best: Option<Sample>, x| match best {
            Some(b) if b.value > x.value || (b.value == x.value && !latest) => Some(b),
            _ => Some(*x),
        })
}

pub fn features_to_markers(features: &[FeatureTriple], marker_type: &MarkerType) -> Vec<Marker> {
    features
        .iter()
        .map(|x| {
            Marker::spanning(
                x.left.date,
                x.center.date,
                x.right.date,
                [x.left.value, x.center.value, x.right.value],
                marker_type.clone(),
            )
        })
        .collect()
}
