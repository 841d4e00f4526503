use crate::features::FeatureTriple;
use crate::series::Sample;
use crate::utils::days_between;

pub fn aggregate_extrema(
    features: &[FeatureTriple],
    threshold: f64,
    percentage: bool,
) -> Vec<FeatureTriple> {
    let Some((first, rest)) = features.split_first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(features.len());
    let mut current = *first;
    for next in rest {
        if current.shares_boundary(next) {
            let step = current.right.value - current.center.value.max(next.center.value);
            let limit = if percentage {
                let top = current.left.value.max(next.right.value);
                let bottom = current.center.value.min(next.center.value);
                threshold * (top - bottom)
            } else {
                threshold
            };
            if step < limit {
                current = current.absorb(next);
                continue;
            }
        }
        out.push(current);
        current = *next;
    }
    out.push(current);
    out
}

pub fn aggregate_extrema_angle(features: &[FeatureTriple], angle_deg: f64) -> Vec<FeatureTriple> {
    if features.len() < 2 {
        return features.to_vec();
    }
    let Some(scale) = Scale::of(features) else {
        return features.to_vec();
    };

    let mut out = Vec::with_capacity(features.len());
    let mut current = features[0];
    for next in &features[1..] {
        if current.shares_boundary(next) {
            let peak = current.right;
            let bend = scale.elevation_deg(&current.center, &peak)
                + scale.elevation_deg(&next.center, &peak);
            if bend < angle_deg {
                current = current.absorb(next);
                continue;
            }
        }
        out.push(current);
        current = *next;
    }
    out.push(current);
    out
}

struct Scale {
    days: f64,
    range: f64,
}

impl Scale {
    fn of(features: &[FeatureTriple]) -> Option<Self> {
        let first = features.first()?;
        let last = features.last()?;
        let days = days_between(first.left.date, last.right.date);
        let (lo, hi) = features
            .iter()
            .flat_map(|x| x.samples())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x.value), hi.max(x.value))
            });
        let range = hi - lo;
        (days > 0.0 && range.is_finite() && range > 0.0).then_some(Self { days, range })
    }

    fn elevation_deg(&self, low: &Sample, high: &Sample) -> f64 {
        let dx = days_between(low.date, high.date).abs() / self.days;
        let dy = (high.value - low.value) / self.range;
        let len = dx.hypot(dy);
        if len == 0.0 {
            return 0.0;
        }
        (dy / len).asin().to_degrees()
    }
}

pub fn filter_by_duration(features: &[FeatureTriple], min_days: f64) -> Vec<FeatureTriple> {
    features
        .iter()
        .filter(|x| x.span_days() >= min_days)
        .copied()
        .collect()
}

pub fn filter_by_drop(features: &[FeatureTriple], min_drop: f64) -> Vec<FeatureTriple> {
    features
        .iter()
        .filter(|x| x.height() >= min_drop)
        .copied()
        .collect()
}

pub fn filter_events_based_on_angle(
    features: &[FeatureTriple],
    min_angle_deg: f64,
) -> Vec<FeatureTriple> {
    features
        .iter()
        .filter(|x| {
            base_angles_deg(x).is_some_and(|(left, right)| {
                left >= min_angle_deg && right >= min_angle_deg
            })
        })
        .copied()
        .collect()
}

pub fn base_angles_deg(feature: &FeatureTriple) -> Option<(f64, f64)> {
    let span = feature.span_days();
    let height = feature.height();
    if span <= 0.0 || !height.is_finite() || height <= 0.0 {
        return None;
    }
    let point = |s: &Sample| {
        (
            days_between(feature.left.date, s.date) / span,
            (s.value - feature.center.value) / height,
        )
    };
    let l = point(&feature.left);
    let c = point(&feature.center);
    let r = point(&feature.right);
    Some((angle_at(l, c, r), angle_at(r, c, l)))
}

fn angle_at(vertex: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let u = (a.0 - vertex.0, a.1 - vertex.1);
    let w = (b.0 - vertex.0, b.1 - vertex.1);
    let norm = u.0.hypot(u.1) * w.0.hypot(w.1);
    if norm == 0.0 {
        return 0.0;
    }
    ((u.0 * w.0 + u.1 * w.1) / norm).clamp(-1.0, 1.0).acos().to_degrees()
}
