use chrono::{DateTime, Utc};

use crate::series::{in_window, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Maximum,
    Minimum,
}

// Plateaus and the end samples never qualify.
fn is_extremum(series: &[Sample], idx: usize, kind: Extremum) -> bool {
    if idx == 0 || idx + 1 >= series.len() {
        return false;
    }
    let prev = series[idx - 1].value;
    let curr = series[idx].value;
    let next = series[idx + 1].value;
    match kind {
        Extremum::Maximum => curr > prev && curr > next,
        Extremum::Minimum => curr < prev && curr < next,
    }
}

fn extrema_indices(series: &[Sample], kind: Extremum) -> Vec<usize> {
    (1..series.len().saturating_sub(1))
        .filter(|idx| is_extremum(series, *idx, kind))
        .collect()
}

pub fn maxima_indices(series: &[Sample]) -> Vec<usize> {
    extrema_indices(series, Extremum::Maximum)
}

pub fn minima_indices(series: &[Sample]) -> Vec<usize> {
    extrema_indices(series, Extremum::Minimum)
}

fn select(
    series: &[Sample],
    kind: Extremum,
    max_number: usize,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    sorted: bool,
) -> Vec<Sample> {
    let mut picked: Vec<usize> = extrema_indices(series, kind)
        .into_iter()
        .filter(|idx| in_window(series[*idx].date, start, stop))
        .collect();

    if sorted {
        // Stable: equal values keep chronological order.
        picked.sort_by(|a, b| {
            let (va, vb) = (series[*a].value, series[*b].value);
            match kind {
                Extremum::Maximum => vb.total_cmp(&va),
                Extremum::Minimum => va.total_cmp(&vb),
            }
        });
        picked.truncate(max_number);
        picked.sort_unstable();
    } else {
        picked.truncate(max_number);
    }

    picked.into_iter().map(|idx| series[idx]).collect()
}

pub fn get_maxima(
    series: &[Sample],
    max_number: usize,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    sorted: bool,
) -> Vec<Sample> {
    select(series, Extremum::Maximum, max_number, start, stop, sorted)
}

pub fn get_minima(
    series: &[Sample],
    max_number: usize,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
    sorted: bool,
) -> Vec<Sample> {
    select(series, Extremum::Minimum, max_number, start, stop, sorted)
}

fn nearest_before(
    series: &[Sample],
    kind: Extremum,
    max_number: usize,
    date: DateTime<Utc>,
) -> Vec<Sample> {
    let before: Vec<usize> = extrema_indices(series, kind)
        .into_iter()
        .filter(|idx| series[*idx].date < date)
        .collect();
    if before.is_empty() {
        return series.first().copied().into_iter().collect();
    }
    let skip = before.len().saturating_sub(max_number);
    before.into_iter().skip(skip).map(|idx| series[idx]).collect()
}

fn nearest_after(
    series: &[Sample],
    kind: Extremum,
    max_number: usize,
    date: DateTime<Utc>,
) -> Vec<Sample> {
    let after: Vec<Sample> = extrema_indices(series, kind)
        .into_iter()
        .filter(|idx| series[*idx].date > date)
        .take(max_number)
        .map(|idx| series[idx])
        .collect();
    if after.is_empty() {
        return series.last().copied().into_iter().collect();
    }
    after
}

/// Falls back to the first sample when there is none.
pub fn get_first_maxima_before(
    series: &[Sample],
    max_number: usize,
    date: DateTime<Utc>,
) -> Vec<Sample> {
    nearest_before(series, Extremum::Maximum, max_number, date)
}

pub fn get_first_maxima_after(
    series: &[Sample],
    max_number: usize,
    date: DateTime<Utc>,
) -> Vec<Sample> {
    nearest_after(series, Extremum::Maximum, max_number, date)
}

pub fn get_first_minima_before(
    series: &[Sample],
    max_number: usize,
    date: DateTime<Utc>,
) -> Vec<Sample> {
    nearest_before(series, Extremum::Minimum, max_number, date)
}

pub fn get_first_minima_after(
    series: &[Sample],
    max_number: usize,
    date: DateTime<Utc>,
) -> Vec<Sample> {
    nearest_after(series, Extremum::Minimum, max_number, date)
}
