use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::ActionConfig;
use crate::constant::{ActionKind, DataError};
use crate::marker::{Marker, MarkerError};
use crate::series::{sort_by_start, MarkerMap};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorAction {
    pub kind: ActionKind,
    pub signals: Vec<String>,
    pub overlap: i64,
    pub outname: Option<String>,
}

impl AggregatorAction {
    pub fn new(
        kind: ActionKind,
        signals: Vec<String>,
        overlap: i64,
        outname: Option<String>,
    ) -> Result<Self, DataError> {
        if signals.is_empty() || signals.len() > 2 {
            return Err(DataError::InvalidSignals {
                owner: kind.as_str().to_string(),
                count: signals.len(),
            });
        }
        Ok(Self {
            kind,
            signals,
            overlap,
            outname,
        })
    }

    pub fn from_config(config: &ActionConfig) -> Result<Self, DataError> {
        Self::new(
            ActionKind::parse(&config.action)?,
            config.signals.clone(),
            config.overlap,
            config.outname.clone(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerAggregator {
    actions: Vec<AggregatorAction>,
}

impl MarkerAggregator {
    pub fn new(actions: Vec<AggregatorAction>) -> Self {
        Self { actions }
    }

    pub fn from_config(configs: &[ActionConfig]) -> Result<Self, DataError> {
        let actions = configs
            .iter()
            .map(AggregatorAction::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(actions))
    }

    pub fn actions(&self) -> &[AggregatorAction] {
        &self.actions
    }

    pub fn aggregate(&self, markers: &MarkerMap) -> Result<Vec<Marker>, DataError> {
        let mut working = markers.clone();
        let mut current = markers
            .first()
            .map(|(_, list)| list.clone())
            .unwrap_or_default();

        for action in &self.actions {
            let result = {
                let (first, second) = match action.signals.as_slice() {
                    [a] => (current.as_slice(), lookup(&working, a)),
                    [a, b] => (lookup(&working, a), lookup(&working, b)),
                    _ => {
                        return Err(DataError::InvalidSignals {
                            owner: action.kind.as_str().to_string(),
                            count: action.signals.len(),
                        });
                    }
                };
                match action.kind {
                    ActionKind::Confirm => confirm(first, second, action.overlap),
                    ActionKind::Aggregate => aggregate(first, second, action.overlap),
                    ActionKind::Merge => merge(first, second)?,
                }
            };
            debug!(
                action = action.kind.as_str(),
                signals = ?action.signals,
                count = result.len(),
                "aggregator action done"
            );
            match &action.outname {
                Some(name) => {
                    working.insert(name.clone(), result);
                }
                None => current = result,
            }
        }
        Ok(current)
    }
}

fn lookup<'a>(working: &'a MarkerMap, signal: &str) -> &'a [Marker] {
    match working.get(signal) {
        Some(list) => list,
        None => {
            warn!(signal, "no markers for signal, using an empty list");
            &[]
        }
    }
}

pub fn confirm(first: &[Marker], second: &[Marker], overlap: i64) -> Vec<Marker> {
    first
        .iter()
        .filter(|m| second.iter().any(|n| m.overlap_in_days(n) > overlap))
        .cloned()
        .collect()
}

fn best_match(marker: &Marker, candidates: &[Marker], overlap: i64) -> Option<(usize, i64)> {
    let mut best: Option<(usize, i64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let days = marker.overlap_in_days(candidate);
        if days <= overlap {
            continue;
        }
        if best.is_none_or(|(_, top)| days > top) {
            best = Some((idx, days));
        }
    }
    best
}

pub fn aggregate(first: &[Marker], second: &[Marker], overlap: i64) -> Vec<Marker> {
    if first.is_empty() {
        return second.to_vec();
    }
    if second.is_empty() {
        return first.to_vec();
    }

    let mut claims: Vec<Option<(usize, i64)>> = first
        .iter()
        .map(|m| best_match(m, second, overlap))
        .collect();

    // A later claim takes a held target only with a strictly larger overlap.
    let mut holders: HashMap<usize, (usize, i64)> = HashMap::new();
    for idx in 0..claims.len() {
        let Some((target, days)) = claims[idx] else {
            continue;
        };
        match holders.get(&target).copied() {
            Some((_, held)) if held >= days => claims[idx] = None,
            Some((holder, _)) => {
                claims[holder] = None;
                holders.insert(target, (idx, days));
            }
            None => {
                holders.insert(target, (idx, days));
            }
        }
    }

    let mut used = vec![false; second.len()];
    let mut out = Vec::with_capacity(first.len() + second.len());
    for (marker, claim) in first.iter().zip(&claims) {
        match claim {
            Some((target, _)) => {
                used[*target] = true;
                out.push(marker.merge_markers(&second[*target]));
            }
            None => out.push(marker.clone()),
        }
    }
    out.extend(
        second
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(marker, _)| marker.clone()),
    );
    sort_by_start(&mut out);
    out
}

pub fn merge(first: &[Marker], second: &[Marker]) -> Result<Vec<Marker>, MarkerError> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut rest_first = first.iter();
    let mut rest_second = second.iter();
    let mut head_first = rest_first.next().cloned();
    let mut head_second = rest_second.next();

    loop {
        let (Some(a), Some(b)) = (&head_first, head_second) else {
            break;
        };
        if a.precedes(b) {
            out.push(a.clone());
            head_first = rest_first.next().cloned();
            continue;
        }
        if b.precedes(a) {
            out.push(b.clone());
            head_second = rest_second.next();
            continue;
        }

        if a.start_date < b.start_date {
            out.push(a.trim_right(b.start_date)?);
        }
        if a.stop_date > b.stop_date {
            let remainder = a.trim_left(b.stop_date)?;
            out.push(b.clone());
            head_first = Some(remainder);
            head_second = rest_second.next();
        } else {
            head_first = rest_first.next().cloned();
        }
    }

    out.extend(head_first);
    out.extend(rest_first.cloned());
    out.extend(head_second.cloned());
    out.extend(rest_second.cloned());
    Ok(out)
}
