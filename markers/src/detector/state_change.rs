use crate::config::DetectorConfig;
use crate::constant::{DataError, DetectorKind, MarkerType};
use crate::detector::{require, DateWindow, MarkerDetector};
use crate::marker::Marker;
use crate::series::{window, Sample, TimeSeries};
use crate::utils::{approx_eq_f64, days_between, midpoint};

/// Boundaries sit halfway between a run edge and its neighbouring sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateChangeDetector {
    pub signals: Vec<String>,
    pub window: DateWindow,
    pub target_state: f64,
    pub min_duration: f64,
}

impl StateChangeDetector {
    pub fn from_config(config: &DetectorConfig) -> Result<Self, DataError> {
        Ok(Self {
            signals: config.signals.clone(),
            window: DateWindow::from_config(config),
            target_state: require(config.target_state, DetectorKind::StateChange, "target_state")?,
            min_duration: config.min_duration.unwrap_or(0.0),
        })
    }

    fn in_state(&self, sample: &Sample) -> bool {
        approx_eq_f64(sample.value, self.target_state)
    }

    fn runs(&self, samples: &[Sample]) -> Vec<Marker> {
        let mut markers = Vec::new();
        let mut idx = 0;
        while idx < samples.len() {
            if !self.in_state(&samples[idx]) {
                idx += 1;
                continue;
            }
            let first = idx;
            while idx + 1 < samples.len() && self.in_state(&samples[idx + 1]) {
                idx += 1;
            }
            let last = idx;
            idx += 1;

            let start_date = match first.checked_sub(1) {
                Some(prev) => midpoint(samples[prev].date, samples[first].date),
                None => samples[first].date,
            };
            let stop_date = match samples.get(last + 1) {
                Some(next) => midpoint(samples[last].date, next.date),
                None => samples[last].date,
            };
            if days_between(start_date, stop_date) < self.min_duration {
                continue;
            }
            markers.push(Marker::spanning(
                start_date,
                midpoint(start_date, stop_date),
                stop_date,
                [self.target_state; 3],
                MarkerType::StateChange,
            ));
        }
        markers
    }
}

impl MarkerDetector for StateChangeDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::StateChange
    }

    fn signals(&self) -> &[String] {
        &self.signals
    }

    fn detect(&self, series: &TimeSeries) -> Vec<Marker> {
        series
            .components()
            .flat_map(|(_, samples)| {
                let samples = window(&samples, self.window.start_date, self.window.stop_date);
                self.runs(&samples)
            })
            .collect()
    }
}
