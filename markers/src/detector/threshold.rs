use crate::config::DetectorConfig;
use crate::constant::{DataError, DetectorKind, MarkerType, ThresholdMode};
use crate::detector::{require, DateWindow, MarkerDetector};
use crate::marker::Marker;
use crate::series::{window, Sample, TimeSeries};
use crate::utils::days_between;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdDetector {
    pub signals: Vec<String>,
    pub window: DateWindow,
    pub threshold: f64,
    pub mode: ThresholdMode,
    pub min_duration: f64,
}

impl ThresholdDetector {
    pub fn from_config(config: &DetectorConfig) -> Result<Self, DataError> {
        Ok(Self {
            signals: config.signals.clone(),
            window: DateWindow::from_config(config),
            threshold: require(config.threshold, DetectorKind::Threshold, "threshold")?,
            mode: config.mode.unwrap_or_default(),
            min_duration: config.min_duration.unwrap_or(0.0),
        })
    }

    fn runs(&self, samples: &[Sample]) -> Vec<Marker> {
        let mut markers = Vec::new();
        let mut run: Vec<Sample> = Vec::new();
        for sample in samples {
            if self.mode.accepts(sample.value, self.threshold) {
                run.push(*sample);
                continue;
            }
            if let Some(marker) = self.close_run(&run) {
                markers.push(marker);
            }
            run.clear();
        }
        if let Some(marker) = self.close_run(&run) {
            markers.push(marker);
        }
        markers
    }

    fn close_run(&self, run: &[Sample]) -> Option<Marker> {
        let first = run.first()?;
        let last = run.last()?;
        if days_between(first.date, last.date) < self.min_duration {
            return None;
        }
        let extreme = run.iter().skip(1).fold(*first, |best, x| {
            let better = match self.mode {
                ThresholdMode::Above => x.value > best.value,
                ThresholdMode::Below => x.value < best.value,
            };
            if better { *x } else { best }
        });
        Some(Marker::spanning(
            first.date,
            extreme.date,
            last.date,
            [first.value, extreme.value, last.value],
            MarkerType::Threshold,
        ))
    }
}

impl MarkerDetector for ThresholdDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Threshold
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
