mod drop;
mod gap;
mod peak;
mod state_change;
mod threshold;

pub use drop::{DropDetector, FeatureParams};
pub use gap::GapDetector;
pub use peak::PeakDetector;
pub use state_change::StateChangeDetector;
pub use threshold::ThresholdDetector;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::DetectorConfig;
use crate::constant::{DataError, DetectorKind};
use crate::marker::Marker;
use crate::series::{sort_by_start, MarkerMap, SignalSet, TimeSeries};

pub trait MarkerDetector {
    fn kind(&self) -> DetectorKind;
    fn signals(&self) -> &[String];
    fn detect(&self, series: &TimeSeries) -> Vec<Marker>;

    fn get_markers(&self, input: &SignalSet) -> MarkerMap {
        let mut out = MarkerMap::new();
        for signal in self.signals() {
            let Some(series) = input.get(signal) else {
                debug!(detector = self.kind().as_str(), signal, "signal not available, skipped");
                continue;
            };
            let mut markers = self.detect(series);
            sort_by_start(&mut markers);
            debug!(
                detector = self.kind().as_str(),
                signal,
                count = markers.len(),
                "markers detected"
            );
            out.insert(signal.clone(), markers);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub enum Detector {
    Drop(DropDetector),
    Peak(PeakDetector),
    Gap(GapDetector),
    Threshold(ThresholdDetector),
    StateChange(StateChangeDetector),
}

impl Detector {
    pub fn from_config(config: &DetectorConfig) -> Result<Self, DataError> {
        let kind = DetectorKind::parse(&config.kind)?;
        if config.signals.is_empty() {
            return Err(DataError::InvalidSignals {
                owner: kind.as_str().to_string(),
                count: 0,
            });
        }
        let detector = match kind {
            DetectorKind::Drop => Self::Drop(DropDetector::from_config(config)),
            DetectorKind::Peak => Self::Peak(PeakDetector::from_config(config)),
            DetectorKind::Gap => Self::Gap(GapDetector::from_config(config)?),
            DetectorKind::Threshold => Self::Threshold(ThresholdDetector::from_config(config)?),
            DetectorKind::StateChange => {
                Self::StateChange(StateChangeDetector::from_config(config)?)
            }
        };
        Ok(detector)
    }

    fn inner(&self) -> &dyn MarkerDetector {
        match self {
            Self::Drop(x) => x,
            Self::Peak(x) => x,
            Self::Gap(x) => x,
            Self::Threshold(x) => x,
            Self::StateChange(x) => x,
        }
    }

    pub fn kind(&self) -> DetectorKind {
        self.inner().kind()
    }

    pub fn get_markers(&self, input: &SignalSet) -> MarkerMap {
        self.inner().get_markers(input)
    }
}

pub(crate) fn require(
    value: Option<f64>,
    kind: DetectorKind,
    name: &str,
) -> Result<f64, DataError> {
    value.ok_or_else(|| DataError::MissingParameter {
        owner: kind.as_str().to_string(),
        name: name.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateWindow {
    pub start_date: Option<DateTime<Utc>>,
    pub stop_date: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(start_date: Option<DateTime<Utc>>, stop_date: Option<DateTime<Utc>>) -> Self {
        Self {
            start_date,
            stop_date,
        }
    }

    fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.start_date, config.stop_date)
    }
}
