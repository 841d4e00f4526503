use tracing::debug;

use crate::config::DetectorConfig;
use crate::constant::DetectorKind;
use crate::detector::{FeatureParams, MarkerDetector};
use crate::features::{features_to_markers, FeatureTriple};
use crate::marker::Marker;
use crate::series::{negate, TimeSeries};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakDetector {
    pub params: FeatureParams,
}

impl PeakDetector {
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(FeatureParams::from_config(config, config.min_increase))
    }
}

impl MarkerDetector for PeakDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Peak
    }

    fn signals(&self) -> &[String] {
        &self.params.signals
    }

    fn detect(&self, series: &TimeSeries) -> Vec<Marker> {
        let mut markers = Vec::new();
        for (component, samples) in series.components() {
            let features: Vec<FeatureTriple> = self
                .params
                .detect_features(&negate(&samples))
                .iter()
                .map(FeatureTriple::negated)
                .collect();
            debug!(component, events = features.len(), "peak events");
            markers.extend(features_to_markers(&features, &self.kind().marker_type()));
        }
        markers
    }
}
