use tracing::debug;

use crate::config::{AggregationConfig, DetectorConfig};
use crate::constant::{DetectorKind, FilterKind};
use crate::detector::{DateWindow, MarkerDetector};
use crate::features::{features_to_markers, get_extrema_features, FeatureTriple};
use crate::filter::{
    aggregate_extrema, aggregate_extrema_angle, filter_by_drop, filter_by_duration,
    filter_events_based_on_angle,
};
use crate::marker::Marker;
use crate::series::{Sample, TimeSeries};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureParams {
    pub signals: Vec<String>,
    pub window: DateWindow,
    pub max_number: usize,
    pub min_duration: f64,
    pub min_magnitude: f64,
    pub aggregate: usize,
    pub aggregation: AggregationConfig,
    pub filter_by_angle: Option<f64>,
    pub filters: Vec<FilterKind>,
    pub by_date: bool,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            signals: Vec::new(),
            window: DateWindow::default(),
            max_number: 10,
            min_duration: 0.0,
            min_magnitude: 0.0,
            aggregate: 0,
            aggregation: AggregationConfig::default(),
            filter_by_angle: None,
            filters: vec![FilterKind::Duration, FilterKind::Drop, FilterKind::Angle],
            by_date: false,
        }
    }
}

impl FeatureParams {
    pub(crate) fn from_config(config: &DetectorConfig, magnitude: Option<f64>) -> Self {
        let defaults = Self::default();
        Self {
            signals: config.signals.clone(),
            window: DateWindow::from_config(config),
            max_number: config.max_number.unwrap_or(defaults.max_number),
            min_duration: config.min_duration.unwrap_or(defaults.min_duration),
            min_magnitude: magnitude.unwrap_or(defaults.min_magnitude),
            aggregate: config.aggregate.unwrap_or(defaults.aggregate),
            aggregation: config.aggregation.unwrap_or(defaults.aggregation),
            filter_by_angle: config.filter_by_angle,
            filters: config.filters.clone().unwrap_or(defaults.filters),
            by_date: config.by_date.unwrap_or(defaults.by_date),
        }
    }

    pub fn detect_features(&self, series: &[Sample]) -> Vec<FeatureTriple> {
        let mut features = get_extrema_features(
            series,
            self.max_number,
            self.window.start_date,
            self.window.stop_date,
            !self.by_date,
        );

        for _ in 0..self.aggregate {
            features = match self.aggregation {
                AggregationConfig::Value {
                    threshold,
                    percentage,
                } => aggregate_extrema(&features, threshold, percentage),
                AggregationConfig::Angle { angle } => aggregate_extrema_angle(&features, angle),
            };
        }

        for filter in &self.filters {
            if features.is_empty() {
                break;
            }
            features = match filter {
                FilterKind::Duration => filter_by_duration(&features, self.min_duration),
                FilterKind::Drop => filter_by_drop(&features, self.min_magnitude),
                FilterKind::Angle => match self.filter_by_angle {
                    Some(min_angle) => filter_events_based_on_angle(&features, min_angle),
                    None => features,
                },
            };
        }
        features
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropDetector {
    pub params: FeatureParams,
}

impl DropDetector {
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(FeatureParams::from_config(config, config.min_drop))
    }
}

impl MarkerDetector for DropDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Drop
    }

    fn signals(&self) -> &[String] {
        &self.params.signals
    }

    fn detect(&self, series: &TimeSeries) -> Vec<Marker> {
        let mut markers = Vec::new();
        for (component, samples) in series.components() {
            let features = self.params.detect_features(&samples);
            debug!(component, events = features.len(), "drop events");
            markers.extend(features_to_markers(&features, &self.kind().marker_type()));
        }
        markers
    }
}
