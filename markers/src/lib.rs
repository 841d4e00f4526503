pub mod aggregator;
pub mod config;
pub mod constant;
pub mod detector;
pub mod export;
pub mod extrema;
pub mod features;
pub mod filter;
pub mod logging;
pub mod marker;
pub mod pipeline;
pub mod series;
pub mod utils;

pub use aggregator::{aggregate, confirm, merge, AggregatorAction, MarkerAggregator};
pub use config::{ActionConfig, AggregationConfig, DetectorConfig, PipelineConfig};
pub use constant::{
	ActionKind, Const, DataError, DetectorKind, FilterKind, MarkerType, ThresholdMode,
};
pub use detector::{
	DateWindow, Detector, DropDetector, FeatureParams, GapDetector, MarkerDetector,
	PeakDetector, StateChangeDetector, ThresholdDetector,
};
pub use export::{
	markers_to_dataframe, markers_to_records, write_markers_csv, write_markers_parquet,
};
pub use extrema::{
	get_first_maxima_after, get_first_maxima_before, get_first_minima_after,
	get_first_minima_before, get_maxima, get_minima,
};
pub use features::{
	features_to_markers, flatten, get_extrema_features, get_peak_features, FeatureTriple,
};
pub use filter::{
	aggregate_extrema, aggregate_extrema_angle, filter_by_drop, filter_by_duration,
	filter_events_based_on_angle,
};
pub use logging::{init_debug_logging, init_logging};
pub use marker::{Marker, MarkerError, MarkerRecord};
pub use pipeline::MarkerPipeline;
pub use series::{MarkerMap, Sample, SignalSet, TimeSeries};
