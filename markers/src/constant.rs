use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::marker::MarkerError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MarkerType {
    Drop,
    Peak,
    Gap,
    Threshold,
    StateChange,
    Composite(Vec<MarkerType>),
}

impl MarkerType {
    pub fn parse(value: &str) -> Result<Self, DataError> {
        let mut parts = value
            .trim()
            .split('-')
            .map(Self::parse_single)
            .collect::<Result<Vec<_>, _>>()?;
        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Ok(Self::Composite(parts))
    }

    fn parse_single(value: &str) -> Result<Self, DataError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "peak" => Ok(Self::Peak),
            "gap" => Ok(Self::Gap),
            "threshold" => Ok(Self::Threshold),
            "state_change" => Ok(Self::StateChange),
            _ => Err(DataError::UnsupportedMarkerType(value.to_string())),
        }
    }

    pub fn combine(&self, other: &Self) -> Self {
        let mut parts = self.members();
        parts.extend(other.members());
        Self::Composite(parts)
    }

    fn members(&self) -> Vec<MarkerType> {
        match self {
            Self::Composite(parts) => parts.clone(),
            single => vec![single.clone()],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

impl Display for MarkerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Peak => write!(f, "peak"),
            Self::Gap => write!(f, "gap"),
            Self::Threshold => write!(f, "threshold"),
            Self::StateChange => write!(f, "state_change"),
            Self::Composite(parts) => {
                let joined = parts
                    .iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join("-");
                write!(f, "{joined}")
            }
        }
    }
}

impl From<MarkerType> for String {
    fn from(value: MarkerType) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MarkerType {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Drop,
    Peak,
    Gap,
    Threshold,
    StateChange,
}

impl DetectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop_detector",
            Self::Peak => "peak_detector",
            Self::Gap => "gap_detector",
            Self::Threshold => "threshold_detector",
            Self::StateChange => "state_change_detector",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DataError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drop" | "drop_detector" | "drop-detector" => Ok(Self::Drop),
            "peak" | "peak_detector" | "peak-detector" => Ok(Self::Peak),
            "gap" | "gap_detector" | "gap-detector" => Ok(Self::Gap),
            "threshold" | "threshold_detector" | "threshold-detector" => Ok(Self::Threshold),
            "state_change" | "state_change_detector" | "state-change-detector" => {
                Ok(Self::StateChange)
            }
            _ => Err(DataError::UnsupportedDetector(value.to_string())),
        }
    }

    pub fn marker_type(self) -> MarkerType {
        match self {
            Self::Drop => MarkerType::Drop,
            Self::Peak => MarkerType::Peak,
            Self::Gap => MarkerType::Gap,
            Self::Threshold => MarkerType::Threshold,
            Self::StateChange => MarkerType::StateChange,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Confirm,
    Aggregate,
    Merge,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Aggregate => "aggregate",
            Self::Merge => "merge",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DataError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirm" => Ok(Self::Confirm),
            "aggregate" => Ok(Self::Aggregate),
            "merge" => Ok(Self::Merge),
            _ => Err(DataError::UnsupportedAction(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    #[default]
    Above,
    Below,
}

impl ThresholdMode {
    pub fn accepts(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value > threshold,
            Self::Below => value < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Duration,
    Drop,
    Angle,
}

pub struct Const;

impl Const {
    pub const AGGREGATION_ANGLE_DEG: f64 = 135.0;
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

#[derive(Debug)]
pub enum DataError {
    UnsupportedDetector(String),
    UnsupportedAction(String),
    UnsupportedMarkerType(String),
    InvalidSignals { owner: String, count: usize },
    MissingParameter { owner: String, name: String },
    InvalidDatetime(String),
    InvalidSeries(String),
    Marker(MarkerError),
    Io(std::io::Error),
    Csv(csv::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    Polars(polars::error::PolarsError),
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDetector(v) => write!(f, "unsupported detector type: {v}"),
            Self::UnsupportedAction(v) => write!(f, "unsupported aggregator action: {v}"),
            Self::UnsupportedMarkerType(v) => write!(f, "unsupported marker type: {v}"),
            Self::InvalidSignals { owner, count } => {
                write!(f, "{owner}: unsupported number of signals ({count})")
            }
            Self::MissingParameter { owner, name } => {
                write!(f, "{owner}: missing required parameter {name}")
            }
            Self::InvalidDatetime(v) => write!(f, "invalid datetime: {v}"),
            Self::InvalidSeries(v) => write!(f, "invalid series: {v}"),
            Self::Marker(e) => write!(f, "marker error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Yaml(e) => write!(f, "yaml error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Polars(e) => write!(f, "polars error: {e}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<MarkerError> for DataError {
    fn from(value: MarkerError) -> Self {
        Self::Marker(value)
    }
}

impl From<std::io::Error> for DataError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for DataError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_yaml::Error> for DataError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<polars::error::PolarsError> for DataError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::Polars(value)
    }
}
