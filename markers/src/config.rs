use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constant::{Const, DataError, FilterKind, ThresholdMode};
use crate::utils::deserialize_opt_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AggregationConfig {
    Value {
        threshold: f64,
        #[serde(default)]
        percentage: bool,
    },
    Angle {
        #[serde(default = "default_angle")]
        angle: f64,
    },
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self::Angle {
            angle: Const::AGGREGATION_ANGLE_DEG,
        }
    }
}

fn default_angle() -> f64 {
    Const::AGGREGATION_ANGLE_DEG
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub stop_date: Option<DateTime<Utc>>,

    pub max_number: Option<usize>,
    pub min_duration: Option<f64>,
    pub min_drop: Option<f64>,
    pub min_increase: Option<f64>,
    pub aggregate: Option<usize>,
    pub aggregation: Option<AggregationConfig>,
    pub filter_by_angle: Option<f64>,
    pub filters: Option<Vec<FilterKind>>,
    pub by_date: Option<bool>,

    pub min_gap_duration: Option<f64>,

    pub threshold: Option<f64>,
    pub mode: Option<ThresholdMode>,

    pub target_state: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionConfig {
    pub action: String,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub overlap: i64,
    #[serde(default)]
    pub outname: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub detectors: Vec<DetectorConfig>,
    #[serde(default)]
    pub aggregator: Vec<ActionConfig>,
}

impl PipelineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        match path.extension().and_then(|x| x.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        }
    }
}
