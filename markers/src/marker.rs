use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::constant::MarkerType;
use crate::utils::{interpolate, midpoint};

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerError {
    EmptyMarker {
        start_date: DateTime<Utc>,
        stop_date: DateTime<Utc>,
        requested: DateTime<Utc>,
    },
    InvalidSpan {
        start_date: DateTime<Utc>,
        stop_date: DateTime<Utc>,
    },
}

impl Display for MarkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMarker {
                start_date,
                stop_date,
                requested,
            } => write!(
                f,
                "trimming marker [{start_date}, {stop_date}] at {requested} leaves an empty marker"
            ),
            Self::InvalidSpan {
                start_date,
                stop_date,
            } => write!(f, "marker start {start_date} is after stop {stop_date}"),
        }
    }
}

impl std::error::Error for MarkerError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub start_date: DateTime<Utc>,
    pub main_date: DateTime<Utc>,
    pub stop_date: DateTime<Utc>,
    /// Samples at start, main and stop date. `NaN` once merged.
    pub values: [f64; 3],
    pub marker_type: MarkerType,
    #[serde(default)]
    pub properties: BTreeMap<String, JsonValue>,
}

impl Marker {
    pub fn new(
        start_date: DateTime<Utc>,
        main_date: DateTime<Utc>,
        stop_date: DateTime<Utc>,
        values: [f64; 3],
        marker_type: MarkerType,
    ) -> Result<Self, MarkerError> {
        if start_date > stop_date {
            return Err(MarkerError::InvalidSpan {
                start_date,
                stop_date,
            });
        }
        Ok(Self {
            start_date,
            main_date,
            stop_date,
            values,
            marker_type,
            properties: BTreeMap::new(),
        })
    }

    pub(crate) fn spanning(
        a: DateTime<Utc>,
        main_date: DateTime<Utc>,
        b: DateTime<Utc>,
        values: [f64; 3],
        marker_type: MarkerType,
    ) -> Self {
        Self {
            start_date: a.min(b),
            main_date,
            stop_date: a.max(b),
            values,
            marker_type,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn duration_days(&self) -> i64 {
        (self.stop_date - self.start_date).num_days()
    }

    pub fn overlap_in_days(&self, other: &Marker) -> i64 {
        let start = self.start_date.max(other.start_date);
        let stop = self.stop_date.min(other.stop_date);
        if stop <= start {
            return 0;
        }
        (stop - start).num_days()
    }

    pub fn overlap(&self, other: &Marker) -> f64 {
        let duration = self.duration_days();
        if duration == 0 {
            return 0.0;
        }
        self.overlap_in_days(other) as f64 / duration as f64
    }

    pub fn symmetric_overlap(&self, other: &Marker) -> f64 {
        self.overlap(other).max(other.overlap(self))
    }

    pub fn contains(&self, other: &Marker) -> bool {
        self.start_date <= other.start_date && self.stop_date >= other.stop_date
    }

    pub fn precedes(&self, other: &Marker) -> bool {
        self.stop_date <= other.start_date
    }

    pub fn overlaps(&self, other: &Marker) -> bool {
        !self.precedes(other) && !other.precedes(self)
    }

    pub fn has_values(&self) -> bool {
        self.values.iter().all(|x| x.is_finite())
    }

    pub fn merge_markers(&self, other: &Marker) -> Marker {
        let mut properties = self.properties.clone();
        for (key, value) in &other.properties {
            properties.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Marker {
            start_date: self.start_date.min(other.start_date),
            main_date: midpoint(self.main_date, other.main_date),
            stop_date: self.stop_date.max(other.stop_date),
            values: [f64::NAN; 3],
            marker_type: self.marker_type.combine(&other.marker_type),
            properties,
        }
    }

    pub fn trim_right(&self, new_stop: DateTime<Utc>) -> Result<Marker, MarkerError> {
        if new_stop >= self.stop_date {
            return Ok(self.clone());
        }
        if new_stop <= self.start_date {
            return Err(self.empty_at(new_stop));
        }

        let [v_start, v_main, v_stop] = self.values;
        let mut trimmed = self.clone();
        trimmed.stop_date = new_stop;

        if new_stop < self.main_date {
            let main_date = midpoint(self.start_date, new_stop);
            trimmed.main_date = main_date;
            trimmed.values[1] =
                interpolate(self.start_date, v_start, self.main_date, v_main, main_date);
            trimmed.values[2] =
                interpolate(self.start_date, v_start, self.main_date, v_main, new_stop);
        } else {
            trimmed.values[2] =
                interpolate(self.main_date, v_main, self.stop_date, v_stop, new_stop);
        }
        Ok(trimmed)
    }

    pub fn trim_left(&self, new_start: DateTime<Utc>) -> Result<Marker, MarkerError> {
        if new_start <= self.start_date {
            return Ok(self.clone());
        }
        if new_start >= self.stop_date {
            return Err(self.empty_at(new_start));
        }

        let [v_start, v_main, v_stop] = self.values;
        let mut trimmed = self.clone();
        trimmed.start_date = new_start;

        if new_start > self.main_date {
            let main_date = midpoint(new_start, self.stop_date);
            trimmed.main_date = main_date;
            trimmed.values[0] =
                interpolate(self.main_date, v_main, self.stop_date, v_stop, new_start);
            trimmed.values[1] =
                interpolate(self.main_date, v_main, self.stop_date, v_stop, main_date);
        } else {
            trimmed.values[0] =
                interpolate(self.start_date, v_start, self.main_date, v_main, new_start);
        }
        Ok(trimmed)
    }

    fn empty_at(&self, requested: DateTime<Utc>) -> MarkerError {
        MarkerError::EmptyMarker {
            start_date: self.start_date,
            stop_date: self.stop_date,
            requested,
        }
    }
}

// Values compare bitwise so merged markers (NaN values) stay equal to themselves.
impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.start_date == other.start_date
            && self.main_date == other.main_date
            && self.stop_date == other.stop_date
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self.marker_type == other.marker_type
            && self.properties == other.properties
    }
}

// Overlapping or touching markers are incomparable.
impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.stop_date < other.start_date {
            Some(Ordering::Less)
        } else if self.start_date > other.stop_date {
            Some(Ordering::Greater)
        } else if self == other {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub marker_type: String,
    pub start_date: DateTime<Utc>,
    pub main_date: DateTime<Utc>,
    pub stop_date: DateTime<Utc>,
    pub duration_days: i64,
    pub value0: f64,
    pub value1: f64,
    pub value2: f64,
    pub properties: String,
}

impl From<&Marker> for MarkerRecord {
    fn from(marker: &Marker) -> Self {
        let properties = if marker.properties.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&marker.properties).unwrap_or_default()
        };
        Self {
            marker_type: marker.marker_type.to_string(),
            start_date: marker.start_date,
            main_date: marker.main_date,
            stop_date: marker.stop_date,
            duration_days: marker.duration_days(),
            value0: marker.values[0],
            value1: marker.values[1],
            value2: marker.values[2],
            properties,
        }
    }
}
