use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::constant::DataError;
use crate::marker::Marker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub date: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(date: DateTime<Utc>, value: f64) -> Self {
        Self { date, value }
    }

    pub fn negated(self) -> Self {
        Self {
            date: self.date,
            value: -self.value,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    index: Vec<DateTime<Utc>>,
    components: IndexMap<String, Vec<f64>>,
}

impl TimeSeries {
    pub fn new(index: Vec<DateTime<Utc>>) -> Result<Self, DataError> {
        if index.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DataError::InvalidSeries(
                "index must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            index,
            components: IndexMap::new(),
        })
    }

    pub fn from_samples(name: impl Into<String>, samples: &[Sample]) -> Result<Self, DataError> {
        let index = samples.iter().map(|x| x.date).collect();
        let values = samples.iter().map(|x| x.value).collect();
        Self::new(index)?.with_component(name, values)
    }

    pub fn with_component(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, DataError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(DataError::InvalidSeries(format!(
                "component {name} has {} values for {} dates",
                values.len(),
                self.index.len()
            )));
        }
        self.components.insert(name, values);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn component(&self, name: &str) -> Option<Vec<Sample>> {
        self.components.get(name).map(|values| self.zip(values))
    }

    pub fn first_component(&self) -> Option<(&str, Vec<Sample>)> {
        self.components
            .first()
            .map(|(name, values)| (name.as_str(), self.zip(values)))
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, Vec<Sample>)> + '_ {
        self.components
            .iter()
            .map(|(name, values)| (name.as_str(), self.zip(values)))
    }

    fn zip(&self, values: &[f64]) -> Vec<Sample> {
        self.index
            .iter()
            .zip(values)
            .map(|(date, value)| Sample::new(*date, *value))
            .collect()
    }
}

pub type SignalSet = IndexMap<String, TimeSeries>;

pub type MarkerMap = IndexMap<String, Vec<Marker>>;

pub fn negate(series: &[Sample]) -> Vec<Sample> {
    series.iter().map(|x| x.negated()).collect()
}

pub fn sort_by_start(markers: &mut [Marker]) {
    markers.sort_by(|a, b| a.start_date.cmp(&b.start_date));
}

pub fn window(
    series: &[Sample],
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
) -> Vec<Sample> {
    series
        .iter()
        .filter(|x| in_window(x.date, start, stop))
        .copied()
        .collect()
}

pub(crate) fn in_window(
    date: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
) -> bool {
    start.is_none_or(|s| date >= s) && stop.is_none_or(|s| date <= s)
}
