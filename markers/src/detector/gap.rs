use crate::config::DetectorConfig;
use crate::constant::{DataError, DetectorKind, MarkerType};
use crate::detector::{require, DateWindow, MarkerDetector};
use crate::marker::Marker;
use crate::series::TimeSeries;
use crate::utils::{days_between, midpoint};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapDetector {
    pub signals: Vec<String>,
    pub window: DateWindow,
    pub min_gap_duration: f64,
}

impl GapDetector {
    pub fn from_config(config: &DetectorConfig) -> Result<Self, DataError> {
        Ok(Self {
            signals: config.signals.clone(),
            window: DateWindow::from_config(config),
            min_gap_duration: require(
                config.min_gap_duration,
                DetectorKind::Gap,
                "min_gap_duration",
            )?,
        })
    }
}

impl MarkerDetector for GapDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Gap
    }

    fn signals(&self) -> &[String] {
        &self.signals
    }

    fn detect(&self, series: &TimeSeries) -> Vec<Marker> {
        let Some((_, samples)) = series.first_component() else {
            return Vec::new();
        };
        let valid: Vec<_> = samples.into_iter().filter(|x| x.value.is_finite()).collect();

        valid
            .windows(2)
            .filter(|pair| days_between(pair[0].date, pair[1].date) > self.min_gap_duration)
            .filter(|pair| {
                self.window.start_date.is_none_or(|s| pair[1].date >= s)
                    && self.window.stop_date.is_none_or(|s| pair[0].date <= s)
            })
            .map(|pair| {
                let (before, after) = (pair[0], pair[1]);
                Marker::spanning(
                    before.date,
                    midpoint(before.date, after.date),
                    after.date,
                    [before.value, (before.value + after.value) / 2.0, after.value],
                    MarkerType::Gap,
                )
            })
            .collect()
    }
}
