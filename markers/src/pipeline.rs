use tracing::info;

use crate::aggregator::MarkerAggregator;
use crate::config::PipelineConfig;
use crate::constant::DataError;
use crate::detector::Detector;
use crate::marker::Marker;
use crate::series::{sort_by_start, MarkerMap, SignalSet};

#[derive(Debug, Clone, Default)]
pub struct MarkerPipeline {
    detectors: Vec<Detector>,
    aggregator: MarkerAggregator,
}

impl MarkerPipeline {
    pub fn new(detectors: Vec<Detector>, aggregator: MarkerAggregator) -> Self {
        Self {
            detectors,
            aggregator,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, DataError> {
        let detectors = config
            .detectors
            .iter()
            .map(Detector::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        let aggregator = MarkerAggregator::from_config(&config.aggregator)?;
        Ok(Self::new(detectors, aggregator))
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn aggregator(&self) -> &MarkerAggregator {
        &self.aggregator
    }

    pub fn detect(&self, input: &SignalSet) -> MarkerMap {
        let outputs = self.detectors.iter().map(|x| x.get_markers(input)).collect();
        combine(outputs)
    }

    pub fn detect_parallel(&self, input: &SignalSet) -> Result<MarkerMap, DataError> {
        let jobs = self
            .detectors
            .iter()
            .map(|detector| move || detector.get_markers(input))
            .collect();
        Ok(combine(run_scoped(jobs)?))
    }

    pub fn run(&self, input: &SignalSet) -> Result<Vec<Marker>, DataError> {
        let detected = self.detect(input);
        let markers = self.aggregator.aggregate(&detected)?;
        info!(
            signals = detected.len(),
            markers = markers.len(),
            "marker pipeline finished"
        );
        Ok(markers)
    }
}

fn run_scoped<T, F>(jobs: Vec<F>) -> Result<Vec<T>, DataError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| scope.spawn(move |_| job()))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| std::io::Error::other("detector worker panicked"))
            })
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| std::io::Error::other("detector scope panicked"))?
    .map_err(DataError::from)
}

fn combine(outputs: Vec<MarkerMap>) -> MarkerMap {
    let mut combined = MarkerMap::new();
    for output in outputs {
        for (signal, markers) in output {
            let entry = combined.entry(signal).or_default();
            entry.extend(markers);
            sort_by_start(entry);
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    type Job = Box<dyn FnOnce() -> usize + Send>;

    #[test]
    fn scoped_jobs_keep_submission_order() {
        let jobs: Vec<Job> = (0..4usize)
            .map(|i| Box::new(move || i * 10) as Job)
            .collect();
        let out = run_scoped(jobs).expect("no job panics");
        assert_eq!(out, vec![0, 10, 20, 30]);
    }

    #[test]
    fn panicking_job_is_an_error() {
        let ok: Job = Box::new(|| 1);
        let failing: Job = Box::new(|| -> usize { panic!("detector failed") });
        let err = run_scoped(vec![ok, failing]).expect_err("panic must surface");
        assert!(matches!(err, DataError::Io(_)));
    }
}
