use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use markers::utils::parse_datetime;
use markers::{
    init_debug_logging, init_logging, write_markers_csv, write_markers_parquet, MarkerPipeline,
    PipelineConfig, SignalSet, TimeSeries,
};
use tracing::info;

const USAGE: &str = concat!(
    "usage: cargo run -q -p detect -- <config.yaml|config.json> <signal=series.csv>... ",
    "[--out markers.csv|markers.parquet] [--parallel] [--verbose]",
);

struct Args {
    config: PathBuf,
    signals: Vec<(String, PathBuf)>,
    out: Option<PathBuf>,
    parallel: bool,
    verbose: bool,
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut raw = std::env::args().skip(1);
    let config = raw.next().map(PathBuf::from).ok_or(USAGE)?;
    let mut args = Args {
        config,
        signals: Vec::new(),
        out: None,
        parallel: false,
        verbose: false,
    };

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--out" => args.out = Some(raw.next().map(PathBuf::from).ok_or(USAGE)?),
            "--parallel" => args.parallel = true,
            "--verbose" => args.verbose = true,
            _ => {
                let (name, path) = arg.split_once('=').ok_or(USAGE)?;
                args.signals.push((name.to_string(), PathBuf::from(path)));
            }
        }
    }
    if args.signals.is_empty() {
        return Err(USAGE.into());
    }
    Ok(args)
}

/// Reads a CSV whose first column is the date and every other column a
/// numeric component. Empty cells become `NaN`.
fn load_series(path: &Path) -> Result<TimeSeries, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut index: Vec<DateTime<Utc>> = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for row in reader.records() {
        let row = row?;
        let date = row.get(0).ok_or("missing date column")?;
        index.push(parse_datetime(date)?);
        for (column, cell) in columns.iter_mut().zip(row.iter().skip(1)) {
            let cell = cell.trim();
            column.push(if cell.is_empty() { f64::NAN } else { cell.parse()? });
        }
    }

    let mut series = TimeSeries::new(index)?;
    for (name, values) in names.into_iter().zip(columns) {
        series = series.with_component(name, values)?;
    }
    Ok(series)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;
    if args.verbose {
        init_debug_logging();
    } else {
        init_logging();
    }

    let config = PipelineConfig::from_file(&args.config)?;
    let pipeline = MarkerPipeline::from_config(&config)?;

    let mut input = SignalSet::new();
    for (name, path) in &args.signals {
        let series = load_series(path)?;
        let components: Vec<&str> = series.component_names().collect();
        info!(
            signal = name.as_str(),
            samples = series.len(),
            components = ?components,
            "series loaded"
        );
        input.insert(name.clone(), series);
    }

    let markers = if args.parallel {
        let detected = pipeline.detect_parallel(&input)?;
        pipeline.aggregator().aggregate(&detected)?
    } else {
        pipeline.run(&input)?
    };

    match args.out {
        Some(path) if path.extension().and_then(|x| x.to_str()) == Some("parquet") => {
            write_markers_parquet(&path, &markers)?
        }
        Some(path) => write_markers_csv(std::fs::File::create(path)?, &markers)?,
        None => write_markers_csv(io::stdout().lock(), &markers)?,
    }
    Ok(())
}
