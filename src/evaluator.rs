//! Evaluation driver: every dataset, tracker and sequence through every
//! selected metric.

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::defaults::default_eval_config;
use crate::config::{init_config, ConfigMap};
use crate::dataset::Dataset;
use crate::error::{EvalError, EvalResult};
use crate::metrics::{Metric, MetricResult};

/// Key under which a tracker's cross-sequence result is stored.
pub const COMBINED_SEQ: &str = "COMBINED_SEQ";

const SUMMARY_FILE: &str = "summary.txt";
const DETAILED_FILE: &str = "detailed.csv";

/// Metric name to (sequence name or [`COMBINED_SEQ`]) to result.
pub type TrackerResults = BTreeMap<String, BTreeMap<String, MetricResult>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerFailure {
    pub dataset: String,
    pub tracker: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct EvalOutput {
    /// Dataset name to tracker name to results.
    pub results: BTreeMap<String, BTreeMap<String, TrackerResults>>,
    pub failures: Vec<TrackerFailure>,
}

#[derive(Debug, Clone)]
struct Settings {
    use_parallel: bool,
    num_parallel_cores: usize,
    break_on_error: bool,
    return_on_error: bool,
    log_on_error: Option<PathBuf>,
    print_results: bool,
    print_only_combined: bool,
    time_progress: bool,
    display_less_progress: bool,
    output_summary: bool,
    output_detailed: bool,
}

impl Settings {
    fn from_config(config: &ConfigMap) -> EvalResult<Self> {
        Ok(Self {
            use_parallel: config.get_bool("USE_PARALLEL")?,
            num_parallel_cores: config.get_int("NUM_PARALLEL_CORES")?.max(1) as usize,
            break_on_error: config.get_bool("BREAK_ON_ERROR")?,
            return_on_error: config.get_bool("RETURN_ON_ERROR")?,
            log_on_error: config.get_text("LOG_ON_ERROR")?.map(PathBuf::from),
            print_results: config.get_bool("PRINT_RESULTS")?,
            print_only_combined: config.get_bool("PRINT_ONLY_COMBINED")?,
            time_progress: config.get_bool("TIME_PROGRESS")?,
            display_less_progress: config.get_bool("DISPLAY_LESS_PROGRESS")?,
            output_summary: config.get_bool("OUTPUT_SUMMARY")?,
            output_detailed: config.get_bool("OUTPUT_DETAILED")?,
        })
    }
}

pub struct Evaluator {
    settings: Settings,
}

impl Evaluator {
    /// Build from an evaluator config; missing keys take their defaults.
    pub fn new(config: Option<&ConfigMap>) -> EvalResult<Self> {
        let config = init_config(config, default_eval_config(), "Eval");
        Ok(Self { settings: Settings::from_config(&config)? })
    }

    /// Evaluate every tracker of every dataset with every metric.
    ///
    /// A failing tracker is appended to `LOG_ON_ERROR` when set. It then ends
    /// the run with its error under `BREAK_ON_ERROR`, ends it early with the
    /// results so far under `RETURN_ON_ERROR`, or is recorded in
    /// [`EvalOutput::failures`].
    pub fn evaluate(
        &self,
        datasets: &[Box<dyn Dataset>],
        metrics: &[Box<dyn Metric>],
    ) -> EvalResult<EvalOutput> {
        if metrics.is_empty() {
            return Err(EvalError::NoMetricsSelected);
        }

        let pool = if self.settings.use_parallel {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.settings.num_parallel_cores)
                    .build()?,
            )
        } else {
            None
        };

        let metric_names: Vec<&str> = metrics.iter().map(|m| m.name()).collect();
        let mut output = EvalOutput::default();

        for dataset in datasets {
            tracing::info!(
                "Evaluating {} tracker(s) on {} sequence(s) of {}, metrics: {}",
                dataset.trackers().len(),
                dataset.sequences().len(),
                dataset.name(),
                metric_names.join(", ")
            );

            let mut dataset_results = BTreeMap::new();
            for tracker in dataset.trackers() {
                let started = Instant::now();
                let outcome = self
                    .eval_tracker(pool.as_ref(), dataset.as_ref(), tracker, metrics)
                    .and_then(|results| {
                        if self.settings.time_progress {
                            tracing::info!(
                                "All sequences for {} finished in {:.2} seconds",
                                tracker,
                                started.elapsed().as_secs_f64()
                            );
                        }
                        self.report(dataset.as_ref(), tracker, metrics, &results)?;
                        Ok(results)
                    });

                match outcome {
                    Ok(results) => {
                        dataset_results.insert(tracker.clone(), results);
                    }
                    Err(err) => {
                        tracing::error!("Tracker {} failed on {}: {}", tracker, dataset.name(), err);
                        self.log_failure(dataset.name(), tracker, &err);
                        if self.settings.break_on_error {
                            return Err(err);
                        }
                        output.failures.push(TrackerFailure {
                            dataset: dataset.name().to_string(),
                            tracker: tracker.clone(),
                            message: err.to_string(),
                        });
                        if self.settings.return_on_error {
                            output.results.insert(dataset.name().to_string(), dataset_results);
                            return Ok(output);
                        }
                    }
                }
            }
            output.results.insert(dataset.name().to_string(), dataset_results);
        }
        Ok(output)
    }

    fn eval_tracker(
        &self,
        pool: Option<&ThreadPool>,
        dataset: &dyn Dataset,
        tracker: &str,
        metrics: &[Box<dyn Metric>],
    ) -> EvalResult<TrackerResults> {
        let sequences = dataset.sequences();
        if sequences.is_empty() {
            return Err(EvalError::Dataset {
                dataset: dataset.name().to_string(),
                message: format!("no sequences to evaluate for tracker {}", tracker),
            });
        }

        let per_sequence: Vec<Vec<MetricResult>> = match pool {
            Some(pool) => pool.install(|| {
                sequences
                    .par_iter()
                    .map(|seq| self.eval_sequence(dataset, tracker, seq, metrics))
                    .collect::<EvalResult<Vec<_>>>()
            })?,
            None => sequences
                .iter()
                .map(|seq| self.eval_sequence(dataset, tracker, seq, metrics))
                .collect::<EvalResult<Vec<_>>>()?,
        };

        let mut results = TrackerResults::new();
        for (idx, metric) in metrics.iter().enumerate() {
            let mut by_sequence: BTreeMap<String, MetricResult> = sequences
                .iter()
                .zip(&per_sequence)
                .map(|(seq, res)| (seq.clone(), res[idx].clone()))
                .collect();
            let combined = metric.combine_sequences(&by_sequence)?;
            by_sequence.insert(COMBINED_SEQ.to_string(), combined);
            results.insert(metric.name().to_string(), by_sequence);
        }
        Ok(results)
    }

    fn eval_sequence(
        &self,
        dataset: &dyn Dataset,
        tracker: &str,
        sequence: &str,
        metrics: &[Box<dyn Metric>],
    ) -> EvalResult<Vec<MetricResult>> {
        let data = dataset.load_sequence(tracker, sequence)?;
        let results = metrics
            .iter()
            .map(|metric| metric.eval_sequence(&data).map_err(EvalError::from))
            .collect::<EvalResult<Vec<_>>>()?;

        if self.settings.display_less_progress {
            tracing::debug!("{} / {} done", tracker, sequence);
        } else {
            tracing::info!("{} / {} done", tracker, sequence);
        }
        Ok(results)
    }

    /// Print and write one tracker's results as configured.
    fn report(
        &self,
        dataset: &dyn Dataset,
        tracker: &str,
        metrics: &[Box<dyn Metric>],
        results: &TrackerResults,
    ) -> EvalResult<()> {
        if self.settings.print_results {
            print_results(
                &dataset.display_name(tracker),
                results,
                metrics,
                self.settings.print_only_combined,
            );
        }
        let Some(folder) = dataset.output_folder(tracker) else {
            return Ok(());
        };
        if self.settings.output_summary {
            write_file(&folder.join(SUMMARY_FILE), &summary_text(results, metrics))?;
        }
        if self.settings.output_detailed {
            let text = detailed_csv(dataset.sequences(), results, metrics);
            write_file(&folder.join(DETAILED_FILE), &text)?;
        }
        Ok(())
    }

    fn log_failure(&self, dataset: &str, tracker: &str, err: &EvalError) {
        let Some(path) = &self.settings.log_on_error else {
            return;
        };
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}\n{}\n{}\n\n\n", dataset, tracker, err));
        if let Err(e) = appended {
            tracing::warn!("Could not append to error log {}: {}", path.display(), e);
        }
    }
}

fn print_results(
    tracker: &str,
    results: &TrackerResults,
    metrics: &[Box<dyn Metric>],
    only_combined: bool,
) {
    for metric in metrics {
        let Some(by_sequence) = results.get(metric.name()) else {
            continue;
        };
        let fields = metric.fields();

        println!();
        let header: String = fields.iter().map(|f| format!("{:>12}", f)).collect();
        println!("{:<32}{}", format!("{}: {}", metric.name(), tracker), header);

        let print_row = |name: &str, res: Option<&MetricResult>| {
            let values: String = fields
                .iter()
                .map(|f| format!("{:>12.4}", res.and_then(|r| r.get(f)).unwrap_or(f64::NAN)))
                .collect();
            println!("{:<32}{}", name, values);
        };
        if !only_combined {
            for (seq, res) in by_sequence.iter().filter(|(seq, _)| *seq != COMBINED_SEQ) {
                print_row(seq, Some(res));
            }
        }
        print_row("COMBINED", by_sequence.get(COMBINED_SEQ));
    }
}

/// Every metric's fields, in metric order.
fn columns(metrics: &[Box<dyn Metric>]) -> Vec<&'static str> {
    metrics.iter().flat_map(|m| m.fields().iter().copied()).collect()
}

fn row_values(results: &TrackerResults, metrics: &[Box<dyn Metric>], sequence: &str) -> Vec<String> {
    metrics
        .iter()
        .flat_map(|metric| {
            let res = results.get(metric.name()).and_then(|by_seq| by_seq.get(sequence));
            metric
                .fields()
                .iter()
                .map(move |f| res.and_then(|r| r.get(f)).map_or_else(String::new, |v| v.to_string()))
        })
        .collect()
}

/// Field names on one line, combined values on the next.
fn summary_text(results: &TrackerResults, metrics: &[Box<dyn Metric>]) -> String {
    format!(
        "{}\n{}\n",
        columns(metrics).join(" "),
        row_values(results, metrics, COMBINED_SEQ).join(" ")
    )
}

/// One row per sequence, then the combined row.
fn detailed_csv(sequences: &[String], results: &TrackerResults, metrics: &[Box<dyn Metric>]) -> String {
    let mut out = format!("seq,{}\n", columns(metrics).join(","));
    for seq in sequences {
        out.push_str(&format!("{},{}\n", seq, row_values(results, metrics, seq).join(",")));
    }
    out.push_str(&format!("COMBINED,{}\n", row_values(results, metrics, COMBINED_SEQ).join(",")));
    out
}

fn write_file(path: &Path, contents: &str) -> EvalResult<()> {
    let io_error = |source| EvalError::Output { path: path.display().to_string(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}
