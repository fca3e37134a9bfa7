//! Dataset backed by precomputed similarity files.
//!
//! Layout: `{TRACKERS_FOLDER}/{tracker}/{TRACKER_SUB_FOLDER}/{sequence}.json`,
//! each file holding `num_tracker_dets`, `num_gt_dets` and
//! `similarity_scores` (one row-major matrix per frame).

use nalgebra::DMatrix;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::Dataset;
use crate::config::{log_config, require_keys, ConfigMap};
use crate::error::{EvalError, EvalResult};
use crate::metrics::SequenceData;

const REQUIRED_KEYS: [&str; 2] = ["TRACKERS_FOLDER", "TRACKER_SUB_FOLDER"];

#[derive(Debug, Deserialize)]
struct RawSequence {
    num_tracker_dets: usize,
    num_gt_dets: usize,
    #[serde(default)]
    similarity_scores: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone)]
pub struct PrecomputedDataset {
    name: String,
    trackers_folder: PathBuf,
    sub_folder: String,
    output_folder: PathBuf,
    output_sub_folder: String,
    trackers: Vec<String>,
    display_names: Vec<String>,
    sequences: Vec<String>,
}

impl PrecomputedDataset {
    pub fn new(name: &str, config: &ConfigMap) -> EvalResult<Self> {
        require_keys(config, name, &REQUIRED_KEYS)?;
        if matches!(config.get_bool("PRINT_CONFIG"), Ok(true)) {
            log_config(config, name);
        }

        let trackers_folder = config
            .get_text("TRACKERS_FOLDER")?
            .map(PathBuf::from)
            .ok_or_else(|| dataset_error(name, "TRACKERS_FOLDER is not set"))?;
        let sub_folder = config.get_text("TRACKER_SUB_FOLDER")?.unwrap_or("").to_string();
        let output_folder = optional_text(config, "OUTPUT_FOLDER")?
            .map_or_else(|| trackers_folder.clone(), PathBuf::from);
        let output_sub_folder = optional_text(config, "OUTPUT_SUB_FOLDER")?.unwrap_or_default();

        let trackers = match optional_list(config, "TRACKERS_TO_EVAL")? {
            Some(list) => list,
            None => list_dirs(&trackers_folder).map_err(|e| dataset_error(name, e))?,
        };
        if trackers.is_empty() {
            return Err(dataset_error(
                name,
                format!("no trackers found in {}", trackers_folder.display()),
            ));
        }

        let display_names = match optional_list(config, "TRACKER_DISPLAY_NAMES")? {
            None => trackers.clone(),
            Some(names) if names.len() == trackers.len() => names,
            Some(_) => {
                return Err(dataset_error(
                    name,
                    "List of tracker files and tracker display names do not match.",
                ));
            }
        };

        let seq_info =
            if config.contains_key("SEQ_INFO") { config.get_map("SEQ_INFO")? } else { None };
        let first_tracker_folder = trackers_folder.join(&trackers[0]).join(&sub_folder);
        let sequences: Vec<String> = match seq_info {
            Some(seq_info) => seq_info.keys().cloned().collect(),
            None => list_json_stems(&first_tracker_folder).map_err(|e| dataset_error(name, e))?,
        };
        if sequences.is_empty() {
            return Err(dataset_error(
                name,
                format!("no sequences found in {}", first_tracker_folder.display()),
            ));
        }

        tracing::debug!(
            "{}: {} trackers, {} sequences",
            name,
            trackers.len(),
            sequences.len()
        );

        Ok(Self {
            name: name.to_string(),
            trackers_folder,
            sub_folder,
            output_folder,
            output_sub_folder,
            trackers,
            display_names,
            sequences,
        })
    }

    fn sequence_path(&self, tracker: &str, sequence: &str) -> PathBuf {
        self.trackers_folder.join(tracker).join(&self.sub_folder).join(format!("{}.json", sequence))
    }
}

impl Dataset for PrecomputedDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn trackers(&self) -> &[String] {
        &self.trackers
    }

    fn sequences(&self) -> &[String] {
        &self.sequences
    }

    fn display_name(&self, tracker: &str) -> String {
        self.trackers
            .iter()
            .position(|t| t == tracker)
            .map(|idx| self.display_names[idx].clone())
            .unwrap_or_else(|| tracker.to_string())
    }

    fn output_folder(&self, tracker: &str) -> Option<PathBuf> {
        Some(self.output_folder.join(tracker).join(&self.output_sub_folder))
    }

    fn load_sequence(&self, tracker: &str, sequence: &str) -> EvalResult<SequenceData> {
        let path = self.sequence_path(tracker, sequence);
        let content = fs::read_to_string(&path)
            .map_err(|e| dataset_error(&self.name, format!("{}: {}", path.display(), e)))?;
        let raw: RawSequence = serde_json::from_str(&content)
            .map_err(|e| dataset_error(&self.name, format!("{}: {}", path.display(), e)))?;

        let similarity_scores = raw
            .similarity_scores
            .iter()
            .enumerate()
            .map(|(frame, rows)| {
                to_matrix(rows).map_err(|e| {
                    dataset_error(&self.name, format!("{} frame {}: {}", path.display(), frame, e))
                })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        Ok(SequenceData {
            num_tracker_dets: raw.num_tracker_dets,
            num_gt_dets: raw.num_gt_dets,
            similarity_scores,
        })
    }
}

/// Row-major nested rows into a matrix. No rows means a 0x0 matrix.
fn to_matrix(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, String> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(format!("row {} has {} columns, expected {}", bad, rows[bad].len(), ncols));
    }
    Ok(DMatrix::from_row_iterator(rows.len(), ncols, rows.iter().flatten().copied()))
}

fn optional_list(config: &ConfigMap, key: &str) -> EvalResult<Option<Vec<String>>> {
    if !config.contains_key(key) {
        return Ok(None);
    }
    Ok(config.get_list(key)?.map(<[String]>::to_vec))
}

fn optional_text(config: &ConfigMap, key: &str) -> EvalResult<Option<String>> {
    if !config.contains_key(key) {
        return Ok(None);
    }
    Ok(config.get_text(key)?.map(str::to_string))
}

fn list_dirs(folder: &Path) -> Result<Vec<String>, String> {
    let entries = fs::read_dir(folder).map_err(|e| format!("{}: {}", folder.display(), e))?;
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("{}: {}", folder.display(), e))?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }
    }
    Ok(names.into_iter().collect())
}

fn list_json_stems(folder: &Path) -> Result<Vec<String>, String> {
    let entries = fs::read_dir(folder).map_err(|e| format!("{}: {}", folder.display(), e))?;
    let mut stems = BTreeSet::new();
    for entry in entries {
        let path = entry.map_err(|e| format!("{}: {}", folder.display(), e))?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.insert(stem.to_string());
            }
        }
    }
    Ok(stems.into_iter().collect())
}

fn dataset_error(dataset: &str, message: impl ToString) -> EvalError {
    EvalError::Dataset { dataset: dataset.to_string(), message: message.to_string() }
}
