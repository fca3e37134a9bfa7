//! Dataset layer
//!
//! A dataset names the trackers and sequences to evaluate and produces the
//! per-sequence evidence metrics consume. How similarity matrices are
//! computed is up to the dataset; [`PrecomputedDataset`] reads matrices that
//! were computed ahead of time.

use std::path::PathBuf;

use crate::error::EvalResult;
use crate::metrics::SequenceData;

pub mod precomputed;

pub use precomputed::PrecomputedDataset;

pub trait Dataset: Send + Sync {
    fn name(&self) -> &str;

    /// Trackers to evaluate, in evaluation order.
    fn trackers(&self) -> &[String];

    /// Sequences every tracker is evaluated on.
    fn sequences(&self) -> &[String];

    /// Name shown for `tracker` in results.
    fn display_name(&self, tracker: &str) -> String {
        tracker.to_string()
    }

    /// Where result files for `tracker` are written. `None` writes nothing.
    fn output_folder(&self, _tracker: &str) -> Option<PathBuf> {
        None
    }

    fn load_sequence(&self, tracker: &str, sequence: &str) -> EvalResult<SequenceData>;
}
