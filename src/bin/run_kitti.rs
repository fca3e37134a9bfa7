//! Evaluate trackers on a KITTI 2D box dataset.
//!
//! Example:
//!     run-kitti --USE_PARALLEL False --METRICS MaxSim --TRACKERS_TO_EVAL CIWT

fn main() -> anyhow::Result<()> {
    track_eval::cli::run_kitti()
}
