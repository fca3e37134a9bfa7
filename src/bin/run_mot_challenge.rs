//! Evaluate trackers on a MOT Challenge style dataset.
//!
//! Example:
//!     run-mot-challenge --USE_PARALLEL False --METRICS MaxSim --TRACKERS_TO_EVAL MPNTrack

fn main() -> anyhow::Result<()> {
    track_eval::cli::run_mot_challenge()
}
