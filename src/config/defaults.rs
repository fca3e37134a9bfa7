//! Default schemas for the evaluator and the supported datasets.

use super::schema::ConfigMap;
use super::value::{ConfigValue, ValueKind};

/// Evaluator defaults.
pub fn default_eval_config() -> ConfigMap {
    ConfigMap::new()
        .declare("USE_PARALLEL", ValueKind::Bool, ConfigValue::Bool(false))
        .declare("NUM_PARALLEL_CORES", ValueKind::Int, ConfigValue::Int(8))
        .declare("BREAK_ON_ERROR", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("RETURN_ON_ERROR", ValueKind::Bool, ConfigValue::Bool(false))
        .declare("LOG_ON_ERROR", ValueKind::Text, ConfigValue::Null)
        .declare("PRINT_RESULTS", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("PRINT_ONLY_COMBINED", ValueKind::Bool, ConfigValue::Bool(false))
        .declare("PRINT_CONFIG", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("TIME_PROGRESS", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("DISPLAY_LESS_PROGRESS", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("OUTPUT_SUMMARY", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("OUTPUT_DETAILED", ValueKind::Bool, ConfigValue::Bool(true))
}

/// MOT Challenge 2D bounding-box dataset defaults.
pub fn default_mot_challenge_config() -> ConfigMap {
    ConfigMap::new()
        .declare("GT_FOLDER", ValueKind::Text, ConfigValue::text("data/gt/mot_challenge/"))
        .declare(
            "TRACKERS_FOLDER",
            ValueKind::Text,
            ConfigValue::text("data/trackers/mot_challenge/"),
        )
        .declare("OUTPUT_FOLDER", ValueKind::Text, ConfigValue::Null)
        .declare("TRACKERS_TO_EVAL", ValueKind::List, ConfigValue::Null)
        .declare("CLASSES_TO_EVAL", ValueKind::List, ConfigValue::list(["pedestrian"]))
        .declare("BENCHMARK", ValueKind::Text, ConfigValue::text("MOT17"))
        .declare("SPLIT_TO_EVAL", ValueKind::Text, ConfigValue::text("train"))
        .declare("INPUT_AS_ZIP", ValueKind::Bool, ConfigValue::Bool(false))
        .declare("PRINT_CONFIG", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("DO_PREPROC", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("TRACKER_SUB_FOLDER", ValueKind::Text, ConfigValue::text("data"))
        .declare("OUTPUT_SUB_FOLDER", ValueKind::Text, ConfigValue::text(""))
        .declare("TRACKER_DISPLAY_NAMES", ValueKind::List, ConfigValue::Null)
        .declare("SEQMAP_FOLDER", ValueKind::Text, ConfigValue::Null)
        .declare("SEQMAP_FILE", ValueKind::Text, ConfigValue::Null)
        .declare("SEQ_INFO", ValueKind::Map, ConfigValue::Null)
        .declare("GT_LOC_FORMAT", ValueKind::Text, ConfigValue::text("{gt_folder}/{seq}/gt/gt.txt"))
        .declare("SKIP_SPLIT_FOL", ValueKind::Bool, ConfigValue::Bool(false))
}

/// KITTI 2D bounding-box dataset defaults.
pub fn default_kitti_config() -> ConfigMap {
    ConfigMap::new()
        .declare("GT_FOLDER", ValueKind::Text, ConfigValue::text("data/gt/kitti/kitti_2d_box_train"))
        .declare(
            "TRACKERS_FOLDER",
            ValueKind::Text,
            ConfigValue::text("data/trackers/kitti/kitti_2d_box_train/"),
        )
        .declare("OUTPUT_FOLDER", ValueKind::Text, ConfigValue::Null)
        .declare("TRACKERS_TO_EVAL", ValueKind::List, ConfigValue::Null)
        .declare("CLASSES_TO_EVAL", ValueKind::List, ConfigValue::list(["car", "pedestrian"]))
        .declare("SPLIT_TO_EVAL", ValueKind::Text, ConfigValue::text("training"))
        .declare("INPUT_AS_ZIP", ValueKind::Bool, ConfigValue::Bool(false))
        .declare("PRINT_CONFIG", ValueKind::Bool, ConfigValue::Bool(true))
        .declare("TRACKER_SUB_FOLDER", ValueKind::Text, ConfigValue::text("data"))
        .declare("OUTPUT_SUB_FOLDER", ValueKind::Text, ConfigValue::text(""))
        .declare("TRACKER_DISPLAY_NAMES", ValueKind::List, ConfigValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_fits_its_kind() {
        for config in [default_eval_config(), default_mot_challenge_config(), default_kitti_config()]
        {
            for (key, entry) in config.iter() {
                assert!(entry.kind.admits(&entry.value), "{key} default does not fit");
            }
        }
    }

    #[test]
    fn test_seq_info_is_a_map_key() {
        assert_eq!(default_mot_challenge_config().kind("SEQ_INFO"), Some(ValueKind::Map));
        assert!(!default_kitti_config().contains_key("SEQ_INFO"));
    }
}
