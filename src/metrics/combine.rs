//! Combination policies for reducing per-frame and per-sequence scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MetricError;

/// How a list of scores is reduced to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinePolicy {
    Max,
    Average,
    Sum,
}

impl CombinePolicy {
    /// Default of the configurable metric path.
    pub const CANONICAL_DEFAULT: CombinePolicy = CombinePolicy::Max;
    /// Default of the flat construction path.
    pub const FLAT_DEFAULT: CombinePolicy = CombinePolicy::Average;

    pub fn as_str(self) -> &'static str {
        match self {
            CombinePolicy::Max => "max",
            CombinePolicy::Average => "average",
            CombinePolicy::Sum => "sum",
        }
    }

    /// Reduce `values`, or `None` when there is nothing to reduce.
    pub fn combine(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let combined = match self {
            CombinePolicy::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CombinePolicy::Average => values.iter().sum::<f64>() / values.len() as f64,
            CombinePolicy::Sum => values.iter().sum(),
        };
        Some(combined)
    }
}

impl FromStr for CombinePolicy {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(CombinePolicy::Max),
            "average" => Ok(CombinePolicy::Average),
            "sum" => Ok(CombinePolicy::Sum),
            other => Err(MetricError::UnknownCombinationPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for CombinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MAXIMA: [f64; 3] = [0.5, 0.9, 0.4];

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_max() {
        assert_eq!(CombinePolicy::Max.combine(&FRAME_MAXIMA), Some(0.9));
    }

    #[test]
    fn test_average() {
        let avg = CombinePolicy::Average.combine(&FRAME_MAXIMA).expect("non-empty");
        assert!(approx(avg, 0.6), "got {avg}");
    }

    #[test]
    fn test_sum() {
        let sum = CombinePolicy::Sum.combine(&FRAME_MAXIMA).expect("non-empty");
        assert!(approx(sum, 1.8), "got {sum}");
    }

    #[test]
    fn test_empty_input_has_no_result() {
        for policy in [CombinePolicy::Max, CombinePolicy::Average, CombinePolicy::Sum] {
            assert_eq!(policy.combine(&[]), None);
        }
    }

    #[test]
    fn test_order_independent() {
        let reversed: Vec<f64> = FRAME_MAXIMA.iter().rev().copied().collect();
        for policy in [CombinePolicy::Max, CombinePolicy::Average, CombinePolicy::Sum] {
            let a = policy.combine(&FRAME_MAXIMA).expect("non-empty");
            let b = policy.combine(&reversed).expect("non-empty");
            assert!(approx(a, b));
        }
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!("max".parse::<CombinePolicy>(), Ok(CombinePolicy::Max));
        assert_eq!("average".parse::<CombinePolicy>(), Ok(CombinePolicy::Average));
        assert_eq!("sum".parse::<CombinePolicy>(), Ok(CombinePolicy::Sum));
        assert_eq!(
            "median".parse::<CombinePolicy>(),
            Err(MetricError::UnknownCombinationPolicy("median".to_string()))
        );
    }

    #[test]
    fn test_defaults_differ_by_construction_path() {
        assert_eq!(CombinePolicy::CANONICAL_DEFAULT, CombinePolicy::Max);
        assert_eq!(CombinePolicy::FLAT_DEFAULT, CombinePolicy::Average);
    }
}
