//! Score → intensity tier classification.

use crate::domain::{ActivityRecord, IntensityTier};

const LOW_FLOOR: u64 = 1;
const MEDIUM_FLOOR: u64 = 5;
const HIGH_FLOOR: u64 = 10;
const VERY_HIGH_FLOOR: u64 = 20;

/// Classify a heatmap cell. Missing cells are empty.
pub fn classify(record: Option<&ActivityRecord>) -> IntensityTier {
    record.map_or(IntensityTier::Empty, |record| tier_for_score(record.score))
}

/// Tier for a raw score.
pub fn tier_for_score(score: u64) -> IntensityTier {
    match score {
        0 => IntensityTier::Empty,
        s if s < MEDIUM_FLOOR => IntensityTier::Low,
        s if s < HIGH_FLOOR => IntensityTier::Medium,
        s if s < VERY_HIGH_FLOOR => IntensityTier::High,
        _ => IntensityTier::VeryHigh,
    }
}

/// Smallest score that lands in `tier`.
pub fn tier_floor(tier: IntensityTier) -> u64 {
    match tier {
        IntensityTier::Empty => 0,
        IntensityTier::Low => LOW_FLOOR,
        IntensityTier::Medium => MEDIUM_FLOOR,
        IntensityTier::High => HIGH_FLOOR,
        IntensityTier::VeryHigh => VERY_HIGH_FLOOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(score: u64) -> ActivityRecord {
        ActivityRecord::new(NaiveDate::from_ymd_opt(2025, 2, 20).expect("date"), score)
    }

    #[test]
    fn missing_record_is_empty() {
        assert_eq!(classify(None), IntensityTier::Empty);
    }

    #[test]
    fn documented_thresholds() {
        let cases = [
            (0, IntensityTier::Empty),
            (1, IntensityTier::Low),
            (4, IntensityTier::Low),
            (5, IntensityTier::Medium),
            (9, IntensityTier::Medium),
            (10, IntensityTier::High),
            (19, IntensityTier::High),
            (20, IntensityTier::VeryHigh),
            (1000, IntensityTier::VeryHigh),
            (u64::MAX, IntensityTier::VeryHigh),
        ];
        for (score, expected) in cases {
            assert_eq!(classify(Some(&record(score))), expected, "score {score}");
        }
    }

    #[test]
    fn classification_is_monotonic() {
        let mut previous = IntensityTier::Empty;
        for score in 0..=40 {
            let tier = tier_for_score(score);
            assert!(tier >= previous, "tier dropped at score {score}");
            previous = tier;
        }
    }

    #[test]
    fn floors_round_trip_through_classifier() {
        for tier in IntensityTier::ALL {
            assert_eq!(tier_for_score(tier_floor(tier)), tier);
        }
    }
}
