//! Wellness score computation and banding.

use serde::{Deserialize, Serialize};

const SLEEP_WEIGHT: f64 = 0.3;
const DIET_WEIGHT: f64 = 0.2;
const ACTIVITY_WEIGHT: f64 = 0.3;
const CALENDAR_WEIGHT: f64 = 0.2;

/// Personality prefix used when the caller does not supply one.
pub const DEFAULT_PERSONALITY: &str = "I'm a friendly helper";

/// Normalised daily signals, each nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Signals {
    /// Sleep quality.
    pub sleep_quality: f64,
    /// Diet score.
    pub diet_score: f64,
    /// Physical activity score.
    pub activity_score: f64,
    /// Balance of the calendar (free vs. booked time).
    pub calendar_balance: f64,
}

/// Weighted score scaled to `[0, 100]`.
///
/// Each signal is clamped to `[0, 1]` (NaN counts as 0) before weighting, and
/// the scaled sum is rounded half-to-even.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compute_wellness(signals: &Signals) -> i64 {
    let raw = unit(signals.sleep_quality) * SLEEP_WEIGHT
        + unit(signals.diet_score) * DIET_WEIGHT
        + unit(signals.activity_score) * ACTIVITY_WEIGHT
        + unit(signals.calendar_balance) * CALENDAR_WEIGHT;
    // Bounded to [0, 100] by the clamp above.
    (raw * 100.0).round_ties_even() as i64
}

fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Intervention band a score falls into.
///
/// Serialises as the catalog code of the band.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Score above 75.
    #[serde(rename = "00145")]
    Thriving,
    /// Score in `[40, 75]`.
    #[serde(rename = "00124")]
    Steady,
    /// Score below 25.
    #[serde(rename = "00093")]
    Depleted,
    /// Score in `[25, 40)`.
    #[serde(rename = "00069")]
    Strained,
}

impl Category {
    /// Catalog code of the band.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Thriving => "00145",
            Self::Steady => "00124",
            Self::Depleted => "00093",
            Self::Strained => "00069",
        }
    }

    /// Recommended intervention for the band.
    #[must_use]
    pub const fn intervention(self) -> &'static str {
        match self {
            Self::Thriving => "Maintain current routine; consider peer-led challenges.",
            Self::Steady => "Schedule a 10-min peer check-in; log 3 positive affirmations.",
            Self::Depleted => "Guided breathing; 30-min light activity or rest.",
            Self::Strained => "Initiate coping skills log; 5-min mindfulness session.",
        }
    }

    /// How often the intervention should be repeated.
    #[must_use]
    pub const fn frequency(self) -> &'static str {
        match self {
            Self::Thriving => "daily",
            Self::Steady => "every 4 hours",
            Self::Depleted => "every 2 hours",
            Self::Strained => "every 3 hours",
        }
    }
}

/// Maps any integer score to exactly one band.
#[must_use]
pub const fn map_to_category(score: i64) -> Category {
    if score > 75 {
        Category::Thriving
    } else if score >= 40 {
        Category::Steady
    } else if score < 25 {
        Category::Depleted
    } else {
        Category::Strained
    }
}

/// Avatar mood shown alongside the score.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarState {
    /// Score above 75.
    Energetic,
    /// Score in `[40, 75]`.
    Neutral,
    /// Score below 40.
    Fatigued,
}

impl AvatarState {
    /// Avatar state for a score.
    #[must_use]
    pub const fn for_score(score: i64) -> Self {
        if score > 75 {
            Self::Energetic
        } else if score >= 40 {
            Self::Neutral
        } else {
            Self::Fatigued
        }
    }
}

/// Response of the scoring capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessReport {
    /// Rounded score.
    pub wellness_score: i64,
    /// Band, as its catalog code.
    pub category: Category,
    /// Same as `category`; kept for clients reading the older key.
    pub nanda_code: Category,
    /// Recommended intervention.
    pub intervention: String,
    /// Repetition cadence of the intervention.
    pub frequency: String,
    /// Avatar mood.
    pub avatar_state: AvatarState,
    /// Personality-prefixed suggestion text.
    pub suggestion: String,
}

impl WellnessReport {
    /// Scores `signals` and renders the suggestion with `personality`.
    #[must_use]
    pub fn assess(signals: &Signals, personality: &str) -> Self {
        let score = compute_wellness(signals);
        let category = map_to_category(score);
        let intervention = category.intervention();
        Self {
            wellness_score: score,
            category,
            nanda_code: category,
            intervention: intervention.to_owned(),
            frequency: category.frequency().to_owned(),
            avatar_state: AvatarState::for_score(score),
            suggestion: format!("{personality}: Your Twin suggests: {intervention}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(sleep: f64, diet: f64, activity: f64, calendar: f64) -> Signals {
        Signals {
            sleep_quality: sleep,
            diet_score: diet,
            activity_score: activity,
            calendar_balance: calendar,
        }
    }

    #[test]
    fn worked_example_scores_67() {
        let report = WellnessReport::assess(&signals(0.7, 0.6, 0.8, 0.5), "Coach");
        assert_eq!(report.wellness_score, 67);
        assert_eq!(report.category, Category::Steady);
        assert_eq!(report.avatar_state, AvatarState::Neutral);
        assert_eq!(report.frequency, "every 4 hours");
        assert_eq!(
            report.suggestion,
            "Coach: Your Twin suggests: Schedule a 10-min peer check-in; log 3 positive affirmations."
        );
    }

    #[test]
    fn extremes() {
        assert_eq!(compute_wellness(&signals(0.0, 0.0, 0.0, 0.0)), 0);
        assert_eq!(compute_wellness(&signals(1.0, 1.0, 1.0, 1.0)), 100);
    }

    #[test]
    fn out_of_range_signals_are_clamped() {
        assert_eq!(compute_wellness(&signals(3.0, 2.0, 9.0, 1.5)), 100);
        assert_eq!(compute_wellness(&signals(-1.0, -0.5, -2.0, -3.0)), 0);
        assert_eq!(compute_wellness(&signals(f64::NAN, 1.0, 1.0, 1.0)), 70);
    }

    #[test]
    fn monotone_in_each_signal() {
        let steps: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();
        let base = [0.3, 0.5, 0.7, 0.2];
        for field in 0..4 {
            let mut previous = i64::MIN;
            for &value in &steps {
                let mut v = base;
                v[field] = value;
                let score = compute_wellness(&signals(v[0], v[1], v[2], v[3]));
                assert!(score >= previous, "field {field} decreased at {value}");
                previous = score;
            }
        }
    }

    #[test]
    fn category_boundaries() {
        let cases = [
            (i64::MIN, Category::Depleted),
            (-5, Category::Depleted),
            (24, Category::Depleted),
            (25, Category::Strained),
            (39, Category::Strained),
            (40, Category::Steady),
            (75, Category::Steady),
            (76, Category::Thriving),
            (i64::MAX, Category::Thriving),
        ];
        for (score, expected) in cases {
            assert_eq!(map_to_category(score), expected, "score {score}");
        }
    }

    #[test]
    fn avatar_boundaries() {
        assert_eq!(AvatarState::for_score(39), AvatarState::Fatigued);
        assert_eq!(AvatarState::for_score(40), AvatarState::Neutral);
        assert_eq!(AvatarState::for_score(75), AvatarState::Neutral);
        assert_eq!(AvatarState::for_score(76), AvatarState::Energetic);
    }

    #[test]
    fn report_serializes_codes() {
        let report = WellnessReport::assess(&signals(0.1, 0.1, 0.1, 0.1), DEFAULT_PERSONALITY);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["wellnessScore"], 10);
        assert_eq!(value["category"], "00093");
        assert_eq!(value["nandaCode"], "00093");
        assert_eq!(value["avatarState"], "fatigued");
        assert_eq!(Category::Depleted.code(), "00093");
    }
}
