//! Sentiment score value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification buckets for a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Score above the positive threshold
    Positive,
    /// Score between the thresholds
    Neutral,
    /// Score below the negative threshold
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

/// Threshold beyond which a score stops being neutral
const LABEL_THRESHOLD: f64 = 0.2;

/// A sentiment score in the closed interval [-1.0, 1.0]
///
/// Scores outside the interval are clamped on construction, matching what
/// the completion model is prompted to produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentScore(f64);

impl SentimentScore {
    /// Create a score, clamping into [-1.0, 1.0]
    ///
    /// Non-finite input collapses to 0.0 (neutral).
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(-1.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// The numeric score
    pub const fn as_f64(&self) -> f64 {
        self.0
    }

    /// Bucket the score into a label
    pub fn label(&self) -> SentimentLabel {
        if self.0 > LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if self.0 < -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Default for SentimentScore {
    fn default() -> Self {
        Self(0.0)
    }
}

impl fmt::Display for SentimentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn new_clamps_out_of_range() {
        assert_eq!(SentimentScore::new(3.5).as_f64(), 1.0);
        assert_eq!(SentimentScore::new(-7.0).as_f64(), -1.0);
    }

    #[test]
    fn non_finite_collapses_to_neutral() {
        assert_eq!(SentimentScore::new(f64::NAN).as_f64(), 0.0);
        assert_eq!(SentimentScore::new(f64::INFINITY).as_f64(), 0.0);
    }

    #[test]
    fn labels_match_thresholds() {
        assert_eq!(SentimentScore::new(0.8).label(), SentimentLabel::Positive);
        assert_eq!(SentimentScore::new(0.0).label(), SentimentLabel::Neutral);
        assert_eq!(SentimentScore::new(-0.5).label(), SentimentLabel::Negative);
        assert_eq!(SentimentScore::new(0.2).label(), SentimentLabel::Neutral);
    }

    proptest! {
        #[test]
        fn score_always_in_range(value in proptest::num::f64::ANY) {
            let score = SentimentScore::new(value);
            prop_assert!(score.as_f64() >= -1.0);
            prop_assert!(score.as_f64() <= 1.0);
        }
    }
}
