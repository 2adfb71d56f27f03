use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Review grade on a four-level scale.
///
/// `Again` is the only failing grade; the other three are passes of
/// increasing ease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quality {
    /// Wrong answer or forgotten.
    Again = 0,
    /// Correct but slow or uncertain.
    Hard = 1,
    Good = 2,
    /// Correct and easy.
    Easy = 3,
}

impl Quality {
    /// Numeric grade `q`.
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_pass(self) -> bool {
        !matches!(self, Self::Again)
    }

    /// Map a raw "correct + time taken" review event to a grade.
    ///
    /// * incorrect => `Again`
    /// * correct, slower than twice the historical average => `Hard`
    /// * correct, faster than half the historical average => `Easy`
    /// * anything else, or no usable history => `Good`
    pub fn from_response(correct: bool, taken: Duration, average: Option<Duration>) -> Self {
        if !correct {
            return Self::Again;
        }

        let Some(average) = average.filter(|avg| !avg.is_zero()) else {
            return Self::Good;
        };

        let ratio = taken.as_secs_f64() / average.as_secs_f64();
        if ratio > 2.0 {
            Self::Hard
        } else if ratio < 0.5 {
            Self::Easy
        } else {
            Self::Good
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Again),
            1 => Ok(Self::Hard),
            2 => Ok(Self::Good),
            3 => Ok(Self::Easy),
            other => Err(SchedulerError::InvalidOutcome(format!(
                "quality must be 0, 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        };
        f.write_str(name)
    }
}

/// What happened during a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub quality: Quality,
    /// Caller-observed correctness for this item, 0-100.
    pub accuracy_percent: Option<u8>,
    /// Time the learner took to answer.
    pub response_ms: Option<u64>,
}

impl ReviewOutcome {
    pub const fn new(quality: Quality) -> Self {
        Self {
            quality,
            accuracy_percent: None,
            response_ms: None,
        }
    }

    pub const fn with_accuracy(mut self, accuracy_percent: u8) -> Self {
        self.accuracy_percent = Some(accuracy_percent);
        self
    }

    pub const fn with_response_ms(mut self, response_ms: u64) -> Self {
        self.response_ms = Some(response_ms);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SchedulerError> {
        match self.accuracy_percent {
            Some(accuracy) if accuracy > 100 => Err(SchedulerError::InvalidOutcome(format!(
                "accuracy must be between 0 and 100, got {accuracy}"
            ))),
            _ => Ok(()),
        }
    }
}

impl From<Quality> for ReviewOutcome {
    fn from(quality: Quality) -> Self {
        Self::new(quality)
    }
}
