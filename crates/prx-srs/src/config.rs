use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Lowest ease factor an item can reach.
pub const DEFAULT_EASE_FLOOR: f64 = 1.3;
/// Ease factor given to a brand-new item.
pub const DEFAULT_INITIAL_EASE: f64 = 2.5;
/// Ease factor lost on a failed review.
pub const DEFAULT_FAILURE_EASE_PENALTY: f64 = 0.2;
/// Consecutive successes required before an item counts as mastered.
pub const DEFAULT_MASTERY_REPETITIONS: u32 = 5;
/// Ease factor required before an item counts as mastered.
pub const DEFAULT_MASTERY_EASE: f64 = 2.8;
/// Roughly a hundred years.
pub const DEFAULT_MAXIMUM_INTERVAL_DAYS: u32 = 36_500;

/// Tunable scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub ease_floor: f64,
    pub initial_ease: f64,
    pub failure_ease_penalty: f64,
    pub mastery_repetitions: u32,
    pub mastery_ease: f64,
    pub maximum_interval_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            ease_floor: DEFAULT_EASE_FLOOR,
            initial_ease: DEFAULT_INITIAL_EASE,
            failure_ease_penalty: DEFAULT_FAILURE_EASE_PENALTY,
            mastery_repetitions: DEFAULT_MASTERY_REPETITIONS,
            mastery_ease: DEFAULT_MASTERY_EASE,
            maximum_interval_days: DEFAULT_MAXIMUM_INTERVAL_DAYS,
        }
    }
}

impl SchedulerConfig {
    /// Check that the policy cannot produce an item violating its invariants.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let floats = [
            ("ease_floor", self.ease_floor),
            ("initial_ease", self.initial_ease),
            ("failure_ease_penalty", self.failure_ease_penalty),
            ("mastery_ease", self.mastery_ease),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SchedulerError::InvalidConfig(format!(
                "{name} must be a finite number"
            )));
        }

        if self.ease_floor < 1.0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "ease_floor must be at least 1.0, got {}",
                self.ease_floor
            )));
        }
        if self.initial_ease < self.ease_floor {
            return Err(SchedulerError::InvalidConfig(format!(
                "initial_ease {} is below ease_floor {}",
                self.initial_ease, self.ease_floor
            )));
        }
        if self.failure_ease_penalty < 0.0 {
            return Err(SchedulerError::InvalidConfig(
                "failure_ease_penalty cannot be negative".to_string(),
            ));
        }
        if self.maximum_interval_days == 0 {
            return Err(SchedulerError::InvalidConfig(
                "maximum_interval_days must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
