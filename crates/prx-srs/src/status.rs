use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Display bucket derived from an item's schedule at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Review date reached or passed.
    Due,
    /// Scheduled, past the learning phase, not yet mastered.
    Upcoming,
    /// Scheduled, at most one consecutive success.
    Learning,
    /// Scheduled, with enough repetitions and ease to be considered known.
    Mastered,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::Due, Self::Upcoming, Self::Learning, Self::Mastered];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Upcoming => "upcoming",
            Self::Learning => "learning",
            Self::Mastered => "mastered",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown status '{s}', expected due, upcoming, learning or mastered")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
        assert_eq!("Mastered".parse::<Status>().unwrap(), Status::Mastered);
        assert!("overdue".parse::<Status>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Upcoming).unwrap(), "\"upcoming\"");
    }
}
