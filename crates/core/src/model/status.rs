use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown test status: {0}")]
pub struct ParseStatusError(pub String);

/// Progress state of a single checklist item. Absent entries are `Pending`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TestStatus {
    pub const ALL: [TestStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// Next state of the fixed cycle `pending -> in-progress -> done -> pending`.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Pending,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    #[must_use]
    pub fn is_default(self) -> bool {
        self == Self::Pending
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Rollup of the statuses of every test in a category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryStatus {
    #[default]
    Pending,
    Progress,
    Done,
}

impl CategoryStatus {
    /// `Done` only when the category is non-empty and every test is done;
    /// `Progress` when anything was started or finished.
    #[must_use]
    pub fn from_statuses(statuses: impl IntoIterator<Item = TestStatus>) -> Self {
        let mut any = false;
        let mut all_done = true;
        let mut touched = false;
        for status in statuses {
            any = true;
            if status != TestStatus::Done {
                all_done = false;
            }
            if status != TestStatus::Pending {
                touched = true;
            }
        }

        if any && all_done {
            Self::Done
        } else if touched {
            Self::Progress
        } else {
            Self::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_returns_to_start_after_three_steps() {
        for start in TestStatus::ALL {
            assert_eq!(start.next().next().next(), start);
            assert_ne!(start.next(), start);
        }
    }

    #[test]
    fn cycle_order_is_fixed() {
        assert_eq!(TestStatus::Pending.next(), TestStatus::InProgress);
        assert_eq!(TestStatus::InProgress.next(), TestStatus::Done);
        assert_eq!(TestStatus::Done.next(), TestStatus::Pending);
    }

    #[test]
    fn serde_uses_kebab_case_wire_names() {
        let json = serde_json::to_string(&TestStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: TestStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, TestStatus::Done);
        assert!(serde_json::from_str::<TestStatus>("\"blocked\"").is_err());
    }

    #[test]
    fn from_str_matches_wire_names() {
        for status in TestStatus::ALL {
            assert_eq!(status.as_str().parse::<TestStatus>().unwrap(), status);
        }
        assert_eq!(
            "skipped".parse::<TestStatus>().unwrap_err(),
            ParseStatusError("skipped".into())
        );
    }

    #[test]
    fn category_rollup() {
        use TestStatus::{Done, InProgress, Pending};

        assert_eq!(CategoryStatus::from_statuses([]), CategoryStatus::Pending);
        assert_eq!(
            CategoryStatus::from_statuses([Pending, Pending]),
            CategoryStatus::Pending
        );
        assert_eq!(
            CategoryStatus::from_statuses([Pending, Done]),
            CategoryStatus::Progress
        );
        assert_eq!(
            CategoryStatus::from_statuses([InProgress, Done]),
            CategoryStatus::Progress
        );
        assert_eq!(
            CategoryStatus::from_statuses([Done, Done]),
            CategoryStatus::Done
        );
    }
}
