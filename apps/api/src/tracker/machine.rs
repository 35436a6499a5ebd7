//! Application stages and the transitions allowed between them.
//!
//! ```text
//! saved ──▶ applied ──▶ interview ──▶ offer
//!   │          │          │  ▲ (another round)
//!   └──────────┴──────────┴──┴──▶ rejected
//! ```
//! `offer` and `rejected` are terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("application is already {0}")]
    Unchanged(Stage),

    #[error("cannot move an application from {from} to {to}")]
    NotAllowed { from: Stage, to: Stage },

    #[error("new applications must start as saved or applied, not {0}")]
    InvalidInitial(Stage),
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown stage '{0}'")]
pub struct UnknownStage(pub String);

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Saved,
        Stage::Applied,
        Stage::Interview,
        Stage::Offer,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Saved => "saved",
            Stage::Applied => "applied",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Offer | Stage::Rejected)
    }

    /// Checks that a new application may be created in this stage.
    pub fn check_initial(self) -> Result<Stage, TransitionError> {
        match self {
            Stage::Saved | Stage::Applied => Ok(self),
            other => Err(TransitionError::InvalidInitial(other)),
        }
    }

    /// Validates a move from `self` to `to`.
    pub fn transition_to(self, to: Stage) -> Result<Stage, TransitionError> {
        use Stage::*;

        match (self, to) {
            (Interview, Interview) => Ok(to),
            (from, to) if from == to => Err(TransitionError::Unchanged(from)),
            (Saved, Applied) | (Applied, Interview) | (Interview, Offer) => Ok(to),
            (from, Rejected) if !from.is_terminal() => Ok(to),
            (from, to) => Err(TransitionError::NotAllowed { from, to }),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Per-stage application counts. Every stage is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageCounts {
    pub saved: i64,
    pub applied: i64,
    pub interview: i64,
    pub offer: i64,
    pub rejected: i64,
    pub total: i64,
}

impl StageCounts {
    /// Folds `(stage, count)` rows. Rows with unknown stage names are ignored.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut counts = StageCounts::default();
        for (stage, n) in rows {
            let Ok(stage) = stage.parse::<Stage>() else {
                continue;
            };
            let slot = match stage {
                Stage::Saved => &mut counts.saved,
                Stage::Applied => &mut counts.applied,
                Stage::Interview => &mut counts.interview,
                Stage::Offer => &mut counts.offer,
                Stage::Rejected => &mut counts.rejected,
            };
            *slot += n;
            counts.total += n;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Stage::*;

    #[test]
    fn test_happy_path() {
        assert_eq!(Saved.transition_to(Applied), Ok(Applied));
        assert_eq!(Applied.transition_to(Interview), Ok(Interview));
        assert_eq!(Interview.transition_to(Offer), Ok(Offer));
    }

    #[test]
    fn test_reject_from_any_open_stage() {
        for from in [Saved, Applied, Interview] {
            assert_eq!(from.transition_to(Rejected), Ok(Rejected));
        }
    }

    #[test]
    fn test_interview_rounds_repeat() {
        assert_eq!(Interview.transition_to(Interview), Ok(Interview));
    }

    #[test]
    fn test_same_stage_is_unchanged() {
        assert_eq!(
            Applied.transition_to(Applied),
            Err(TransitionError::Unchanged(Applied))
        );
    }

    #[test]
    fn test_terminal_stages_are_final() {
        for from in [Offer, Rejected] {
            for to in Stage::ALL {
                if from == to {
                    continue;
                }
                assert_eq!(
                    from.transition_to(to),
                    Err(TransitionError::NotAllowed { from, to })
                );
            }
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(Saved.transition_to(Interview).is_err());
        assert!(Saved.transition_to(Offer).is_err());
        assert!(Applied.transition_to(Offer).is_err());
        assert!(Interview.transition_to(Applied).is_err());
        assert!(Applied.transition_to(Saved).is_err());
    }

    #[test]
    fn test_initial_stage() {
        assert_eq!(Saved.check_initial(), Ok(Saved));
        assert_eq!(Applied.check_initial(), Ok(Applied));
        assert_eq!(
            Offer.check_initial(),
            Err(TransitionError::InvalidInitial(Offer))
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(" Interview ".parse::<Stage>(), Ok(Interview));
        assert_eq!(
            "ghosted".parse::<Stage>(),
            Err(UnknownStage("ghosted".to_string()))
        );
        for stage in Stage::ALL {
            assert_eq!(stage.to_string().parse::<Stage>(), Ok(stage));
        }
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Offer).unwrap(), "\"offer\"");
        let stage: Stage = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(stage, Rejected);
    }

    #[test]
    fn test_stage_counts() {
        let counts = StageCounts::from_rows([("saved", 2), ("offer", 1), ("bogus", 9)]);
        assert_eq!(counts.saved, 2);
        assert_eq!(counts.offer, 1);
        assert_eq!(counts.applied, 0);
        assert_eq!(counts.total, 3);
    }
}
