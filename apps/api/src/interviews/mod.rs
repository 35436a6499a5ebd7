//! Interviews scheduled against tracked applications.

pub mod handlers;
pub mod repo;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewKind {
    Phone,
    Video,
    Onsite,
    Technical,
    Other,
}

impl InterviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewKind::Phone => "phone",
            InterviewKind::Video => "video",
            InterviewKind::Onsite => "onsite",
            InterviewKind::Technical => "technical",
            InterviewKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Passed,
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names_match_columns() {
        for kind in [
            InterviewKind::Phone,
            InterviewKind::Video,
            InterviewKind::Onsite,
            InterviewKind::Technical,
            InterviewKind::Other,
        ] {
            let wire = serde_json::to_string(&kind).unwrap();
            assert_eq!(wire, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_outcome_defaults_to_pending() {
        assert_eq!(Outcome::default().as_str(), "pending");
        let outcome: Outcome = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(serde_json::from_str::<InterviewKind>("\"lunch\"").is_err());
    }
}
