use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{AssessmentPreview, AttemptId, QuestionId, QuestionResponse, SectionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("assessment preview carries no attempt id")]
    MissingAttemptId,
}

/// Per-question UI flags recorded in a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFlags {
    #[serde(default)]
    pub is_visited: bool,
    #[serde(default)]
    pub is_marked_for_review: bool,
}

/// The locally persisted record of one in-progress attempt.
///
/// Every map and counter defaults on deserialization, so a snapshot written
/// by an older or partial writer still loads; missing timer data degrades to
/// zeros downstream rather than failing. The snapshot deliberately stores no
/// navigation pointer: recovery always restarts navigation at the first
/// question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSnapshot {
    pub assessment: AssessmentPreview,
    /// Seconds left on the overall test timer; `None` means never recorded.
    #[serde(default)]
    pub entire_test_seconds_left: Option<u32>,
    #[serde(default)]
    pub section_seconds_left: HashMap<SectionId, u32>,
    #[serde(default)]
    pub question_seconds_left: HashMap<QuestionId, u32>,
    #[serde(default)]
    pub question_time_spent: HashMap<QuestionId, u32>,
    #[serde(default)]
    pub question_flags: HashMap<QuestionId, QuestionFlags>,
    #[serde(default)]
    pub answers: HashMap<QuestionId, QuestionResponse>,
    #[serde(default)]
    pub tab_switch_count: u32,
}

impl AttemptSnapshot {
    /// Starts a fresh snapshot for a just-begun attempt, with timers
    /// initialized from the preview's declared durations.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::MissingAttemptId` if the preview carries no
    /// attempt id.
    pub fn begin(assessment: AssessmentPreview) -> Result<Self, SnapshotError> {
        if assessment.attempt_id.is_none() {
            return Err(SnapshotError::MissingAttemptId);
        }

        let entire_test_seconds_left = assessment.duration_minutes.map(|m| m.saturating_mul(60));
        let section_seconds_left = assessment
            .sections
            .iter()
            .map(|s| (s.id.clone(), s.duration_minutes.saturating_mul(60)))
            .collect();
        let question_seconds_left = assessment
            .questions()
            .map(|q| (q.id.clone(), q.duration_seconds))
            .collect();

        Ok(Self {
            assessment,
            entire_test_seconds_left,
            section_seconds_left,
            question_seconds_left,
            question_time_spent: HashMap::new(),
            question_flags: HashMap::new(),
            answers: HashMap::new(),
            tab_switch_count: 0,
        })
    }

    /// Returns the attempt id, if the preview carries one.
    #[must_use]
    pub fn attempt_id(&self) -> Option<&AttemptId> {
        self.assessment.attempt_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentId, Question, QuestionKind, Section};

    fn preview(attempt_id: Option<&str>) -> AssessmentPreview {
        AssessmentPreview {
            assessment_id: AssessmentId::new("X").unwrap(),
            attempt_id: attempt_id.map(|id| AttemptId::new(id).unwrap()),
            title: String::new(),
            duration_minutes: Some(10),
            sections: vec![Section {
                id: SectionId::new("S1").unwrap(),
                name: String::new(),
                duration_minutes: 5,
                questions: vec![Question {
                    id: QuestionId::new("Q1").unwrap(),
                    kind: QuestionKind::Mcqs,
                    text: String::new(),
                    duration_seconds: 90,
                    options: Vec::new(),
                }],
            }],
        }
    }

    #[test]
    fn test_begin_initializes_timers_from_durations() {
        let snapshot = AttemptSnapshot::begin(preview(Some("A1"))).unwrap();
        assert_eq!(snapshot.entire_test_seconds_left, Some(600));
        assert_eq!(
            snapshot.section_seconds_left[&SectionId::new("S1").unwrap()],
            300
        );
        assert_eq!(
            snapshot.question_seconds_left[&QuestionId::new("Q1").unwrap()],
            90
        );
        assert!(snapshot.answers.is_empty());
        assert_eq!(snapshot.tab_switch_count, 0);
    }

    #[test]
    fn test_begin_saturates_oversized_declared_durations() {
        let mut assessment = preview(Some("A1"));
        assessment.duration_minutes = Some(80_000_000);
        assessment.sections[0].duration_minutes = u32::MAX;

        let snapshot = AttemptSnapshot::begin(assessment).unwrap();
        assert_eq!(snapshot.entire_test_seconds_left, Some(u32::MAX));
        assert_eq!(
            snapshot.section_seconds_left[&SectionId::new("S1").unwrap()],
            u32::MAX
        );
    }

    #[test]
    fn test_begin_requires_attempt_id() {
        assert_eq!(
            AttemptSnapshot::begin(preview(None)),
            Err(SnapshotError::MissingAttemptId)
        );
    }

    #[test]
    fn test_sparse_snapshot_deserializes_with_defaults() {
        let snapshot: AttemptSnapshot =
            serde_json::from_str(r#"{ "assessment": { "assessment_id": "X" } }"#).unwrap();
        assert!(snapshot.entire_test_seconds_left.is_none());
        assert!(snapshot.section_seconds_left.is_empty());
        assert!(snapshot.question_flags.is_empty());
        assert_eq!(snapshot.tab_switch_count, 0);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut snapshot = AttemptSnapshot::begin(preview(Some("A1"))).unwrap();
        snapshot.answers.insert(
            QuestionId::new("Q1").unwrap(),
            QuestionResponse::SingleChoice {
                option_ids: vec![crate::model::OptionId::new("O1").unwrap()],
            },
        );
        snapshot.tab_switch_count = 2;

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: AttemptSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
