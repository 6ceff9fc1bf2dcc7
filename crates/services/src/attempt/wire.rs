//! Request and response schemas for the restart endpoint.
//!
//! These are validated at the network boundary: a reply that does not decode
//! into `RestartResponse` is rejected before any of it reaches the local
//! store or the in-memory attempt state.

use serde::{Deserialize, Serialize};

use attempt_core::model::{
    AssessmentPreview, AttemptWindow, QuestionId, QuestionResponse, SectionId,
};

/// Top-level timing and conduct report for the whole test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub entire_test_duration_left_in_seconds: u32,
    pub time_elapsed_in_seconds: u32,
    pub tab_switch_count: u32,
}

/// Timing report for one section, with its per-question detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub section_id: SectionId,
    pub section_duration_left_in_seconds: u32,
    pub time_elapsed_in_seconds: u32,
    pub questions: Vec<QuestionReport>,
}

/// Timing, flags, and response payload for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReport {
    pub question_id: QuestionId,
    pub question_duration_left_in_seconds: u32,
    pub time_spent_in_seconds: u32,
    pub is_visited: bool,
    pub is_marked_for_review: bool,
    pub response_data: QuestionResponse,
}

/// Body of the restart request: the formatted projection of the local
/// snapshot, or the zeroed body when no snapshot exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestartRequestBody {
    #[serde(default)]
    pub assessment: AssessmentReport,
    #[serde(default)]
    pub sections: Vec<SectionReport>,
}

impl RestartRequestBody {
    /// The zeroed body sent when no local snapshot exists.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Finds the report for a question across all sections.
    #[must_use]
    pub fn find_question(&self, id: &QuestionId) -> Option<&QuestionReport> {
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter())
            .find(|q| q.question_id == *id)
    }

    /// Finds the report for a section.
    #[must_use]
    pub fn find_section(&self, id: &SectionId) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.section_id == *id)
    }
}

/// The server's authoritative reply to a restart request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestartResponse {
    /// Fresh question set and attempt metadata.
    pub preview_response: AssessmentPreview,
    /// Echo of the timing data the server accepted, when it returns one.
    #[serde(default)]
    pub learner_assessment_attempt_data_dto: Option<RestartRequestBody>,
    /// Opaque acknowledgment of the attempt's status transition.
    #[serde(default)]
    pub update_status_response: serde_json::Value,
    /// Freshly computed start/end time record.
    pub start_assessment_response: AttemptWindow,
}
