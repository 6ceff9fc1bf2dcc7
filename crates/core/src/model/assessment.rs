use serde::{Deserialize, Serialize};

use crate::model::{AssessmentId, AttemptId, OptionId, QuestionId, SectionId};

/// The response kind a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "MCQS")]
    Mcqs,
    #[serde(rename = "MCQM")]
    Mcqm,
    #[serde(rename = "NUMERIC")]
    Numeric,
    #[serde(rename = "ONE_WORD")]
    OneWord,
    #[serde(rename = "LONG_ANSWER")]
    LongAnswer,
}

impl QuestionKind {
    /// Returns the wire tag for this kind.
    #[must_use]
    pub fn wire_tag(&self) -> &'static str {
        match self {
            QuestionKind::Mcqs => "MCQS",
            QuestionKind::Mcqm => "MCQM",
            QuestionKind::Numeric => "NUMERIC",
            QuestionKind::OneWord => "ONE_WORD",
            QuestionKind::LongAnswer => "LONG_ANSWER",
        }
    }
}

/// One selectable answer option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    #[serde(default)]
    pub text: String,
}

/// One question within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question_type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub text: String,
    /// Declared per-question time limit; `0` means no individual limit.
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

/// One timed section of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    #[serde(default)]
    pub name: String,
    /// Declared section duration in minutes.
    #[serde(rename = "duration", default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Server-owned description of an assessment's question set and attempt
/// metadata, as rendered by the live-test caller.
///
/// `attempt_id` is optional on the wire; rehydration of a live attempt
/// requires it to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPreview {
    pub assessment_id: AssessmentId,
    #[serde(default)]
    pub attempt_id: Option<AttemptId>,
    #[serde(default)]
    pub title: String,
    /// Declared overall duration in minutes, when the assessment is timed.
    #[serde(rename = "preview_total_time", default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl AssessmentPreview {
    /// Returns the first question of the first section, if any.
    #[must_use]
    pub fn first_question(&self) -> Option<&Question> {
        self.sections.first().and_then(|s| s.questions.first())
    }

    /// Finds a question along with the index of the section holding it.
    #[must_use]
    pub fn find_question(&self, id: &QuestionId) -> Option<(usize, &Question)> {
        self.sections.iter().enumerate().find_map(|(idx, section)| {
            section
                .questions
                .iter()
                .find(|q| q.id == *id)
                .map(|q| (idx, q))
        })
    }

    /// Returns true if the question belongs to this preview.
    #[must_use]
    pub fn contains_question(&self, id: &QuestionId) -> bool {
        self.find_question(id).is_some()
    }

    /// Total number of questions across all sections.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Iterates all questions in section order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }
}
