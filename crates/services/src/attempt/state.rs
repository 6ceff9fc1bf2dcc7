//! In-memory working state of the current attempt.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use attempt_core::model::{
    AssessmentPreview, AttemptId, AttemptSnapshot, QuestionFlags, QuestionId, QuestionResponse,
    SectionId,
};

use crate::attempt::wire::RestartRequestBody;
use crate::error::AttemptStateError;

/// Live status of one question in the running attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionStatus {
    pub is_answered: bool,
    pub is_visited: bool,
    pub is_marked_for_review: bool,
}

/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptProgress {
    pub total: usize,
    pub answered: usize,
    pub visited: usize,
    pub marked_for_review: usize,
}

/// The single owner of live attempt data: answers, flags, timers, and the
/// navigation pointer.
///
/// Callers mutate it through `&mut self` operations, so there is exactly one
/// writer by construction. Recovery replaces it wholesale through
/// [`AttemptState::rehydrate`]: a complete replacement is built first and
/// installed only on success, so a failed rehydration leaves the previous
/// state intact.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptState {
    preview: AssessmentPreview,
    attempt_id: AttemptId,
    current_section: usize,
    current_question: Option<QuestionId>,
    question_status: HashMap<QuestionId, QuestionStatus>,
    answers: HashMap<QuestionId, QuestionResponse>,
    entire_test_seconds_left: u32,
    section_seconds_left: HashMap<SectionId, u32>,
    question_seconds_left: HashMap<QuestionId, u32>,
    question_time_spent: HashMap<QuestionId, u32>,
    tab_switch_count: u32,
    question_started_at: HashMap<QuestionId, DateTime<Utc>>,
}

impl AttemptState {
    /// Start a live attempt from a fresh preview, with timers initialized
    /// from the declared durations and navigation at the first question.
    ///
    /// # Errors
    ///
    /// Returns `AttemptStateError::MissingAttemptId` if the preview carries
    /// no attempt id.
    pub fn begin(preview: AssessmentPreview, now: DateTime<Utc>) -> Result<Self, AttemptStateError> {
        let attempt_id = preview
            .attempt_id
            .clone()
            .ok_or(AttemptStateError::MissingAttemptId)?;

        let section_seconds_left = preview
            .sections
            .iter()
            .map(|s| (s.id.clone(), s.duration_minutes.saturating_mul(60)))
            .collect();
        let question_seconds_left = preview
            .questions()
            .map(|q| (q.id.clone(), q.duration_seconds))
            .collect();
        let first_question = preview.first_question().map(|q| q.id.clone());

        let mut state = Self {
            entire_test_seconds_left: preview.duration_minutes.map_or(0, |m| m.saturating_mul(60)),
            attempt_id,
            current_section: 0,
            current_question: first_question.clone(),
            question_status: HashMap::new(),
            answers: HashMap::new(),
            section_seconds_left,
            question_seconds_left,
            question_time_spent: HashMap::new(),
            tab_switch_count: 0,
            question_started_at: HashMap::new(),
            preview,
        };

        if let Some(id) = first_question {
            state.question_status.entry(id.clone()).or_default().is_visited = true;
            state.question_started_at.insert(id, now);
        }

        Ok(state)
    }

    /// Rebuild an attempt state from a fresh server preview and the formatted
    /// restart body.
    ///
    /// Navigation always resets to the first question of the fresh preview's
    /// first section; answers, flags, and timers are taken from the body, and
    /// entries for questions the fresh preview no longer contains are
    /// dropped. Question start times are not reconstructed.
    ///
    /// # Errors
    ///
    /// Returns `AttemptStateError::MissingAttemptId` if the preview carries
    /// no attempt id.
    pub fn from_restart(
        preview: AssessmentPreview,
        body: &RestartRequestBody,
    ) -> Result<Self, AttemptStateError> {
        let attempt_id = preview
            .attempt_id
            .clone()
            .ok_or(AttemptStateError::MissingAttemptId)?;

        let mut question_status = HashMap::new();
        let mut answers = HashMap::new();
        let mut question_seconds_left = HashMap::new();
        let mut question_time_spent = HashMap::new();
        let mut section_seconds_left = HashMap::new();

        for section in &preview.sections {
            let left = body
                .find_section(&section.id)
                .map_or(0, |s| s.section_duration_left_in_seconds);
            section_seconds_left.insert(section.id.clone(), left);
        }

        for question in preview.questions() {
            let Some(report) = body.find_question(&question.id) else {
                question_status.insert(question.id.clone(), QuestionStatus::default());
                question_seconds_left.insert(question.id.clone(), 0);
                continue;
            };
            question_status.insert(
                question.id.clone(),
                QuestionStatus {
                    is_answered: !report.response_data.is_empty(),
                    is_visited: report.is_visited,
                    is_marked_for_review: report.is_marked_for_review,
                },
            );
            answers.insert(question.id.clone(), report.response_data.clone());
            question_seconds_left
                .insert(question.id.clone(), report.question_duration_left_in_seconds);
            question_time_spent.insert(question.id.clone(), report.time_spent_in_seconds);
        }

        Ok(Self {
            current_section: 0,
            current_question: preview.first_question().map(|q| q.id.clone()),
            attempt_id,
            question_status,
            answers,
            entire_test_seconds_left: body.assessment.entire_test_duration_left_in_seconds,
            section_seconds_left,
            question_seconds_left,
            question_time_spent,
            tab_switch_count: body.assessment.tab_switch_count,
            question_started_at: HashMap::new(),
            preview,
        })
    }

    /// Atomically replace this state from a fresh preview and formatted body.
    ///
    /// # Errors
    ///
    /// Returns `AttemptStateError::MissingAttemptId` without mutating
    /// anything if the preview carries no attempt id.
    pub fn rehydrate(
        &mut self,
        preview: AssessmentPreview,
        body: &RestartRequestBody,
    ) -> Result<(), AttemptStateError> {
        let replacement = Self::from_restart(preview, body)?;
        *self = replacement;
        Ok(())
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn preview(&self) -> &AssessmentPreview {
        &self.preview
    }

    #[must_use]
    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    #[must_use]
    pub fn current_section(&self) -> usize {
        self.current_section
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionId> {
        self.current_question.as_ref()
    }

    /// Status of a question; unknown questions read as all-false.
    #[must_use]
    pub fn status(&self, id: &QuestionId) -> QuestionStatus {
        self.question_status.get(id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn answer(&self, id: &QuestionId) -> Option<&QuestionResponse> {
        self.answers.get(id)
    }

    #[must_use]
    pub fn entire_test_seconds_left(&self) -> u32 {
        self.entire_test_seconds_left
    }

    #[must_use]
    pub fn section_seconds_left(&self, id: &SectionId) -> u32 {
        self.section_seconds_left.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn question_seconds_left(&self, id: &QuestionId) -> u32 {
        self.question_seconds_left.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn question_time_spent(&self, id: &QuestionId) -> u32 {
        self.question_time_spent.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn tab_switch_count(&self) -> u32 {
        self.tab_switch_count
    }

    /// Aggregate counts across all questions of the preview.
    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        let mut progress = AttemptProgress {
            total: self.preview.question_count(),
            answered: 0,
            visited: 0,
            marked_for_review: 0,
        };
        for status in self.question_status.values() {
            if status.is_answered {
                progress.answered += 1;
            }
            if status.is_visited {
                progress.visited += 1;
            }
            if status.is_marked_for_review {
                progress.marked_for_review += 1;
            }
        }
        progress
    }

    // ─── Live-test mutators ────────────────────────────────────────────────────

    /// Record the learner's answer to a question.
    ///
    /// `is_answered` is derived from the payload: an empty payload marks the
    /// question unanswered again.
    ///
    /// # Errors
    ///
    /// Returns `UnknownQuestion` if the question is not part of the preview,
    /// or `ResponseKindMismatch` if the payload kind does not match the
    /// question kind.
    pub fn record_answer(
        &mut self,
        question_id: &QuestionId,
        response: QuestionResponse,
    ) -> Result<(), AttemptStateError> {
        let (_, question) = self
            .preview
            .find_question(question_id)
            .ok_or_else(|| AttemptStateError::UnknownQuestion(question_id.clone()))?;
        if response.kind() != question.kind {
            return Err(AttemptStateError::ResponseKindMismatch(question_id.clone()));
        }

        let is_answered = !response.is_empty();
        self.question_status
            .entry(question_id.clone())
            .or_default()
            .is_answered = is_answered;
        self.answers.insert(question_id.clone(), response);
        Ok(())
    }

    /// Navigate to a question: moves the section pointer, marks the question
    /// visited, and stamps its start time.
    ///
    /// # Errors
    ///
    /// Returns `UnknownQuestion` if the question is not part of the preview.
    pub fn open_question(
        &mut self,
        question_id: &QuestionId,
        now: DateTime<Utc>,
    ) -> Result<(), AttemptStateError> {
        let (section_index, _) = self
            .preview
            .find_question(question_id)
            .ok_or_else(|| AttemptStateError::UnknownQuestion(question_id.clone()))?;

        self.current_section = section_index;
        self.current_question = Some(question_id.clone());
        self.question_status
            .entry(question_id.clone())
            .or_default()
            .is_visited = true;
        self.question_started_at.insert(question_id.clone(), now);
        Ok(())
    }

    /// Toggle the marked-for-review flag of a question.
    ///
    /// # Errors
    ///
    /// Returns `UnknownQuestion` if the question is not part of the preview.
    pub fn set_marked_for_review(
        &mut self,
        question_id: &QuestionId,
        marked: bool,
    ) -> Result<(), AttemptStateError> {
        if !self.preview.contains_question(question_id) {
            return Err(AttemptStateError::UnknownQuestion(question_id.clone()));
        }
        self.question_status
            .entry(question_id.clone())
            .or_default()
            .is_marked_for_review = marked;
        Ok(())
    }

    /// Count one tab switch away from the test.
    pub fn record_tab_switch(&mut self) {
        self.tab_switch_count = self.tab_switch_count.saturating_add(1);
    }

    /// Advance all running timers by the given number of seconds.
    ///
    /// Decrements the overall timer, the current section's timer, and the
    /// current question's timer, saturating at zero, and accrues the current
    /// question's time spent. The caller drives the cadence; no background
    /// timer exists.
    pub fn tick(&mut self, seconds: u32) {
        self.entire_test_seconds_left = self.entire_test_seconds_left.saturating_sub(seconds);

        if let Some(section) = self.preview.sections.get(self.current_section)
            && let Some(left) = self.section_seconds_left.get_mut(&section.id)
        {
            *left = left.saturating_sub(seconds);
        }

        if let Some(question_id) = self.current_question.clone() {
            if let Some(left) = self.question_seconds_left.get_mut(&question_id) {
                *left = left.saturating_sub(seconds);
            }
            let spent = self.question_time_spent.entry(question_id).or_insert(0);
            *spent = spent.saturating_add(seconds);
        }
    }

    /// Project the live state into the persisted snapshot shape.
    ///
    /// Navigation and question start times are deliberately not part of the
    /// persisted record.
    #[must_use]
    pub fn snapshot(&self) -> AttemptSnapshot {
        let question_flags = self
            .question_status
            .iter()
            .map(|(id, status)| {
                (
                    id.clone(),
                    QuestionFlags {
                        is_visited: status.is_visited,
                        is_marked_for_review: status.is_marked_for_review,
                    },
                )
            })
            .collect();

        AttemptSnapshot {
            assessment: self.preview.clone(),
            entire_test_seconds_left: Some(self.entire_test_seconds_left),
            section_seconds_left: self.section_seconds_left.clone(),
            question_seconds_left: self.question_seconds_left.clone(),
            question_time_spent: self.question_time_spent.clone(),
            question_flags,
            answers: self.answers.clone(),
            tab_switch_count: self.tab_switch_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::format::restart_request;
    use attempt_core::model::OptionId;
    use attempt_core::time::fixed_now;

    fn preview(attempt_id: Option<&str>) -> AssessmentPreview {
        serde_json::from_value(serde_json::json!({
            "assessment_id": "X",
            "attempt_id": attempt_id,
            "preview_total_time": 10,
            "sections": [
                {
                    "id": "S1",
                    "duration": 5,
                    "questions": [
                        { "id": "Q1", "question_type": "MCQS",
                          "options": [{ "id": "O1" }, { "id": "O2" }] },
                        { "id": "Q2", "question_type": "ONE_WORD" }
                    ]
                },
                {
                    "id": "S2",
                    "duration": 5,
                    "questions": [{ "id": "Q3", "question_type": "NUMERIC" }]
                }
            ]
        }))
        .unwrap()
    }

    fn question_id(raw: &str) -> QuestionId {
        QuestionId::new(raw).unwrap()
    }

    fn single_choice(option: &str) -> QuestionResponse {
        QuestionResponse::SingleChoice {
            option_ids: vec![OptionId::new(option).unwrap()],
        }
    }

    #[test]
    fn test_begin_requires_attempt_id() {
        assert_eq!(
            AttemptState::begin(preview(None), fixed_now()),
            Err(AttemptStateError::MissingAttemptId)
        );
    }

    #[test]
    fn test_begin_starts_at_first_question_with_full_timers() {
        let state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        assert_eq!(state.current_section(), 0);
        assert_eq!(state.current_question(), Some(&question_id("Q1")));
        assert!(state.status(&question_id("Q1")).is_visited);
        assert_eq!(state.entire_test_seconds_left(), 600);
        assert_eq!(state.section_seconds_left(&"S1".parse().unwrap()), 300);
    }

    #[test]
    fn test_begin_saturates_oversized_declared_durations() {
        // minutes values the wire accepts but that overflow a u32 of seconds
        let oversized: AssessmentPreview = serde_json::from_value(serde_json::json!({
            "assessment_id": "X",
            "attempt_id": "A1",
            "preview_total_time": 80_000_000_u32,
            "sections": [{
                "id": "S1",
                "duration": u32::MAX,
                "questions": [{ "id": "Q1", "question_type": "MCQS" }]
            }]
        }))
        .unwrap();

        let state = AttemptState::begin(oversized, fixed_now()).unwrap();
        assert_eq!(state.entire_test_seconds_left(), u32::MAX);
        assert_eq!(state.section_seconds_left(&"S1".parse().unwrap()), u32::MAX);
    }

    #[test]
    fn test_record_answer_derives_is_answered() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();

        state
            .record_answer(&question_id("Q1"), single_choice("O1"))
            .unwrap();
        assert!(state.status(&question_id("Q1")).is_answered);

        // clearing the selection marks the question unanswered again
        state
            .record_answer(
                &question_id("Q1"),
                QuestionResponse::SingleChoice {
                    option_ids: Vec::new(),
                },
            )
            .unwrap();
        assert!(!state.status(&question_id("Q1")).is_answered);
    }

    #[test]
    fn test_record_answer_rejects_kind_mismatch() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        let result = state.record_answer(
            &question_id("Q2"),
            QuestionResponse::Numeric { answer: Some(1.0) },
        );
        assert_eq!(
            result,
            Err(AttemptStateError::ResponseKindMismatch(question_id("Q2")))
        );
    }

    #[test]
    fn test_record_answer_rejects_unknown_question() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        let result = state.record_answer(&question_id("Q9"), single_choice("O1"));
        assert_eq!(
            result,
            Err(AttemptStateError::UnknownQuestion(question_id("Q9")))
        );
    }

    #[test]
    fn test_open_question_moves_section_pointer() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        state.open_question(&question_id("Q3"), fixed_now()).unwrap();
        assert_eq!(state.current_section(), 1);
        assert_eq!(state.current_question(), Some(&question_id("Q3")));
        assert!(state.status(&question_id("Q3")).is_visited);
    }

    #[test]
    fn test_tick_decrements_running_timers_and_accrues_time_spent() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        state.tick(30);
        assert_eq!(state.entire_test_seconds_left(), 570);
        assert_eq!(state.section_seconds_left(&"S1".parse().unwrap()), 270);
        assert_eq!(state.section_seconds_left(&"S2".parse().unwrap()), 300);
        assert_eq!(state.question_time_spent(&question_id("Q1")), 30);

        // timers saturate at zero
        state.tick(100_000);
        assert_eq!(state.entire_test_seconds_left(), 0);
        assert_eq!(state.section_seconds_left(&"S1".parse().unwrap()), 0);
    }

    #[test]
    fn test_rehydrate_resets_navigation_to_first_question() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        state.open_question(&question_id("Q3"), fixed_now()).unwrap();
        state
            .record_answer(&question_id("Q1"), single_choice("O1"))
            .unwrap();
        state.record_tab_switch();
        state.tick(120);

        let body = restart_request(&state.snapshot());
        state.rehydrate(preview(Some("A2")), &body).unwrap();

        assert_eq!(state.attempt_id().as_str(), "A2");
        assert_eq!(state.current_section(), 0);
        assert_eq!(state.current_question(), Some(&question_id("Q1")));
        assert!(state.status(&question_id("Q1")).is_answered);
        assert_eq!(state.answer(&question_id("Q1")), Some(&single_choice("O1")));
        assert_eq!(state.entire_test_seconds_left(), 480);
        assert_eq!(state.tab_switch_count(), 1);
    }

    #[test]
    fn test_rehydrate_without_attempt_id_leaves_state_unchanged() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        state
            .record_answer(&question_id("Q1"), single_choice("O1"))
            .unwrap();
        let before = state.clone();

        let body = restart_request(&state.snapshot());
        let result = state.rehydrate(preview(None), &body);

        assert_eq!(result, Err(AttemptStateError::MissingAttemptId));
        assert_eq!(state, before);
    }

    #[test]
    fn test_rehydrate_drops_entries_absent_from_fresh_preview() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        state
            .record_answer(&question_id("Q3"), QuestionResponse::Numeric { answer: Some(7.0) })
            .unwrap();
        let body = restart_request(&state.snapshot());

        // fresh preview no longer contains section S2 / question Q3
        let trimmed: AssessmentPreview = serde_json::from_value(serde_json::json!({
            "assessment_id": "X",
            "attempt_id": "A2",
            "preview_total_time": 10,
            "sections": [{
                "id": "S1",
                "duration": 5,
                "questions": [{ "id": "Q1", "question_type": "MCQS" }]
            }]
        }))
        .unwrap();

        state.rehydrate(trimmed, &body).unwrap();
        assert!(state.answer(&question_id("Q3")).is_none());
        assert!(!state.status(&question_id("Q3")).is_answered);
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_answers_flags_and_timers() {
        let mut state = AttemptState::begin(preview(Some("A1")), fixed_now()).unwrap();
        state
            .record_answer(&question_id("Q1"), single_choice("O2"))
            .unwrap();
        state
            .set_marked_for_review(&question_id("Q2"), true)
            .unwrap();
        state.record_tab_switch();
        state.record_tab_switch();
        state.tick(45);

        let body = restart_request(&state.snapshot());
        let rebuilt = AttemptState::from_restart(state.preview().clone(), &body).unwrap();

        assert_eq!(rebuilt.answer(&question_id("Q1")), Some(&single_choice("O2")));
        assert!(rebuilt.status(&question_id("Q2")).is_marked_for_review);
        assert_eq!(rebuilt.entire_test_seconds_left(), 555);
        assert_eq!(
            rebuilt.section_seconds_left(&"S1".parse().unwrap()),
            255
        );
        assert_eq!(rebuilt.question_time_spent(&question_id("Q1")), 45);
        assert_eq!(rebuilt.tab_switch_count(), 2);
        // start times are not reconstructed
        assert_eq!(rebuilt.progress().answered, 1);
    }
}
