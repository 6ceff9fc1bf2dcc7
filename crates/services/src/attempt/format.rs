//! Projection of a locally persisted snapshot into the restart request body.

use attempt_core::model::{AttemptSnapshot, QuestionResponse, Section};

use crate::attempt::wire::{AssessmentReport, QuestionReport, RestartRequestBody, SectionReport};

/// Formats a snapshot as the body of a restart request.
///
/// Never fails: missing timer entries, flags, or answers degrade to zeros,
/// `false`, and empty payloads, so even a sparse snapshot produces a
/// well-formed report. Elapsed time is only derived when both the declared
/// duration and a recorded remainder exist; a remainder larger than the
/// declared duration saturates elapsed at zero.
#[must_use]
pub fn restart_request(snapshot: &AttemptSnapshot) -> RestartRequestBody {
    let preview = &snapshot.assessment;

    let time_elapsed_in_seconds = match (
        preview.duration_minutes,
        snapshot.entire_test_seconds_left,
    ) {
        (Some(minutes), Some(left)) => minutes.saturating_mul(60).saturating_sub(left),
        _ => 0,
    };

    RestartRequestBody {
        assessment: AssessmentReport {
            entire_test_duration_left_in_seconds: snapshot.entire_test_seconds_left.unwrap_or(0),
            time_elapsed_in_seconds,
            tab_switch_count: snapshot.tab_switch_count,
        },
        sections: preview
            .sections
            .iter()
            .map(|section| section_report(snapshot, section))
            .collect(),
    }
}

fn section_report(snapshot: &AttemptSnapshot, section: &Section) -> SectionReport {
    let (left, elapsed) = match snapshot.section_seconds_left.get(&section.id) {
        Some(&left) => (
            left,
            section.duration_minutes.saturating_mul(60).saturating_sub(left),
        ),
        None => (0, 0),
    };

    SectionReport {
        section_id: section.id.clone(),
        section_duration_left_in_seconds: left,
        time_elapsed_in_seconds: elapsed,
        questions: section
            .questions
            .iter()
            .map(|question| QuestionReport {
                question_id: question.id.clone(),
                question_duration_left_in_seconds: snapshot
                    .question_seconds_left
                    .get(&question.id)
                    .copied()
                    .unwrap_or(0),
                time_spent_in_seconds: snapshot
                    .question_time_spent
                    .get(&question.id)
                    .copied()
                    .unwrap_or(0),
                is_visited: snapshot
                    .question_flags
                    .get(&question.id)
                    .is_some_and(|f| f.is_visited),
                is_marked_for_review: snapshot
                    .question_flags
                    .get(&question.id)
                    .is_some_and(|f| f.is_marked_for_review),
                response_data: snapshot
                    .answers
                    .get(&question.id)
                    .cloned()
                    .unwrap_or_else(|| QuestionResponse::empty_for(question.kind)),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attempt_core::model::{AssessmentPreview, QuestionFlags, QuestionId};

    fn preview() -> AssessmentPreview {
        serde_json::from_value(serde_json::json!({
            "assessment_id": "X",
            "attempt_id": "A1",
            "preview_total_time": 10,
            "sections": [{
                "id": "S1",
                "duration": 5,
                "questions": [{ "id": "Q1", "question_type": "MCQS" }]
            }]
        }))
        .unwrap()
    }

    fn question_id(raw: &str) -> QuestionId {
        QuestionId::new(raw).unwrap()
    }

    #[test]
    fn test_bare_snapshot_formats_to_all_zeros() {
        let snapshot = AttemptSnapshot {
            assessment: preview(),
            entire_test_seconds_left: None,
            section_seconds_left: Default::default(),
            question_seconds_left: Default::default(),
            question_time_spent: Default::default(),
            question_flags: Default::default(),
            answers: Default::default(),
            tab_switch_count: 0,
        };

        let body = restart_request(&snapshot);
        assert_eq!(body.assessment.entire_test_duration_left_in_seconds, 0);
        assert_eq!(body.assessment.time_elapsed_in_seconds, 0);
        assert_eq!(body.assessment.tab_switch_count, 0);

        let section = &body.sections[0];
        assert_eq!(section.section_duration_left_in_seconds, 0);
        assert_eq!(section.time_elapsed_in_seconds, 0);

        let question = &section.questions[0];
        assert_eq!(question.question_duration_left_in_seconds, 0);
        assert_eq!(question.time_spent_in_seconds, 0);
        assert!(!question.is_visited);
        assert!(!question.is_marked_for_review);
        assert!(question.response_data.is_empty());
    }

    #[test]
    fn test_elapsed_plus_remaining_equals_declared_duration() {
        let mut snapshot = AttemptSnapshot::begin(preview()).unwrap();
        snapshot.entire_test_seconds_left = Some(300);
        snapshot
            .section_seconds_left
            .insert("S1".parse().unwrap(), 120);

        let body = restart_request(&snapshot);
        assert_eq!(
            body.assessment.time_elapsed_in_seconds
                + body.assessment.entire_test_duration_left_in_seconds,
            10 * 60
        );
        let section = &body.sections[0];
        assert_eq!(
            section.time_elapsed_in_seconds + section.section_duration_left_in_seconds,
            5 * 60
        );
    }

    #[test]
    fn test_remainder_beyond_declared_duration_saturates_elapsed() {
        let mut snapshot = AttemptSnapshot::begin(preview()).unwrap();
        snapshot.entire_test_seconds_left = Some(10 * 60 + 30);

        let body = restart_request(&snapshot);
        assert_eq!(body.assessment.time_elapsed_in_seconds, 0);
        assert_eq!(
            body.assessment.entire_test_duration_left_in_seconds,
            10 * 60 + 30
        );
    }

    #[test]
    fn test_oversized_declared_durations_format_without_overflow() {
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
        let mut snapshot = AttemptSnapshot::begin(oversized).unwrap();
        snapshot.entire_test_seconds_left = Some(300);
        snapshot
            .section_seconds_left
            .insert("S1".parse().unwrap(), 120);

        let body = restart_request(&snapshot);
        assert_eq!(body.assessment.time_elapsed_in_seconds, u32::MAX - 300);
        assert_eq!(body.sections[0].time_elapsed_in_seconds, u32::MAX - 120);
    }

    #[test]
    fn test_formats_recorded_timers_and_answers() {
        let mut snapshot = AttemptSnapshot::begin(preview()).unwrap();
        snapshot.entire_test_seconds_left = Some(300);
        snapshot
            .section_seconds_left
            .insert("S1".parse().unwrap(), 120);
        snapshot.answers.insert(
            question_id("Q1"),
            serde_json::from_value(serde_json::json!({ "type": "MCQS", "optionIds": ["O1"] }))
                .unwrap(),
        );

        let body = restart_request(&snapshot);
        assert_eq!(body.assessment.entire_test_duration_left_in_seconds, 300);
        assert_eq!(body.assessment.time_elapsed_in_seconds, 300);

        let section = &body.sections[0];
        assert_eq!(section.section_duration_left_in_seconds, 120);
        assert_eq!(section.time_elapsed_in_seconds, 180);

        let response = serde_json::to_value(&section.questions[0].response_data).unwrap();
        assert_eq!(
            response,
            serde_json::json!({ "type": "MCQS", "optionIds": ["O1"] })
        );
    }

    #[test]
    fn test_flags_and_time_spent_carry_over() {
        let mut snapshot = AttemptSnapshot::begin(preview()).unwrap();
        snapshot.question_flags.insert(
            question_id("Q1"),
            QuestionFlags {
                is_visited: true,
                is_marked_for_review: true,
            },
        );
        snapshot.question_time_spent.insert(question_id("Q1"), 42);

        let question = &restart_request(&snapshot).sections[0].questions[0];
        assert!(question.is_visited);
        assert!(question.is_marked_for_review);
        assert_eq!(question.time_spent_in_seconds, 42);
    }
}
