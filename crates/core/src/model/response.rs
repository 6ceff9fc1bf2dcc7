use serde::{Deserialize, Serialize};

use crate::model::{OptionId, QuestionKind};

/// A learner's answer to one question, tagged by the question kind.
///
/// Wire shape is internally tagged with a `type` field, e.g.
/// `{ "type": "MCQS", "optionIds": ["O1"] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionResponse {
    #[serde(rename = "MCQS")]
    SingleChoice {
        #[serde(rename = "optionIds", default)]
        option_ids: Vec<OptionId>,
    },
    #[serde(rename = "MCQM")]
    MultipleChoice {
        #[serde(rename = "optionIds", default)]
        option_ids: Vec<OptionId>,
    },
    #[serde(rename = "NUMERIC")]
    Numeric {
        #[serde(default)]
        answer: Option<f64>,
    },
    #[serde(rename = "ONE_WORD")]
    OneWord {
        #[serde(default)]
        answer: String,
    },
    #[serde(rename = "LONG_ANSWER")]
    LongAnswer {
        #[serde(default)]
        answer: String,
    },
}

impl QuestionResponse {
    /// Returns the question kind this response answers.
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionResponse::SingleChoice { .. } => QuestionKind::Mcqs,
            QuestionResponse::MultipleChoice { .. } => QuestionKind::Mcqm,
            QuestionResponse::Numeric { .. } => QuestionKind::Numeric,
            QuestionResponse::OneWord { .. } => QuestionKind::OneWord,
            QuestionResponse::LongAnswer { .. } => QuestionKind::LongAnswer,
        }
    }

    /// Returns true if the response carries no actual answer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            QuestionResponse::SingleChoice { option_ids }
            | QuestionResponse::MultipleChoice { option_ids } => option_ids.is_empty(),
            QuestionResponse::Numeric { answer } => answer.is_none(),
            QuestionResponse::OneWord { answer } | QuestionResponse::LongAnswer { answer } => {
                answer.trim().is_empty()
            }
        }
    }

    /// Returns the empty response emitted for an unanswered question of the
    /// given kind.
    #[must_use]
    pub fn empty_for(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Mcqs => QuestionResponse::SingleChoice {
                option_ids: Vec::new(),
            },
            QuestionKind::Mcqm => QuestionResponse::MultipleChoice {
                option_ids: Vec::new(),
            },
            QuestionKind::Numeric => QuestionResponse::Numeric { answer: None },
            QuestionKind::OneWord => QuestionResponse::OneWord {
                answer: String::new(),
            },
            QuestionKind::LongAnswer => QuestionResponse::LongAnswer {
                answer: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_choice_wire_shape() {
        let response = QuestionResponse::SingleChoice {
            option_ids: vec![OptionId::new("O1").unwrap()],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "MCQS");
        assert_eq!(json["optionIds"][0], "O1");
    }

    #[test]
    fn test_deserialize_tagged_variant() {
        let response: QuestionResponse =
            serde_json::from_str(r#"{ "type": "NUMERIC", "answer": 4.5 }"#).unwrap();
        assert_eq!(response.kind(), QuestionKind::Numeric);
        assert!(!response.is_empty());
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = serde_json::from_str::<QuestionResponse>(r#"{ "type": "ESSAY" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_for_every_kind_is_empty() {
        for kind in [
            QuestionKind::Mcqs,
            QuestionKind::Mcqm,
            QuestionKind::Numeric,
            QuestionKind::OneWord,
            QuestionKind::LongAnswer,
        ] {
            let response = QuestionResponse::empty_for(kind);
            assert_eq!(response.kind(), kind);
            assert!(response.is_empty());
        }
    }

    #[test]
    fn test_whitespace_text_answer_is_empty() {
        let response = QuestionResponse::OneWord {
            answer: "   ".into(),
        };
        assert!(response.is_empty());
    }
}
