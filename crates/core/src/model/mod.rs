mod assessment;
mod ids;
mod response;
mod snapshot;
mod window;

pub use assessment::{AssessmentPreview, Question, QuestionKind, QuestionOption, Section};
pub use ids::{AssessmentId, AttemptId, IdError, OptionId, QuestionId, SectionId};
pub use response::QuestionResponse;
pub use snapshot::{AttemptSnapshot, QuestionFlags, SnapshotError};
pub use window::AttemptWindow;
