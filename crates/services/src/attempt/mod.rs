pub mod client;
pub mod format;
pub mod recovery;
pub mod state;
pub mod wire;

pub use client::{RestartApi, RestartClient, RestartEndpointConfig};
pub use format::restart_request;
pub use recovery::{RecoveredAttempt, RecoveryOutcome, RecoveryService};
pub use state::{AttemptProgress, AttemptState, QuestionStatus};
pub use wire::{
    AssessmentReport, QuestionReport, RestartRequestBody, RestartResponse, SectionReport,
};
