#![forbid(unsafe_code)]

pub mod attempt;
pub mod error;

pub use attempt_core::Clock;

pub use error::{AttemptStateError, RecoveryError, RestartClientError};

pub use attempt::{
    AttemptProgress, AttemptState, QuestionStatus, RecoveredAttempt, RecoveryOutcome,
    RecoveryService, RestartApi, RestartClient, RestartEndpointConfig, RestartRequestBody,
    RestartResponse, restart_request,
};
