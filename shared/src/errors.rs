//! Error types shared by the client and the backend

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Rejection of a completion action (exercise or meal).
///
/// This is a precondition failure, not a fault: callers surface the message
/// to the user and must not attempt the write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionRejected {
    #[error("This day is a rest day and has nothing to complete")]
    RestDay,

    #[error("This day is scheduled for {scheduled_for}, it can only be completed on that date")]
    NotScheduledToday { scheduled_for: NaiveDate },

    #[error("Item {0} is already completed")]
    AlreadyCompleted(Uuid),

    #[error("Item {0} does not belong to this day")]
    UnknownItem(Uuid),
}

impl CompletionRejected {
    /// Short machine-readable kind, used for metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionRejected::RestDay => "rest_day",
            CompletionRejected::NotScheduledToday { .. } => "not_today",
            CompletionRejected::AlreadyCompleted(_) => "already_completed",
            CompletionRejected::UnknownItem(_) => "unknown_item",
        }
    }
}

/// Onboarding wizard errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    /// The current step's checklist has unmet entries
    #[error("Missing or invalid fields: {}", .0.join(", "))]
    Incomplete(Vec<String>),

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Already at the first step")]
    AtFirstStep,
}

/// Violations of the plan-generation contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanContractError {
    #[error("Model output is not valid JSON: {0}")]
    NotJson(String),

    #[error("Model output is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("Model output has an invalid shape: {0}")]
    Malformed(String),
}
