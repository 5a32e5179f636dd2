use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid {what} identifier: '{value}' (expected lowercase letter followed by [a-z0-9_])")]
    InvalidIdentifier { what: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
