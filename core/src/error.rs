use crate::outcome::Tag;
use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

/// Failures raised inside a flow operation.
///
/// None of these escape a public controller call: they are logged and, under
/// `end_on_error`, end the flow.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Flow already started")]
    AlreadyStarted,

    #[error("Flow not started")]
    NotStarted,

    #[error("Flow already ended")]
    AlreadyEnded,

    #[error("Flow is locked, `{op}` rejected")]
    Locked { op: &'static str },

    #[error("Tag not found: {tag}")]
    TagNotFound { tag: Tag },

    #[error("Action failed during `{op}` (item {tag})")]
    Action {
        op: &'static str,
        tag: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Stack walk exceeded {limit} steps without rendering")]
    WalkLimit { limit: usize },

    #[error("`{op}` suspended outside of a tokio runtime")]
    NoRuntime { op: &'static str },
}

impl FlowError {
    /// Usage errors come from calling the public API at the wrong time.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            FlowError::AlreadyStarted
                | FlowError::NotStarted
                | FlowError::AlreadyEnded
                | FlowError::Locked { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse flow config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid flow config: {0}")]
    Invalid(String),
}
