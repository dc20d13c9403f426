use thiserror::Error;

/// Failure raised by an individual question while it is being asked.
#[derive(Debug, Error)]
pub enum AskError {
    /// The user cancelled the prompt.
    #[error("interrupted by user")]
    Interrupted,
    #[error("invalid answer: {0}")]
    Invalid(String),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a whole form resolution.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(
        "dependencies in conditional skip_if cannot be resolved for [{}]; please make sure there are no circular dependencies in your skip_if conditions",
        .unresolved.join(", ")
    )]
    Dependency { unresolved: Vec<String> },
    #[error("question '{key}' was interrupted by the user")]
    Interrupted { key: String },
    #[error("question '{key}' failed: {source}")]
    Question {
        key: String,
        #[source]
        source: AskError,
    },
    #[error("skip condition for '{key}' failed: {message}")]
    Condition { key: String, message: String },
    #[error("failed to write form output: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    pub(crate) fn from_ask(key: &str, error: AskError) -> Self {
        match error {
            AskError::Interrupted => FormError::Interrupted {
                key: key.to_string(),
            },
            source => FormError::Question {
                key: key.to_string(),
                source,
            },
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, FormError::Interrupted { .. })
    }
}
