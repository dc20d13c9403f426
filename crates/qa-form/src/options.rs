use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERRUPT_MESSAGE: &str = "Cancelled by user";

/// Settings for the interruption-safe [`crate::Form::ask`] entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskOptions {
    /// Printed between two blank lines when the user cancels the form.
    #[serde(default = "default_interrupt_message")]
    pub interrupt_message: String,
}

fn default_interrupt_message() -> String {
    DEFAULT_INTERRUPT_MESSAGE.to_string()
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            interrupt_message: default_interrupt_message(),
        }
    }
}

impl AskOptions {
    pub fn with_interrupt_message(message: impl Into<String>) -> Self {
        Self {
            interrupt_message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_message_falls_back_to_default() {
        let options: AskOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, AskOptions::default());
        assert_eq!(options.interrupt_message, "Cancelled by user");
    }
}
