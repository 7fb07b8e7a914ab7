//! Response type for command execution results.

use std::time::Duration;

use crate::error::{DriverError, Result};

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (command echo and trailing prompt removed).
    pub result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the output matched a failure pattern.
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark this response as failed.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Turn a failed response into a [`DriverError::CommandFailed`].
    pub fn into_result(self) -> Result<Self> {
        match self.failure_message {
            Some(ref failure) => Err(DriverError::CommandFailed {
                message: format!("'{}': {}", self.command, failure),
            }
            .into()),
            None => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = Response::new("commit check", "configuration check succeeds", "user@sw1#", Duration::ZERO);
        assert!(response.is_success());
        assert!(response.into_result().is_ok());
    }

    #[test]
    fn test_failed_response_into_error() {
        let response = Response::new("shw version", "syntax error", "user@sw1>", Duration::ZERO)
            .with_failure("syntax error");
        assert!(!response.is_success());

        let err = response.into_result().unwrap_err();
        assert!(err.to_string().contains("'shw version': syntax error"));
    }
}
