use crate::error::{ComposeError, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    InternalError { message: String },

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

/// Convert ProcessError to ComposeError
impl From<ProcessError> for ComposeError {
    fn from(err: ProcessError) -> Self {
        let (code, command) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::EXEC_COMMAND_NOT_FOUND, Some(cmd.clone()))
            }
            ProcessError::Io(_) => (ErrorCode::EXEC_OUTPUT_ERROR, None),
            ProcessError::SpawnFailed { command, .. } => {
                (ErrorCode::EXEC_SPAWN_FAILED, Some(command.clone()))
            }
            ProcessError::InternalError { .. } | ProcessError::MockExpectationNotMet(_) => {
                (ErrorCode::EXEC_GENERIC, None)
            }
        };

        ComposeError::execution_with_code(code, err.to_string(), command).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_not_found_conversion() {
        let err: ComposeError = ProcessError::CommandNotFound("docker".to_string()).into();
        assert_eq!(err.code(), ErrorCode::EXEC_COMMAND_NOT_FOUND);
        assert!(err.user_message().contains("'docker'"));
    }

    #[test]
    fn test_spawn_failure_conversion_keeps_command() {
        let err: ComposeError = ProcessError::SpawnFailed {
            command: "docker ps".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        match err {
            ComposeError::Execution { code, command, .. } => {
                assert_eq!(code, ErrorCode::EXEC_SPAWN_FAILED);
                assert_eq!(command.as_deref(), Some("docker ps"));
            }
            other => panic!("Expected Execution error, got {other:?}"),
        }
    }
}
