use super::{ComposeError, ErrorCode};
use std::path::Path;

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// The project has no pyproject.toml
    pub fn config_not_found(path: impl AsRef<Path>) -> ComposeError {
        ComposeError::config_with_code(ErrorCode::CONFIG_NOT_FOUND, "Missing pyproject.toml file.")
            .with_path(path.as_ref())
    }

    /// pyproject.toml exists but has no tool section for us
    pub fn config_missing_section(path: impl AsRef<Path>, section: &str) -> ComposeError {
        ComposeError::config_with_code(
            ErrorCode::CONFIG_MISSING_SECTION,
            format!("pyproject.toml file missing a '[{}]' section.", section),
        )
        .with_path(path.as_ref())
    }

    /// A required key is absent from the tool section
    pub fn missing_required_field(field: &str) -> ComposeError {
        ComposeError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!("Required configuration key '{}' is missing", field),
        )
    }

    /// A subprocess ran but reported failure
    pub fn command_failed(command: &str, exit_code: i32, stderr: &str) -> ComposeError {
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            format!("exited with status {}", exit_code)
        } else {
            format!("exited with status {}: {}", exit_code, stderr)
        };
        ComposeError::execution_with_code(
            ErrorCode::EXEC_SUBPROCESS_FAILED,
            message,
            Some(command.to_string()),
        )
        .with_exit_code(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_helpers() {
        let err = common::config_not_found("pyproject.toml");
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert_eq!(err.user_message(), "Missing pyproject.toml file.");

        let err = common::config_missing_section("pyproject.toml", "tool.airflow-docker-compose");
        assert_eq!(
            err.user_message(),
            "pyproject.toml file missing a '[tool.airflow-docker-compose]' section."
        );

        let err = common::command_failed("docker-compose up", 2, "no such service\n");
        assert!(err.user_message().contains("no such service"));
    }
}
