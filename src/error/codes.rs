/// Error code registry for airflow-compose
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Execution errors
/// - 5000-5999: Container runtime errors
/// - 6000-6999: Readiness errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_MISSING_SECTION: u16 = 1002;
    pub const CONFIG_INVALID_TOML: u16 = 1003;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_PERMISSION_DENIED: u16 = 3002;
    pub const STORAGE_NOT_FOUND: u16 = 3004;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 3011;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXEC_SPAWN_FAILED: u16 = 4007;
    pub const EXEC_OUTPUT_ERROR: u16 = 4008;

    // Container runtime errors (5000-5999)
    pub const RUNTIME_GENERIC: u16 = 5000;
    pub const RUNTIME_LISTING_FAILED: u16 = 5001;
    pub const RUNTIME_UNPARSEABLE_OUTPUT: u16 = 5002;
    pub const RUNTIME_NETWORK_FAILED: u16 = 5003;

    // Readiness errors (6000-6999)
    pub const READINESS_GENERIC: u16 = 6000;
    pub const READINESS_TIMEOUT: u16 = 6001;
    pub const READINESS_ATTEMPTS_EXHAUSTED: u16 = 6002;
    pub const READINESS_CANCELLED: u16 = 6003;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "pyproject.toml not found",
        ErrorCode::CONFIG_MISSING_SECTION => "Tool section missing from pyproject.toml",
        ErrorCode::CONFIG_INVALID_TOML => "Invalid TOML syntax",
        ErrorCode::CONFIG_MISSING_REQUIRED => "Required configuration field missing",
        ErrorCode::CONFIG_INVALID_VALUE => "Invalid configuration value",

        ErrorCode::STORAGE_GENERIC => "General storage error",
        ErrorCode::STORAGE_IO_ERROR => "File I/O failed",
        ErrorCode::STORAGE_PERMISSION_DENIED => "Permission denied",
        ErrorCode::STORAGE_NOT_FOUND => "File or directory not found",
        ErrorCode::STORAGE_SERIALIZATION_ERROR => "Failed to serialize data",

        ErrorCode::EXEC_GENERIC => "General execution error",
        ErrorCode::EXEC_COMMAND_NOT_FOUND => "Command not found",
        ErrorCode::EXEC_SUBPROCESS_FAILED => "Subprocess exited with a non-zero status",
        ErrorCode::EXEC_SPAWN_FAILED => "Failed to spawn subprocess",
        ErrorCode::EXEC_OUTPUT_ERROR => "Failed to read subprocess output",

        ErrorCode::RUNTIME_GENERIC => "General container runtime error",
        ErrorCode::RUNTIME_LISTING_FAILED => "Failed to list containers",
        ErrorCode::RUNTIME_UNPARSEABLE_OUTPUT => "Container runtime output could not be parsed",
        ErrorCode::RUNTIME_NETWORK_FAILED => "Docker network operation failed",

        ErrorCode::READINESS_GENERIC => "General readiness error",
        ErrorCode::READINESS_TIMEOUT => "Timed out waiting for containers",
        ErrorCode::READINESS_ATTEMPTS_EXHAUSTED => "Ran out of attempts waiting for containers",
        ErrorCode::READINESS_CANCELLED => "Wait for containers was cancelled",

        ErrorCode::OTHER_GENERIC => "General error",
        _ => "Unknown error",
    }
}
