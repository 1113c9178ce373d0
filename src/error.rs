//! Process-level error type.
//!
//! Every fallible path returns `AppError`, which carries the eventual process
//! exit code alongside the message:
//!
//! - `2`: configuration or input error (bad flags, malformed files, missing key)
//! - `3`: no usable data (missing merged table, empty selection)
//! - `4`: network, terminal, or other runtime failure

#[derive(Debug, Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}
