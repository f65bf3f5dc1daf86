//! CLI-facing error type.
//!
//! Every failure that reaches `main` carries a process exit code:
//!
//! - `2`: bad input or configuration (arguments, environment, files we read)
//! - `3`: the provider answered but there is nothing usable to reconstruct
//! - `4`: remote or processing failure (transport, malformed fetched document, and
//!   every local write: exports, `--save-raw`, debug bundle)
//!
//! The reconstruction core has its own typed errors (`reconstruct::error`); those are
//! reported alongside the dataset and never converted into an `AppError` one by one.

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_NO_DATA: u8 = 3;
pub const EXIT_REMOTE: u8 = 4;

#[derive(Clone)]
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

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_DATA, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(EXIT_REMOTE, message)
    }

    /// A local write failed (export, raw copy, debug bundle).
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(EXIT_REMOTE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_map_to_exit_codes() {
        assert_eq!(AppError::input("x").exit_code(), 2);
        assert_eq!(AppError::no_data("x").exit_code(), 3);
        assert_eq!(AppError::remote("x").exit_code(), 4);
        assert_eq!(AppError::output("x").exit_code(), 4);
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = AppError::remote("provider returned HTTP 503");
        assert_eq!(err.to_string(), "provider returned HTTP 503");
        assert_eq!(err.message(), "provider returned HTTP 503");
    }
}
