//! Shared primitives used across Trellis crates.

use core::fmt;

/// Result alias used across the workspace.
pub type TrellisResult<T> = Result<T, TrellisError>;

/// Error carried by every fallible Trellis operation.
///
/// `code` is a stable dotted identifier (`dom.unknown_node`,
/// `css.selector_invalid`, ...) that callers and tests match on; `message`
/// is meant for humans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrellisError {
    pub code: &'static str,
    pub message: String,
}

impl TrellisError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// True when the error was raised with `code`.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for TrellisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for TrellisError {}

#[cfg(test)]
mod tests {
    use super::TrellisError;

    #[test]
    fn display_includes_code_and_message() {
        let error = TrellisError::new("dom.unknown_node", "node 7 is not part of this document");
        assert_eq!(
            error.to_string(),
            "dom.unknown_node: node 7 is not part of this document"
        );
        assert!(error.is("dom.unknown_node"));
        assert!(!error.is("dom.hierarchy_request"));
    }
}
