#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// An enum to represent the ways a grading calculation can fail.
///
/// The message carried by each variant is shown to the user as-is, so it
/// is the whole `Display` output.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GradingError {
    /// Malformed criteria, boundaries or tables, detected before computing.
    #[error("{0}")]
    Configuration(String),
    /// A score, time or performance is missing or outside its allowed bounds.
    #[error("{0}")]
    InputRange(String),
    /// No table entry matches a discipline/performance/context combination.
    #[error("{0}")]
    Lookup(String),
}

impl GradingError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an input range error.
    pub fn input_range(message: impl Into<String>) -> Self {
        Self::InputRange(message.into())
    }

    /// Creates a lookup error.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    /// Returns the message without the variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration(m) | Self::InputRange(m) | Self::Lookup(m) => m,
        }
    }
}

/// Result type used throughout the grading and analysis modules.
pub type Result<T, E = GradingError> = std::result::Result<T, E>;
