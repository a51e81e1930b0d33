//! Error types shared across the RelayJam crates.

use thiserror::Error;

/// Error codes reported by wire validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Wire errors (E101-E104)
    /// E101: Payload is not a JSON object, or a track entry or note tuple is badly shaped
    MalformedWire,
    /// E102: No recognized track-type key holds an array
    NoTrackData,
    /// E103: A note tuple field is outside its permitted range
    FieldOutOfRange,
    /// E104: A note ends past the composition horizon
    BeyondHorizon,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E101").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedWire => "E101",
            ErrorCode::NoTrackData => "E102",
            ErrorCode::FieldOutOfRange => "E103",
            ErrorCode::BeyondHorizon => "E104",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional wire path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Path to the offending element (e.g., "drum\[2\]\[3\]").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a wire path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of wire validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors, in wire order.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if any error carries the given code.
    pub fn has(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Top-level error type for configuration and hashing operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Common trait for errors surfaced by the RelayJam crates.
///
/// Every error enum in the workspace implements this so that a UI layer can
/// show a stable code next to the message without matching on concrete
/// types.
pub trait CoreError: std::error::Error {
    /// Stable code such as "CODEC_001" or "RELAY_002".
    fn code(&self) -> &'static str;

    /// Human-readable message; defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category ("codec", "relay", "aggregate", "ledger", "playback").
    fn category(&self) -> &'static str;
}

impl CoreError for SpecError {
    fn code(&self) -> &'static str {
        match self {
            SpecError::JsonParse(_) => "SPEC_001",
            SpecError::Io(_) => "SPEC_002",
            SpecError::InvalidConfig { .. } => "SPEC_003",
        }
    }

    fn category(&self) -> &'static str {
        "spec"
    }
}
