use thiserror::Error;

/// Tool-level error type.
///
/// Provider failures never reach this type; they are absorbed by the
/// provider clients and at worst become a "no codes found" outcome.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
