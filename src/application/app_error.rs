use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A quota-gated action was refused. Carries the user-facing reason.
    #[error("Entitlement denied: {0}")]
    EntitlementDenied(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable `code` field of every error response body.
///
/// Clients key on these strings: `ENTITLEMENT_DENIED` means the plan, trial or
/// client quota refused the action and `message` holds the text to show;
/// `INVALID_CREDENTIALS` is an unknown login e-mail or a bad session cookie.
#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    InvalidInput,
    EntitlementDenied,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::EntitlementDenied => "ENTITLEMENT_DENIED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
