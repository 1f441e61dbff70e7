use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no user is logged in")]
    NoActiveSession,
    #[error("another session operation is still in flight")]
    OperationInProgress,
    #[error("auth endpoint unreachable: {0}")]
    Transport(String),
    #[error("auth endpoint rejected the request ({code:?}): {message}")]
    Server { code: ErrorCode, message: String },
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::NoActiveSession => ErrorCode::NoActiveSession,
            AuthError::OperationInProgress | AuthError::Transport(_) => ErrorCode::Internal,
            AuthError::Server { code, .. } => *code,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(value: ApiError) -> Self {
        match value.code {
            ErrorCode::InvalidCredentials => AuthError::InvalidCredentials,
            ErrorCode::NoActiveSession | ErrorCode::Unauthorized => AuthError::NoActiveSession,
            code => AuthError::Server {
                code,
                message: value.message,
            },
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        AuthError::Transport(value.to_string())
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
