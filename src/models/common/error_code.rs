use crate::errors::{ErrorKind, WorkflowError};

// 业务错误码，写入 ApiResponse.code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    // 工作流错误
    PermissionDenied = 2001,
    InvalidState = 2002,
    IntegrityViolation = 2003,
    ValidationFailed = 2004,
    IncompleteTaskChain = 2005,
    AlreadyLastTask = 2006,
}

impl From<&WorkflowError> for ErrorCode {
    fn from(err: &WorkflowError) -> Self {
        match err {
            WorkflowError::IncompleteChain(_) => ErrorCode::IncompleteTaskChain,
            WorkflowError::AlreadyLastTask(_) => ErrorCode::AlreadyLastTask,
            WorkflowError::Authentication(_) => ErrorCode::Unauthorized,
            _ => match err.kind() {
                ErrorKind::NotFound => ErrorCode::NotFound,
                ErrorKind::Permission => ErrorCode::PermissionDenied,
                ErrorKind::InvalidState => ErrorCode::InvalidState,
                ErrorKind::IntegrityViolation => ErrorCode::IntegrityViolation,
                ErrorKind::Validation => ErrorCode::ValidationFailed,
                ErrorKind::Conflict => ErrorCode::Conflict,
                ErrorKind::Infrastructure => ErrorCode::InternalServerError,
            },
        }
    }
}
