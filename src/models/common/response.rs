use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::errors::WorkflowError;
use crate::models::ErrorCode;

/// 统一的API响应结构
///
/// `code` 为 0 表示成功；失败时 `error` 携带内部错误代码（如 `E013`），便于前端区分同一 HTTP 状态下的不同原因。
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    // message 由调用方决定，基础设施错误不应把细节返回给客户端
    pub fn from_error(err: &WorkflowError, message: impl Into<String>) -> Self {
        Self {
            error: Some(err.code().to_string()),
            ..Self::error_empty(ErrorCode::from(err), message)
        }
    }
}
