//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称与 HTTP 状态码。

use std::fmt;

/// 错误大类，对应工作流引擎对调用方暴露的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Permission,
    InvalidState,
    IntegrityViolation,
    Validation,
    Conflict,
    Infrastructure,
}

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - kind() 方法 - 返回错误大类
/// - http_status() 方法 - 返回对应的 HTTP 状态码
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_workflow_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $kind:ident, $status:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum WorkflowError {
            $($variant(String),)*
        }

        impl WorkflowError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(WorkflowError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(WorkflowError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误大类
            pub fn kind(&self) -> ErrorKind {
                match self {
                    $(WorkflowError::$variant(_) => ErrorKind::$kind,)*
                }
            }

            /// 获取 HTTP 状态码
            pub fn http_status(&self) -> u16 {
                match self {
                    $(WorkflowError::$variant(_) => $status,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(WorkflowError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl WorkflowError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        WorkflowError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_workflow_errors! {
    DatabaseConfig("E001", "Database Configuration Error", Infrastructure, 500),
    DatabaseConnection("E002", "Database Connection Error", Infrastructure, 500),
    DatabaseOperation("E003", "Database Operation Error", Infrastructure, 500),
    Serialization("E004", "Serialization Error", Infrastructure, 500),
    Authentication("E005", "Authentication Error", Permission, 401),
    NotFound("E010", "Resource Not Found", NotFound, 404),
    Permission("E011", "Permission Denied", Permission, 403),
    InvalidState("E012", "Invalid State", InvalidState, 403),
    IntegrityViolation("E013", "Integrity Violation", IntegrityViolation, 400),
    Validation("E014", "Validation Error", Validation, 400),
    IncompleteChain("E015", "Incomplete Task Chain", IntegrityViolation, 400),
    AlreadyLastTask("E016", "Already Last Task", InvalidState, 400),
    Conflict("E017", "Concurrent Modification", Conflict, 409),
}

impl WorkflowError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为基础设施错误（数据库、序列化等），这类错误需要记录 error 日志
    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for WorkflowError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for WorkflowError {
    fn from(err: sea_orm::DbErr) -> Self {
        WorkflowError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for WorkflowError {
    fn from(err: serde_json::Error) -> Self {
        WorkflowError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(WorkflowError::database_config("test").code(), "E001");
        assert_eq!(WorkflowError::not_found("test").code(), "E010");
        assert_eq!(WorkflowError::validation("test").code(), "E014");
        assert_eq!(WorkflowError::already_last_task("test").code(), "E016");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            WorkflowError::incomplete_chain("x").kind(),
            ErrorKind::IntegrityViolation
        );
        assert_eq!(
            WorkflowError::already_last_task("x").kind(),
            ErrorKind::InvalidState
        );
        assert!(WorkflowError::database_operation("x").is_infrastructure());
        assert!(!WorkflowError::permission("x").is_infrastructure());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(WorkflowError::not_found("x").http_status(), 404);
        assert_eq!(WorkflowError::permission("x").http_status(), 403);
        assert_eq!(WorkflowError::invalid_state("x").http_status(), 403);
        assert_eq!(WorkflowError::integrity_violation("x").http_status(), 400);
        assert_eq!(WorkflowError::conflict("x").http_status(), 409);
    }

    #[test]
    fn test_format_simple() {
        let err = WorkflowError::integrity_violation("Group is full");
        let formatted = err.format_simple();
        assert!(formatted.contains("Integrity Violation"));
        assert!(formatted.contains("Group is full"));
    }
}
