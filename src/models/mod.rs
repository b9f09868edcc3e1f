//! 数据模型定义
//!
//! 业务实体同时用于工作流引擎内部状态和 API 响应，并通过 ts-rs 导出 TypeScript 类型。

pub mod common;

pub mod actors {
    pub mod entities;
}

pub mod classes {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod tasks {
    pub mod entities;
    pub mod requests;
}

pub mod groups {
    pub mod entities;
    pub mod requests;
}

pub mod deliveries {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod scores {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod work_items {
    pub mod entities;
    pub mod requests;
}

pub use common::{ApiResponse, ErrorCode};

use serde::{Deserialize, Deserializer};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 区分"字段缺失"与"显式传 null"
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
