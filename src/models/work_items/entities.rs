use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

// 组内工作项状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/work_item.ts")]
pub enum WorkItemStatus {
    Pending,  // 待开始
    Normal,   // 进行中
    Finished, // 已完成
}

impl WorkItemStatus {
    pub const PENDING: &'static str = "pending";
    pub const NORMAL: &'static str = "normal";
    pub const FINISHED: &'static str = "finished";
}

impl std::fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkItemStatus::Pending => write!(f, "{}", Self::PENDING),
            WorkItemStatus::Normal => write!(f, "{}", Self::NORMAL),
            WorkItemStatus::Finished => write!(f, "{}", Self::FINISHED),
        }
    }
}

impl std::str::FromStr for WorkItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(WorkItemStatus::Pending),
            Self::NORMAL => Ok(WorkItemStatus::Normal),
            Self::FINISHED => Ok(WorkItemStatus::Finished),
            _ => Err(format!("Invalid work item status: {s}")),
        }
    }
}

/// 组内工作项
///
/// 分组在当前任务下自行拆分的工作，按角色分派，可挂接本组的文件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work_item.ts")]
pub struct WorkItem {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub details: Option<String>,
    pub status: WorkItemStatus,
    // 数值越大越优先
    pub priority: i32,
    // 发布者用户ID
    pub publisher: i64,
    // 负责的分组角色ID
    pub assignees: BTreeSet<i64>,
    // 关联文件ID（文件存储中的外部ID）
    pub related_files: BTreeSet<i64>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub publish_time: chrono::DateTime<chrono::Utc>,
    pub update_time: chrono::DateTime<chrono::Utc>,
}
