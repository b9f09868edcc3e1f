use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级状态，单调推进：not_started -> grouping -> teaching -> finished
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub enum ClassStatus {
    NotStarted, // 未开始
    Grouping,   // 分组中
    Teaching,   // 教学中
    Finished,   // 已结束
}

impl ClassStatus {
    pub const NOT_STARTED: &'static str = "not_started";
    pub const GROUPING: &'static str = "grouping";
    pub const TEACHING: &'static str = "teaching";
    pub const FINISHED: &'static str = "finished";

    /// 状态机中的下一个状态
    pub fn next(self) -> Option<ClassStatus> {
        match self {
            ClassStatus::NotStarted => Some(ClassStatus::Grouping),
            ClassStatus::Grouping => Some(ClassStatus::Teaching),
            ClassStatus::Teaching => Some(ClassStatus::Finished),
            ClassStatus::Finished => None,
        }
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassStatus::NotStarted => write!(f, "{}", Self::NOT_STARTED),
            ClassStatus::Grouping => write!(f, "{}", Self::GROUPING),
            ClassStatus::Teaching => write!(f, "{}", Self::TEACHING),
            ClassStatus::Finished => write!(f, "{}", Self::FINISHED),
        }
    }
}

impl std::str::FromStr for ClassStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::NOT_STARTED => Ok(ClassStatus::NotStarted),
            Self::GROUPING => Ok(ClassStatus::Grouping),
            Self::TEACHING => Ok(ClassStatus::Teaching),
            Self::FINISHED => Ok(ClassStatus::Finished),
            _ => Err(format!("Invalid class status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct Class {
    // 班级ID
    pub id: i64,
    // 班级名称
    pub name: String,
    // 班级描述
    pub description: Option<String>,
    // 班级状态
    pub status: ClassStatus,
    // 任务链表头
    pub first_task_id: Option<i64>,
    // 乐观锁版本号
    pub version: i64,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
