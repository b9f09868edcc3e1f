use super::entities::WorkItemStatus;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

// 关联文件，owner_group_id 是文件存储记录的归属分组
#[derive(Debug, Clone, Copy, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work_item.ts")]
pub struct FileRef {
    pub file_id: i64,
    pub owner_group_id: i64,
}

// 创建工作项请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work_item.ts")]
pub struct CreateWorkItemRequest {
    pub name: String,
    pub details: Option<String>,
    pub assignees: Vec<i64>,
    #[serde(default)]
    pub related_files: Vec<FileRef>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: i32,
}

// 更新工作项请求
//
// 发布者、组长与教师可改全部字段；负责角色的成员只能改 status 与 related_files
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work_item.ts")]
pub struct UpdateWorkItemRequest {
    pub name: Option<String>,
    pub details: Option<String>,
    pub status: Option<WorkItemStatus>,
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[ts(type = "string | null")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub assignees: Option<Vec<i64>>,
    pub related_files: Option<Vec<FileRef>>,
}

impl UpdateWorkItemRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.details.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.assignees.is_none()
            && self.related_files.is_none()
    }

    /// 是否只涉及负责人可修改的字段
    pub fn is_assignee_update(&self) -> bool {
        self.name.is_none()
            && self.details.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.assignees.is_none()
    }
}

// 工作项列表筛选
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/work_item.ts")]
pub struct WorkItemQuery {
    pub status: Option<WorkItemStatus>,
    pub priority: Option<i32>,
    // 名称关键字，不区分大小写
    pub kw: Option<String>,
}
