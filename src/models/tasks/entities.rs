use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct Task {
    // 任务ID
    pub id: i64,
    // 所属班级ID
    pub class_id: i64,
    // 任务名称
    pub name: String,
    // 任务内容
    pub content: Option<String>,
    // 提交所需的分组角色，为空表示不限角色
    pub specified_role: Option<i64>,
    // 链表中的下一个任务
    pub next_task_id: Option<i64>,
    // 成绩占比 (0-100)
    pub grade_percentage: f64,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
