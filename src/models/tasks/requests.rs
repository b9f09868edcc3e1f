use serde::Deserialize;
use ts_rs::TS;

// 创建任务请求，新任务追加到任务链末尾
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct CreateTaskRequest {
    pub name: String,
    pub content: Option<String>,
    pub specified_role: Option<i64>,
    pub grade_percentage: f64,
}

// 更新任务请求
//
// specified_role 使用双层 Option：外层 None 表示不修改，Some(None) 表示清除角色限制
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[ts(type = "bigint | null")]
    pub specified_role: Option<Option<i64>>,
    pub grade_percentage: Option<f64>,
}

// 调整任务顺序请求，必须是班级全部任务的一个排列
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct ReorderTasksRequest {
    pub task_ids: Vec<i64>,
}
