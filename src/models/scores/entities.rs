use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// 组内互评记录，按 (任务, 分组) 唯一
///
/// - `manager_score`：组员给组长的评分，键为评分人的用户ID
/// - `member_scores`：组长给组员的评分，键为被评人的用户ID
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct TaskGroupMemberScore {
    pub task_id: i64,
    pub group_id: i64,
    pub manager_score: BTreeMap<i64, f64>,
    pub member_scores: BTreeMap<i64, f64>,
}

/// 教师给单个学生的任务评分，按 (任务, 用户) 唯一
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct TeacherScore {
    pub task_id: i64,
    pub user_id: i64,
    pub score: f64,
    pub score_details: Option<serde_json::Value>,
    pub score_time: chrono::DateTime<chrono::Utc>,
}
