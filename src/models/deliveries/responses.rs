use serde::Serialize;
use ts_rs::TS;

// 提交资格检查结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct SubmissionCheck {
    pub task_id: i64,
    pub group_id: i64,
    pub allowed: bool,
    // 不允许提交时的原因
    pub reason: Option<String>,
}
