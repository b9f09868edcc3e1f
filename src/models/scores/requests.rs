use serde::Deserialize;
use std::collections::BTreeMap;
use ts_rs::TS;

// 提交互评请求，键为被评人的用户ID
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct PeerScoreRequest {
    pub scores: BTreeMap<i64, f64>,
}

// 教师评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct TeacherScoreRequest {
    pub user_id: i64,
    pub score: f64,
    pub score_details: Option<serde_json::Value>,
}
