use super::entities::TeacherScore;
use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

// 互评完成情况
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct Completion {
    pub complete: bool,
    // 尚未给组长评分的组员
    pub missing_manager_scores: Vec<i64>,
    // 组长尚未评分的组员
    pub missing_member_scores: Vec<i64>,
}

// 按可见性过滤后的互评记录，不可见的部分为 None
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct PeerScoreView {
    pub task_id: i64,
    pub group_id: i64,
    pub manager_score: Option<BTreeMap<i64, f64>>,
    pub member_scores: Option<BTreeMap<i64, f64>>,
    pub completion: Completion,
}

// 某任务下分组成员的教师评分
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct TeacherScoreList {
    pub task_id: i64,
    pub group_id: i64,
    pub scores: Vec<TeacherScore>,
    // 尚未评分的学生
    pub unscored_users: Vec<i64>,
    pub complete: bool,
}

// 单个学生的成绩汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct StudentGrade {
    pub user_id: i64,
    pub group_id: Option<i64>,
    pub scores: Vec<TeacherScore>,
    // Σ score × grade_percentage / 100
    pub total: f64,
}

// 班级成绩汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct GradeSummary {
    pub class_id: i64,
    pub students: Vec<StudentGrade>,
}
