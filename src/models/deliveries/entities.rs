use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 交付状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub enum DeliveryStatus {
    Draft,           // 草稿
    LeaderReview,    // 组长审核中
    LeaderRejected,  // 组长驳回
    TeacherReview,   // 教师审核中
    TeacherRejected, // 教师驳回
    TeacherApproved, // 教师通过
}

impl DeliveryStatus {
    pub const DRAFT: &'static str = "draft";
    pub const LEADER_REVIEW: &'static str = "leader_review";
    pub const LEADER_REJECTED: &'static str = "leader_rejected";
    pub const TEACHER_REVIEW: &'static str = "teacher_review";
    pub const TEACHER_REJECTED: &'static str = "teacher_rejected";
    pub const TEACHER_APPROVED: &'static str = "teacher_approved";

    /// 状态转换表，表外的转换一律非法
    pub fn can_transition_to(self, to: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, to),
            (Draft, LeaderReview)
                | (Draft, TeacherReview)
                | (LeaderReview, LeaderRejected)
                | (LeaderReview, TeacherReview)
                | (TeacherReview, TeacherRejected)
                | (TeacherReview, TeacherApproved)
                | (TeacherApproved, TeacherRejected)
        )
    }

    /// 草稿或任一审核中状态
    pub fn is_active(self) -> bool {
        matches!(
            self,
            DeliveryStatus::Draft | DeliveryStatus::LeaderReview | DeliveryStatus::TeacherReview
        )
    }

    pub fn is_rejected(self) -> bool {
        matches!(
            self,
            DeliveryStatus::LeaderRejected | DeliveryStatus::TeacherRejected
        )
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStatus::Draft => Self::DRAFT,
            DeliveryStatus::LeaderReview => Self::LEADER_REVIEW,
            DeliveryStatus::LeaderRejected => Self::LEADER_REJECTED,
            DeliveryStatus::TeacherReview => Self::TEACHER_REVIEW,
            DeliveryStatus::TeacherRejected => Self::TEACHER_REJECTED,
            DeliveryStatus::TeacherApproved => Self::TEACHER_APPROVED,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(DeliveryStatus::Draft),
            Self::LEADER_REVIEW => Ok(DeliveryStatus::LeaderReview),
            Self::LEADER_REJECTED => Ok(DeliveryStatus::LeaderRejected),
            Self::TEACHER_REVIEW => Ok(DeliveryStatus::TeacherReview),
            Self::TEACHER_REJECTED => Ok(DeliveryStatus::TeacherRejected),
            Self::TEACHER_APPROVED => Ok(DeliveryStatus::TeacherApproved),
            _ => Err(format!("Invalid delivery status: {s}")),
        }
    }
}

// 交付项类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub enum DeliveryType {
    File, // 文件
    Repo, // 代码仓库
}

impl DeliveryType {
    pub const FILE: &'static str = "file";
    pub const REPO: &'static str = "repo";
}

impl<'de> Deserialize<'de> for DeliveryType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryType::File => write!(f, "{}", Self::FILE),
            DeliveryType::Repo => write!(f, "{}", Self::REPO),
        }
    }
}

impl std::str::FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::FILE => Ok(DeliveryType::File),
            Self::REPO => Ok(DeliveryType::Repo),
            _ => Err(format!(
                "Invalid delivery item type: '{s}'. Supported: file, repo"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct DeliveryItem {
    // 交付项ID
    pub id: i64,
    // 所属交付ID
    pub delivery_id: i64,
    // 交付项类型
    pub item_type: DeliveryType,
    // 文件或仓库记录的ID，由外部存储提供
    pub item_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct Delivery {
    // 交付ID
    pub id: i64,
    // 任务ID
    pub task_id: i64,
    // 分组ID
    pub group_id: i64,
    // 交付状态
    pub status: DeliveryStatus,
    // 创建草稿的用户
    pub delivery_user: i64,
    // 提交时任务成绩占比的快照
    pub task_grade_percentage: f64,
    // 提交说明
    pub delivery_comments: Option<String>,
    // 提交时间，草稿为空
    pub delivery_time: Option<chrono::DateTime<chrono::Utc>>,
    // 审核意见
    pub review_comments: Option<String>,
    // 审核时间
    pub review_time: Option<chrono::DateTime<chrono::Utc>>,
    // 教师最终评分
    pub score: Option<f64>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 交付项
    pub items: Vec<DeliveryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeliveryStatus::*;

    const ALL: [DeliveryStatus; 6] = [
        Draft,
        LeaderReview,
        LeaderRejected,
        TeacherReview,
        TeacherRejected,
        TeacherApproved,
    ];

    #[test]
    fn test_transition_table_is_exact() {
        let allowed = [
            (Draft, LeaderReview),
            (Draft, TeacherReview),
            (LeaderReview, LeaderRejected),
            (LeaderReview, TeacherReview),
            (TeacherReview, TeacherRejected),
            (TeacherReview, TeacherApproved),
            (TeacherApproved, TeacherRejected),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_rejected_states_are_terminal() {
        for to in ALL {
            assert!(!LeaderRejected.can_transition_to(to));
            assert!(!TeacherRejected.can_transition_to(to));
        }
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in ALL {
            assert_eq!(status.to_string().parse::<DeliveryStatus>(), Ok(status));
        }
    }
}
