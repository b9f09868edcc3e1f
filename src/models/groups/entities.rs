use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

// 分组状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub enum GroupStatus {
    Pending, // 待审核
    Normal,  // 已审核
}

impl GroupStatus {
    pub const PENDING: &'static str = "pending";
    pub const NORMAL: &'static str = "normal";
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupStatus::Pending => write!(f, "{}", Self::PENDING),
            GroupStatus::Normal => write!(f, "{}", Self::NORMAL),
        }
    }
}

impl std::str::FromStr for GroupStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(GroupStatus::Pending),
            Self::NORMAL => Ok(GroupStatus::Normal),
            _ => Err(format!("Invalid group status: {s}")),
        }
    }
}

// 分组成员审核状态（数据库列的取值）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub enum MemberStatus {
    LeaderReview, // 等待组长审核
    MemberReview, // 等待被邀请人确认
    Approved,     // 已通过
}

impl MemberStatus {
    pub const LEADER_REVIEW: &'static str = "leader_review";
    pub const MEMBER_REVIEW: &'static str = "member_review";
    pub const APPROVED: &'static str = "approved";
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::LeaderReview => write!(f, "{}", Self::LEADER_REVIEW),
            MemberStatus::MemberReview => write!(f, "{}", Self::MEMBER_REVIEW),
            MemberStatus::Approved => write!(f, "{}", Self::APPROVED),
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::LEADER_REVIEW => Ok(MemberStatus::LeaderReview),
            Self::MEMBER_REVIEW => Ok(MemberStatus::MemberReview),
            Self::APPROVED => Ok(MemberStatus::Approved),
            _ => Err(format!("Invalid member status: {s}")),
        }
    }
}

/// 班级成员与分组的关系
///
/// 未分组时为 `Unassigned`，不再用空的 group_id/status 组合表达。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub enum Membership {
    Unassigned,
    LeaderReview { group_id: i64 },
    MemberReview { group_id: i64 },
    Approved { group_id: i64 },
}

impl Membership {
    pub fn new(group_id: i64, status: MemberStatus) -> Self {
        match status {
            MemberStatus::LeaderReview => Membership::LeaderReview { group_id },
            MemberStatus::MemberReview => Membership::MemberReview { group_id },
            MemberStatus::Approved => Membership::Approved { group_id },
        }
    }

    /// 从数据库列还原；两列任一为空都视为未分组
    pub fn from_columns(group_id: Option<i64>, status: Option<MemberStatus>) -> Self {
        match (group_id, status) {
            (Some(group_id), Some(status)) => Self::new(group_id, status),
            _ => Membership::Unassigned,
        }
    }

    pub fn group_id(&self) -> Option<i64> {
        match *self {
            Membership::Unassigned => None,
            Membership::LeaderReview { group_id }
            | Membership::MemberReview { group_id }
            | Membership::Approved { group_id } => Some(group_id),
        }
    }

    pub fn status(&self) -> Option<MemberStatus> {
        match self {
            Membership::Unassigned => None,
            Membership::LeaderReview { .. } => Some(MemberStatus::LeaderReview),
            Membership::MemberReview { .. } => Some(MemberStatus::MemberReview),
            Membership::Approved { .. } => Some(MemberStatus::Approved),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Membership::LeaderReview { .. } | Membership::MemberReview { .. }
        )
    }

    pub fn approved_group(&self) -> Option<i64> {
        match *self {
            Membership::Approved { group_id } => Some(group_id),
            _ => None,
        }
    }

    pub fn with_group(self, group_id: i64) -> Self {
        match self.status() {
            Some(status) => Self::new(group_id, status),
            None => self,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupRole {
    // 角色ID
    pub id: i64,
    // 所属班级ID
    pub class_id: i64,
    // 角色名称
    pub role_name: String,
    // 角色描述
    pub role_description: Option<String>,
    // 是否为组长角色，每个班级有且仅有一个
    pub is_manager: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    // 分组ID
    pub id: i64,
    // 所属班级ID
    pub class_id: i64,
    // 分组名称
    pub name: String,
    // 分组状态
    pub status: GroupStatus,
    // 当前进行中的任务
    pub current_task_id: Option<i64>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct ClassMember {
    // 班级成员ID
    pub id: i64,
    // 所属班级ID
    pub class_id: i64,
    // 用户ID
    pub user_id: i64,
    // 是否为教师成员
    pub is_teacher: bool,
    // 分组关系
    pub membership: Membership,
    // 持有的分组角色
    pub role_ids: BTreeSet<i64>,
    // 加入时间
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_from_columns() {
        assert_eq!(
            Membership::from_columns(Some(3), Some(MemberStatus::Approved)),
            Membership::Approved { group_id: 3 }
        );
        assert_eq!(
            Membership::from_columns(Some(3), None),
            Membership::Unassigned
        );
        assert_eq!(
            Membership::from_columns(None, Some(MemberStatus::LeaderReview)),
            Membership::Unassigned
        );
    }

    #[test]
    fn test_membership_accessors() {
        let pending = Membership::MemberReview { group_id: 7 };
        assert!(pending.is_pending());
        assert_eq!(pending.group_id(), Some(7));
        assert_eq!(pending.approved_group(), None);
        assert_eq!(pending.with_group(9).group_id(), Some(9));
        assert_eq!(Membership::Unassigned.with_group(9), Membership::Unassigned);
    }

    #[test]
    fn test_membership_serializes_tagged() {
        let json = serde_json::to_value(Membership::Approved { group_id: 1 }).unwrap();
        assert_eq!(json["status"], "approved");
        assert_eq!(json["group_id"], 1);
    }
}
