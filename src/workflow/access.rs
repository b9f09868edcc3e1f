//! 权限判定
//!
//! 每个工作流操作在开头显式调用 [`check`]，传入操作者、动作与目标，
//! 得到允许或带原因的拒绝。

use crate::errors::{Result, WorkflowError};
use crate::models::actors::entities::{Actor, UserType};
use crate::models::groups::entities::ClassMember;

use super::state::ClassState;

/// 判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(WorkflowError::permission(reason)),
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny(reason.into())
    }
}

/// 需要判定的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 查看班级
    ViewClass,
    /// 班级管理：生命周期、任务、角色、成员、分组审核、教师审核与评分
    ManageClass,
    /// 分组管理：组长或教师/管理员
    ManageGroup { group_id: i64 },
    /// 以分组身份行动：分组内已通过成员或教师/管理员
    ActForGroup { group_id: i64 },
    /// 查看分组内部数据
    ViewGroup { group_id: i64 },
    /// 作为分组成员参与互评（教师/管理员不参与）
    PeerReview { group_id: i64 },
}

/// 操作者对应的班级成员
pub fn acting_member<'a>(state: &'a ClassState, actor: &Actor) -> Option<&'a ClassMember> {
    state.member_by_user(actor.user_id)
}

/// 管理员，或本班级的教师成员
pub fn is_staff(state: &ClassState, actor: &Actor) -> bool {
    match actor.user_type {
        UserType::Admin => true,
        UserType::Teacher => acting_member(state, actor).is_some_and(|m| m.is_teacher),
        UserType::Student => false,
    }
}

/// 操作者是否为该分组的组长
pub fn is_group_manager(state: &ClassState, actor: &Actor, group_id: i64) -> bool {
    state
        .group_managers(group_id)
        .iter()
        .any(|m| m.user_id == actor.user_id)
}

/// 操作者是否为该分组已通过审核的成员
pub fn is_approved_member(state: &ClassState, actor: &Actor, group_id: i64) -> bool {
    acting_member(state, actor)
        .is_some_and(|m| m.membership.approved_group() == Some(group_id))
}

/// 班级对非管理员的非成员不可见，统一返回 NotFound
pub fn ensure_visible(state: &ClassState, actor: &Actor) -> Result<()> {
    if actor.is_admin() || acting_member(state, actor).is_some() {
        Ok(())
    } else {
        Err(WorkflowError::not_found("Class not found"))
    }
}

pub fn check(state: &ClassState, actor: &Actor, action: Action) -> Decision {
    let staff = is_staff(state, actor);
    match action {
        Action::ViewClass => {
            if actor.is_admin() || acting_member(state, actor).is_some() {
                Decision::Allow
            } else {
                Decision::deny("Not a member of this class")
            }
        }
        Action::ManageClass => {
            if staff {
                Decision::Allow
            } else {
                Decision::deny("Only teachers of this class or admins can do this")
            }
        }
        Action::ManageGroup { group_id } => {
            if staff || is_group_manager(state, actor, group_id) {
                Decision::Allow
            } else {
                Decision::deny("Only the group manager, teachers or admins can do this")
            }
        }
        Action::ActForGroup { group_id } => {
            if staff || is_approved_member(state, actor, group_id) {
                Decision::Allow
            } else {
                Decision::deny("Only approved members of this group can do this")
            }
        }
        Action::ViewGroup { group_id } => {
            let in_group = acting_member(state, actor)
                .is_some_and(|m| m.membership.group_id() == Some(group_id));
            if staff || in_group {
                Decision::Allow
            } else {
                Decision::deny("Not a member of this group")
            }
        }
        Action::PeerReview { group_id } => {
            if is_approved_member(state, actor, group_id) {
                Decision::Allow
            } else {
                Decision::deny("Only approved members of this group can submit peer scores")
            }
        }
    }
}

/// 组合 [`check`] 与 `?` 的简写
pub fn require(state: &ClassState, actor: &Actor, action: Action) -> Result<()> {
    check(state, actor, action).into_result()
}
