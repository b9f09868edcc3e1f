//! 班级生命周期：`not_started -> grouping -> teaching -> finished`，单调推进

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::{Class, ClassStatus};
use crate::models::groups::entities::{ClassMember, GroupStatus, Membership};

use super::access::{self, Action};
use super::events::{EventKind, Subject};
use super::state::ClassState;
use super::{Ctx, task_chain};

/// 新建班级的初始状态，ID 由存储层在插入后回填
pub fn new_class(
    name: String,
    description: Option<String>,
    now: DateTime<Utc>,
) -> Result<Class> {
    crate::utils::validate_class_name(&name).map_err(WorkflowError::validation)?;
    Ok(Class {
        id: 0,
        name,
        description,
        status: ClassStatus::NotStarted,
        first_task_id: None,
        version: 0,
        created_at: now,
        updated_at: now,
    })
}

fn transition(
    state: &mut ClassState,
    ctx: &mut Ctx,
    from: ClassStatus,
    to: ClassStatus,
) -> Result<Subject> {
    let current = state.class().status;
    if current != from {
        return Err(WorkflowError::invalid_state(format!(
            "Class must be {from} to move to {to}, but it is {current}"
        )));
    }
    let class = state.class_mut();
    class.status = to;
    class.updated_at = ctx.now;

    let class_id = state.class_id();
    ctx.emit(
        EventKind::ClassStatusChanged,
        Subject::Class { class_id },
        Some(to.to_string()),
    );
    Ok(Subject::Class { class_id })
}

pub fn start_grouping(state: &mut ClassState, ctx: &mut Ctx) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    let managers = state.manager_roles().count();
    if managers != 1 {
        return Err(WorkflowError::integrity_violation(format!(
            "Class must have exactly one manager role, found {managers}"
        )));
    }
    transition(state, ctx, ClassStatus::NotStarted, ClassStatus::Grouping)
}

/// 进入教学阶段
///
/// 前置条件：全部学生成员已通过入组、全部分组已审核、每组恰有一名组长、任务链完整。
/// 成功后每个分组的当前任务指向任务链表头。
pub fn start_teaching(state: &mut ClassState, ctx: &mut Ctx) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    if state.class().status != ClassStatus::Grouping {
        return Err(WorkflowError::invalid_state(
            "Teaching can only start from the grouping phase",
        ));
    }

    if let Some(member) = state
        .members()
        .find(|m| !m.is_teacher && m.membership.approved_group().is_none())
    {
        return Err(WorkflowError::integrity_violation(format!(
            "Student {} is not an approved member of any group",
            member.user_id
        )));
    }
    if let Some(group) = state.groups().find(|g| g.status != GroupStatus::Normal) {
        return Err(WorkflowError::integrity_violation(format!(
            "Group '{}' has not been approved",
            group.name
        )));
    }
    for group in state.groups() {
        let managers = state.group_managers(group.id).len();
        if managers != 1 {
            return Err(WorkflowError::integrity_violation(format!(
                "Group '{}' must have exactly one manager, found {managers}",
                group.name
            )));
        }
    }
    task_chain::validate(state)?;

    let first_task = state.class().first_task_id;
    let group_ids: Vec<i64> = state.groups().map(|g| g.id).collect();
    for group_id in group_ids {
        state.group_mut(group_id)?.current_task_id = first_task;
    }
    transition(state, ctx, ClassStatus::Grouping, ClassStatus::Teaching)
}

pub fn finish_class(state: &mut ClassState, ctx: &mut Ctx) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    transition(state, ctx, ClassStatus::Teaching, ClassStatus::Finished)
}

/// 添加班级成员；教学开始后不再接受新成员
pub fn add_member(
    state: &mut ClassState,
    ctx: &mut Ctx,
    user_id: i64,
    is_teacher: bool,
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    let status = state.class().status;
    if status > ClassStatus::Grouping {
        return Err(WorkflowError::invalid_state(
            "Members can only be added before teaching starts",
        ));
    }
    if state.member_by_user(user_id).is_some() {
        return Err(WorkflowError::integrity_violation(format!(
            "User {user_id} is already a member of this class"
        )));
    }

    let member_id = state.allocate_id();
    let class_id = state.class_id();
    state.insert_member(ClassMember {
        id: member_id,
        class_id,
        user_id,
        is_teacher,
        membership: Membership::Unassigned,
        role_ids: BTreeSet::new(),
        joined_at: ctx.now,
    });

    ctx.emit(
        EventKind::MemberAdded,
        Subject::Member { member_id },
        Some(format!("user {user_id}")),
    );
    Ok(Subject::Member { member_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::groups::requests::{CreateGroupRequest, CreateRoleRequest};
    use crate::workflow::Command;
    use crate::workflow::fixtures::Fixture;

    #[test]
    fn test_new_class_starts_not_started() {
        let class = new_class("Software Engineering".into(), None, Utc::now()).unwrap();
        assert_eq!(class.status, ClassStatus::NotStarted);
        assert!(class.first_task_id.is_none());
        assert!(new_class(String::new(), None, Utc::now()).is_err());
    }

    #[test]
    fn test_start_grouping_requires_manager_role() {
        let mut fx = Fixture::new();
        let err = fx.run_as_teacher(Command::StartGrouping).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        fx.run_as_teacher(Command::CreateRole(CreateRoleRequest {
            role_name: "manager".into(),
            role_description: None,
            is_manager: true,
        }))
        .unwrap();
        fx.run_as_teacher(Command::StartGrouping).unwrap();
        assert_eq!(fx.state.class().status, ClassStatus::Grouping);

        let err = fx.run_as_teacher(Command::StartGrouping).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_admin_manages_any_class() {
        let mut fx = Fixture::with_tasks(1);
        let admin = fx.admin;
        fx.run(admin, Command::StartGrouping).unwrap();
        assert_eq!(fx.state.class().status, ClassStatus::Grouping);
    }

    #[test]
    fn test_start_teaching_sets_current_task() {
        let fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 3);
        assert_eq!(fx.state.class().status, ClassStatus::Teaching);
        for group in fx.state.groups() {
            assert_eq!(group.current_task_id, Some(fx.tasks[0]));
        }
    }

    #[test]
    fn test_start_teaching_rejects_ungrouped_student() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        fx.add_tasks(1);
        fx.run_as_student(
            0,
            Command::CreateGroup(CreateGroupRequest {
                name: "Solo".into(),
                leader_member_id: None,
            }),
        )
        .unwrap();
        let group_id = fx.group_id();
        fx.run_as_teacher(Command::ApproveGroup { group_id }).unwrap();

        let err = fx.run_as_teacher(Command::StartTeaching).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        assert!(err.message().contains("not an approved member"));
        assert_eq!(fx.state.class().status, ClassStatus::Grouping);
    }

    #[test]
    fn test_start_teaching_rejects_pending_group() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 1);
        fx.add_tasks(1);
        fx.run_as_student(
            0,
            Command::CreateGroup(CreateGroupRequest {
                name: "Solo".into(),
                leader_member_id: None,
            }),
        )
        .unwrap();
        let err = fx.run_as_teacher(Command::StartTeaching).unwrap_err();
        assert!(err.message().contains("has not been approved"));
    }

    #[test]
    fn test_start_teaching_requires_complete_chain() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 1);
        fx.run_as_student(
            0,
            Command::CreateGroup(CreateGroupRequest {
                name: "Solo".into(),
                leader_member_id: None,
            }),
        )
        .unwrap();
        let group_id = fx.group_id();
        fx.run_as_teacher(Command::ApproveGroup { group_id }).unwrap();

        let err = fx.run_as_teacher(Command::StartTeaching).unwrap_err();
        assert!(matches!(err, WorkflowError::IncompleteChain(_)));
    }

    #[test]
    fn test_finish_class_only_from_teaching() {
        let mut fx = Fixture::grouping(&["manager"], 0);
        let err = fx.run_as_teacher(Command::FinishClass).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        fx.run_as_teacher(Command::FinishClass).unwrap();
        assert_eq!(fx.state.class().status, ClassStatus::Finished);
    }

    #[test]
    fn test_add_member_rejects_duplicates_and_late_joins() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 1);
        let err = fx
            .run_as_teacher(Command::AddMember {
                user_id: fx.students[0].user_id,
                is_teacher: false,
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let err = fx
            .run_as_teacher(Command::AddMember {
                user_id: 4242,
                is_teacher: false,
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }
}
