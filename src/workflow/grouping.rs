//! 分组组建
//!
//! 成员与分组的关系状态机：
//! `Unassigned -> {LeaderReview, MemberReview} -> Approved`，教师/管理员可直接 `Unassigned -> Approved`。
//! 分组容量为班级角色数（含待审核成员），同组内同一角色只能由一人持有，组长角色在建组时确定后不可变。

use std::collections::BTreeSet;

use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::ClassStatus;
use crate::models::groups::entities::{Group, GroupRole, GroupStatus, Membership};
use crate::models::groups::requests::{CreateGroupRequest, CreateRoleRequest};

use super::access::{self, Action};
use super::events::{EventKind, Subject};
use super::state::ClassState;
use super::Ctx;

fn ensure_grouping(state: &ClassState) -> Result<()> {
    if state.class().status != ClassStatus::Grouping {
        return Err(WorkflowError::invalid_state(
            "Class is not in the grouping phase",
        ));
    }
    Ok(())
}

fn ensure_roles_editable(state: &ClassState) -> Result<()> {
    if state.class().status != ClassStatus::NotStarted {
        return Err(WorkflowError::invalid_state(
            "Roles can only be changed before grouping starts",
        ));
    }
    Ok(())
}

fn ensure_pending(state: &ClassState, group_id: i64, message: &str) -> Result<()> {
    if state.group(group_id)?.status != GroupStatus::Pending {
        return Err(WorkflowError::invalid_state(message));
    }
    Ok(())
}

// ---- 角色 ----

pub fn create_role(
    state: &mut ClassState,
    ctx: &mut Ctx,
    request: CreateRoleRequest,
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_roles_editable(state)?;
    crate::utils::validate_role_name(&request.role_name).map_err(WorkflowError::validation)?;

    if request.is_manager && state.manager_role_id().is_some() {
        return Err(WorkflowError::integrity_violation(
            "Class already has a manager role",
        ));
    }
    if state.roles().any(|r| r.role_name == request.role_name) {
        return Err(WorkflowError::integrity_violation(format!(
            "Role '{}' already exists",
            request.role_name
        )));
    }

    let id = state.allocate_id();
    let class_id = state.class_id();
    state.insert_role(GroupRole {
        id,
        class_id,
        role_name: request.role_name,
        role_description: request.role_description,
        is_manager: request.is_manager,
    });

    ctx.emit(EventKind::RoleCreated, Subject::Role { role_id: id }, None);
    Ok(Subject::Role { role_id: id })
}

pub fn delete_role(state: &mut ClassState, ctx: &mut Ctx, role_id: i64) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_roles_editable(state)?;
    state.role(role_id)?;

    if let Some(task) = state.tasks().find(|t| t.specified_role == Some(role_id)) {
        return Err(WorkflowError::integrity_violation(format!(
            "Role is required by task '{}'",
            task.name
        )));
    }

    state.strip_role(role_id);
    state.remove_role(role_id);
    ctx.emit(EventKind::RoleDeleted, Subject::Role { role_id }, None);
    Ok(Subject::Class {
        class_id: state.class_id(),
    })
}

// ---- 分组 ----

/// 创建分组
///
/// 学生创建时自己成为组长；教师/管理员创建时必须指定一名尚未入组的学生为组长。
pub fn create_group(
    state: &mut ClassState,
    ctx: &mut Ctx,
    request: CreateGroupRequest,
) -> Result<Subject> {
    ensure_grouping(state)?;
    crate::utils::validate_group_name(&request.name).map_err(WorkflowError::validation)?;
    let manager_role = state
        .manager_role_id()
        .ok_or_else(|| WorkflowError::integrity_violation("Class has no manager role"))?;

    let leader_id = if access::is_staff(state, &ctx.actor) {
        let leader_id = request.leader_member_id.ok_or_else(|| {
            WorkflowError::validation("A leader must be designated when staff create a group")
        })?;
        let leader = state.member(leader_id)?;
        if leader.is_teacher {
            return Err(WorkflowError::validation("Teachers cannot lead a group"));
        }
        if leader.membership.approved_group().is_some() {
            return Err(WorkflowError::integrity_violation(
                "Designated leader already belongs to a group",
            ));
        }
        leader_id
    } else {
        let me = access::acting_member(state, &ctx.actor)
            .ok_or_else(|| WorkflowError::permission("Not a member of this class"))?;
        if me.is_teacher {
            return Err(WorkflowError::permission("Teachers cannot lead a group"));
        }
        if me.membership != Membership::Unassigned {
            return Err(WorkflowError::integrity_violation(
                "You already belong to a group or have a pending request",
            ));
        }
        me.id
    };

    let group_id = state.allocate_id();
    let class_id = state.class_id();
    state.insert_group(Group {
        id: group_id,
        class_id,
        name: request.name,
        status: GroupStatus::Pending,
        current_task_id: None,
        created_at: ctx.now,
    });
    state.set_membership(leader_id, Membership::Approved { group_id })?;
    state.set_roles(leader_id, BTreeSet::from([manager_role]))?;

    ctx.emit(EventKind::GroupCreated, Subject::Group { group_id }, None);
    Ok(Subject::Group { group_id })
}

pub fn update_group(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    name: String,
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageGroup { group_id })?;
    if state.class().status == ClassStatus::Finished {
        return Err(WorkflowError::invalid_state(
            "Groups cannot be changed after the class has finished",
        ));
    }
    crate::utils::validate_group_name(&name).map_err(WorkflowError::validation)?;
    state.group_mut(group_id)?.name = name;

    ctx.emit(EventKind::GroupUpdated, Subject::Group { group_id }, None);
    Ok(Subject::Group { group_id })
}

/// 解散待审核分组，全部成员回到未分组状态
pub fn delete_group(state: &mut ClassState, ctx: &mut Ctx, group_id: i64) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageGroup { group_id })?;
    ensure_grouping(state)?;
    ensure_pending(state, group_id, "Only pending groups can be deleted")?;

    let member_ids: Vec<i64> = state.roster(group_id).map(|m| m.id).collect();
    for member_id in member_ids {
        state.set_membership(member_id, Membership::Unassigned)?;
    }
    state.remove_group(group_id);

    ctx.emit(EventKind::GroupDeleted, Subject::Group { group_id }, None);
    Ok(Subject::Class {
        class_id: state.class_id(),
    })
}

/// 申请加入 / 邀请加入 / 教师直接分配
///
/// - 学生为自己申请：`LeaderReview`，等待组长或教师审核
/// - 组长邀请其他学生：`MemberReview`，等待被邀请人确认
/// - 教师/管理员：直接 `Approved`，并覆盖目标已有的待审核申请
pub fn request_membership(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    class_member_id: i64,
) -> Result<Subject> {
    ensure_grouping(state)?;
    ensure_pending(state, group_id, "Group is not accepting new members")?;

    let target = state.member(class_member_id)?.clone();
    if target.is_teacher {
        return Err(WorkflowError::validation("Teachers cannot join a group"));
    }
    if target.membership.approved_group().is_some() {
        return Err(WorkflowError::integrity_violation(
            "Member already belongs to a group",
        ));
    }

    let staff = access::is_staff(state, &ctx.actor);
    let membership = if staff {
        Membership::Approved { group_id }
    } else {
        let me = access::acting_member(state, &ctx.actor)
            .ok_or_else(|| WorkflowError::permission("Not a member of this class"))?;
        let membership = if me.id == target.id {
            Membership::LeaderReview { group_id }
        } else if access::is_group_manager(state, &ctx.actor, group_id) {
            Membership::MemberReview { group_id }
        } else {
            return Err(WorkflowError::permission(
                "Only the group manager can invite other students",
            ));
        };
        if target.membership.is_pending() {
            return Err(WorkflowError::integrity_violation(
                "Member already has a pending request",
            ));
        }
        membership
    };

    let occupied = state
        .roster(group_id)
        .filter(|m| m.id != target.id)
        .count();
    if occupied >= state.role_count() {
        return Err(WorkflowError::integrity_violation("Group is full"));
    }

    state.set_membership(target.id, membership)?;
    let kind = if staff {
        EventKind::MembershipApproved
    } else {
        EventKind::MembershipRequested
    };
    ctx.emit(
        kind,
        Subject::Member {
            member_id: target.id,
        },
        membership.status().map(|s| s.to_string()),
    );
    Ok(Subject::Member {
        member_id: target.id,
    })
}

/// 审核通过待定成员
///
/// `LeaderReview` 由组长或教师/管理员审核；`MemberReview` 由被邀请人本人或教师/管理员确认。
pub fn approve_membership(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    class_member_id: i64,
) -> Result<Subject> {
    ensure_grouping(state)?;
    ensure_pending(state, group_id, "Group is not accepting new members")?;

    let member = state.member(class_member_id)?;
    match member.membership {
        Membership::LeaderReview { group_id: g } if g == group_id => {
            access::require(state, &ctx.actor, Action::ManageGroup { group_id })?;
        }
        Membership::MemberReview { group_id: g } if g == group_id => {
            let invited_self = member.user_id == ctx.actor.user_id;
            if !invited_self && !access::is_staff(state, &ctx.actor) {
                return Err(WorkflowError::permission(
                    "Only the invited student can accept the invitation",
                ));
            }
        }
        _ => {
            return Err(WorkflowError::invalid_state(
                "No pending request for this group",
            ));
        }
    }

    state.set_membership(class_member_id, Membership::Approved { group_id })?;
    ctx.emit(
        EventKind::MembershipApproved,
        Subject::Member {
            member_id: class_member_id,
        },
        None,
    );
    Ok(Subject::Member {
        member_id: class_member_id,
    })
}

/// 退出或移出分组
///
/// 学生可以移出自己；组长可以移出任意非组长成员；组长本身不可被移出。
pub fn remove_member(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    class_member_id: i64,
) -> Result<Subject> {
    ensure_grouping(state)?;
    ensure_pending(
        state,
        group_id,
        "Members can only be removed while the group is pending",
    )?;

    let member = state.member(class_member_id)?;
    if member.membership.group_id() != Some(group_id) {
        return Err(WorkflowError::not_found("Member is not in this group"));
    }
    let is_manager = state
        .group_managers(group_id)
        .iter()
        .any(|m| m.id == class_member_id);
    if is_manager {
        return Err(WorkflowError::integrity_violation(
            "The group manager cannot be removed",
        ));
    }
    let removing_self = member.user_id == ctx.actor.user_id;
    if !removing_self {
        access::require(state, &ctx.actor, Action::ManageGroup { group_id })?;
    }

    state.set_membership(class_member_id, Membership::Unassigned)?;
    ctx.emit(
        EventKind::MemberRemoved,
        Subject::Member {
            member_id: class_member_id,
        },
        Some(format!("group {group_id}")),
    );
    Ok(Subject::Member {
        member_id: class_member_id,
    })
}

/// 为已通过成员设置角色集合，整批生效或整批拒绝
pub fn assign_roles(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    class_member_id: i64,
    role_ids: &[i64],
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageGroup { group_id })?;
    if state.class().status == ClassStatus::Finished {
        return Err(WorkflowError::invalid_state(
            "Roles cannot be changed after the class has finished",
        ));
    }
    state.group(group_id)?;

    let member = state.member(class_member_id)?;
    if member.membership.approved_group() != Some(group_id) {
        return Err(WorkflowError::invalid_state(
            "Roles can only be assigned to approved members of this group",
        ));
    }

    let requested: BTreeSet<i64> = role_ids.iter().copied().collect();
    for &role_id in &requested {
        state.role(role_id)?;
    }

    if let Some(manager_role) = state.manager_role_id() {
        if requested.contains(&manager_role) != member.role_ids.contains(&manager_role) {
            return Err(WorkflowError::integrity_violation(
                "The manager role cannot be assigned or revoked",
            ));
        }
    }

    for other in state
        .approved_members(group_id)
        .filter(|m| m.id != class_member_id)
    {
        if let Some(taken) = other.role_ids.intersection(&requested).next() {
            let role_name = state.role(*taken)?.role_name.clone();
            return Err(WorkflowError::integrity_violation(format!(
                "Role '{role_name}' is already held by another member"
            )));
        }
    }

    state.set_roles(class_member_id, requested)?;
    ctx.emit(
        EventKind::RolesAssigned,
        Subject::Member {
            member_id: class_member_id,
        },
        Some(format!("{role_ids:?}")),
    );
    Ok(Subject::Member {
        member_id: class_member_id,
    })
}

pub fn approve_group(state: &mut ClassState, ctx: &mut Ctx, group_id: i64) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_grouping(state)?;
    ensure_pending(state, group_id, "Group is already approved")?;

    state.group_mut(group_id)?.status = GroupStatus::Normal;
    ctx.emit(EventKind::GroupApproved, Subject::Group { group_id }, None);
    Ok(Subject::Group { group_id })
}

pub fn unapprove_group(state: &mut ClassState, ctx: &mut Ctx, group_id: i64) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_grouping(state)?;
    if state.group(group_id)?.status != GroupStatus::Normal {
        return Err(WorkflowError::invalid_state("Group is not approved"));
    }

    state.group_mut(group_id)?.status = GroupStatus::Pending;
    ctx.emit(EventKind::GroupUnapproved, Subject::Group { group_id }, None);
    Ok(Subject::Group { group_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::groups::entities::MemberStatus;
    use crate::workflow::Command;
    use crate::workflow::fixtures::Fixture;

    fn create_group_as(fx: &mut Fixture, student: usize) -> i64 {
        let applied = fx
            .run_as_student(
                student,
                Command::CreateGroup(CreateGroupRequest {
                    name: format!("Team {student}"),
                    leader_member_id: None,
                }),
            )
            .unwrap();
        match applied.subject {
            Subject::Group { group_id } => group_id,
            other => panic!("unexpected subject {other:?}"),
        }
    }

    #[test]
    fn test_student_creating_group_becomes_manager() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let group_id = create_group_as(&mut fx, 0);

        let leader = fx.state.member(fx.member_id(0)).unwrap();
        assert_eq!(leader.membership, Membership::Approved { group_id });
        assert_eq!(
            fx.state.group_manager(group_id).map(|m| m.id),
            Some(leader.id)
        );
        assert_eq!(fx.state.group(group_id).unwrap().status, GroupStatus::Pending);
    }

    #[test]
    fn test_create_group_requires_grouping_phase() {
        let mut fx = Fixture::with_tasks(1);
        fx.add_students(1);
        let err = fx
            .run_as_student(
                0,
                Command::CreateGroup(CreateGroupRequest {
                    name: "Early".into(),
                    leader_member_id: None,
                }),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_staff_group_requires_free_leader() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        let err = fx
            .run_as_teacher(Command::CreateGroup(CreateGroupRequest {
                name: "Staffed".into(),
                leader_member_id: None,
            }))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        create_group_as(&mut fx, 0);
        let err = fx
            .run_as_teacher(Command::CreateGroup(CreateGroupRequest {
                name: "Staffed".into(),
                leader_member_id: Some(fx.member_id(0)),
            }))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        fx.run_as_teacher(Command::CreateGroup(CreateGroupRequest {
            name: "Staffed".into(),
            leader_member_id: Some(fx.member_id(1)),
        }))
        .unwrap();
    }

    #[test]
    fn test_self_application_and_leader_approval() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let group_id = create_group_as(&mut fx, 0);
        let applicant = fx.member_id(1);

        fx.run_as_student(
            1,
            Command::RequestMembership {
                group_id,
                class_member_id: applicant,
            },
        )
        .unwrap();
        assert_eq!(
            fx.state.member(applicant).unwrap().membership.status(),
            Some(MemberStatus::LeaderReview)
        );

        // 申请人不能自己审核 leader_review
        let err = fx
            .run_as_student(
                1,
                Command::ApproveMembership {
                    group_id,
                    class_member_id: applicant,
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_student(
            0,
            Command::ApproveMembership {
                group_id,
                class_member_id: applicant,
            },
        )
        .unwrap();
        assert_eq!(
            fx.state.member(applicant).unwrap().membership,
            Membership::Approved { group_id }
        );
    }

    #[test]
    fn test_invitation_is_accepted_by_invitee() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let group_id = create_group_as(&mut fx, 0);
        let invitee = fx.member_id(2);

        fx.run_as_student(
            0,
            Command::RequestMembership {
                group_id,
                class_member_id: invitee,
            },
        )
        .unwrap();
        assert_eq!(
            fx.state.member(invitee).unwrap().membership,
            Membership::MemberReview { group_id }
        );

        // 组长不能替被邀请人接受
        let err = fx
            .run_as_student(
                0,
                Command::ApproveMembership {
                    group_id,
                    class_member_id: invitee,
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_student(
            2,
            Command::ApproveMembership {
                group_id,
                class_member_id: invitee,
            },
        )
        .unwrap();
        let membership = fx.state.member(invitee).unwrap().membership;
        assert_eq!(membership.approved_group(), Some(group_id));
    }

    #[test]
    fn test_non_manager_cannot_invite() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let group_id = create_group_as(&mut fx, 0);
        fx.assign_directly(group_id, 1);

        let err = fx
            .run_as_student(
                1,
                Command::RequestMembership {
                    group_id,
                    class_member_id: fx.member_id(2),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }

    #[test]
    fn test_full_group_rejects_self_application() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 3);
        let group_id = create_group_as(&mut fx, 0);
        fx.assign_directly(group_id, 1);

        let err = fx
            .run_as_student(
                2,
                Command::RequestMembership {
                    group_id,
                    class_member_id: fx.member_id(2),
                },
            )
            .unwrap_err();
        assert_eq!(err, WorkflowError::integrity_violation("Group is full"));
    }

    #[test]
    fn test_pending_requests_count_toward_capacity() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 3);
        let group_id = create_group_as(&mut fx, 0);
        fx.run_as_student(
            1,
            Command::RequestMembership {
                group_id,
                class_member_id: fx.member_id(1),
            },
        )
        .unwrap();

        let err = fx
            .run_as_teacher(Command::RequestMembership {
                group_id,
                class_member_id: fx.member_id(2),
            })
            .unwrap_err();
        assert!(err.message().contains("full"));
    }

    #[test]
    fn test_second_pending_request_is_rejected() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let first = create_group_as(&mut fx, 0);
        let second = create_group_as(&mut fx, 1);
        let me = fx.member_id(2);

        fx.run_as_student(
            2,
            Command::RequestMembership {
                group_id: first,
                class_member_id: me,
            },
        )
        .unwrap();
        let err = fx
            .run_as_student(
                2,
                Command::RequestMembership {
                    group_id: second,
                    class_member_id: me,
                },
            )
            .unwrap_err();
        assert!(err.message().contains("pending"));

        // 教师直接分配覆盖待审核申请
        fx.run_as_teacher(Command::RequestMembership {
            group_id: second,
            class_member_id: me,
        })
        .unwrap();
        assert_eq!(fx.state.roster_size(first), 1);
        assert_eq!(
            fx.state.member(me).unwrap().membership,
            Membership::Approved { group_id: second }
        );
    }

    #[test]
    fn test_manager_cannot_be_removed() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        let group_id = create_group_as(&mut fx, 0);
        for actor in [fx.students[0], fx.teacher] {
            let err = fx
                .run(
                    actor,
                    Command::RemoveMember {
                        group_id,
                        class_member_id: fx.member_id(0),
                    },
                )
                .unwrap_err();
            assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        }
    }

    #[test]
    fn test_member_can_leave_and_manager_can_remove() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let group_id = create_group_as(&mut fx, 0);
        fx.assign_directly(group_id, 1);
        fx.assign_directly(group_id, 2);

        // 普通成员不能移出他人
        let err = fx
            .run_as_student(
                1,
                Command::RemoveMember {
                    group_id,
                    class_member_id: fx.member_id(2),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_student(
            1,
            Command::RemoveMember {
                group_id,
                class_member_id: fx.member_id(1),
            },
        )
        .unwrap();
        fx.run_as_student(
            0,
            Command::RemoveMember {
                group_id,
                class_member_id: fx.member_id(2),
            },
        )
        .unwrap();
        assert_eq!(fx.state.roster_size(group_id), 1);
        assert_eq!(
            fx.state.member(fx.member_id(2)).unwrap().membership,
            Membership::Unassigned
        );
    }

    #[test]
    fn test_removal_requires_pending_group() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        let group_id = create_group_as(&mut fx, 0);
        fx.assign_directly(group_id, 1);
        fx.run_as_teacher(Command::ApproveGroup { group_id }).unwrap();

        let err = fx
            .run_as_student(
                1,
                Command::RemoveMember {
                    group_id,
                    class_member_id: fx.member_id(1),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_assign_roles_enforces_uniqueness_and_manager_immutability() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let group_id = create_group_as(&mut fx, 0);
        fx.assign_directly(group_id, 1);
        fx.assign_directly(group_id, 2);
        let (manager, dev, qa) = (fx.roles[0], fx.roles[1], fx.roles[2]);

        fx.run_as_student(
            0,
            Command::AssignRoles {
                group_id,
                class_member_id: fx.member_id(1),
                role_ids: vec![dev, dev],
            },
        )
        .unwrap();
        assert_eq!(
            fx.state.member(fx.member_id(1)).unwrap().role_ids,
            BTreeSet::from([dev])
        );

        // dev 已被成员 1 持有，整批拒绝
        let err = fx
            .run_as_student(
                0,
                Command::AssignRoles {
                    group_id,
                    class_member_id: fx.member_id(2),
                    role_ids: vec![qa, dev],
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        assert!(fx.state.member(fx.member_id(2)).unwrap().role_ids.is_empty());

        let err = fx
            .run_as_teacher(Command::AssignRoles {
                group_id,
                class_member_id: fx.member_id(2),
                role_ids: vec![manager],
            })
            .unwrap_err();
        assert!(err.message().contains("manager role"));

        let err = fx
            .run_as_student(
                0,
                Command::AssignRoles {
                    group_id,
                    class_member_id: fx.member_id(0),
                    role_ids: vec![qa],
                },
            )
            .unwrap_err();
        assert!(err.message().contains("manager role"));

        fx.run_as_student(
            0,
            Command::AssignRoles {
                group_id,
                class_member_id: fx.member_id(0),
                role_ids: vec![manager, qa],
            },
        )
        .unwrap();
    }

    #[test]
    fn test_assign_roles_requires_manager_or_staff() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        let group_id = create_group_as(&mut fx, 0);
        fx.assign_directly(group_id, 1);
        let err = fx
            .run_as_student(
                1,
                Command::AssignRoles {
                    group_id,
                    class_member_id: fx.member_id(1),
                    role_ids: vec![fx.roles[1]],
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }

    #[test]
    fn test_group_approval_toggles_only_in_grouping() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 1);
        let group_id = create_group_as(&mut fx, 0);

        let err = fx
            .run_as_student(0, Command::ApproveGroup { group_id })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_teacher(Command::ApproveGroup { group_id }).unwrap();
        let err = fx
            .run_as_teacher(Command::ApproveGroup { group_id })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        fx.run_as_teacher(Command::UnapproveGroup { group_id }).unwrap();
        assert_eq!(fx.state.group(group_id).unwrap().status, GroupStatus::Pending);
    }

    #[test]
    fn test_normal_group_rejects_new_members() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        let group_id = create_group_as(&mut fx, 0);
        fx.run_as_teacher(Command::ApproveGroup { group_id }).unwrap();
        let err = fx
            .run_as_student(
                1,
                Command::RequestMembership {
                    group_id,
                    class_member_id: fx.member_id(1),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_delete_group_releases_members() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        let group_id = create_group_as(&mut fx, 0);
        fx.run_as_student(
            1,
            Command::RequestMembership {
                group_id,
                class_member_id: fx.member_id(1),
            },
        )
        .unwrap();

        fx.run_as_student(0, Command::DeleteGroup { group_id }).unwrap();
        assert!(fx.state.group(group_id).is_err());
        for i in 0..2 {
            let member = fx.state.member(fx.member_id(i)).unwrap();
            assert_eq!(member.membership, Membership::Unassigned);
            assert!(member.role_ids.is_empty());
        }
    }

    #[test]
    fn test_roles_locked_after_grouping_starts() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 1);
        let err = fx
            .run_as_teacher(Command::CreateRole(CreateRoleRequest {
                role_name: "qa".into(),
                role_description: None,
                is_manager: false,
            }))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_only_one_manager_role() {
        let mut fx = Fixture::with_tasks(0);
        let err = fx
            .run_as_teacher(Command::CreateRole(CreateRoleRequest {
                role_name: "co-manager".into(),
                role_description: None,
                is_manager: true,
            }))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
    }

    #[test]
    fn test_role_used_by_task_cannot_be_deleted() {
        let mut fx = Fixture::with_tasks(0);
        let dev = fx.add_role("dev");
        fx.run_as_teacher(Command::CreateTask(
            crate::models::tasks::requests::CreateTaskRequest {
                name: "Implementation".into(),
                content: None,
                specified_role: Some(dev),
                grade_percentage: 50.0,
            },
        ))
        .unwrap();
        let err = fx
            .run_as_teacher(Command::DeleteRole { role_id: dev })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
    }
}
