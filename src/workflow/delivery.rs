//! 任务交付
//!
//! 状态转换见 [`DeliveryStatus::can_transition_to`]。被驳回的交付永久终止，
//! 重新提交总是新建一份草稿。

use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::ClassStatus;
use crate::models::deliveries::entities::{Delivery, DeliveryItem, DeliveryStatus};
use crate::models::deliveries::requests::AddItemRequest;
use crate::models::scores::entities::TeacherScore;
use crate::models::scores::requests::TeacherScoreRequest;

use super::access::{self, Action};
use super::events::{EventKind, Subject};
use super::state::ClassState;
use super::{Ctx, scoring, task_chain};

/// 最新的一份交付（含草稿）
pub fn latest_delivery(state: &ClassState, task_id: i64, group_id: i64) -> Option<&Delivery> {
    state.deliveries_for(task_id, group_id).into_iter().next()
}

/// 最新的一份已提交交付
pub fn latest_submitted(state: &ClassState, task_id: i64, group_id: i64) -> Option<&Delivery> {
    state
        .deliveries_for(task_id, group_id)
        .into_iter()
        .find(|d| d.status != DeliveryStatus::Draft)
}

pub fn current_draft(state: &ClassState, task_id: i64, group_id: i64) -> Option<&Delivery> {
    state
        .deliveries_for(task_id, group_id)
        .into_iter()
        .find(|d| d.status == DeliveryStatus::Draft)
}

fn draft_id(state: &ClassState, task_id: i64, group_id: i64) -> Result<i64> {
    current_draft(state, task_id, group_id)
        .map(|d| d.id)
        .ok_or_else(|| WorkflowError::not_found("No draft exists for this task"))
}

/// 提交资格检查，返回第一个不满足的前置条件
///
/// - 班级处于教学阶段
/// - 任务位于分组的锁定前缀内（不超前于分组当前进度）
/// - 最新的已提交交付不存在或已被驳回
/// - 链表中前一个任务的组内互评已完成
pub fn check_submission(state: &ClassState, task_id: i64, group_id: i64) -> Result<()> {
    if state.class().status != ClassStatus::Teaching {
        return Err(WorkflowError::invalid_state(
            "Deliveries can only be submitted while the class is teaching",
        ));
    }
    state.task(task_id)?;
    if !task_chain::locked_prefix_for_group(state, group_id)?.contains(&task_id) {
        return Err(WorkflowError::invalid_state(
            "Group has not reached this task yet",
        ));
    }
    if let Some(latest) = latest_submitted(state, task_id, group_id) {
        if !latest.status.is_rejected() {
            return Err(WorkflowError::invalid_state(format!(
                "Task already has a delivery in {} state",
                latest.status
            )));
        }
    }
    if let Some(previous) = state.predecessor(task_id) {
        if !scoring::completion(state, previous.id, group_id).complete {
            return Err(WorkflowError::invalid_state(format!(
                "Peer scoring for task '{}' is not complete",
                previous.name
            )));
        }
    }
    Ok(())
}

fn ensure_can_edit(state: &ClassState, ctx: &Ctx, task_id: i64, group_id: i64) -> Result<()> {
    access::require(state, &ctx.actor, Action::ActForGroup { group_id })?;
    check_submission(state, task_id, group_id)
}

/// 新建草稿；学生须持有任务指定角色或为组长
pub fn create_draft(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    comments: Option<String>,
) -> Result<Subject> {
    ensure_can_edit(state, ctx, task_id, group_id)?;
    if current_draft(state, task_id, group_id).is_some() {
        return Err(WorkflowError::integrity_violation(
            "A draft already exists for this task",
        ));
    }

    let task = state.task(task_id)?;
    let staff = access::is_staff(state, &ctx.actor);
    if !staff && !access::is_group_manager(state, &ctx.actor, group_id) {
        if let Some(role_id) = task.specified_role {
            let holds_role = access::acting_member(state, &ctx.actor)
                .is_some_and(|m| m.role_ids.contains(&role_id));
            if !holds_role {
                return Err(WorkflowError::permission(
                    "Only the member holding the task's role or the group manager can create the draft",
                ));
            }
        }
    }

    let grade_percentage = task.grade_percentage;
    let id = state.allocate_id();
    state.insert_delivery(Delivery {
        id,
        task_id,
        group_id,
        status: DeliveryStatus::Draft,
        delivery_user: ctx.actor.user_id,
        task_grade_percentage: grade_percentage,
        delivery_comments: comments,
        delivery_time: None,
        review_comments: None,
        review_time: None,
        score: None,
        created_at: ctx.now,
        items: Vec::new(),
    });

    ctx.emit(
        EventKind::DeliveryDrafted,
        Subject::Delivery { delivery_id: id },
        None,
    );
    Ok(Subject::Delivery { delivery_id: id })
}

pub fn update_draft(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    comments: Option<String>,
) -> Result<Subject> {
    ensure_can_edit(state, ctx, task_id, group_id)?;
    let delivery_id = draft_id(state, task_id, group_id)?;
    state.delivery_mut(delivery_id)?.delivery_comments = comments;

    ctx.emit(
        EventKind::DeliveryDraftUpdated,
        Subject::Delivery { delivery_id },
        None,
    );
    Ok(Subject::Delivery { delivery_id })
}

/// 向草稿添加文件或仓库；归属分组必须与交付分组一致
pub fn add_item(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    item: AddItemRequest,
) -> Result<Subject> {
    ensure_can_edit(state, ctx, task_id, group_id)?;
    if item.owner_group_id != group_id {
        return Err(WorkflowError::integrity_violation(format!(
            "{} {} does not belong to this group",
            item.item_type, item.item_id
        )));
    }
    let delivery_id = draft_id(state, task_id, group_id)?;
    let duplicate = state
        .delivery(delivery_id)?
        .items
        .iter()
        .any(|i| i.item_type == item.item_type && i.item_id == item.item_id);
    if duplicate {
        return Err(WorkflowError::integrity_violation(
            "Item already exists in the draft.",
        ));
    }

    let id = state.allocate_id();
    state.delivery_mut(delivery_id)?.items.push(DeliveryItem {
        id,
        delivery_id,
        item_type: item.item_type,
        item_id: item.item_id,
    });

    ctx.emit(
        EventKind::DeliveryDraftUpdated,
        Subject::Delivery { delivery_id },
        Some(format!("added {} {}", item.item_type, item.item_id)),
    );
    Ok(Subject::Delivery { delivery_id })
}

pub fn remove_item(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    item_id: i64,
) -> Result<Subject> {
    ensure_can_edit(state, ctx, task_id, group_id)?;
    let delivery_id = draft_id(state, task_id, group_id)?;
    let delivery = state.delivery_mut(delivery_id)?;
    let before = delivery.items.len();
    delivery.items.retain(|i| i.id != item_id);
    if delivery.items.len() == before {
        return Err(WorkflowError::not_found(format!(
            "Delivery item {item_id} not found"
        )));
    }

    ctx.emit(
        EventKind::DeliveryDraftUpdated,
        Subject::Delivery { delivery_id },
        Some(format!("removed item {item_id}")),
    );
    Ok(Subject::Delivery { delivery_id })
}

/// 提交草稿：组长与教师/管理员直接进入教师审核，普通组员进入组长审核
pub fn submit_draft(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
) -> Result<Subject> {
    ensure_can_edit(state, ctx, task_id, group_id)?;
    let delivery_id = draft_id(state, task_id, group_id)?;

    let skip_leader = access::is_staff(state, &ctx.actor)
        || access::is_group_manager(state, &ctx.actor, group_id);
    let target = if skip_leader {
        DeliveryStatus::TeacherReview
    } else {
        DeliveryStatus::LeaderReview
    };
    let grade_percentage = state.task(task_id)?.grade_percentage;

    let delivery = state.delivery_mut(delivery_id)?;
    if !delivery.status.can_transition_to(target) {
        return Err(WorkflowError::invalid_state(format!(
            "Cannot submit a delivery in {} state",
            delivery.status
        )));
    }
    delivery.status = target;
    delivery.delivery_time = Some(ctx.now);
    delivery.task_grade_percentage = grade_percentage;

    ctx.emit(
        EventKind::DeliverySubmitted,
        Subject::Delivery { delivery_id },
        Some(target.to_string()),
    );
    Ok(Subject::Delivery { delivery_id })
}

fn ensure_reviewer(state: &ClassState, ctx: &Ctx, group_id: i64) -> Result<bool> {
    state.group(group_id)?;
    let staff = access::is_staff(state, &ctx.actor);
    if !staff && !access::is_group_manager(state, &ctx.actor, group_id) {
        return Err(WorkflowError::permission(
            "Only the group manager, teachers or admins can review deliveries",
        ));
    }
    Ok(staff)
}

fn submitted_id(state: &ClassState, task_id: i64, group_id: i64) -> Result<i64> {
    state.task(task_id)?;
    latest_submitted(state, task_id, group_id)
        .map(|d| d.id)
        .ok_or_else(|| WorkflowError::not_found("No submitted delivery for this task"))
}

/// 审核通过
///
/// 组长只能把 `leader_review` 上交到 `teacher_review`；教师/管理员把 `leader_review`
/// 或 `teacher_review` 推进到 `teacher_approved`（前者依次经过两步），此时必须给出分数。
pub fn approve(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    score: Option<f64>,
    comments: Option<String>,
) -> Result<Subject> {
    let staff = ensure_reviewer(state, ctx, group_id)?;
    let delivery_id = submitted_id(state, task_id, group_id)?;
    let from = state.delivery(delivery_id)?.status;

    let target = match (from, staff) {
        (DeliveryStatus::LeaderReview, false) => DeliveryStatus::TeacherReview,
        (DeliveryStatus::LeaderReview | DeliveryStatus::TeacherReview, true) => {
            DeliveryStatus::TeacherApproved
        }
        (DeliveryStatus::TeacherReview, false) => {
            return Err(WorkflowError::permission(
                "Only teachers or admins can give the final approval",
            ));
        }
        _ => {
            return Err(WorkflowError::invalid_state(format!(
                "Cannot approve a delivery in {from} state"
            )));
        }
    };

    let final_score = if target == DeliveryStatus::TeacherApproved {
        let score = score.ok_or_else(|| WorkflowError::validation("Score is required"))?;
        crate::utils::validate_grade(score).map_err(WorkflowError::validation)?;
        Some(score)
    } else {
        None
    };

    let delivery = state.delivery_mut(delivery_id)?;
    if from == DeliveryStatus::LeaderReview && target == DeliveryStatus::TeacherApproved {
        delivery.status = DeliveryStatus::TeacherReview;
    }
    if !delivery.status.can_transition_to(target) {
        return Err(WorkflowError::invalid_state(format!(
            "Cannot approve a delivery in {} state",
            delivery.status
        )));
    }
    delivery.status = target;
    delivery.review_comments = comments;
    delivery.review_time = Some(ctx.now);
    if final_score.is_some() {
        delivery.score = final_score;
    }

    ctx.emit(
        EventKind::DeliveryApproved,
        Subject::Delivery { delivery_id },
        Some(target.to_string()),
    );
    Ok(Subject::Delivery { delivery_id })
}

/// 驳回：`leader_review -> leader_rejected`；`teacher_review | teacher_approved -> teacher_rejected`
pub fn reject(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    comments: Option<String>,
) -> Result<Subject> {
    let staff = ensure_reviewer(state, ctx, group_id)?;
    let delivery_id = submitted_id(state, task_id, group_id)?;
    let from = state.delivery(delivery_id)?.status;

    let target = match from {
        DeliveryStatus::LeaderReview => DeliveryStatus::LeaderRejected,
        DeliveryStatus::TeacherReview | DeliveryStatus::TeacherApproved if staff => {
            DeliveryStatus::TeacherRejected
        }
        DeliveryStatus::TeacherReview | DeliveryStatus::TeacherApproved => {
            return Err(WorkflowError::permission(
                "Only teachers or admins can reject a delivery under teacher review",
            ));
        }
        _ => {
            return Err(WorkflowError::invalid_state(format!(
                "Cannot reject a delivery in {from} state"
            )));
        }
    };

    let delivery = state.delivery_mut(delivery_id)?;
    delivery.status = target;
    delivery.review_comments = comments;
    delivery.review_time = Some(ctx.now);

    ctx.emit(
        EventKind::DeliveryRejected,
        Subject::Delivery { delivery_id },
        Some(target.to_string()),
    );
    Ok(Subject::Delivery { delivery_id })
}

/// 推进分组到下一个任务
///
/// 当前任务的最新交付须为 `teacher_approved` 且组内互评已完成。
pub fn advance_group(state: &mut ClassState, ctx: &mut Ctx, group_id: i64) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    if state.class().status != ClassStatus::Teaching {
        return Err(WorkflowError::invalid_state(
            "Groups can only advance while the class is teaching",
        ));
    }
    let current = state
        .group(group_id)?
        .current_task_id
        .ok_or_else(|| WorkflowError::invalid_state("Group has no current task"))?;

    let approved = latest_submitted(state, current, group_id)
        .is_some_and(|d| d.status == DeliveryStatus::TeacherApproved);
    if !approved {
        return Err(WorkflowError::invalid_state(
            "The delivery for the current task has not been approved",
        ));
    }
    if !scoring::completion(state, current, group_id).complete {
        return Err(WorkflowError::invalid_state(
            "Peer scoring for the current task is not complete",
        ));
    }
    let next = state
        .task(current)?
        .next_task_id
        .ok_or_else(|| WorkflowError::already_last_task("Group is already on the last task"))?;

    state.group_mut(group_id)?.current_task_id = Some(next);
    ctx.emit(
        EventKind::GroupAdvanced,
        Subject::Group { group_id },
        Some(format!("task {current} -> {next}")),
    );
    Ok(Subject::Group { group_id })
}

/// 教师给分组内单个学生打分，交付须已通过
pub fn score_member(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    request: TeacherScoreRequest,
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    state.group(group_id)?;
    state.task(task_id)?;

    let approved = latest_submitted(state, task_id, group_id)
        .is_some_and(|d| d.status == DeliveryStatus::TeacherApproved);
    if !approved {
        return Err(WorkflowError::invalid_state(
            "Members can only be scored after the delivery is approved",
        ));
    }
    let in_group = state.member_by_user(request.user_id).is_some_and(|m| {
        !m.is_teacher && m.membership.approved_group() == Some(group_id)
    });
    if !in_group {
        return Err(WorkflowError::not_found(format!(
            "User {} is not a member of this group",
            request.user_id
        )));
    }
    crate::utils::validate_grade(request.score).map_err(WorkflowError::validation)?;

    state.upsert_teacher_score(TeacherScore {
        task_id,
        user_id: request.user_id,
        score: request.score,
        score_details: request.score_details,
        score_time: ctx.now,
    });

    let subject = Subject::TeacherScore {
        task_id,
        user_id: request.user_id,
    };
    ctx.emit(
        EventKind::TeacherScored,
        subject,
        Some(request.score.to_string()),
    );
    Ok(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deliveries::entities::DeliveryType;
    use crate::workflow::Command;
    use crate::workflow::fixtures::Fixture;

    fn draft_cmd(fx: &Fixture, task: usize) -> Command {
        Command::CreateDraft {
            task_id: fx.tasks[task],
            group_id: fx.group_id(),
            comments: Some("first cut".into()),
        }
    }

    fn submit_cmd(fx: &Fixture, task: usize) -> Command {
        Command::SubmitDraft {
            task_id: fx.tasks[task],
            group_id: fx.group_id(),
        }
    }

    fn approve_cmd(fx: &Fixture, task: usize, score: Option<f64>) -> Command {
        Command::ApproveDelivery {
            task_id: fx.tasks[task],
            group_id: fx.group_id(),
            score,
            comments: None,
        }
    }

    fn reject_cmd(fx: &Fixture, task: usize) -> Command {
        Command::RejectDelivery {
            task_id: fx.tasks[task],
            group_id: fx.group_id(),
            comments: Some("incomplete".into()),
        }
    }

    fn status(fx: &Fixture, task: usize) -> DeliveryStatus {
        latest_delivery(&fx.state, fx.tasks[task], fx.group_id())
            .unwrap()
            .status
    }

    fn peer_score_all(fx: &mut Fixture, task: usize) {
        let manager = fx.students[0].user_id;
        let members: Vec<i64> = fx.students[1..].iter().map(|a| a.user_id).collect();
        let (task_id, group_id) = (fx.tasks[task], fx.group_id());
        fx.run_as_student(
            0,
            Command::SubmitPeerScores {
                task_id,
                group_id,
                scores: members.iter().map(|&u| (u, 88.0)).collect(),
            },
        )
        .unwrap();
        for i in 1..fx.students.len() {
            fx.run_as_student(
                i,
                Command::SubmitPeerScores {
                    task_id,
                    group_id,
                    scores: [(manager, 92.0)].into_iter().collect(),
                },
            )
            .unwrap();
        }
    }

    #[test]
    fn test_scenario_manager_submission_to_next_task() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 3);
        let group_id = fx.group_id();

        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(0, submit_cmd(&fx, 0)).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::TeacherReview);

        fx.run_as_teacher(approve_cmd(&fx, 0, Some(85.0))).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::TeacherApproved);
        let delivery = latest_delivery(&fx.state, fx.tasks[0], group_id).unwrap();
        assert_eq!(delivery.score, Some(85.0));

        // 互评未完成时不能推进
        let err = fx
            .run_as_teacher(Command::AdvanceGroup { group_id })
            .unwrap_err();
        assert!(err.message().contains("Peer scoring"));

        peer_score_all(&mut fx, 0);
        assert!(scoring::completion(&fx.state, fx.tasks[0], group_id).complete);

        fx.run_as_teacher(Command::AdvanceGroup { group_id }).unwrap();
        assert_eq!(
            fx.state.group(group_id).unwrap().current_task_id,
            Some(fx.tasks[1])
        );

        let err = fx
            .run_as_teacher(Command::AdvanceGroup { group_id })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_member_submission_goes_through_leader_review() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        fx.run_as_student(1, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(1, submit_cmd(&fx, 0)).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::LeaderReview);

        // 普通组员不能审核
        let err = fx.run_as_student(1, approve_cmd(&fx, 0, None)).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_student(0, approve_cmd(&fx, 0, Some(100.0))).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::TeacherReview);
        let delivery = latest_delivery(&fx.state, fx.tasks[0], fx.group_id()).unwrap();
        assert_eq!(delivery.score, None);

        // 组长不能给出最终通过
        let err = fx
            .run_as_student(0, approve_cmd(&fx, 0, Some(90.0)))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }

    #[test]
    fn test_teacher_approves_leader_review_in_two_steps() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        fx.run_as_student(1, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(1, submit_cmd(&fx, 0)).unwrap();

        let err = fx.run_as_teacher(approve_cmd(&fx, 0, None)).unwrap_err();
        assert_eq!(err, WorkflowError::validation("Score is required"));
        assert_eq!(status(&fx, 0), DeliveryStatus::LeaderReview);

        let err = fx
            .run_as_teacher(approve_cmd(&fx, 0, Some(101.0)))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        fx.run_as_teacher(approve_cmd(&fx, 0, Some(0.0))).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::TeacherApproved);
    }

    #[test]
    fn test_rejections_follow_transition_table() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        fx.run_as_student(1, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(1, submit_cmd(&fx, 0)).unwrap();

        let err = fx.run_as_student(1, reject_cmd(&fx, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
        fx.run_as_student(0, reject_cmd(&fx, 0)).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::LeaderRejected);

        // 终止状态不能再审核
        let err = fx.run_as_teacher(reject_cmd(&fx, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        // 驳回后可以新建草稿，旧交付保持终止
        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(0, submit_cmd(&fx, 0)).unwrap();
        fx.run_as_teacher(approve_cmd(&fx, 0, Some(70.0))).unwrap();

        let err = fx.run_as_student(0, reject_cmd(&fx, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
        fx.run_as_teacher(reject_cmd(&fx, 0)).unwrap();
        assert_eq!(status(&fx, 0), DeliveryStatus::TeacherRejected);

        let err = fx
            .run_as_teacher(approve_cmd(&fx, 0, Some(80.0)))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        let history = fx.state.deliveries_for(fx.tasks[0], fx.group_id());
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, DeliveryStatus::LeaderRejected);
    }

    #[test]
    fn test_active_review_blocks_new_draft() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();
        let err = fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        fx.run_as_student(0, submit_cmd(&fx, 0)).unwrap();
        let err = fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
        assert!(
            check_submission(&fx.state, fx.tasks[0], fx.group_id())
                .unwrap_err()
                .message()
                .contains("teacher_review")
        );
    }

    #[test]
    fn test_draft_requires_task_role_or_manager() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 1);
        let dev = fx.roles[1];
        fx.state.task_mut(fx.tasks[0]).unwrap().specified_role = Some(dev);

        // 学生 2 持有 qa
        let err = fx.run_as_student(2, draft_cmd(&fx, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
        fx.run_as_student(1, draft_cmd(&fx, 0)).unwrap();
    }

    #[test]
    fn test_cannot_submit_ahead_of_group() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 2);
        let err = fx.run_as_student(0, draft_cmd(&fx, 1)).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_previous_task_scoring_gates_submission() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 2);
        let group_id = fx.group_id();
        fx.state.group_mut(group_id).unwrap().current_task_id = Some(fx.tasks[1]);

        let err = fx.run_as_student(0, draft_cmd(&fx, 1)).unwrap_err();
        assert!(err.message().contains("Peer scoring"));

        peer_score_all(&mut fx, 0);
        fx.run_as_student(0, draft_cmd(&fx, 1)).unwrap();
    }

    #[test]
    fn test_items_must_belong_to_group_and_be_unique() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let (task_id, group_id) = (fx.tasks[0], fx.group_id());
        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();

        let item = |owner| Command::AddItem {
            task_id,
            group_id,
            item: AddItemRequest {
                item_type: DeliveryType::Repo,
                item_id: 31,
                owner_group_id: owner,
            },
        };
        let err = fx.run_as_student(1, item(group_id + 1)).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        fx.run_as_student(1, item(group_id)).unwrap();
        let err = fx.run_as_student(1, item(group_id)).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::integrity_violation("Item already exists in the draft.")
        );

        let item_id = current_draft(&fx.state, task_id, group_id).unwrap().items[0].id;
        fx.run_as_student(
            1,
            Command::RemoveItem {
                task_id,
                group_id,
                item_id,
            },
        )
        .unwrap();
        assert!(current_draft(&fx.state, task_id, group_id)
            .unwrap()
            .items
            .is_empty());
    }

    #[test]
    fn test_snapshot_taken_at_submission() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();
        fx.state.task_mut(fx.tasks[0]).unwrap().grade_percentage = 40.0;
        fx.run_as_student(0, submit_cmd(&fx, 0)).unwrap();
        fx.state.task_mut(fx.tasks[0]).unwrap().grade_percentage = 60.0;

        let delivery = latest_delivery(&fx.state, fx.tasks[0], fx.group_id()).unwrap();
        assert_eq!(delivery.task_grade_percentage, 40.0);
        assert!(delivery.delivery_time.is_some());
    }

    #[test]
    fn test_advance_past_last_task_fails() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let group_id = fx.group_id();
        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(0, submit_cmd(&fx, 0)).unwrap();
        fx.run_as_teacher(approve_cmd(&fx, 0, Some(90.0))).unwrap();
        peer_score_all(&mut fx, 0);

        let err = fx
            .run_as_teacher(Command::AdvanceGroup { group_id })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyLastTask(_)));
    }

    #[test]
    fn test_teacher_scores_require_approved_delivery() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let (task_id, group_id) = (fx.tasks[0], fx.group_id());
        let score = |user_id, score| Command::ScoreMember {
            task_id,
            group_id,
            request: TeacherScoreRequest {
                user_id,
                score,
                score_details: None,
            },
        };
        let student = fx.students[1].user_id;

        let err = fx.run_as_teacher(score(student, 80.0)).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));

        fx.run_as_student(0, draft_cmd(&fx, 0)).unwrap();
        fx.run_as_student(0, submit_cmd(&fx, 0)).unwrap();
        fx.run_as_teacher(approve_cmd(&fx, 0, Some(90.0))).unwrap();

        let err = fx.run_as_teacher(score(fx.teacher.user_id, 80.0)).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        let err = fx.run_as_teacher(score(student, -5.0)).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        let err = fx.run_as_student(0, score(student, 80.0)).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_teacher(score(student, 80.0)).unwrap();
        fx.run_as_teacher(score(student, 82.5)).unwrap();
        assert_eq!(fx.state.teacher_score(task_id, student).unwrap().score, 82.5);
    }
}
