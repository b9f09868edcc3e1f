//! 组内工作项
//!
//! 分组在当前任务下自行拆分工作。发布者、组长与教师可以管理全部字段，
//! 持有负责角色的组员只能推进状态和维护附件。

use std::collections::BTreeSet;

use crate::errors::{Result, WorkflowError};
use crate::models::actors::entities::Actor;
use crate::models::classes::entities::ClassStatus;
use crate::models::work_items::entities::{WorkItem, WorkItemStatus};
use crate::models::work_items::requests::{CreateWorkItemRequest, FileRef, UpdateWorkItemRequest};

use super::Ctx;
use super::access::{self, Action};
use super::events::{EventKind, Subject};
use super::state::ClassState;

fn ensure_teaching(state: &ClassState) -> Result<()> {
    if state.class().status != ClassStatus::Teaching {
        return Err(WorkflowError::invalid_state(
            "Work items can only be changed while the class is teaching",
        ));
    }
    Ok(())
}

fn checked_assignees(state: &ClassState, role_ids: &[i64]) -> Result<BTreeSet<i64>> {
    if role_ids.is_empty() {
        return Err(WorkflowError::validation("Assignees can't be empty"));
    }
    role_ids
        .iter()
        .map(|&role_id| {
            state.role(role_id).map(|r| r.id).map_err(|_| {
                WorkflowError::validation(format!("Role {role_id} does not belong to this class"))
            })
        })
        .collect()
}

fn checked_files(group_id: i64, files: &[FileRef]) -> Result<BTreeSet<i64>> {
    files
        .iter()
        .map(|f| {
            if f.owner_group_id == group_id {
                Ok(f.file_id)
            } else {
                Err(WorkflowError::integrity_violation(format!(
                    "File {} does not belong to this group",
                    f.file_id
                )))
            }
        })
        .collect()
}

/// 发布者、组长或教师/管理员
fn can_manage(state: &ClassState, actor: &Actor, item: &WorkItem) -> bool {
    item.publisher == actor.user_id
        || access::check(
            state,
            actor,
            Action::ManageGroup {
                group_id: item.group_id,
            },
        )
        .is_allowed()
}

/// 本组已通过成员，且持有任一负责角色
fn is_assignee(state: &ClassState, actor: &Actor, item: &WorkItem) -> bool {
    access::acting_member(state, actor).is_some_and(|m| {
        m.membership.approved_group() == Some(item.group_id)
            && !m.role_ids.is_disjoint(&item.assignees)
    })
}

/// 发布工作项
///
/// 分组必须有当前任务；当前任务限定了角色时，只有持有该角色的组员、组长或教师可以发布。
pub fn create_work_item(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    request: CreateWorkItemRequest,
) -> Result<Subject> {
    ensure_teaching(state)?;
    let current_task = state
        .group(group_id)?
        .current_task_id
        .ok_or_else(|| WorkflowError::invalid_state("Group has no current task"))?;
    access::require(state, &ctx.actor, Action::ActForGroup { group_id })?;

    if let Some(role_id) = state.task(current_task)?.specified_role {
        let manages = access::check(state, &ctx.actor, Action::ManageGroup { group_id });
        let holds_role = access::acting_member(state, &ctx.actor)
            .is_some_and(|m| m.role_ids.contains(&role_id));
        if !manages.is_allowed() && !holds_role {
            return Err(WorkflowError::permission(
                "Only the member holding the current task's role can publish work items",
            ));
        }
    }

    crate::utils::validate_work_item_name(&request.name).map_err(WorkflowError::validation)?;
    let assignees = checked_assignees(state, &request.assignees)?;
    let related_files = checked_files(group_id, &request.related_files)?;

    let work_item_id = state.allocate_id();
    state.insert_work_item(WorkItem {
        id: work_item_id,
        group_id,
        name: request.name,
        details: request.details,
        status: WorkItemStatus::Pending,
        priority: request.priority,
        publisher: ctx.actor.user_id,
        assignees,
        related_files,
        deadline: request.deadline,
        publish_time: ctx.now,
        update_time: ctx.now,
    });

    ctx.emit(
        EventKind::WorkItemCreated,
        Subject::WorkItem { work_item_id },
        None,
    );
    Ok(Subject::WorkItem { work_item_id })
}

pub fn update_work_item(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    work_item_id: i64,
    update: UpdateWorkItemRequest,
) -> Result<Subject> {
    ensure_teaching(state)?;
    state.group(group_id)?;
    access::require(state, &ctx.actor, Action::ViewGroup { group_id })?;
    let item = state.work_item(group_id, work_item_id)?;

    if update.is_empty() {
        return Err(WorkflowError::validation("Nothing to update"));
    }
    if !can_manage(state, &ctx.actor, item) {
        if !is_assignee(state, &ctx.actor, item) {
            return Err(WorkflowError::permission("You can't update this work item"));
        }
        if !update.is_assignee_update() {
            return Err(WorkflowError::permission(
                "Assignees can only change the status and related files",
            ));
        }
    }

    // 先全部校验，再修改
    if let Some(name) = &update.name {
        crate::utils::validate_work_item_name(name).map_err(WorkflowError::validation)?;
    }
    let assignees = update
        .assignees
        .as_deref()
        .map(|ids| checked_assignees(state, ids))
        .transpose()?;
    let related_files = update
        .related_files
        .as_deref()
        .map(|files| checked_files(group_id, files))
        .transpose()?;

    let now = ctx.now;
    let item = state.work_item_mut(group_id, work_item_id)?;
    if let Some(name) = update.name {
        item.name = name;
    }
    if let Some(details) = update.details {
        item.details = Some(details);
    }
    if let Some(status) = update.status {
        item.status = status;
    }
    if let Some(priority) = update.priority {
        item.priority = priority;
    }
    if let Some(deadline) = update.deadline {
        item.deadline = deadline;
    }
    if let Some(assignees) = assignees {
        item.assignees = assignees;
    }
    if let Some(related_files) = related_files {
        item.related_files = related_files;
    }
    item.update_time = now;
    let status = item.status;

    ctx.emit(
        EventKind::WorkItemUpdated,
        Subject::WorkItem { work_item_id },
        Some(status.to_string()),
    );
    Ok(Subject::WorkItem { work_item_id })
}

pub fn delete_work_item(
    state: &mut ClassState,
    ctx: &mut Ctx,
    group_id: i64,
    work_item_id: i64,
) -> Result<Subject> {
    ensure_teaching(state)?;
    state.group(group_id)?;
    access::require(state, &ctx.actor, Action::ViewGroup { group_id })?;
    let item = state.work_item(group_id, work_item_id)?;
    if !can_manage(state, &ctx.actor, item) {
        return Err(WorkflowError::permission("You can't delete this work item"));
    }

    state.remove_work_item(work_item_id);
    ctx.emit(
        EventKind::WorkItemDeleted,
        Subject::WorkItem { work_item_id },
        None,
    );
    Ok(Subject::Group { group_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tasks::requests::UpdateTaskRequest;
    use crate::workflow::Command;
    use crate::workflow::fixtures::Fixture;

    fn publish(fx: &Fixture, assignees: Vec<i64>) -> Command {
        Command::CreateWorkItem {
            group_id: fx.group_id(),
            request: CreateWorkItemRequest {
                name: "Write the API draft".into(),
                details: None,
                assignees,
                related_files: Vec::new(),
                deadline: None,
                priority: 1,
            },
        }
    }

    fn created_id(subject: Subject) -> i64 {
        let Subject::WorkItem { work_item_id } = subject else {
            panic!("expected work item subject, got {subject:?}");
        };
        work_item_id
    }

    #[test]
    fn test_member_publishes_work_item() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 2);
        let dev = fx.roles[1];
        let cmd = publish(&fx, vec![dev, dev]);
        let applied = fx.run_as_student(2, cmd).unwrap();
        let id = created_id(applied.subject);

        let item = fx.state.work_item(fx.group_id(), id).unwrap();
        assert_eq!(item.status, WorkItemStatus::Pending);
        assert_eq!(item.publisher, fx.students[2].user_id);
        assert_eq!(item.assignees, BTreeSet::from([dev]));
        assert_eq!(applied.events[0].kind, EventKind::WorkItemCreated);
    }

    #[test]
    fn test_publish_requires_current_task_role() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 2);
        let (dev, qa) = (fx.roles[1], fx.roles[2]);
        fx.run_as_teacher(Command::UpdateTask {
            task_id: fx.tasks[0],
            update: UpdateTaskRequest {
                specified_role: Some(Some(dev)),
                ..Default::default()
            },
        })
        .unwrap();

        let err = fx.run_as_student(2, publish(&fx, vec![qa])).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_student(1, publish(&fx, vec![qa])).unwrap();
        // 组长不受角色限制
        fx.run_as_student(0, publish(&fx, vec![qa])).unwrap();
    }

    #[test]
    fn test_publish_rejects_bad_input() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let err = fx.run_as_student(1, publish(&fx, Vec::new())).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let err = fx.run_as_student(1, publish(&fx, vec![9999])).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let group_id = fx.group_id();
        let foreign_file = Command::CreateWorkItem {
            group_id,
            request: CreateWorkItemRequest {
                name: "Attach design doc".into(),
                details: None,
                assignees: vec![fx.roles[1]],
                related_files: vec![FileRef {
                    file_id: 77,
                    owner_group_id: group_id + 1,
                }],
                deadline: None,
                priority: 0,
            },
        };
        let err = fx.run_as_student(1, foreign_file).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        assert_eq!(fx.state.work_items().count(), 0);
    }

    #[test]
    fn test_publish_outside_teaching_is_rejected() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 2);
        fx.add_tasks(1);
        fx.run_as_student(
            0,
            Command::CreateGroup(crate::models::groups::requests::CreateGroupRequest {
                name: "Alpha".into(),
                leader_member_id: None,
            }),
        )
        .unwrap();
        let cmd = publish(&fx, vec![fx.roles[1]]);
        let err = fx.run_as_student(0, cmd).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_assignee_may_only_move_status_and_files() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 1);
        let group_id = fx.group_id();
        let applied = fx.run_as_student(0, publish(&fx, vec![fx.roles[1]])).unwrap();
        let id = created_id(applied.subject);

        let finish = |status| Command::UpdateWorkItem {
            group_id,
            work_item_id: id,
            update: UpdateWorkItemRequest {
                status: Some(status),
                related_files: Some(vec![FileRef {
                    file_id: 5,
                    owner_group_id: group_id,
                }]),
                ..Default::default()
            },
        };
        fx.run_as_student(1, finish(WorkItemStatus::Finished)).unwrap();
        let item = fx.state.work_item(group_id, id).unwrap();
        assert_eq!(item.status, WorkItemStatus::Finished);
        assert_eq!(item.related_files, BTreeSet::from([5]));

        let rename = Command::UpdateWorkItem {
            group_id,
            work_item_id: id,
            update: UpdateWorkItemRequest {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        };
        let err = fx.run_as_student(1, rename.clone()).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        // 不负责该工作项的组员不能修改
        let err = fx.run_as_student(2, finish(WorkItemStatus::Normal)).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        fx.run_as_student(0, rename).unwrap();
        assert_eq!(fx.state.work_item(group_id, id).unwrap().name, "Renamed");
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let group_id = fx.group_id();
        let applied = fx.run_as_student(0, publish(&fx, vec![fx.roles[1]])).unwrap();
        let id = created_id(applied.subject);
        let err = fx
            .run_as_student(
                0,
                Command::UpdateWorkItem {
                    group_id,
                    work_item_id: id,
                    update: UpdateWorkItemRequest::default(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn test_only_publisher_or_manager_deletes() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 1);
        let group_id = fx.group_id();
        let applied = fx.run_as_student(2, publish(&fx, vec![fx.roles[1]])).unwrap();
        let id = created_id(applied.subject);
        let delete = Command::DeleteWorkItem {
            group_id,
            work_item_id: id,
        };

        let err = fx.run_as_student(1, delete.clone()).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));

        let applied = fx.run_as_student(2, delete.clone()).unwrap();
        assert_eq!(applied.subject, Subject::Group { group_id });
        assert!(fx.state.work_item(group_id, id).is_err());

        let err = fx.run_as_teacher(delete).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }
}
