//! 任务链
//!
//! 班级的任务以单链表表示：`Class.first_task_id` 为表头，`Task.next_task_id` 指向后继。
//! 任一分组已到达的最远任务及其之前的部分称为锁定前缀，不可删除、不可重排。

use std::collections::HashSet;

use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::ClassStatus;
use crate::models::tasks::entities::Task;
use crate::models::tasks::requests::{CreateTaskRequest, UpdateTaskRequest};

use super::access::{self, Action};
use super::events::{EventKind, Subject};
use super::state::ClassState;
use super::Ctx;

/// 沿链表遍历并返回按顺序排列的任务ID
///
/// 表头为空、遍历未覆盖全部任务、出现环或指向不存在的任务时返回 `IncompleteChain`。
pub fn validate(state: &ClassState) -> Result<Vec<i64>> {
    let total = state.task_count();
    let mut current = state
        .class()
        .first_task_id
        .ok_or_else(|| WorkflowError::incomplete_chain("Task chain has no first task"))?;

    let mut visited = HashSet::with_capacity(total);
    let mut order = Vec::with_capacity(total);
    loop {
        let task = state.task(current).map_err(|_| {
            WorkflowError::incomplete_chain(format!("Task chain points to unknown task {current}"))
        })?;
        if !visited.insert(current) {
            return Err(WorkflowError::incomplete_chain(format!(
                "Task chain contains a cycle at task {current}"
            )));
        }
        order.push(current);
        match task.next_task_id {
            Some(next) => current = next,
            None => break,
        }
    }

    if order.len() != total {
        return Err(WorkflowError::incomplete_chain(format!(
            "Task chain reaches {} of {} tasks",
            order.len(),
            total
        )));
    }
    Ok(order)
}

/// 截取到 `last` 为止的前缀；`last` 不在链中时返回空
fn prefix_through(chain: &[i64], last: Option<usize>) -> Vec<i64> {
    match last {
        Some(index) => chain[..=index].to_vec(),
        None => Vec::new(),
    }
}

/// 全班锁定前缀：到任一分组当前任务中最靠后的那个为止
pub fn locked_prefix(state: &ClassState) -> Result<Vec<i64>> {
    let chain = validate(state)?;
    let furthest = state
        .groups()
        .filter_map(|g| g.current_task_id)
        .filter_map(|task_id| chain.iter().position(|&id| id == task_id))
        .max();
    Ok(prefix_through(&chain, furthest))
}

/// 单个分组的锁定前缀：到该分组当前任务为止
pub fn locked_prefix_for_group(state: &ClassState, group_id: i64) -> Result<Vec<i64>> {
    let group = state.group(group_id)?;
    let chain = validate(state)?;
    let position = group
        .current_task_id
        .and_then(|task_id| chain.iter().position(|&id| id == task_id));
    Ok(prefix_through(&chain, position))
}

/// 当前锁定前缀；任务链尚未完整时不可能有分组在推进，视为无锁定
fn current_lock(state: &ClassState) -> Result<Vec<i64>> {
    let any_progress = state.groups().any(|g| g.current_task_id.is_some());
    if !any_progress {
        return Ok(Vec::new());
    }
    locked_prefix(state)
}

fn ensure_editable(state: &ClassState) -> Result<()> {
    if state.class().status == ClassStatus::Finished {
        return Err(WorkflowError::invalid_state(
            "Tasks cannot be changed after the class has finished",
        ));
    }
    Ok(())
}

fn validate_task_fields(
    state: &ClassState,
    name: &str,
    specified_role: Option<i64>,
    grade_percentage: f64,
) -> Result<()> {
    crate::utils::validate_task_name(name).map_err(WorkflowError::validation)?;
    crate::utils::validate_percentage(grade_percentage).map_err(WorkflowError::validation)?;
    if let Some(role_id) = specified_role {
        state.role(role_id)?;
    }
    Ok(())
}

/// 按新的完整排列重写链表
///
/// 拒绝：ID 重复、缺失或不属于本班；锁定任务之间的相对顺序改变；锁定前缀不再位于链表开头。
pub fn reorder(state: &mut ClassState, ctx: &mut Ctx, sequence: &[i64]) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_editable(state)?;

    let mut seen = HashSet::with_capacity(sequence.len());
    for &task_id in sequence {
        if !state.contains_task(task_id) {
            return Err(WorkflowError::integrity_violation(format!(
                "Task {task_id} does not belong to this class"
            )));
        }
        if !seen.insert(task_id) {
            return Err(WorkflowError::integrity_violation(format!(
                "Task {task_id} appears more than once"
            )));
        }
    }
    if seen.len() != state.task_count() {
        return Err(WorkflowError::integrity_violation(
            "New order must contain every task of the class",
        ));
    }

    let locked = current_lock(state)?;
    if !locked.is_empty() {
        let locked_set: HashSet<i64> = locked.iter().copied().collect();
        let relative: Vec<i64> = sequence
            .iter()
            .copied()
            .filter(|id| locked_set.contains(id))
            .collect();
        if relative != locked {
            return Err(WorkflowError::integrity_violation(
                "New order would change the order of locked tasks",
            ));
        }
        if sequence[..locked.len()] != locked[..] {
            return Err(WorkflowError::integrity_violation(
                "Locked tasks must stay at the head of the task chain",
            ));
        }
    }

    relink(state, sequence)?;
    ctx.emit(
        EventKind::TaskChainReordered,
        Subject::Class {
            class_id: state.class_id(),
        },
        Some(format!("{sequence:?}")),
    );
    Ok(Subject::Class {
        class_id: state.class_id(),
    })
}

fn relink(state: &mut ClassState, sequence: &[i64]) -> Result<()> {
    for (index, &task_id) in sequence.iter().enumerate() {
        let next = sequence.get(index + 1).copied();
        state.task_mut(task_id)?.next_task_id = next;
    }
    state.class_mut().first_task_id = sequence.first().copied();
    Ok(())
}

/// 链表末尾任务；没有任务时为空
fn tail(state: &ClassState) -> Result<Option<i64>> {
    if state.task_count() == 0 {
        return Ok(None);
    }
    Ok(validate(state)?.last().copied())
}

/// 新建任务并追加到链表末尾
pub fn create_task(
    state: &mut ClassState,
    ctx: &mut Ctx,
    request: CreateTaskRequest,
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_editable(state)?;
    validate_task_fields(
        state,
        &request.name,
        request.specified_role,
        request.grade_percentage,
    )?;

    let previous_tail = tail(state)?;
    let id = state.allocate_id();
    let class_id = state.class_id();
    state.insert_task(Task {
        id,
        class_id,
        name: request.name,
        content: request.content,
        specified_role: request.specified_role,
        next_task_id: None,
        grade_percentage: request.grade_percentage,
        created_at: ctx.now,
        updated_at: ctx.now,
    });
    match previous_tail {
        Some(tail_id) => state.task_mut(tail_id)?.next_task_id = Some(id),
        None => state.class_mut().first_task_id = Some(id),
    }

    ctx.emit(EventKind::TaskCreated, Subject::Task { task_id: id }, None);
    Ok(Subject::Task { task_id: id })
}

/// 修改任务内容；锁定任务同样允许修改，锁定只限制删除与重排
pub fn update_task(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    update: UpdateTaskRequest,
) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_editable(state)?;

    let current = state.task(task_id)?.clone();
    let name = update.name.unwrap_or(current.name);
    let specified_role = update.specified_role.unwrap_or(current.specified_role);
    let grade_percentage = update.grade_percentage.unwrap_or(current.grade_percentage);
    validate_task_fields(state, &name, specified_role, grade_percentage)?;

    let task = state.task_mut(task_id)?;
    task.name = name;
    if update.content.is_some() {
        task.content = update.content;
    }
    task.specified_role = specified_role;
    task.grade_percentage = grade_percentage;
    task.updated_at = ctx.now;

    ctx.emit(EventKind::TaskUpdated, Subject::Task { task_id }, None);
    Ok(Subject::Task { task_id })
}

/// 删除未锁定的任务，并把前驱直接接到其后继
pub fn delete_task(state: &mut ClassState, ctx: &mut Ctx, task_id: i64) -> Result<Subject> {
    access::require(state, &ctx.actor, Action::ManageClass)?;
    ensure_editable(state)?;
    let next = state.task(task_id)?.next_task_id;

    if current_lock(state)?.contains(&task_id) {
        return Err(WorkflowError::integrity_violation(
            "Task is locked because a group has already reached it",
        ));
    }

    let predecessor = state.predecessor(task_id).map(|t| t.id);
    match predecessor {
        Some(prev) => state.task_mut(prev)?.next_task_id = next,
        None => {
            if state.class().first_task_id == Some(task_id) {
                state.class_mut().first_task_id = next;
            }
        }
    }
    state.remove_task(task_id);

    ctx.emit(EventKind::TaskDeleted, Subject::Task { task_id }, None);
    Ok(Subject::Class {
        class_id: state.class_id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Command;
    use crate::workflow::fixtures::Fixture;

    #[test]
    fn test_validate_returns_chain_order() {
        let fx = Fixture::with_tasks(3);
        assert_eq!(validate(&fx.state).unwrap(), fx.tasks);
    }

    #[test]
    fn test_validate_rejects_missing_head() {
        let fx = Fixture::new();
        assert!(matches!(
            validate(&fx.state),
            Err(WorkflowError::IncompleteChain(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unreachable_task() {
        let mut fx = Fixture::with_tasks(3);
        // 断开 1 -> 2，任务 2、3 不可达
        fx.state.task_mut(fx.tasks[0]).unwrap().next_task_id = None;
        let err = validate(&fx.state).unwrap_err();
        assert!(matches!(err, WorkflowError::IncompleteChain(_)));
        assert!(err.message().contains("1 of 3"));
    }

    #[test]
    fn test_validate_detects_cycle() {
        let mut fx = Fixture::with_tasks(3);
        fx.state.task_mut(fx.tasks[2]).unwrap().next_task_id = Some(fx.tasks[0]);
        let err = validate(&fx.state).unwrap_err();
        assert!(err.message().contains("cycle"));
    }

    #[test]
    fn test_validate_accepts_single_task() {
        let fx = Fixture::with_tasks(1);
        assert_eq!(validate(&fx.state).unwrap().len(), 1);
    }

    #[test]
    fn test_locked_prefix_uses_furthest_group() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 3);
        assert_eq!(locked_prefix(&fx.state).unwrap(), vec![fx.tasks[0]]);

        let group_id = fx.group_id();
        fx.state.group_mut(group_id).unwrap().current_task_id = Some(fx.tasks[1]);
        assert_eq!(
            locked_prefix(&fx.state).unwrap(),
            vec![fx.tasks[0], fx.tasks[1]]
        );
        assert_eq!(
            locked_prefix_for_group(&fx.state, group_id).unwrap(),
            vec![fx.tasks[0], fx.tasks[1]]
        );
    }

    #[test]
    fn test_reorder_rewrites_links() {
        let mut fx = Fixture::with_tasks(3);
        let (a, b, c) = (fx.tasks[0], fx.tasks[1], fx.tasks[2]);
        fx.run_as_teacher(Command::ReorderTasks {
            task_ids: vec![c, a, b],
        })
        .unwrap();
        assert_eq!(validate(&fx.state).unwrap(), vec![c, a, b]);
        assert_eq!(fx.state.class().first_task_id, Some(c));
        assert_eq!(fx.state.task(b).unwrap().next_task_id, None);
    }

    #[test]
    fn test_reorder_rejects_bad_permutations() {
        let mut fx = Fixture::with_tasks(3);
        let (a, b, c) = (fx.tasks[0], fx.tasks[1], fx.tasks[2]);
        for bad in [vec![a, b], vec![a, a, b, c], vec![a, b, c, 4242]] {
            let err = fx
                .run_as_teacher(Command::ReorderTasks { task_ids: bad })
                .unwrap_err();
            assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        }
        assert_eq!(validate(&fx.state).unwrap(), vec![a, b, c]);
    }

    #[test]
    fn test_reorder_rejects_swapping_locked_prefix() {
        // 分组已到达任务 2，链表 [1,2,3] 改为 [2,1,3] 必须被拒绝
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 3);
        let (a, b, c) = (fx.tasks[0], fx.tasks[1], fx.tasks[2]);
        let group_id = fx.group_id();
        fx.state.group_mut(group_id).unwrap().current_task_id = Some(b);

        let err = fx
            .run_as_teacher(Command::ReorderTasks {
                task_ids: vec![b, a, c],
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        assert_eq!(validate(&fx.state).unwrap(), vec![a, b, c]);
    }

    #[test]
    fn test_reorder_keeps_locked_prefix_at_head() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 4);
        let (a, b, c, d) = (fx.tasks[0], fx.tasks[1], fx.tasks[2], fx.tasks[3]);

        let err = fx
            .run_as_teacher(Command::ReorderTasks {
                task_ids: vec![c, a, b, d],
            })
            .unwrap_err();
        assert!(err.message().contains("head"));

        fx.run_as_teacher(Command::ReorderTasks {
            task_ids: vec![a, d, c, b],
        })
        .unwrap();
        assert_eq!(validate(&fx.state).unwrap(), vec![a, d, c, b]);
    }

    #[test]
    fn test_create_task_appends_to_tail() {
        let mut fx = Fixture::with_tasks(2);
        let applied = fx
            .run_as_teacher(Command::CreateTask(CreateTaskRequest {
                name: "Retrospective".into(),
                content: None,
                specified_role: None,
                grade_percentage: 10.0,
            }))
            .unwrap();
        let Subject::Task { task_id } = applied.subject else {
            panic!("expected task subject");
        };
        let chain = validate(&fx.state).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.last(), Some(&task_id));
    }

    #[test]
    fn test_create_task_rejects_foreign_role_and_bad_percentage() {
        let mut fx = Fixture::with_tasks(0);
        let err = fx
            .run_as_teacher(Command::CreateTask(CreateTaskRequest {
                name: "Design".into(),
                content: None,
                specified_role: Some(777),
                grade_percentage: 20.0,
            }))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));

        let err = fx
            .run_as_teacher(Command::CreateTask(CreateTaskRequest {
                name: "Design".into(),
                content: None,
                specified_role: None,
                grade_percentage: 120.0,
            }))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn test_delete_task_splices_chain() {
        let mut fx = Fixture::with_tasks(3);
        let (a, b, c) = (fx.tasks[0], fx.tasks[1], fx.tasks[2]);
        fx.run_as_teacher(Command::DeleteTask { task_id: b }).unwrap();
        assert_eq!(validate(&fx.state).unwrap(), vec![a, c]);

        fx.run_as_teacher(Command::DeleteTask { task_id: a }).unwrap();
        assert_eq!(fx.state.class().first_task_id, Some(c));
        assert_eq!(validate(&fx.state).unwrap(), vec![c]);
    }

    #[test]
    fn test_delete_locked_task_is_rejected() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 3);
        let err = fx
            .run_as_teacher(Command::DeleteTask {
                task_id: fx.tasks[0],
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        fx.run_as_teacher(Command::DeleteTask {
            task_id: fx.tasks[2],
        })
        .unwrap();
        assert_eq!(validate(&fx.state).unwrap().len(), 2);
    }

    #[test]
    fn test_student_cannot_edit_tasks() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 2);
        let err = fx
            .run_as_student(
                0,
                Command::DeleteTask {
                    task_id: fx.tasks[1],
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }
}
