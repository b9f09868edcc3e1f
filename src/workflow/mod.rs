//! 课程项目工作流引擎
//!
//! 纯内存、同步、无 I/O。存储层负责在事务中加载 [`ClassState`]、调用 [`execute`]
//! 并把变更写回数据库；引擎本身只负责不变量与状态转换。
//!
//! - `task_chain`: 任务链校验、锁定前缀、排序与增删改
//! - `grouping`: 角色、分组与成员状态机
//! - `delivery`: 交付审核状态机与任务推进
//! - `scoring`: 互评完成度判定
//! - `lifecycle`: 班级生命周期
//! - `work_items`: 组内工作项
//! - `views`: 只读查询

pub mod access;
pub mod delivery;
pub mod events;
pub mod grouping;
pub mod lifecycle;
pub mod scoring;
pub mod state;
pub mod task_chain;
pub mod views;
pub mod work_items;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::Result;
use crate::models::actors::entities::Actor;
use crate::models::deliveries::requests::AddItemRequest;
use crate::models::groups::requests::{CreateGroupRequest, CreateRoleRequest};
use crate::models::scores::requests::TeacherScoreRequest;
use crate::models::tasks::requests::{CreateTaskRequest, UpdateTaskRequest};
use crate::models::work_items::requests::{CreateWorkItemRequest, UpdateWorkItemRequest};

pub use events::{EventKind, EventSink, Subject, TracingEventSink, WorkflowEvent};
pub use state::{ClassState, IdMap};

/// 对单个班级执行的写操作
#[derive(Debug, Clone)]
pub enum Command {
    // 班级生命周期
    StartGrouping,
    StartTeaching,
    FinishClass,
    AddMember {
        user_id: i64,
        is_teacher: bool,
    },

    // 角色
    CreateRole(CreateRoleRequest),
    DeleteRole {
        role_id: i64,
    },

    // 任务链
    CreateTask(CreateTaskRequest),
    UpdateTask {
        task_id: i64,
        update: UpdateTaskRequest,
    },
    DeleteTask {
        task_id: i64,
    },
    ReorderTasks {
        task_ids: Vec<i64>,
    },

    // 分组
    CreateGroup(CreateGroupRequest),
    UpdateGroup {
        group_id: i64,
        name: String,
    },
    DeleteGroup {
        group_id: i64,
    },
    RequestMembership {
        group_id: i64,
        class_member_id: i64,
    },
    ApproveMembership {
        group_id: i64,
        class_member_id: i64,
    },
    RemoveMember {
        group_id: i64,
        class_member_id: i64,
    },
    AssignRoles {
        group_id: i64,
        class_member_id: i64,
        role_ids: Vec<i64>,
    },
    ApproveGroup {
        group_id: i64,
    },
    UnapproveGroup {
        group_id: i64,
    },

    // 交付
    CreateDraft {
        task_id: i64,
        group_id: i64,
        comments: Option<String>,
    },
    UpdateDraft {
        task_id: i64,
        group_id: i64,
        comments: Option<String>,
    },
    AddItem {
        task_id: i64,
        group_id: i64,
        item: AddItemRequest,
    },
    RemoveItem {
        task_id: i64,
        group_id: i64,
        item_id: i64,
    },
    SubmitDraft {
        task_id: i64,
        group_id: i64,
    },
    ApproveDelivery {
        task_id: i64,
        group_id: i64,
        score: Option<f64>,
        comments: Option<String>,
    },
    RejectDelivery {
        task_id: i64,
        group_id: i64,
        comments: Option<String>,
    },
    AdvanceGroup {
        group_id: i64,
    },

    // 评分
    SubmitPeerScores {
        task_id: i64,
        group_id: i64,
        scores: BTreeMap<i64, f64>,
    },
    ScoreMember {
        task_id: i64,
        group_id: i64,
        request: TeacherScoreRequest,
    },

    // 组内工作项
    CreateWorkItem {
        group_id: i64,
        request: CreateWorkItemRequest,
    },
    UpdateWorkItem {
        group_id: i64,
        work_item_id: i64,
        update: UpdateWorkItemRequest,
    },
    DeleteWorkItem {
        group_id: i64,
        work_item_id: i64,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartGrouping => "start_grouping",
            Command::StartTeaching => "start_teaching",
            Command::FinishClass => "finish_class",
            Command::AddMember { .. } => "add_member",
            Command::CreateRole(_) => "create_role",
            Command::DeleteRole { .. } => "delete_role",
            Command::CreateTask(_) => "create_task",
            Command::UpdateTask { .. } => "update_task",
            Command::DeleteTask { .. } => "delete_task",
            Command::ReorderTasks { .. } => "reorder_tasks",
            Command::CreateGroup(_) => "create_group",
            Command::UpdateGroup { .. } => "update_group",
            Command::DeleteGroup { .. } => "delete_group",
            Command::RequestMembership { .. } => "request_membership",
            Command::ApproveMembership { .. } => "approve_membership",
            Command::RemoveMember { .. } => "remove_member",
            Command::AssignRoles { .. } => "assign_roles",
            Command::ApproveGroup { .. } => "approve_group",
            Command::UnapproveGroup { .. } => "unapprove_group",
            Command::CreateDraft { .. } => "create_draft",
            Command::UpdateDraft { .. } => "update_draft",
            Command::AddItem { .. } => "add_item",
            Command::RemoveItem { .. } => "remove_item",
            Command::SubmitDraft { .. } => "submit_draft",
            Command::ApproveDelivery { .. } => "approve_delivery",
            Command::RejectDelivery { .. } => "reject_delivery",
            Command::AdvanceGroup { .. } => "advance_group",
            Command::SubmitPeerScores { .. } => "submit_peer_scores",
            Command::ScoreMember { .. } => "score_member",
            Command::CreateWorkItem { .. } => "create_work_item",
            Command::UpdateWorkItem { .. } => "update_work_item",
            Command::DeleteWorkItem { .. } => "delete_work_item",
        }
    }
}

/// 单次操作的上下文：操作者、时间与事件收集
#[derive(Debug)]
pub struct Ctx {
    pub actor: Actor,
    pub now: DateTime<Utc>,
    class_id: i64,
    events: Vec<WorkflowEvent>,
}

impl Ctx {
    pub fn new(actor: Actor, class_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            actor,
            now,
            class_id,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, kind: EventKind, subject: Subject, detail: Option<String>) {
        self.events.push(WorkflowEvent {
            kind,
            class_id: self.class_id,
            actor: self.actor,
            subject,
            detail,
            occurred_at: self.now,
        });
    }

    pub fn into_events(self) -> Vec<WorkflowEvent> {
        self.events
    }
}

/// 一次成功操作的结果
#[derive(Debug, Clone)]
pub struct Applied {
    pub subject: Subject,
    pub events: Vec<WorkflowEvent>,
}

impl Applied {
    pub fn rekey(&mut self, map: &IdMap) {
        self.subject = self.subject.rekey(map);
        for event in &mut self.events {
            event.rekey(map);
        }
    }
}

/// 执行一条命令
///
/// 在状态副本上操作，任一校验失败时原状态保持不变。
pub fn execute(state: &mut ClassState, actor: &Actor, command: Command) -> Result<Applied> {
    access::ensure_visible(state, actor)?;

    let name = command.name();
    let mut next = state.clone();
    let mut ctx = Ctx::new(*actor, next.class_id(), Utc::now());
    let subject = dispatch(&mut next, &mut ctx, command)?;
    debug!(
        "Command {} applied to class {} by user {}",
        name,
        next.class_id(),
        actor.user_id
    );

    *state = next;
    Ok(Applied {
        subject,
        events: ctx.into_events(),
    })
}

fn dispatch(state: &mut ClassState, ctx: &mut Ctx, command: Command) -> Result<Subject> {
    match command {
        Command::StartGrouping => lifecycle::start_grouping(state, ctx),
        Command::StartTeaching => lifecycle::start_teaching(state, ctx),
        Command::FinishClass => lifecycle::finish_class(state, ctx),
        Command::AddMember {
            user_id,
            is_teacher,
        } => lifecycle::add_member(state, ctx, user_id, is_teacher),

        Command::CreateRole(request) => grouping::create_role(state, ctx, request),
        Command::DeleteRole { role_id } => grouping::delete_role(state, ctx, role_id),

        Command::CreateTask(request) => task_chain::create_task(state, ctx, request),
        Command::UpdateTask { task_id, update } => {
            task_chain::update_task(state, ctx, task_id, update)
        }
        Command::DeleteTask { task_id } => task_chain::delete_task(state, ctx, task_id),
        Command::ReorderTasks { task_ids } => task_chain::reorder(state, ctx, &task_ids),

        Command::CreateGroup(request) => grouping::create_group(state, ctx, request),
        Command::UpdateGroup { group_id, name } => {
            grouping::update_group(state, ctx, group_id, name)
        }
        Command::DeleteGroup { group_id } => grouping::delete_group(state, ctx, group_id),
        Command::RequestMembership {
            group_id,
            class_member_id,
        } => grouping::request_membership(state, ctx, group_id, class_member_id),
        Command::ApproveMembership {
            group_id,
            class_member_id,
        } => grouping::approve_membership(state, ctx, group_id, class_member_id),
        Command::RemoveMember {
            group_id,
            class_member_id,
        } => grouping::remove_member(state, ctx, group_id, class_member_id),
        Command::AssignRoles {
            group_id,
            class_member_id,
            role_ids,
        } => grouping::assign_roles(state, ctx, group_id, class_member_id, &role_ids),
        Command::ApproveGroup { group_id } => grouping::approve_group(state, ctx, group_id),
        Command::UnapproveGroup { group_id } => grouping::unapprove_group(state, ctx, group_id),

        Command::CreateDraft {
            task_id,
            group_id,
            comments,
        } => delivery::create_draft(state, ctx, task_id, group_id, comments),
        Command::UpdateDraft {
            task_id,
            group_id,
            comments,
        } => delivery::update_draft(state, ctx, task_id, group_id, comments),
        Command::AddItem {
            task_id,
            group_id,
            item,
        } => delivery::add_item(state, ctx, task_id, group_id, item),
        Command::RemoveItem {
            task_id,
            group_id,
            item_id,
        } => delivery::remove_item(state, ctx, task_id, group_id, item_id),
        Command::SubmitDraft { task_id, group_id } => {
            delivery::submit_draft(state, ctx, task_id, group_id)
        }
        Command::ApproveDelivery {
            task_id,
            group_id,
            score,
            comments,
        } => delivery::approve(state, ctx, task_id, group_id, score, comments),
        Command::RejectDelivery {
            task_id,
            group_id,
            comments,
        } => delivery::reject(state, ctx, task_id, group_id, comments),
        Command::AdvanceGroup { group_id } => delivery::advance_group(state, ctx, group_id),

        Command::SubmitPeerScores {
            task_id,
            group_id,
            scores,
        } => scoring::submit_peer_scores(state, ctx, task_id, group_id, &scores),
        Command::ScoreMember {
            task_id,
            group_id,
            request,
        } => delivery::score_member(state, ctx, task_id, group_id, request),

        Command::CreateWorkItem { group_id, request } => {
            work_items::create_work_item(state, ctx, group_id, request)
        }
        Command::UpdateWorkItem {
            group_id,
            work_item_id,
            update,
        } => work_items::update_work_item(state, ctx, group_id, work_item_id, update),
        Command::DeleteWorkItem {
            group_id,
            work_item_id,
        } => work_items::delete_work_item(state, ctx, group_id, work_item_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WorkflowError;
    use crate::models::classes::entities::ClassStatus;
    use crate::workflow::fixtures::Fixture;

    #[test]
    fn test_failed_command_leaves_state_untouched() {
        let mut fx = Fixture::grouping(&["manager", "dev", "qa"], 3);
        let before = fx.state.clone();
        let err = fx.run_as_student(0, Command::StartTeaching).unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
        assert_eq!(fx.state, before);
    }

    #[test]
    fn test_outsider_gets_not_found() {
        let mut fx = Fixture::grouping(&["manager", "dev"], 1);
        let outsider = Actor::new(
            99_999,
            crate::models::actors::entities::UserType::Student,
        );
        let err = execute(&mut fx.state, &outsider, Command::StartTeaching).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        assert_eq!(fx.state.class().status, ClassStatus::Grouping);
    }

    #[test]
    fn test_events_are_recorded_with_actor() {
        let mut fx = Fixture::new();
        let applied = fx
            .run_as_teacher(Command::CreateRole(CreateRoleRequest {
                role_name: "manager".into(),
                role_description: None,
                is_manager: true,
            }))
            .unwrap();
        assert_eq!(applied.events.len(), 1);
        assert_eq!(applied.events[0].kind, EventKind::RoleCreated);
        assert_eq!(applied.events[0].actor, fx.teacher);
    }
}
