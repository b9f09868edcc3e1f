//! 工作流事件
//!
//! 操作过程中记录事件，事务提交后交给 [`EventSink`]。发送失败不影响请求结果。

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::models::actors::entities::Actor;

use super::state::{IdMap, remap};

/// 操作影响的主体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    Class { class_id: i64 },
    Task { task_id: i64 },
    Role { role_id: i64 },
    Group { group_id: i64 },
    Member { member_id: i64 },
    Delivery { delivery_id: i64 },
    PeerScores { task_id: i64, group_id: i64 },
    TeacherScore { task_id: i64, user_id: i64 },
    WorkItem { work_item_id: i64 },
}

impl Subject {
    pub fn rekey(self, map: &IdMap) -> Self {
        let r = |id| remap(map, id);
        match self {
            Subject::Class { class_id } => Subject::Class { class_id: r(class_id) },
            Subject::Task { task_id } => Subject::Task { task_id: r(task_id) },
            Subject::Role { role_id } => Subject::Role { role_id: r(role_id) },
            Subject::Group { group_id } => Subject::Group { group_id: r(group_id) },
            Subject::Member { member_id } => Subject::Member {
                member_id: r(member_id),
            },
            Subject::Delivery { delivery_id } => Subject::Delivery {
                delivery_id: r(delivery_id),
            },
            Subject::PeerScores { task_id, group_id } => Subject::PeerScores {
                task_id: r(task_id),
                group_id: r(group_id),
            },
            Subject::TeacherScore { task_id, user_id } => Subject::TeacherScore {
                task_id: r(task_id),
                user_id,
            },
            Subject::WorkItem { work_item_id } => Subject::WorkItem {
                work_item_id: r(work_item_id),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ClassCreated,
    ClassStatusChanged,
    MemberAdded,
    RoleCreated,
    RoleDeleted,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskChainReordered,
    GroupCreated,
    GroupUpdated,
    GroupDeleted,
    GroupApproved,
    GroupUnapproved,
    MembershipRequested,
    MembershipApproved,
    MemberRemoved,
    RolesAssigned,
    DeliveryDrafted,
    DeliveryDraftUpdated,
    DeliverySubmitted,
    DeliveryApproved,
    DeliveryRejected,
    GroupAdvanced,
    PeerScored,
    TeacherScored,
    WorkItemCreated,
    WorkItemUpdated,
    WorkItemDeleted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowEvent {
    pub kind: EventKind,
    pub class_id: i64,
    pub actor: Actor,
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn rekey(&mut self, map: &IdMap) {
        self.class_id = remap(map, self.class_id);
        self.subject = self.subject.rekey(map);
    }
}

/// 审计日志接收方
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &WorkflowEvent);
}

/// 以结构化日志输出到 `audit` target
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &WorkflowEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        info!(
            target: "audit",
            kind = ?event.kind,
            class_id = event.class_id,
            user_id = event.actor.user_id,
            "{}",
            payload
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actors::entities::UserType;

    #[test]
    fn test_event_rekey_replaces_provisional_ids() {
        let mut event = WorkflowEvent {
            kind: EventKind::GroupCreated,
            class_id: 1,
            actor: Actor::new(7, UserType::Student),
            subject: Subject::Group { group_id: -3 },
            detail: None,
            occurred_at: Utc::now(),
        };
        event.rekey(&IdMap::from([(-3, 12)]));
        assert_eq!(event.subject, Subject::Group { group_id: 12 });
        assert_eq!(event.class_id, 1);
    }

    #[test]
    fn test_event_serializes_kind_snake_case() {
        let event = WorkflowEvent {
            kind: EventKind::DeliveryApproved,
            class_id: 1,
            actor: Actor::new(7, UserType::Teacher),
            subject: Subject::Delivery { delivery_id: 3 },
            detail: Some("teacher_approved".into()),
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "delivery_approved");
        assert_eq!(json["subject"]["type"], "delivery");
    }
}
