use super::entities::Class;
use crate::models::groups::entities::{ClassMember, Group, GroupRole};
use crate::models::tasks::entities::Task;
use serde::Serialize;
use ts_rs::TS;

// 分组及其成员
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct GroupWithMembers {
    pub group: Group,
    pub members: Vec<ClassMember>,
}

// 班级概览
//
// 任务链完整时 tasks 按链表顺序排列，否则按 ID 排列且 chain_valid 为 false
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassOverview {
    pub class: Class,
    pub chain_valid: bool,
    pub tasks: Vec<Task>,
    pub roles: Vec<GroupRole>,
    pub groups: Vec<GroupWithMembers>,
    pub ungrouped: Vec<ClassMember>,
}
