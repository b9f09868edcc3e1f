//! 预导入模块，方便使用

pub use super::class_groups::{
    ActiveModel as ClassGroupActiveModel, Entity as ClassGroups, Model as ClassGroupModel,
};
pub use super::class_members::{
    ActiveModel as ClassMemberActiveModel, Entity as ClassMembers, Model as ClassMemberModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::deliveries::{
    ActiveModel as DeliveryActiveModel, Entity as Deliveries, Model as DeliveryModel,
};
pub use super::delivery_items::{
    ActiveModel as DeliveryItemActiveModel, Entity as DeliveryItems, Model as DeliveryItemModel,
};
pub use super::group_member_roles::{
    ActiveModel as GroupMemberRoleActiveModel, Entity as GroupMemberRoles,
    Model as GroupMemberRoleModel,
};
pub use super::group_roles::{
    ActiveModel as GroupRoleActiveModel, Entity as GroupRoles, Model as GroupRoleModel,
};
pub use super::group_work_item_assignees::{
    ActiveModel as WorkItemAssigneeActiveModel, Entity as GroupWorkItemAssignees,
    Model as WorkItemAssigneeModel,
};
pub use super::group_work_item_files::{
    ActiveModel as WorkItemFileActiveModel, Entity as GroupWorkItemFiles,
    Model as WorkItemFileModel,
};
pub use super::group_work_items::{
    ActiveModel as WorkItemActiveModel, Entity as GroupWorkItems, Model as WorkItemModel,
};
pub use super::task_group_member_scores::{
    ActiveModel as PeerScoreActiveModel, Entity as TaskGroupMemberScores, Model as PeerScoreModel,
};
pub use super::tasks::{ActiveModel as TaskActiveModel, Entity as Tasks, Model as TaskModel};
pub use super::teacher_scores::{
    ActiveModel as TeacherScoreActiveModel, Entity as TeacherScores, Model as TeacherScoreModel,
};
