//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层加载实体后转换为 models 中的业务实体，组装成班级聚合。

pub mod prelude;

pub mod class_groups;
pub mod class_members;
pub mod classes;
pub mod deliveries;
pub mod delivery_items;
pub mod group_member_roles;
pub mod group_roles;
pub mod group_work_item_assignees;
pub mod group_work_item_files;
pub mod group_work_items;
pub mod task_group_member_scores;
pub mod tasks;
pub mod teacher_scores;
