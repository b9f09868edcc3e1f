//! 组内工作项实体

use sea_orm::entity::prelude::*;
use std::collections::BTreeSet;

use crate::errors::{Result as WorkflowResult, WorkflowError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_work_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub details: Option<String>,
    pub status: String,
    pub priority: i32,
    pub publisher: i64,
    pub deadline: Option<i64>,
    pub publish_time: i64,
    pub update_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_groups::Entity",
        from = "Column::GroupId",
        to = "super::class_groups::Column::Id"
    )]
    Group,
    #[sea_orm(has_many = "super::group_work_item_assignees::Entity")]
    Assignees,
    #[sea_orm(has_many = "super::group_work_item_files::Entity")]
    Files,
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::group_work_item_assignees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignees.def()
    }
}

impl Related<super::group_work_item_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 负责角色与附件存放在关联表中，由调用方传入
    pub fn into_work_item(
        self,
        assignees: BTreeSet<i64>,
        related_files: BTreeSet<i64>,
    ) -> WorkflowResult<crate::models::work_items::entities::WorkItem> {
        use crate::models::work_items::entities::{WorkItem, WorkItemStatus};
        use chrono::{DateTime, Utc};

        let status = self
            .status
            .parse::<WorkItemStatus>()
            .map_err(WorkflowError::database_operation)?;

        Ok(WorkItem {
            id: self.id,
            group_id: self.group_id,
            name: self.name,
            details: self.details,
            status,
            priority: self.priority,
            publisher: self.publisher,
            assignees,
            related_files,
            deadline: self
                .deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            publish_time: DateTime::<Utc>::from_timestamp(self.publish_time, 0)
                .unwrap_or_default(),
            update_time: DateTime::<Utc>::from_timestamp(self.update_time, 0)
                .unwrap_or_default(),
        })
    }
}
