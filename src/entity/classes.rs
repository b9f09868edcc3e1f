//! 班级实体

use sea_orm::entity::prelude::*;

use crate::errors::{Result as WorkflowResult, WorkflowError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub first_task_id: Option<i64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::group_roles::Entity")]
    GroupRoles,
    #[sea_orm(has_many = "super::class_groups::Entity")]
    ClassGroups,
    #[sea_orm(has_many = "super::class_members::Entity")]
    ClassMembers,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::group_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupRoles.def()
    }
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassGroups.def()
    }
}

impl Related<super::class_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_class(self) -> WorkflowResult<crate::models::classes::entities::Class> {
        use crate::models::classes::entities::{Class, ClassStatus};
        use chrono::{DateTime, Utc};

        let status = self
            .status
            .parse::<ClassStatus>()
            .map_err(WorkflowError::database_operation)?;

        Ok(Class {
            id: self.id,
            name: self.name,
            description: self.description,
            status,
            first_task_id: self.first_task_id,
            version: self.version,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}
