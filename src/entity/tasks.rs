//! 任务实体
//!
//! next_task_id / specified_role 不建外键，链表一致性由工作流引擎维护。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub name: String,
    pub content: Option<String>,
    pub specified_role: Option<i64>,
    pub next_task_id: Option<i64>,
    #[sea_orm(column_type = "Double")]
    pub grade_percentage: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::deliveries::Entity")]
    Deliveries,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::deliveries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deliveries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_task(self) -> crate::models::tasks::entities::Task {
        use crate::models::tasks::entities::Task;
        use chrono::{DateTime, Utc};

        Task {
            id: self.id,
            class_id: self.class_id,
            name: self.name,
            content: self.content,
            specified_role: self.specified_role,
            next_task_id: self.next_task_id,
            grade_percentage: self.grade_percentage,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
