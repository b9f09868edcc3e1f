//! 交付实体

use sea_orm::entity::prelude::*;

use crate::errors::{Result as WorkflowResult, WorkflowError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub group_id: i64,
    pub status: String,
    pub delivery_user: i64,
    #[sea_orm(column_type = "Double")]
    pub task_grade_percentage: f64,
    pub delivery_comments: Option<String>,
    pub delivery_time: Option<i64>,
    pub review_comments: Option<String>,
    pub review_time: Option<i64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub score: Option<f64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
    #[sea_orm(
        belongs_to = "super::class_groups::Entity",
        from = "Column::GroupId",
        to = "super::class_groups::Column::Id"
    )]
    Group,
    #[sea_orm(has_many = "super::delivery_items::Entity")]
    DeliveryItems,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::delivery_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_delivery(
        self,
        items: Vec<crate::models::deliveries::entities::DeliveryItem>,
    ) -> WorkflowResult<crate::models::deliveries::entities::Delivery> {
        use crate::models::deliveries::entities::{Delivery, DeliveryStatus};
        use chrono::{DateTime, Utc};

        let status = self
            .status
            .parse::<DeliveryStatus>()
            .map_err(WorkflowError::database_operation)?;

        Ok(Delivery {
            id: self.id,
            task_id: self.task_id,
            group_id: self.group_id,
            status,
            delivery_user: self.delivery_user,
            task_grade_percentage: self.task_grade_percentage,
            delivery_comments: self.delivery_comments,
            delivery_time: self
                .delivery_time
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            review_comments: self.review_comments,
            review_time: self
                .review_time
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            score: self.score,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            items,
        })
    }
}
