//! 交付项实体

use sea_orm::entity::prelude::*;

use crate::errors::{Result as WorkflowResult, WorkflowError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "delivery_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub delivery_id: i64,
    pub item_type: String,
    pub item_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deliveries::Entity",
        from = "Column::DeliveryId",
        to = "super::deliveries::Column::Id"
    )]
    Delivery,
}

impl Related<super::deliveries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_delivery_item(
        self,
    ) -> WorkflowResult<crate::models::deliveries::entities::DeliveryItem> {
        use crate::models::deliveries::entities::{DeliveryItem, DeliveryType};

        let item_type = self
            .item_type
            .parse::<DeliveryType>()
            .map_err(WorkflowError::database_operation)?;

        Ok(DeliveryItem {
            id: self.id,
            delivery_id: self.delivery_id,
            item_type,
            item_id: self.item_id,
        })
    }
}
