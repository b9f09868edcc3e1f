//! 工作项附件关联实体
//!
//! file_id 指向外部文件存储，不加外键。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_work_item_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub work_item_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group_work_items::Entity",
        from = "Column::WorkItemId",
        to = "super::group_work_items::Column::Id"
    )]
    WorkItem,
}

impl Related<super::group_work_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
