//! 工作项负责角色关联实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_work_item_assignees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub work_item_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group_work_items::Entity",
        from = "Column::WorkItemId",
        to = "super::group_work_items::Column::Id"
    )]
    WorkItem,
    #[sea_orm(
        belongs_to = "super::group_roles::Entity",
        from = "Column::RoleId",
        to = "super::group_roles::Column::Id"
    )]
    Role,
}

impl Related<super::group_work_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkItem.def()
    }
}

impl Related<super::group_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
