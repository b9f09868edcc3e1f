//! 分组角色实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub role_name: String,
    pub role_description: Option<String>,
    pub is_manager: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::group_member_roles::Entity")]
    GroupMemberRoles,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::group_member_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMemberRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_group_role(self) -> crate::models::groups::entities::GroupRole {
        crate::models::groups::entities::GroupRole {
            id: self.id,
            class_id: self.class_id,
            role_name: self.role_name,
            role_description: self.role_description,
            is_manager: self.is_manager,
        }
    }
}
