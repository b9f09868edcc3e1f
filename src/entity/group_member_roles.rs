//! 成员角色关联实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_member_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub class_member_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_members::Entity",
        from = "Column::ClassMemberId",
        to = "super::class_members::Column::Id"
    )]
    ClassMember,
    #[sea_orm(
        belongs_to = "super::group_roles::Entity",
        from = "Column::RoleId",
        to = "super::group_roles::Column::Id"
    )]
    Role,
}

impl Related<super::class_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassMember.def()
    }
}

impl Related<super::group_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
