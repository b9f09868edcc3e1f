//! 班级成员实体
//!
//! group_id 与 status 同时为空表示未分组。

use sea_orm::entity::prelude::*;
use std::collections::BTreeSet;

use crate::errors::{Result as WorkflowResult, WorkflowError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "class_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub user_id: i64,
    pub is_teacher: bool,
    pub group_id: Option<i64>,
    pub status: Option<String>,
    pub joined_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::class_groups::Entity",
        from = "Column::GroupId",
        to = "super::class_groups::Column::Id"
    )]
    Group,
    #[sea_orm(has_many = "super::group_member_roles::Entity")]
    GroupMemberRoles,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::class_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::group_member_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMemberRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 角色关联单独存放，由调用方传入
    pub fn into_class_member(
        self,
        role_ids: BTreeSet<i64>,
    ) -> WorkflowResult<crate::models::groups::entities::ClassMember> {
        use crate::models::groups::entities::{ClassMember, MemberStatus, Membership};
        use chrono::{DateTime, Utc};

        let status = self
            .status
            .as_deref()
            .map(str::parse::<MemberStatus>)
            .transpose()
            .map_err(WorkflowError::database_operation)?;

        Ok(ClassMember {
            id: self.id,
            class_id: self.class_id,
            user_id: self.user_id,
            is_teacher: self.is_teacher,
            membership: Membership::from_columns(self.group_id, status),
            role_ids,
            joined_at: DateTime::<Utc>::from_timestamp(self.joined_at, 0).unwrap_or_default(),
        })
    }
}
