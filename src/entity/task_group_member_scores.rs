//! 组内互评实体
//!
//! 两张评分表以 JSON 文本存储，键为用户ID。

use sea_orm::entity::prelude::*;

use crate::errors::Result as WorkflowResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_group_member_scores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub task_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i64,
    #[sea_orm(column_type = "Text")]
    pub manager_score: String,
    #[sea_orm(column_type = "Text")]
    pub member_scores: String,
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

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_peer_scores(
        self,
    ) -> WorkflowResult<crate::models::scores::entities::TaskGroupMemberScore> {
        use crate::models::scores::entities::TaskGroupMemberScore;

        Ok(TaskGroupMemberScore {
            task_id: self.task_id,
            group_id: self.group_id,
            manager_score: serde_json::from_str(&self.manager_score)?,
            member_scores: serde_json::from_str(&self.member_scores)?,
        })
    }
}
