//! 教师评分实体

use sea_orm::entity::prelude::*;

use crate::errors::Result as WorkflowResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teacher_scores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub task_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(column_type = "Double")]
    pub score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub score_details: Option<String>,
    pub score_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_teacher_score(
        self,
    ) -> WorkflowResult<crate::models::scores::entities::TeacherScore> {
        use crate::models::scores::entities::TeacherScore;
        use chrono::{DateTime, Utc};

        let score_details = self
            .score_details
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(TeacherScore {
            task_id: self.task_id,
            user_id: self.user_id,
            score: self.score,
            score_details,
            score_time: DateTime::<Utc>::from_timestamp(self.score_time, 0).unwrap_or_default(),
        })
    }
}
