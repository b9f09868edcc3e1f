//! 班级存储操作

use super::SeaOrmStorage;
use super::persist::{insert_class, member_model};
use crate::entity::class_members;
use crate::entity::classes::{Column, Entity as Classes};
use crate::errors::{Result, WorkflowError};
use crate::models::{
    actors::entities::{Actor, UserType},
    classes::{entities::Class, requests::CreateClassRequest},
    groups::entities::{ClassMember, Membership},
};
use crate::workflow::{EventKind, Subject, WorkflowEvent, lifecycle};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait,
};
use sea_orm::sea_query::JoinType;
use std::collections::BTreeSet;
use tracing::info;

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, actor: &Actor, req: CreateClassRequest) -> Result<Class> {
        if !UserType::staff_types().contains(&actor.user_type) {
            return Err(WorkflowError::permission(
                "Only teachers or admins can create classes",
            ));
        }

        let now = chrono::Utc::now();
        let mut class = lifecycle::new_class(req.name, req.description, now)?;

        let txn = self.db.begin().await?;
        class.id = insert_class(&txn, &class).await?;

        // 教师创建者自动成为教师成员
        if actor.user_type == UserType::Teacher {
            let member = ClassMember {
                id: 0,
                class_id: class.id,
                user_id: actor.user_id,
                is_teacher: true,
                membership: Membership::Unassigned,
                role_ids: BTreeSet::new(),
                joined_at: now,
            };
            class_members::Entity::insert(member_model(&member, NotSet))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        info!("Class {} created by user {}", class.id, actor.user_id);
        self.sink.emit(&WorkflowEvent {
            kind: EventKind::ClassCreated,
            class_id: class.id,
            actor: *actor,
            subject: Subject::Class { class_id: class.id },
            detail: Some(class.name.clone()),
            occurred_at: now,
        });

        Ok(class)
    }

    /// 列出班级：管理员可见全部，其他用户只见自己所在的班级
    pub async fn list_classes_impl(&self, actor: &Actor) -> Result<Vec<Class>> {
        let mut select = Classes::find().order_by_asc(Column::Id);

        if !actor.is_admin() {
            select = select
                .join(
                    JoinType::InnerJoin,
                    crate::entity::classes::Relation::ClassMembers.def(),
                )
                .filter(class_members::Column::UserId.eq(actor.user_id));
        }

        select
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.into_class())
            .collect()
    }
}
