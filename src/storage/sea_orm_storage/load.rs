//! 班级聚合加载

use std::collections::{BTreeSet, HashMap};

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{
    class_groups, class_members, deliveries, delivery_items, group_member_roles, group_roles,
    group_work_item_assignees, group_work_item_files, group_work_items, task_group_member_scores,
    tasks, teacher_scores,
};
use crate::errors::{Result, WorkflowError};
use crate::models::actors::entities::Actor;
use crate::models::deliveries::entities::DeliveryItem;
use crate::workflow::{ClassState, access};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// 读取一个班级的全部工作流数据
///
/// `lock` 为真时在 PostgreSQL/MySQL 上对班级行加 `FOR UPDATE`；
/// SQLite 的写事务本身是串行的，不需要行锁。
pub(super) async fn load_state<C>(db: &C, class_id: i64, lock: bool) -> Result<ClassState>
where
    C: ConnectionTrait,
{
    let mut query = Classes::find_by_id(class_id);
    if lock && db.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }
    let class = query
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("Class not found"))?
        .into_class()?;

    let tasks = Tasks::find()
        .filter(tasks::Column::ClassId.eq(class_id))
        .all(db)
        .await?
        .into_iter()
        .map(TaskModel::into_task)
        .collect::<Vec<_>>();
    let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();

    let roles = GroupRoles::find()
        .filter(group_roles::Column::ClassId.eq(class_id))
        .all(db)
        .await?
        .into_iter()
        .map(GroupRoleModel::into_group_role)
        .collect::<Vec<_>>();

    let groups = ClassGroups::find()
        .filter(class_groups::Column::ClassId.eq(class_id))
        .all(db)
        .await?
        .into_iter()
        .map(ClassGroupModel::into_group)
        .collect::<Result<Vec<_>>>()?;
    let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();

    // 成员与角色关联
    let member_models = ClassMembers::find()
        .filter(class_members::Column::ClassId.eq(class_id))
        .all(db)
        .await?;
    let member_ids: Vec<i64> = member_models.iter().map(|m| m.id).collect();

    let mut role_links: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    if !member_ids.is_empty() {
        for link in GroupMemberRoles::find()
            .filter(group_member_roles::Column::ClassMemberId.is_in(member_ids))
            .all(db)
            .await?
        {
            role_links
                .entry(link.class_member_id)
                .or_default()
                .insert(link.role_id);
        }
    }

    let members = member_models
        .into_iter()
        .map(|m| {
            let roles = role_links.remove(&m.id).unwrap_or_default();
            m.into_class_member(roles)
        })
        .collect::<Result<Vec<_>>>()?;

    // 交付与交付项
    let mut deliveries = Vec::new();
    if !group_ids.is_empty() {
        let delivery_models = Deliveries::find()
            .filter(deliveries::Column::GroupId.is_in(group_ids.clone()))
            .order_by_asc(deliveries::Column::Id)
            .all(db)
            .await?;
        let delivery_ids: Vec<i64> = delivery_models.iter().map(|d| d.id).collect();

        let mut items: HashMap<i64, Vec<DeliveryItem>> = HashMap::new();
        if !delivery_ids.is_empty() {
            for item in DeliveryItems::find()
                .filter(delivery_items::Column::DeliveryId.is_in(delivery_ids))
                .order_by_asc(delivery_items::Column::Id)
                .all(db)
                .await?
            {
                let item = item.into_delivery_item()?;
                items.entry(item.delivery_id).or_default().push(item);
            }
        }

        for model in delivery_models {
            let own_items = items.remove(&model.id).unwrap_or_default();
            deliveries.push(model.into_delivery(own_items)?);
        }
    }

    // 工作项及其负责角色与附件
    let mut work_items = Vec::new();
    if !group_ids.is_empty() {
        let item_models = GroupWorkItems::find()
            .filter(group_work_items::Column::GroupId.is_in(group_ids.clone()))
            .order_by_asc(group_work_items::Column::Id)
            .all(db)
            .await?;
        let item_ids: Vec<i64> = item_models.iter().map(|w| w.id).collect();

        let mut assignees: HashMap<i64, BTreeSet<i64>> = HashMap::new();
        let mut files: HashMap<i64, BTreeSet<i64>> = HashMap::new();
        if !item_ids.is_empty() {
            for link in GroupWorkItemAssignees::find()
                .filter(group_work_item_assignees::Column::WorkItemId.is_in(item_ids.clone()))
                .all(db)
                .await?
            {
                assignees
                    .entry(link.work_item_id)
                    .or_default()
                    .insert(link.role_id);
            }
            for link in GroupWorkItemFiles::find()
                .filter(group_work_item_files::Column::WorkItemId.is_in(item_ids))
                .all(db)
                .await?
            {
                files
                    .entry(link.work_item_id)
                    .or_default()
                    .insert(link.file_id);
            }
        }

        for model in item_models {
            let own_assignees = assignees.remove(&model.id).unwrap_or_default();
            let own_files = files.remove(&model.id).unwrap_or_default();
            work_items.push(model.into_work_item(own_assignees, own_files)?);
        }
    }

    // 评分
    let peer_scores = if group_ids.is_empty() {
        Vec::new()
    } else {
        TaskGroupMemberScores::find()
            .filter(task_group_member_scores::Column::GroupId.is_in(group_ids))
            .all(db)
            .await?
            .into_iter()
            .map(PeerScoreModel::into_peer_scores)
            .collect::<Result<Vec<_>>>()?
    };

    let teacher_scores = if task_ids.is_empty() {
        Vec::new()
    } else {
        TeacherScores::find()
            .filter(teacher_scores::Column::TaskId.is_in(task_ids))
            .all(db)
            .await?
            .into_iter()
            .map(TeacherScoreModel::into_teacher_score)
            .collect::<Result<Vec<_>>>()?
    };

    Ok(ClassState::from_parts(
        class,
        tasks,
        roles,
        groups,
        members,
        deliveries,
        peer_scores,
        teacher_scores,
    )
    .with_work_items(work_items))
}

impl SeaOrmStorage {
    /// 只读加载，非成员（管理员除外）得到 NotFound
    pub async fn load_class_impl(&self, class_id: i64, actor: &Actor) -> Result<ClassState> {
        let state = load_state(&self.db, class_id, false).await?;
        access::ensure_visible(&state, actor)?;
        Ok(state)
    }
}
