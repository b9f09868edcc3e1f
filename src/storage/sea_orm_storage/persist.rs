//! 班级聚合写回
//!
//! 比较命令执行前后的两份 [`ClassState`]，只写入发生变化的行。
//! 写入顺序：插入新行（按外键依赖）→ 替换临时 ID → 更新 → 删除。

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::entity::prelude::*;
use crate::entity::{
    class_groups, classes, delivery_items, group_member_roles, group_roles,
    group_work_item_assignees, group_work_item_files, group_work_items, tasks,
};
use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::Class;
use crate::models::deliveries::entities::{Delivery, DeliveryItem};
use crate::models::groups::entities::{ClassMember, Group, GroupRole};
use crate::models::scores::entities::{TaskGroupMemberScore, TeacherScore};
use crate::models::tasks::entities::Task;
use crate::models::work_items::entities::WorkItem;
use crate::workflow::state::remap;
use crate::workflow::{ClassState, IdMap};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use tracing::debug;

fn task_model(task: &Task, id: sea_orm::ActiveValue<i64>) -> TaskActiveModel {
    TaskActiveModel {
        id,
        class_id: Set(task.class_id),
        name: Set(task.name.clone()),
        content: Set(task.content.clone()),
        specified_role: Set(task.specified_role),
        next_task_id: Set(task.next_task_id),
        grade_percentage: Set(task.grade_percentage),
        created_at: Set(task.created_at.timestamp()),
        updated_at: Set(task.updated_at.timestamp()),
    }
}

fn role_model(role: &GroupRole, id: sea_orm::ActiveValue<i64>) -> GroupRoleActiveModel {
    GroupRoleActiveModel {
        id,
        class_id: Set(role.class_id),
        role_name: Set(role.role_name.clone()),
        role_description: Set(role.role_description.clone()),
        is_manager: Set(role.is_manager),
    }
}

fn group_model(group: &Group, id: sea_orm::ActiveValue<i64>) -> ClassGroupActiveModel {
    ClassGroupActiveModel {
        id,
        class_id: Set(group.class_id),
        name: Set(group.name.clone()),
        status: Set(group.status.to_string()),
        current_task_id: Set(group.current_task_id),
        created_at: Set(group.created_at.timestamp()),
    }
}

pub(super) fn member_model(
    member: &ClassMember,
    id: sea_orm::ActiveValue<i64>,
) -> ClassMemberActiveModel {
    ClassMemberActiveModel {
        id,
        class_id: Set(member.class_id),
        user_id: Set(member.user_id),
        is_teacher: Set(member.is_teacher),
        group_id: Set(member.membership.group_id()),
        status: Set(member.membership.status().map(|s| s.to_string())),
        joined_at: Set(member.joined_at.timestamp()),
    }
}

fn delivery_model(delivery: &Delivery, id: sea_orm::ActiveValue<i64>) -> DeliveryActiveModel {
    DeliveryActiveModel {
        id,
        task_id: Set(delivery.task_id),
        group_id: Set(delivery.group_id),
        status: Set(delivery.status.to_string()),
        delivery_user: Set(delivery.delivery_user),
        task_grade_percentage: Set(delivery.task_grade_percentage),
        delivery_comments: Set(delivery.delivery_comments.clone()),
        delivery_time: Set(delivery.delivery_time.map(|t| t.timestamp())),
        review_comments: Set(delivery.review_comments.clone()),
        review_time: Set(delivery.review_time.map(|t| t.timestamp())),
        score: Set(delivery.score),
        created_at: Set(delivery.created_at.timestamp()),
    }
}

fn item_model(item: &DeliveryItem, delivery_id: i64) -> DeliveryItemActiveModel {
    DeliveryItemActiveModel {
        id: NotSet,
        delivery_id: Set(delivery_id),
        item_type: Set(item.item_type.to_string()),
        item_id: Set(item.item_id),
    }
}

fn work_item_model(item: &WorkItem, id: sea_orm::ActiveValue<i64>) -> WorkItemActiveModel {
    WorkItemActiveModel {
        id,
        group_id: Set(item.group_id),
        name: Set(item.name.clone()),
        details: Set(item.details.clone()),
        status: Set(item.status.to_string()),
        priority: Set(item.priority),
        publisher: Set(item.publisher),
        deadline: Set(item.deadline.map(|t| t.timestamp())),
        publish_time: Set(item.publish_time.timestamp()),
        update_time: Set(item.update_time.timestamp()),
    }
}

/// 工作项的负责角色与附件按集合差异写入
async fn sync_work_item_links<C: ConnectionTrait>(
    db: &C,
    item: &WorkItem,
    old: Option<&WorkItem>,
) -> Result<()> {
    let empty = BTreeSet::new();
    let old_assignees = old.map_or(&empty, |o| &o.assignees);
    let removed: Vec<i64> = old_assignees.difference(&item.assignees).copied().collect();
    if !removed.is_empty() {
        GroupWorkItemAssignees::delete_many()
            .filter(group_work_item_assignees::Column::WorkItemId.eq(item.id))
            .filter(group_work_item_assignees::Column::RoleId.is_in(removed))
            .exec(db)
            .await?;
    }
    let added: Vec<i64> = item.assignees.difference(old_assignees).copied().collect();
    if !added.is_empty() {
        let links = added.into_iter().map(|role_id| WorkItemAssigneeActiveModel {
            work_item_id: Set(item.id),
            role_id: Set(role_id),
        });
        GroupWorkItemAssignees::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }

    let old_files = old.map_or(&empty, |o| &o.related_files);
    let removed: Vec<i64> = old_files.difference(&item.related_files).copied().collect();
    if !removed.is_empty() {
        GroupWorkItemFiles::delete_many()
            .filter(group_work_item_files::Column::WorkItemId.eq(item.id))
            .filter(group_work_item_files::Column::FileId.is_in(removed))
            .exec(db)
            .await?;
    }
    let added: Vec<i64> = item.related_files.difference(old_files).copied().collect();
    if !added.is_empty() {
        let links = added.into_iter().map(|file_id| WorkItemFileActiveModel {
            work_item_id: Set(item.id),
            file_id: Set(file_id),
        });
        GroupWorkItemFiles::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

fn peer_score_model(score: &TaskGroupMemberScore) -> Result<PeerScoreActiveModel> {
    Ok(PeerScoreActiveModel {
        task_id: Set(score.task_id),
        group_id: Set(score.group_id),
        manager_score: Set(serde_json::to_string(&score.manager_score)?),
        member_scores: Set(serde_json::to_string(&score.member_scores)?),
    })
}

fn teacher_score_model(score: &TeacherScore) -> Result<TeacherScoreActiveModel> {
    let score_details = score
        .score_details
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    Ok(TeacherScoreActiveModel {
        task_id: Set(score.task_id),
        user_id: Set(score.user_id),
        score: Set(score.score),
        score_details: Set(score_details),
        score_time: Set(score.score_time.timestamp()),
    })
}

/// 本次写回中新插入的行，按表区分
#[derive(Debug, Default)]
struct Inserted {
    roles: HashSet<i64>,
    tasks: HashSet<i64>,
    groups: HashSet<i64>,
    members: HashSet<i64>,
    deliveries: HashSet<i64>,
    work_items: HashSet<i64>,
}

/// 插入班级行，返回数据库分配的 ID
pub(super) async fn insert_class<C: ConnectionTrait>(db: &C, class: &Class) -> Result<i64> {
    let model = ClassActiveModel {
        id: NotSet,
        name: Set(class.name.clone()),
        description: Set(class.description.clone()),
        status: Set(class.status.to_string()),
        first_task_id: Set(class.first_task_id),
        version: Set(class.version),
        created_at: Set(class.created_at.timestamp()),
        updated_at: Set(class.updated_at.timestamp()),
    };
    let result = Classes::insert(model).exec(db).await?;
    Ok(result.last_insert_id)
}

/// 以版本号比较并交换的方式更新班级行
///
/// `expected` 是加载时读到的版本；行数为 0 说明期间已被其他事务修改。
async fn update_class<C: ConnectionTrait>(db: &C, class: &Class, expected: i64) -> Result<()> {
    let result = Classes::update_many()
        .col_expr(classes::Column::Name, Expr::value(class.name.clone()))
        .col_expr(
            classes::Column::Description,
            Expr::value(class.description.clone()),
        )
        .col_expr(classes::Column::Status, Expr::value(class.status.to_string()))
        .col_expr(classes::Column::FirstTaskId, Expr::value(class.first_task_id))
        .col_expr(classes::Column::Version, Expr::value(class.version))
        .col_expr(
            classes::Column::UpdatedAt,
            Expr::value(class.updated_at.timestamp()),
        )
        .filter(classes::Column::Id.eq(class.id))
        .filter(classes::Column::Version.eq(expected))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(WorkflowError::conflict(
            "Class was modified by another request, please retry",
        ));
    }
    Ok(())
}

/// 把 `after` 相对 `before` 的变化写入数据库，并把 `after` 中的临时 ID 替换为真实 ID
///
/// 调用方负责在事务中调用，并预先把 `after` 的版本号加一。
pub(super) async fn persist<C: ConnectionTrait>(
    db: &C,
    before: &ClassState,
    after: &mut ClassState,
) -> Result<IdMap> {
    let mut map = IdMap::new();
    // 各表的 ID 序列相互独立，新行按表分别记录
    let mut inserted = Inserted::default();

    // ---- 插入 ----

    for role in after.roles().filter(|r| r.id < 0) {
        let model = role_model(role, NotSet);
        let id = GroupRoles::insert(model).exec(db).await?.last_insert_id;
        map.insert(role.id, id);
        inserted.roles.insert(id);
    }

    // 新任务的后继可能仍是临时 ID，先写空值，替换 ID 后再补写
    let mut pending_links = Vec::new();
    for task in after.tasks().filter(|t| t.id < 0) {
        let mut row = task.clone();
        row.specified_role = row.specified_role.map(|r| remap(&map, r));
        if row.next_task_id.is_some_and(|n| n < 0) {
            row.next_task_id = None;
            pending_links.push(task.id);
        }
        let id = Tasks::insert(task_model(&row, NotSet))
            .exec(db)
            .await?
            .last_insert_id;
        map.insert(task.id, id);
        inserted.tasks.insert(id);
    }

    for group in after.groups().filter(|g| g.id < 0) {
        let mut row = group.clone();
        row.current_task_id = row.current_task_id.map(|t| remap(&map, t));
        let id = ClassGroups::insert(group_model(&row, NotSet))
            .exec(db)
            .await?
            .last_insert_id;
        map.insert(group.id, id);
        inserted.groups.insert(id);
    }

    for member in after.members().filter(|m| m.id < 0) {
        let mut row = member.clone();
        if let Some(group_id) = row.membership.group_id() {
            row.membership = row.membership.with_group(remap(&map, group_id));
        }
        let id = ClassMembers::insert(member_model(&row, NotSet))
            .exec(db)
            .await?
            .last_insert_id;
        map.insert(member.id, id);
        inserted.members.insert(id);
    }

    for delivery in after.deliveries().filter(|d| d.id < 0) {
        let mut row = delivery.clone();
        row.task_id = remap(&map, row.task_id);
        row.group_id = remap(&map, row.group_id);
        let id = Deliveries::insert(delivery_model(&row, NotSet))
            .exec(db)
            .await?
            .last_insert_id;
        map.insert(delivery.id, id);
        inserted.deliveries.insert(id);
    }

    for item in after.work_items().filter(|w| w.id < 0) {
        let mut row = item.clone();
        row.group_id = remap(&map, row.group_id);
        let id = GroupWorkItems::insert(work_item_model(&row, NotSet))
            .exec(db)
            .await?
            .last_insert_id;
        map.insert(item.id, id);
        inserted.work_items.insert(id);
    }

    for delivery in after.deliveries() {
        let delivery_id = remap(&map, delivery.id);
        for item in delivery.items.iter().filter(|i| i.id < 0) {
            let id = DeliveryItems::insert(item_model(item, delivery_id))
                .exec(db)
                .await?
                .last_insert_id;
            map.insert(item.id, id);
        }
    }

    after.rekey(&map);

    // ---- 更新 ----

    for old_id in pending_links {
        let task = after.task(remap(&map, old_id))?;
        Tasks::update(task_model(task, Unchanged(task.id)))
            .exec(db)
            .await?;
    }

    let version_before = before.class().version;
    if after.class() != before.class() {
        update_class(db, after.class(), version_before).await?;
    }

    for task in after.tasks().filter(|t| !inserted.tasks.contains(&t.id)) {
        if before.task(task.id).ok() != Some(task) {
            Tasks::update(task_model(task, Unchanged(task.id)))
                .exec(db)
                .await?;
        }
    }

    for role in after.roles().filter(|r| !inserted.roles.contains(&r.id)) {
        if before.role(role.id).ok() != Some(role) {
            GroupRoles::update(role_model(role, Unchanged(role.id)))
                .exec(db)
                .await?;
        }
    }

    for group in after.groups().filter(|g| !inserted.groups.contains(&g.id)) {
        if before.group(group.id).ok() != Some(group) {
            ClassGroups::update(group_model(group, Unchanged(group.id)))
                .exec(db)
                .await?;
        }
    }

    for member in after.members() {
        let old = before.member(member.id).ok();
        let row_changed = old.is_none_or(|o| {
            o.membership != member.membership || o.is_teacher != member.is_teacher
        });
        if row_changed && !inserted.members.contains(&member.id) {
            ClassMembers::update(member_model(member, Unchanged(member.id)))
                .exec(db)
                .await?;
        }

        // 角色关联按集合差异写入
        let old_roles = old.map(|o| o.role_ids.clone()).unwrap_or_default();
        let removed: Vec<i64> = old_roles.difference(&member.role_ids).copied().collect();
        let added: BTreeSet<i64> = member.role_ids.difference(&old_roles).copied().collect();
        if !removed.is_empty() {
            GroupMemberRoles::delete_many()
                .filter(group_member_roles::Column::ClassMemberId.eq(member.id))
                .filter(group_member_roles::Column::RoleId.is_in(removed))
                .exec(db)
                .await?;
        }
        if !added.is_empty() {
            let links = added.into_iter().map(|role_id| GroupMemberRoleActiveModel {
                class_member_id: Set(member.id),
                role_id: Set(role_id),
            });
            GroupMemberRoles::insert_many(links)
                .exec_without_returning(db)
                .await?;
        }
    }

    for delivery in after.deliveries() {
        let old = before.delivery(delivery.id).ok();
        if !inserted.deliveries.contains(&delivery.id) {
            let row_changed = old.is_none_or(|o| {
                let mut o = o.clone();
                o.items = delivery.items.clone();
                &o != delivery
            });
            if row_changed {
                Deliveries::update(delivery_model(delivery, Unchanged(delivery.id)))
                    .exec(db)
                    .await?;
            }
        }

        // 交付项只会新增或删除
        if let Some(old) = old {
            let kept: HashSet<i64> = delivery.items.iter().map(|i| i.id).collect();
            let removed: Vec<i64> = old
                .items
                .iter()
                .map(|i| i.id)
                .filter(|id| !kept.contains(id))
                .collect();
            if !removed.is_empty() {
                DeliveryItems::delete_many()
                    .filter(delivery_items::Column::Id.is_in(removed))
                    .exec(db)
                    .await?;
            }
        }
    }

    let old_items: HashMap<i64, &WorkItem> = before.work_items().map(|w| (w.id, w)).collect();
    for item in after.work_items() {
        let old = old_items.get(&item.id).copied();
        if !inserted.work_items.contains(&item.id) {
            let row_changed = old.is_none_or(|o| {
                let mut o = o.clone();
                o.assignees = item.assignees.clone();
                o.related_files = item.related_files.clone();
                &o != item
            });
            if row_changed {
                GroupWorkItems::update(work_item_model(item, Unchanged(item.id)))
                    .exec(db)
                    .await?;
            }
        }
        sync_work_item_links(db, item, old).await?;
    }

    for score in after.all_peer_scores() {
        match before.peer_scores(score.task_id, score.group_id) {
            Some(old) if old == score => {}
            Some(_) => {
                TaskGroupMemberScores::update(peer_score_model(score)?)
                    .exec(db)
                    .await?;
            }
            None => {
                TaskGroupMemberScores::insert(peer_score_model(score)?)
                    .exec_without_returning(db)
                    .await?;
            }
        }
    }

    for score in after.teacher_scores() {
        match before.teacher_score(score.task_id, score.user_id) {
            Some(old) if old == score => {}
            Some(_) => {
                TeacherScores::update(teacher_score_model(score)?)
                    .exec(db)
                    .await?;
            }
            None => {
                TeacherScores::insert(teacher_score_model(score)?)
                    .exec_without_returning(db)
                    .await?;
            }
        }
    }

    // ---- 删除 ----

    let gone_items: Vec<i64> = old_items
        .keys()
        .copied()
        .filter(|id| !after.work_items().any(|w| w.id == *id))
        .collect();
    if !gone_items.is_empty() {
        GroupWorkItems::delete_many()
            .filter(group_work_items::Column::Id.is_in(gone_items))
            .exec(db)
            .await?;
    }

    let gone_groups: Vec<i64> = before
        .groups()
        .map(|g| g.id)
        .filter(|id| after.group(*id).is_err())
        .collect();
    if !gone_groups.is_empty() {
        ClassGroups::delete_many()
            .filter(class_groups::Column::Id.is_in(gone_groups))
            .exec(db)
            .await?;
    }

    let gone_tasks: Vec<i64> = before
        .tasks()
        .map(|t| t.id)
        .filter(|id| !after.contains_task(*id))
        .collect();
    if !gone_tasks.is_empty() {
        Tasks::delete_many()
            .filter(tasks::Column::Id.is_in(gone_tasks))
            .exec(db)
            .await?;
    }

    let gone_roles: Vec<i64> = before
        .roles()
        .map(|r| r.id)
        .filter(|id| after.role(*id).is_err())
        .collect();
    if !gone_roles.is_empty() {
        GroupRoles::delete_many()
            .filter(group_roles::Column::Id.is_in(gone_roles))
            .exec(db)
            .await?;
    }

    debug!(
        "Persisted class {} at version {} ({} new rows)",
        after.class_id(),
        after.class().version,
        map.len()
    );

    Ok(map)
}
