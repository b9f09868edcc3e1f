//! 班级聚合状态
//!
//! 一个班级的全部工作流数据（任务、角色、分组、成员、交付、评分、组内工作项）以 ID 为键
//! 存放在内存中，并维护 `user_id -> 成员` 与 `group_id -> 成员` 两个索引。
//! 新建但尚未落库的实体使用负数临时 ID，落库后通过 [`ClassState::rekey`] 替换为真实 ID。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::Class;
use crate::models::deliveries::entities::Delivery;
use crate::models::groups::entities::{ClassMember, Group, GroupRole, Membership};
use crate::models::scores::entities::{TaskGroupMemberScore, TeacherScore};
use crate::models::tasks::entities::Task;
use crate::models::work_items::entities::WorkItem;

/// 临时 ID 到真实 ID 的映射
pub type IdMap = HashMap<i64, i64>;

/// 按映射替换 ID，未出现在映射中的保持不变
pub fn remap(map: &IdMap, id: i64) -> i64 {
    map.get(&id).copied().unwrap_or(id)
}

/// 创建顺序排序键：临时 ID 晚于所有已落库的 ID，且越小越新
pub fn creation_order(id: i64) -> i64 {
    if id < 0 { (i64::MAX / 2) - id } else { id }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassState {
    class: Class,
    tasks: BTreeMap<i64, Task>,
    roles: BTreeMap<i64, GroupRole>,
    groups: BTreeMap<i64, Group>,
    members: BTreeMap<i64, ClassMember>,
    deliveries: BTreeMap<i64, Delivery>,
    peer_scores: BTreeMap<(i64, i64), TaskGroupMemberScore>,
    teacher_scores: BTreeMap<(i64, i64), TeacherScore>,
    work_items: BTreeMap<i64, WorkItem>,
    by_user: HashMap<i64, i64>,
    rosters: HashMap<i64, BTreeSet<i64>>,
    last_provisional: i64,
}

impl ClassState {
    pub fn new(class: Class) -> Self {
        Self {
            class,
            tasks: BTreeMap::new(),
            roles: BTreeMap::new(),
            groups: BTreeMap::new(),
            members: BTreeMap::new(),
            deliveries: BTreeMap::new(),
            peer_scores: BTreeMap::new(),
            teacher_scores: BTreeMap::new(),
            work_items: BTreeMap::new(),
            by_user: HashMap::new(),
            rosters: HashMap::new(),
            last_provisional: 0,
        }
    }

    /// 由存储层加载的数据组装
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        class: Class,
        tasks: Vec<Task>,
        roles: Vec<GroupRole>,
        groups: Vec<Group>,
        members: Vec<ClassMember>,
        deliveries: Vec<Delivery>,
        peer_scores: Vec<TaskGroupMemberScore>,
        teacher_scores: Vec<TeacherScore>,
    ) -> Self {
        let mut state = Self::new(class);
        state.tasks = tasks.into_iter().map(|t| (t.id, t)).collect();
        state.roles = roles.into_iter().map(|r| (r.id, r)).collect();
        state.groups = groups.into_iter().map(|g| (g.id, g)).collect();
        state.members = members.into_iter().map(|m| (m.id, m)).collect();
        state.deliveries = deliveries.into_iter().map(|d| (d.id, d)).collect();
        state.peer_scores = peer_scores
            .into_iter()
            .map(|s| ((s.task_id, s.group_id), s))
            .collect();
        state.teacher_scores = teacher_scores
            .into_iter()
            .map(|s| ((s.task_id, s.user_id), s))
            .collect();
        state.reindex();
        state
    }

    pub fn with_work_items(mut self, work_items: Vec<WorkItem>) -> Self {
        self.work_items = work_items.into_iter().map(|w| (w.id, w)).collect();
        self
    }

    fn reindex(&mut self) {
        self.by_user = self.members.values().map(|m| (m.user_id, m.id)).collect();
        self.rosters.clear();
        for member in self.members.values() {
            if let Some(group_id) = member.membership.group_id() {
                self.rosters.entry(group_id).or_default().insert(member.id);
            }
        }
    }

    /// 分配一个新的临时 ID
    pub fn allocate_id(&mut self) -> i64 {
        self.last_provisional -= 1;
        self.last_provisional
    }

    // ---- 班级 ----

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn class_mut(&mut self) -> &mut Class {
        &mut self.class
    }

    pub fn class_id(&self) -> i64 {
        self.class.id
    }

    // ---- 任务 ----

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task(&self, task_id: i64) -> Result<&Task> {
        self.tasks
            .get(&task_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Task {task_id} not found")))
    }

    pub fn task_mut(&mut self, task_id: i64) -> Result<&mut Task> {
        self.tasks
            .get_mut(&task_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Task {task_id} not found")))
    }

    pub fn contains_task(&self, task_id: i64) -> bool {
        self.tasks.contains_key(&task_id)
    }

    pub fn insert_task(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    pub fn remove_task(&mut self, task_id: i64) -> Option<Task> {
        self.tasks.remove(&task_id)
    }

    /// 链表中指向 task_id 的前驱任务
    pub fn predecessor(&self, task_id: i64) -> Option<&Task> {
        self.tasks
            .values()
            .find(|t| t.next_task_id == Some(task_id))
    }

    // ---- 角色 ----

    pub fn roles(&self) -> impl Iterator<Item = &GroupRole> {
        self.roles.values()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn role(&self, role_id: i64) -> Result<&GroupRole> {
        self.roles
            .get(&role_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Role {role_id} not found")))
    }

    pub fn insert_role(&mut self, role: GroupRole) {
        self.roles.insert(role.id, role);
    }

    pub fn remove_role(&mut self, role_id: i64) -> Option<GroupRole> {
        self.roles.remove(&role_id)
    }

    pub fn manager_roles(&self) -> impl Iterator<Item = &GroupRole> {
        self.roles.values().filter(|r| r.is_manager)
    }

    pub fn manager_role_id(&self) -> Option<i64> {
        self.manager_roles().next().map(|r| r.id)
    }

    // ---- 分组 ----

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group(&self, group_id: i64) -> Result<&Group> {
        self.groups
            .get(&group_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Group {group_id} not found")))
    }

    pub fn group_mut(&mut self, group_id: i64) -> Result<&mut Group> {
        self.groups
            .get_mut(&group_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Group {group_id} not found")))
    }

    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    pub fn remove_group(&mut self, group_id: i64) -> Option<Group> {
        self.rosters.remove(&group_id);
        self.work_items.retain(|_, w| w.group_id != group_id);
        self.groups.remove(&group_id)
    }

    /// 分组的全部成员（含待审核）
    pub fn roster(&self, group_id: i64) -> impl Iterator<Item = &ClassMember> {
        self.rosters
            .get(&group_id)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.members.get(id))
    }

    pub fn roster_size(&self, group_id: i64) -> usize {
        self.rosters.get(&group_id).map_or(0, BTreeSet::len)
    }

    /// 分组内已通过审核的成员
    pub fn approved_members(&self, group_id: i64) -> impl Iterator<Item = &ClassMember> {
        self.roster(group_id)
            .filter(move |m| m.membership.approved_group() == Some(group_id))
    }

    /// 分组内持有组长角色的已通过成员
    pub fn group_managers(&self, group_id: i64) -> Vec<&ClassMember> {
        match self.manager_role_id() {
            Some(manager_role) => self
                .approved_members(group_id)
                .filter(|m| m.role_ids.contains(&manager_role))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn group_manager(&self, group_id: i64) -> Option<&ClassMember> {
        self.group_managers(group_id).into_iter().next()
    }

    /// 分组内不持有组长角色的已通过成员的用户ID
    pub fn non_manager_user_ids(&self, group_id: i64) -> BTreeSet<i64> {
        let manager_role = self.manager_role_id();
        self.approved_members(group_id)
            .filter(|m| manager_role.is_none_or(|r| !m.role_ids.contains(&r)))
            .map(|m| m.user_id)
            .collect()
    }

    // ---- 成员 ----

    pub fn members(&self) -> impl Iterator<Item = &ClassMember> {
        self.members.values()
    }

    pub fn member(&self, member_id: i64) -> Result<&ClassMember> {
        self.members
            .get(&member_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Class member {member_id} not found")))
    }

    pub fn member_by_user(&self, user_id: i64) -> Option<&ClassMember> {
        self.by_user
            .get(&user_id)
            .and_then(|id| self.members.get(id))
    }

    pub fn insert_member(&mut self, member: ClassMember) {
        self.by_user.insert(member.user_id, member.id);
        if let Some(group_id) = member.membership.group_id() {
            self.rosters.entry(group_id).or_default().insert(member.id);
        }
        self.members.insert(member.id, member);
    }

    /// 修改成员的分组关系，同步维护分组索引；离开分组时清空角色
    pub fn set_membership(&mut self, member_id: i64, membership: Membership) -> Result<()> {
        let member = self.members.get_mut(&member_id).ok_or_else(|| {
            WorkflowError::not_found(format!("Class member {member_id} not found"))
        })?;
        if let Some(old_group) = member.membership.group_id() {
            if let Some(roster) = self.rosters.get_mut(&old_group) {
                roster.remove(&member_id);
            }
        }
        if membership.group_id().is_none() {
            member.role_ids.clear();
        }
        member.membership = membership;
        if let Some(new_group) = membership.group_id() {
            self.rosters.entry(new_group).or_default().insert(member_id);
        }
        Ok(())
    }

    pub fn set_roles(&mut self, member_id: i64, role_ids: BTreeSet<i64>) -> Result<()> {
        let member = self.members.get_mut(&member_id).ok_or_else(|| {
            WorkflowError::not_found(format!("Class member {member_id} not found"))
        })?;
        member.role_ids = role_ids;
        Ok(())
    }

    /// 从所有成员上移除某个角色
    pub fn strip_role(&mut self, role_id: i64) {
        for member in self.members.values_mut() {
            member.role_ids.remove(&role_id);
        }
    }

    // ---- 交付 ----

    pub fn deliveries(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.values()
    }

    pub fn delivery(&self, delivery_id: i64) -> Result<&Delivery> {
        self.deliveries
            .get(&delivery_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Delivery {delivery_id} not found")))
    }

    pub fn delivery_mut(&mut self, delivery_id: i64) -> Result<&mut Delivery> {
        self.deliveries
            .get_mut(&delivery_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Delivery {delivery_id} not found")))
    }

    pub fn insert_delivery(&mut self, delivery: Delivery) {
        self.deliveries.insert(delivery.id, delivery);
    }

    /// 某任务+分组的全部交付，按创建顺序从新到旧
    pub fn deliveries_for(&self, task_id: i64, group_id: i64) -> Vec<&Delivery> {
        let mut list: Vec<&Delivery> = self
            .deliveries
            .values()
            .filter(|d| d.task_id == task_id && d.group_id == group_id)
            .collect();
        list.sort_by_key(|d| std::cmp::Reverse(creation_order(d.id)));
        list
    }

    // ---- 评分 ----

    pub fn peer_scores(&self, task_id: i64, group_id: i64) -> Option<&TaskGroupMemberScore> {
        self.peer_scores.get(&(task_id, group_id))
    }

    /// 获取互评记录，不存在时惰性创建
    pub fn peer_scores_mut(&mut self, task_id: i64, group_id: i64) -> &mut TaskGroupMemberScore {
        self.peer_scores
            .entry((task_id, group_id))
            .or_insert_with(|| TaskGroupMemberScore {
                task_id,
                group_id,
                ..Default::default()
            })
    }

    pub fn all_peer_scores(&self) -> impl Iterator<Item = &TaskGroupMemberScore> {
        self.peer_scores.values()
    }

    pub fn teacher_score(&self, task_id: i64, user_id: i64) -> Option<&TeacherScore> {
        self.teacher_scores.get(&(task_id, user_id))
    }

    pub fn teacher_scores(&self) -> impl Iterator<Item = &TeacherScore> {
        self.teacher_scores.values()
    }

    pub fn upsert_teacher_score(&mut self, score: TeacherScore) {
        self.teacher_scores
            .insert((score.task_id, score.user_id), score);
    }

    // ---- 组内工作项 ----

    pub fn work_items(&self) -> impl Iterator<Item = &WorkItem> {
        self.work_items.values()
    }

    /// 工作项必须属于给定分组，否则视为不存在
    pub fn work_item(&self, group_id: i64, work_item_id: i64) -> Result<&WorkItem> {
        self.work_items
            .get(&work_item_id)
            .filter(|w| w.group_id == group_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Work item {work_item_id} not found")))
    }

    pub fn work_item_mut(&mut self, group_id: i64, work_item_id: i64) -> Result<&mut WorkItem> {
        self.work_items
            .get_mut(&work_item_id)
            .filter(|w| w.group_id == group_id)
            .ok_or_else(|| WorkflowError::not_found(format!("Work item {work_item_id} not found")))
    }

    pub fn insert_work_item(&mut self, work_item: WorkItem) {
        self.work_items.insert(work_item.id, work_item);
    }

    pub fn remove_work_item(&mut self, work_item_id: i64) -> Option<WorkItem> {
        self.work_items.remove(&work_item_id)
    }

    // ---- 临时 ID 替换 ----

    /// 用落库后的真实 ID 替换全部临时 ID（含所有引用字段）
    pub fn rekey(&mut self, map: &IdMap) {
        if map.is_empty() {
            return;
        }
        let r = |id: i64| remap(map, id);
        let ro = |id: Option<i64>| id.map(|v| remap(map, v));

        self.class.id = r(self.class.id);
        self.class.first_task_id = ro(self.class.first_task_id);

        self.tasks = std::mem::take(&mut self.tasks)
            .into_values()
            .map(|mut t| {
                t.id = r(t.id);
                t.class_id = r(t.class_id);
                t.specified_role = ro(t.specified_role);
                t.next_task_id = ro(t.next_task_id);
                (t.id, t)
            })
            .collect();

        self.roles = std::mem::take(&mut self.roles)
            .into_values()
            .map(|mut role| {
                role.id = r(role.id);
                role.class_id = r(role.class_id);
                (role.id, role)
            })
            .collect();

        self.groups = std::mem::take(&mut self.groups)
            .into_values()
            .map(|mut g| {
                g.id = r(g.id);
                g.class_id = r(g.class_id);
                g.current_task_id = ro(g.current_task_id);
                (g.id, g)
            })
            .collect();

        self.members = std::mem::take(&mut self.members)
            .into_values()
            .map(|mut m| {
                m.id = r(m.id);
                m.class_id = r(m.class_id);
                if let Some(group_id) = m.membership.group_id() {
                    m.membership = m.membership.with_group(r(group_id));
                }
                m.role_ids = m.role_ids.iter().map(|&id| r(id)).collect();
                (m.id, m)
            })
            .collect();

        self.deliveries = std::mem::take(&mut self.deliveries)
            .into_values()
            .map(|mut d| {
                d.id = r(d.id);
                d.task_id = r(d.task_id);
                d.group_id = r(d.group_id);
                for item in &mut d.items {
                    item.id = r(item.id);
                    item.delivery_id = d.id;
                }
                (d.id, d)
            })
            .collect();

        self.peer_scores = std::mem::take(&mut self.peer_scores)
            .into_values()
            .map(|mut s| {
                s.task_id = r(s.task_id);
                s.group_id = r(s.group_id);
                ((s.task_id, s.group_id), s)
            })
            .collect();

        self.teacher_scores = std::mem::take(&mut self.teacher_scores)
            .into_values()
            .map(|mut s| {
                s.task_id = r(s.task_id);
                ((s.task_id, s.user_id), s)
            })
            .collect();

        self.work_items = std::mem::take(&mut self.work_items)
            .into_values()
            .map(|mut w| {
                w.id = r(w.id);
                w.group_id = r(w.group_id);
                w.assignees = w.assignees.iter().map(|&id| r(id)).collect();
                (w.id, w)
            })
            .collect();

        self.reindex();
    }
}
