//! 只读查询
//!
//! 与写操作共用同一套权限判定，查询结果按操作者可见范围裁剪。

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::{Result, WorkflowError};
use crate::models::actors::entities::Actor;
use crate::models::classes::responses::{ClassOverview, GroupWithMembers};
use crate::models::deliveries::entities::{Delivery, DeliveryStatus};
use crate::models::deliveries::responses::SubmissionCheck;
use crate::models::groups::entities::Membership;
use crate::models::scores::responses::{GradeSummary, PeerScoreView, StudentGrade, TeacherScoreList};
use crate::models::tasks::entities::Task;
use crate::models::work_items::entities::WorkItem;
use crate::models::work_items::requests::WorkItemQuery;

use super::access::{self, Action};
use super::events::Subject;
use super::state::{ClassState, creation_order};
use super::{delivery, scoring, task_chain};

/// 任务链完整时按链表顺序，否则按 ID
fn ordered_tasks(state: &ClassState) -> (bool, Vec<Task>) {
    match task_chain::validate(state) {
        Ok(order) => {
            let tasks = order
                .into_iter()
                .filter_map(|id| state.task(id).ok().cloned())
                .collect();
            (true, tasks)
        }
        Err(_) => (false, state.tasks().cloned().collect()),
    }
}

fn group_with_members(state: &ClassState, group_id: i64) -> Result<GroupWithMembers> {
    Ok(GroupWithMembers {
        group: state.group(group_id)?.clone(),
        members: state.roster(group_id).cloned().collect(),
    })
}

pub fn class_overview(state: &ClassState, actor: &Actor) -> Result<ClassOverview> {
    access::require(state, actor, Action::ViewClass)?;
    let (chain_valid, tasks) = ordered_tasks(state);
    let groups = state
        .groups()
        .map(|g| group_with_members(state, g.id))
        .collect::<Result<Vec<_>>>()?;

    Ok(ClassOverview {
        class: state.class().clone(),
        chain_valid,
        tasks,
        roles: state.roles().cloned().collect(),
        groups,
        ungrouped: state
            .members()
            .filter(|m| !m.is_teacher && m.membership == Membership::Unassigned)
            .cloned()
            .collect(),
    })
}

/// 互评记录
///
/// 教师/管理员可见两张表；组长只可见自己给组员的评分；普通组员只可见自己给组长的那一条。
pub fn peer_score_view(
    state: &ClassState,
    actor: &Actor,
    task_id: i64,
    group_id: i64,
) -> Result<PeerScoreView> {
    access::require(state, actor, Action::ActForGroup { group_id })?;
    state.task(task_id)?;

    let record = state.peer_scores(task_id, group_id);
    let manager_map = || record.map(|r| r.manager_score.clone()).unwrap_or_default();
    let member_map = || record.map(|r| r.member_scores.clone()).unwrap_or_default();

    let (manager_score, member_scores) = if access::is_staff(state, actor) {
        (Some(manager_map()), Some(member_map()))
    } else if access::is_group_manager(state, actor, group_id) {
        (None, Some(member_map()))
    } else {
        let own: BTreeMap<i64, f64> = manager_map()
            .into_iter()
            .filter(|(rater, _)| *rater == actor.user_id)
            .collect();
        (Some(own), None)
    };

    Ok(PeerScoreView {
        task_id,
        group_id,
        manager_score,
        member_scores,
        completion: scoring::completion(state, task_id, group_id),
    })
}

/// 某任务+分组的全部交付，从新到旧
pub fn list_deliveries(
    state: &ClassState,
    actor: &Actor,
    task_id: i64,
    group_id: i64,
) -> Result<Vec<Delivery>> {
    access::require(state, actor, Action::ViewGroup { group_id })?;
    state.task(task_id)?;
    Ok(state
        .deliveries_for(task_id, group_id)
        .into_iter()
        .cloned()
        .collect())
}

pub fn latest_delivery(
    state: &ClassState,
    actor: &Actor,
    task_id: i64,
    group_id: i64,
) -> Result<Delivery> {
    access::require(state, actor, Action::ViewGroup { group_id })?;
    delivery::latest_delivery(state, task_id, group_id)
        .cloned()
        .ok_or_else(|| WorkflowError::not_found("No delivery for this task"))
}

pub fn draft(state: &ClassState, actor: &Actor, task_id: i64, group_id: i64) -> Result<Delivery> {
    access::require(state, actor, Action::ViewGroup { group_id })?;
    delivery::current_draft(state, task_id, group_id)
        .cloned()
        .ok_or_else(|| WorkflowError::not_found("No draft exists for this task"))
}

pub fn submission_check(
    state: &ClassState,
    actor: &Actor,
    task_id: i64,
    group_id: i64,
) -> Result<SubmissionCheck> {
    access::require(state, actor, Action::ViewGroup { group_id })?;
    let reason = delivery::check_submission(state, task_id, group_id)
        .err()
        .map(|e| e.message().to_string());
    Ok(SubmissionCheck {
        task_id,
        group_id,
        allowed: reason.is_none(),
        reason,
    })
}

/// 教师评分列表；学生只能看到自己的评分
pub fn teacher_score_list(
    state: &ClassState,
    actor: &Actor,
    task_id: i64,
    group_id: i64,
) -> Result<TeacherScoreList> {
    access::require(state, actor, Action::ViewGroup { group_id })?;
    state.task(task_id)?;
    let staff = access::is_staff(state, actor);

    let mut scores = Vec::new();
    let mut unscored_users = Vec::new();
    for member in state.approved_members(group_id).filter(|m| !m.is_teacher) {
        match state.teacher_score(task_id, member.user_id) {
            Some(score) if staff || member.user_id == actor.user_id => scores.push(score.clone()),
            Some(_) => {}
            None => unscored_users.push(member.user_id),
        }
    }

    Ok(TeacherScoreList {
        task_id,
        group_id,
        complete: unscored_users.is_empty(),
        scores,
        unscored_users,
    })
}

/// 任务成绩占比：优先取最新通过交付的快照，否则取任务当前设置
fn grade_weight(state: &ClassState, task_id: i64, group_id: Option<i64>) -> f64 {
    let snapshot = group_id.and_then(|group_id| {
        state
            .deliveries_for(task_id, group_id)
            .into_iter()
            .find(|d| d.status == DeliveryStatus::TeacherApproved)
            .map(|d| d.task_grade_percentage)
    });
    snapshot
        .or_else(|| state.task(task_id).ok().map(|t| t.grade_percentage))
        .unwrap_or(0.0)
}

/// 成绩汇总：总分 = Σ 教师评分 × 任务占比 / 100
pub fn grade_summary(state: &ClassState, actor: &Actor) -> Result<GradeSummary> {
    access::require(state, actor, Action::ViewClass)?;
    let staff = access::is_staff(state, actor);

    let students = state
        .members()
        .filter(|m| !m.is_teacher)
        .filter(|m| staff || m.user_id == actor.user_id)
        .map(|member| {
            let group_id = member.membership.approved_group();
            let scores: Vec<_> = state
                .teacher_scores()
                .filter(|s| s.user_id == member.user_id)
                .cloned()
                .collect();
            let total = scores
                .iter()
                .map(|s| s.score * grade_weight(state, s.task_id, group_id) / 100.0)
                .sum();
            StudentGrade {
                user_id: member.user_id,
                group_id,
                scores,
                total,
            }
        })
        .collect();

    Ok(GradeSummary {
        class_id: state.class_id(),
        students,
    })
}

/// 分组工作项：按优先级从高到低，同优先级时新的在前
pub fn list_work_items(
    state: &ClassState,
    actor: &Actor,
    group_id: i64,
    query: &WorkItemQuery,
) -> Result<Vec<WorkItem>> {
    state.group(group_id)?;
    access::require(state, actor, Action::ViewGroup { group_id })?;

    let kw = query
        .kw
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);
    let mut list: Vec<WorkItem> = state
        .work_items()
        .filter(|w| w.group_id == group_id)
        .filter(|w| query.status.is_none_or(|s| w.status == s))
        .filter(|w| query.priority.is_none_or(|p| w.priority == p))
        .filter(|w| kw.as_deref().is_none_or(|k| w.name.to_lowercase().contains(k)))
        .cloned()
        .collect();
    list.sort_by_key(|w| (Reverse(w.priority), Reverse(creation_order(w.id))));
    Ok(list)
}

pub fn work_item(
    state: &ClassState,
    actor: &Actor,
    group_id: i64,
    work_item_id: i64,
) -> Result<WorkItem> {
    state.group(group_id)?;
    access::require(state, actor, Action::ViewGroup { group_id })?;
    state.work_item(group_id, work_item_id).cloned()
}

/// 操作完成后返回给调用方的主体当前状态
pub fn render(state: &ClassState, actor: &Actor, subject: Subject) -> Result<Value> {
    let value = match subject {
        Subject::Class { .. } => serde_json::to_value(class_overview(state, actor)?)?,
        Subject::Task { task_id } => serde_json::to_value(state.task(task_id)?)?,
        Subject::Role { role_id } => serde_json::to_value(state.role(role_id)?)?,
        Subject::Group { group_id } => serde_json::to_value(group_with_members(state, group_id)?)?,
        Subject::Member { member_id } => serde_json::to_value(state.member(member_id)?)?,
        Subject::Delivery { delivery_id } => serde_json::to_value(state.delivery(delivery_id)?)?,
        Subject::PeerScores { task_id, group_id } => {
            serde_json::to_value(peer_score_view(state, actor, task_id, group_id)?)?
        }
        Subject::TeacherScore { task_id, user_id } => {
            let score = state.teacher_score(task_id, user_id).ok_or_else(|| {
                WorkflowError::not_found(format!("No score for user {user_id}"))
            })?;
            serde_json::to_value(score)?
        }
        Subject::WorkItem { work_item_id } => {
            let item = state
                .work_items()
                .find(|w| w.id == work_item_id)
                .ok_or_else(|| WorkflowError::not_found("Work item not found"))?;
            serde_json::to_value(item)?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::actors::entities::UserType;
    use crate::models::scores::requests::TeacherScoreRequest;
    use crate::workflow::Command;
    use crate::workflow::fixtures::Fixture;

    #[test]
    fn test_overview_lists_tasks_in_chain_order() {
        let mut fx = Fixture::with_tasks(3);
        let (a, b, c) = (fx.tasks[0], fx.tasks[1], fx.tasks[2]);
        fx.run_as_teacher(Command::ReorderTasks {
            task_ids: vec![c, a, b],
        })
        .unwrap();

        let overview = class_overview(&fx.state, &fx.teacher).unwrap();
        assert!(overview.chain_valid);
        let ids: Vec<i64> = overview.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c, a, b]);
    }

    #[test]
    fn test_overview_hidden_from_outsiders() {
        let fx = Fixture::with_tasks(1);
        let outsider = Actor::new(31337, UserType::Teacher);
        assert!(class_overview(&fx.state, &outsider).is_err());
        let admin = Actor::new(31337, UserType::Admin);
        assert!(class_overview(&fx.state, &admin).is_ok());
    }

    #[test]
    fn test_peer_score_visibility() {
        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 1);
        let (task_id, group_id) = (fx.tasks[0], fx.group_id());
        let (a, b) = (fx.students[1].user_id, fx.students[2].user_id);
        let record = fx.state.peer_scores_mut(task_id, group_id);
        record.manager_score.insert(a, 81.0);
        record.manager_score.insert(b, 82.0);
        record.member_scores.insert(a, 91.0);

        let staff = peer_score_view(&fx.state, &fx.teacher, task_id, group_id).unwrap();
        assert_eq!(staff.manager_score.as_ref().map(BTreeMap::len), Some(2));
        assert!(staff.member_scores.is_some());

        let as_manager =
            peer_score_view(&fx.state, &fx.students[0], task_id, group_id).unwrap();
        assert!(as_manager.manager_score.is_none());
        assert_eq!(as_manager.member_scores.unwrap().get(&a), Some(&91.0));

        let as_member = peer_score_view(&fx.state, &fx.students[1], task_id, group_id).unwrap();
        assert_eq!(
            as_member.manager_score.unwrap(),
            BTreeMap::from([(a, 81.0)])
        );
        assert!(as_member.member_scores.is_none());
        assert!(!as_member.completion.complete);
    }

    #[test]
    fn test_submission_check_reports_reason() {
        let fx = Fixture::teaching(&["manager", "dev"], 2, 2);
        let group_id = fx.group_id();
        let ok = submission_check(&fx.state, &fx.students[0], fx.tasks[0], group_id).unwrap();
        assert!(ok.allowed);
        let ahead = submission_check(&fx.state, &fx.students[0], fx.tasks[1], group_id).unwrap();
        assert!(!ahead.allowed);
        assert!(ahead.reason.unwrap().contains("not reached"));
    }

    #[test]
    fn test_grade_summary_weights_and_visibility() {
        let mut fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let (task_id, group_id) = (fx.tasks[0], fx.group_id());
        fx.state.task_mut(task_id).unwrap().grade_percentage = 50.0;
        fx.run_as_student(
            0,
            Command::CreateDraft {
                task_id,
                group_id,
                comments: None,
            },
        )
        .unwrap();
        fx.run_as_student(0, Command::SubmitDraft { task_id, group_id }).unwrap();
        fx.run_as_teacher(Command::ApproveDelivery {
            task_id,
            group_id,
            score: Some(90.0),
            comments: None,
        })
        .unwrap();
        for (i, score) in [(0, 80.0), (1, 60.0)] {
            fx.run_as_teacher(Command::ScoreMember {
                task_id,
                group_id,
                request: TeacherScoreRequest {
                    user_id: fx.students[i].user_id,
                    score,
                    score_details: None,
                },
            })
            .unwrap();
        }
        // 修改任务占比不影响已通过交付的快照
        fx.state.task_mut(task_id).unwrap().grade_percentage = 10.0;

        let summary = grade_summary(&fx.state, &fx.teacher).unwrap();
        assert_eq!(summary.students.len(), 2);
        let totals: Vec<f64> = summary.students.iter().map(|s| s.total).collect();
        assert!(totals.contains(&40.0) && totals.contains(&30.0));

        let own = grade_summary(&fx.state, &fx.students[1]).unwrap();
        assert_eq!(own.students.len(), 1);
        assert_eq!(own.students[0].total, 30.0);

        let list = teacher_score_list(&fx.state, &fx.students[1], task_id, group_id).unwrap();
        assert_eq!(list.scores.len(), 1);
        assert!(list.complete);
    }

    #[test]
    fn test_render_group_includes_roster() {
        let fx = Fixture::teaching(&["manager", "dev"], 2, 1);
        let value = render(
            &fx.state,
            &fx.teacher,
            Subject::Group {
                group_id: fx.group_id(),
            },
        )
        .unwrap();
        assert_eq!(value["members"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["group"]["status"], "normal");
    }

    #[test]
    fn test_work_items_filtered_and_ordered() {
        use crate::models::work_items::entities::WorkItemStatus;
        use crate::models::work_items::requests::{CreateWorkItemRequest, UpdateWorkItemRequest};

        let mut fx = Fixture::teaching(&["manager", "dev", "qa"], 3, 1);
        let group_id = fx.group_id();
        let mut ids = Vec::new();
        for (name, priority) in [("Write API", 1), ("Review API", 3), ("Deploy", 1)] {
            let applied = fx
                .run_as_student(
                    0,
                    Command::CreateWorkItem {
                        group_id,
                        request: CreateWorkItemRequest {
                            name: name.into(),
                            details: None,
                            assignees: vec![fx.roles[1]],
                            related_files: Vec::new(),
                            deadline: None,
                            priority,
                        },
                    },
                )
                .unwrap();
            let Subject::WorkItem { work_item_id } = applied.subject else {
                panic!("expected work item subject");
            };
            ids.push(work_item_id);
        }
        fx.run_as_student(
            1,
            Command::UpdateWorkItem {
                group_id,
                work_item_id: ids[2],
                update: UpdateWorkItemRequest {
                    status: Some(WorkItemStatus::Finished),
                    ..Default::default()
                },
            },
        )
        .unwrap();

        let all = list_work_items(&fx.state, &fx.students[2], group_id, &Default::default())
            .unwrap();
        let order: Vec<i64> = all.iter().map(|w| w.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);

        let query = WorkItemQuery {
            kw: Some(" api ".into()),
            ..Default::default()
        };
        let found = list_work_items(&fx.state, &fx.teacher, group_id, &query).unwrap();
        assert_eq!(found.len(), 2);

        let query = WorkItemQuery {
            status: Some(WorkItemStatus::Finished),
            ..Default::default()
        };
        let finished = list_work_items(&fx.state, &fx.teacher, group_id, &query).unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].id, ids[2]);

        // 非本组成员不可见
        let outsider = Actor::new(31337, UserType::Student);
        assert!(work_item(&fx.state, &outsider, group_id, ids[0]).is_err());
    }
}
