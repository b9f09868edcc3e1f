//! 组内互评
//!
//! 每个 (任务, 分组) 有两张评分表：组员给组长打分（`manager_score`，键为评分人），
//! 组长给组员打分（`member_scores`，键为被评人）。两张表都覆盖全部非组长成员时视为完成。

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{Result, WorkflowError};
use crate::models::classes::entities::ClassStatus;
use crate::models::scores::responses::Completion;

use super::access::{self, Action};
use super::events::{EventKind, Subject};
use super::state::ClassState;
use super::{Ctx, task_chain};

/// 互评分数有效范围 (0, 100]，0 视为未评分
pub fn is_valid_peer_score(score: f64) -> bool {
    score > 0.0 && score <= 100.0
}

fn missing(required: &BTreeSet<i64>, scores: Option<&BTreeMap<i64, f64>>) -> Vec<i64> {
    required
        .iter()
        .copied()
        .filter(|user_id| {
            !scores
                .and_then(|map| map.get(user_id))
                .is_some_and(|&score| is_valid_peer_score(score))
        })
        .collect()
}

/// 以当前分组名单为准计算完成度；没有非组长成员时直接完成
pub fn completion(state: &ClassState, task_id: i64, group_id: i64) -> Completion {
    let required = state.non_manager_user_ids(group_id);
    let record = state.peer_scores(task_id, group_id);

    let missing_manager_scores = missing(&required, record.map(|r| &r.manager_score));
    let missing_member_scores = missing(&required, record.map(|r| &r.member_scores));
    Completion {
        complete: missing_manager_scores.is_empty() && missing_member_scores.is_empty(),
        missing_manager_scores,
        missing_member_scores,
    }
}

/// 提交一批互评分数，合并进已有记录（只增不减）
///
/// 组长为非组长成员打分；非组长成员只能提交一条给组长的评分。
pub fn submit_peer_scores(
    state: &mut ClassState,
    ctx: &mut Ctx,
    task_id: i64,
    group_id: i64,
    scores: &BTreeMap<i64, f64>,
) -> Result<Subject> {
    if state.class().status != ClassStatus::Teaching {
        return Err(WorkflowError::invalid_state(
            "Peer scores can only be submitted while the class is teaching",
        ));
    }
    state.task(task_id)?;
    if !task_chain::locked_prefix_for_group(state, group_id)?.contains(&task_id) {
        return Err(WorkflowError::invalid_state(
            "Group has not reached this task yet",
        ));
    }
    access::require(state, &ctx.actor, Action::PeerReview { group_id })?;

    if scores.is_empty() {
        return Err(WorkflowError::validation("No scores submitted"));
    }
    if scores.values().any(|&s| !is_valid_peer_score(s)) {
        return Err(WorkflowError::validation(
            "Peer scores must be greater than 0 and at most 100",
        ));
    }

    let manager_user = state
        .group_manager(group_id)
        .map(|m| m.user_id)
        .ok_or_else(|| WorkflowError::integrity_violation("Group has no manager"))?;
    let rater = ctx.actor.user_id;

    if rater == manager_user {
        let ratees = state.non_manager_user_ids(group_id);
        if let Some(user_id) = scores.keys().find(|id| !ratees.contains(id)) {
            return Err(WorkflowError::validation(format!(
                "User {user_id} is not a member the manager can score"
            )));
        }
        let record = state.peer_scores_mut(task_id, group_id);
        record.member_scores.extend(scores.iter().map(|(&k, &v)| (k, v)));
    } else {
        let score = match scores.get(&manager_user) {
            Some(&score) if scores.len() == 1 => score,
            _ => {
                return Err(WorkflowError::validation(
                    "Members can only score the group manager",
                ));
            }
        };
        let record = state.peer_scores_mut(task_id, group_id);
        record.manager_score.insert(rater, score);
    }

    let subject = Subject::PeerScores { task_id, group_id };
    ctx.emit(
        EventKind::PeerScored,
        subject,
        Some(format!("{} score(s) from user {rater}", scores.len())),
    );
    Ok(subject)
}
