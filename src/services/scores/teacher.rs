use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ScoreService;
use crate::models::scores::requests::TeacherScoreRequest;
use crate::services::deliveries::DeliveryTarget;
use crate::services::respond::{run_command, run_view};
use crate::workflow::{Command, views};

pub async fn list_teacher_scores(
    service: &ScoreService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        target.class_id,
        "Teacher scores retrieved successfully",
        |state, actor| views::teacher_score_list(state, actor, target.task_id, target.group_id),
    )
    .await
}

pub async fn score_member(
    service: &ScoreService,
    request: &HttpRequest,
    target: DeliveryTarget,
    body: TeacherScoreRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::ScoreMember {
            task_id: target.task_id,
            group_id: target.group_id,
            request: body,
        },
        "Member scored successfully",
    )
    .await
}
