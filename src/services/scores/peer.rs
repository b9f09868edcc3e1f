use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ScoreService;
use crate::models::scores::requests::PeerScoreRequest;
use crate::services::deliveries::DeliveryTarget;
use crate::services::respond::{run_command, run_view};
use crate::workflow::{Command, views};

pub async fn get_peer_scores(
    service: &ScoreService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        target.class_id,
        "Peer scores retrieved successfully",
        |state, actor| views::peer_score_view(state, actor, target.task_id, target.group_id),
    )
    .await
}

// 组长给组员打分，组员给组长打分，由提交人身份决定写入哪张表
pub async fn submit_peer_scores(
    service: &ScoreService,
    request: &HttpRequest,
    target: DeliveryTarget,
    body: PeerScoreRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::SubmitPeerScores {
            task_id: target.task_id,
            group_id: target.group_id,
            scores: body.scores,
        },
        "Peer scores submitted successfully",
    )
    .await
}
