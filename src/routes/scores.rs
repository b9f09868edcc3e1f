use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::deliveries::target;
use crate::models::scores::requests::{PeerScoreRequest, TeacherScoreRequest};
use crate::services::ScoreService;

static SCORE_SERVICE: Lazy<ScoreService> = Lazy::new(ScoreService::new_lazy);

pub async fn get_peer_scores(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE.get_peer_scores(&req, target(path)).await
}

pub async fn submit_peer_scores(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<PeerScoreRequest>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE
        .submit_peer_scores(&req, target(path), body.into_inner())
        .await
}

pub async fn list_teacher_scores(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE.list_teacher_scores(&req, target(path)).await
}

pub async fn score_member(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<TeacherScoreRequest>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE
        .score_member(&req, target(path), body.into_inner())
        .await
}

// 配置路由
pub fn configure_scores_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{class_id}/groups/{group_id}/tasks/{task_id}/peer_scores")
            .route(web::get().to(get_peer_scores))
            .route(web::post().to(submit_peer_scores)),
    )
    .service(
        web::resource("/{class_id}/groups/{group_id}/tasks/{task_id}/teacher_scores")
            .route(web::get().to(list_teacher_scores))
            .route(web::post().to(score_member)),
    );
}
