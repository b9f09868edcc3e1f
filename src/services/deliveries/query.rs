use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DeliveryService, DeliveryTarget};
use crate::services::respond::run_view;
use crate::workflow::views;

pub async fn list_deliveries(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        target.class_id,
        "Deliveries retrieved successfully",
        |state, actor| views::list_deliveries(state, actor, target.task_id, target.group_id),
    )
    .await
}

pub async fn get_latest(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        target.class_id,
        "Latest delivery retrieved successfully",
        |state, actor| views::latest_delivery(state, actor, target.task_id, target.group_id),
    )
    .await
}

pub async fn get_draft(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        target.class_id,
        "Draft retrieved successfully",
        |state, actor| views::draft(state, actor, target.task_id, target.group_id),
    )
    .await
}

pub async fn check_submission(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        target.class_id,
        "Submission check completed",
        |state, actor| views::submission_check(state, actor, target.task_id, target.group_id),
    )
    .await
}
