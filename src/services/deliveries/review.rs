use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DeliveryService, DeliveryTarget};
use crate::models::deliveries::requests::{ApproveDeliveryRequest, RejectDeliveryRequest};
use crate::services::respond::run_command;
use crate::workflow::Command;

/// 组长确认或教师最终通过，由当前状态决定
pub async fn approve_delivery(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
    body: ApproveDeliveryRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::ApproveDelivery {
            task_id: target.task_id,
            group_id: target.group_id,
            score: body.score,
            comments: body.comments,
        },
        "Delivery approved",
    )
    .await
}

pub async fn reject_delivery(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
    body: RejectDeliveryRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::RejectDelivery {
            task_id: target.task_id,
            group_id: target.group_id,
            comments: body.comments,
        },
        "Delivery rejected",
    )
    .await
}
