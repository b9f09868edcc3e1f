use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DeliveryService, DeliveryTarget};
use crate::models::deliveries::requests::{AddItemRequest, DraftRequest};
use crate::services::respond::run_command;
use crate::workflow::Command;

pub async fn create_draft(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
    body: DraftRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::CreateDraft {
            task_id: target.task_id,
            group_id: target.group_id,
            comments: body.delivery_comments,
        },
        "Draft created successfully",
    )
    .await
}

pub async fn update_draft(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
    body: DraftRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::UpdateDraft {
            task_id: target.task_id,
            group_id: target.group_id,
            comments: body.delivery_comments,
        },
        "Draft updated successfully",
    )
    .await
}

pub async fn add_item(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
    item: AddItemRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::AddItem {
            task_id: target.task_id,
            group_id: target.group_id,
            item,
        },
        "Item added to draft",
    )
    .await
}

pub async fn remove_item(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
    item_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::RemoveItem {
            task_id: target.task_id,
            group_id: target.group_id,
            item_id,
        },
        "Item removed from draft",
    )
    .await
}

// 提交前会校验交付项类型是否满足任务要求
pub async fn submit_draft(
    service: &DeliveryService,
    request: &HttpRequest,
    target: DeliveryTarget,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        target.class_id,
        Command::SubmitDraft {
            task_id: target.task_id,
            group_id: target.group_id,
        },
        "Draft submitted successfully",
    )
    .await
}
