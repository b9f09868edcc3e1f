use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::WorkItemService;
use crate::models::work_items::requests::{CreateWorkItemRequest, UpdateWorkItemRequest};
use crate::services::respond::run_command;
use crate::workflow::Command;

pub async fn create_work_item(
    service: &WorkItemService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    body: CreateWorkItemRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::CreateWorkItem {
            group_id,
            request: body,
        },
        "Work item created successfully",
    )
    .await
}

// 负责人只能改状态和附件，其余字段需发布者或组长
pub async fn update_work_item(
    service: &WorkItemService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    work_item_id: i64,
    body: UpdateWorkItemRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::UpdateWorkItem {
            group_id,
            work_item_id,
            update: body,
        },
        "Work item updated successfully",
    )
    .await
}

pub async fn delete_work_item(
    service: &WorkItemService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    work_item_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::DeleteWorkItem {
            group_id,
            work_item_id,
        },
        "Work item deleted successfully",
    )
    .await
}
