use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::WorkItemService;
use crate::models::work_items::requests::WorkItemQuery;
use crate::services::respond::run_view;
use crate::workflow::views;

pub async fn list_work_items(
    service: &WorkItemService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    query: WorkItemQuery,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        class_id,
        "Work items retrieved successfully",
        |state, actor| views::list_work_items(state, actor, group_id, &query),
    )
    .await
}

pub async fn get_work_item(
    service: &WorkItemService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    work_item_id: i64,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        class_id,
        "Work item retrieved successfully",
        |state, actor| views::work_item(state, actor, group_id, work_item_id),
    )
    .await
}
