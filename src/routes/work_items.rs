use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::work_items::requests::{
    CreateWorkItemRequest, UpdateWorkItemRequest, WorkItemQuery,
};
use crate::services::WorkItemService;

static WORK_ITEM_SERVICE: Lazy<WorkItemService> = Lazy::new(WorkItemService::new_lazy);

pub async fn list_work_items(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<WorkItemQuery>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    WORK_ITEM_SERVICE
        .list_work_items(&req, class_id, group_id, query.into_inner())
        .await
}

pub async fn create_work_item(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<CreateWorkItemRequest>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    WORK_ITEM_SERVICE
        .create_work_item(&req, class_id, group_id, body.into_inner())
        .await
}

pub async fn get_work_item(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, work_item_id) = path.into_inner();
    WORK_ITEM_SERVICE
        .get_work_item(&req, class_id, group_id, work_item_id)
        .await
}

pub async fn update_work_item(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<UpdateWorkItemRequest>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, work_item_id) = path.into_inner();
    WORK_ITEM_SERVICE
        .update_work_item(&req, class_id, group_id, work_item_id, body.into_inner())
        .await
}

pub async fn delete_work_item(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, work_item_id) = path.into_inner();
    WORK_ITEM_SERVICE
        .delete_work_item(&req, class_id, group_id, work_item_id)
        .await
}

// 配置路由
pub fn configure_work_items_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{class_id}/groups/{group_id}/work_items")
            .route(web::get().to(list_work_items))
            .route(web::post().to(create_work_item)),
    )
    .service(
        web::resource("/{class_id}/groups/{group_id}/work_items/{work_item_id}")
            .route(web::get().to(get_work_item))
            .route(web::put().to(update_work_item))
            .route(web::delete().to(delete_work_item)),
    );
}
