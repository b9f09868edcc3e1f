use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::deliveries::requests::{
    AddItemRequest, ApproveDeliveryRequest, DraftRequest, RejectDeliveryRequest,
};
use crate::services::DeliveryService;
use crate::services::deliveries::DeliveryTarget;

static DELIVERY_SERVICE: Lazy<DeliveryService> = Lazy::new(DeliveryService::new_lazy);

/// 路径参数：/{class_id}/groups/{group_id}/tasks/{task_id}
pub(crate) fn target(path: web::Path<(i64, i64, i64)>) -> DeliveryTarget {
    let (class_id, group_id, task_id) = path.into_inner();
    DeliveryTarget {
        class_id,
        group_id,
        task_id,
    }
}

// 查询
pub async fn list_deliveries(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE.list_deliveries(&req, target(path)).await
}

pub async fn get_latest(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE.get_latest(&req, target(path)).await
}

pub async fn get_draft(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE.get_draft(&req, target(path)).await
}

pub async fn check_submission(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE.check_submission(&req, target(path)).await
}

// 草稿
pub async fn create_draft(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<DraftRequest>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE
        .create_draft(&req, target(path), body.into_inner())
        .await
}

pub async fn update_draft(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<DraftRequest>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE
        .update_draft(&req, target(path), body.into_inner())
        .await
}

pub async fn add_item(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    item: web::Json<AddItemRequest>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE
        .add_item(&req, target(path), item.into_inner())
        .await
}

pub async fn remove_item(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, task_id, item_id) = path.into_inner();
    let target = DeliveryTarget {
        class_id,
        group_id,
        task_id,
    };
    DELIVERY_SERVICE.remove_item(&req, target, item_id).await
}

pub async fn submit_draft(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE.submit_draft(&req, target(path)).await
}

// 审核
pub async fn approve_delivery(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<ApproveDeliveryRequest>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE
        .approve_delivery(&req, target(path), body.into_inner())
        .await
}

pub async fn reject_delivery(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<RejectDeliveryRequest>,
) -> ActixResult<HttpResponse> {
    DELIVERY_SERVICE
        .reject_delivery(&req, target(path), body.into_inner())
        .await
}

// 配置路由
pub fn configure_deliveries_routes(cfg: &mut web::ServiceConfig) {
    const BASE: &str = "/{class_id}/groups/{group_id}/tasks/{task_id}";

    cfg.service(web::resource(format!("{BASE}/deliveries")).route(web::get().to(list_deliveries)))
        .service(web::resource(format!("{BASE}/delivery")).route(web::get().to(get_latest)))
        .service(
            web::resource(format!("{BASE}/draft"))
                .route(web::get().to(get_draft))
                .route(web::post().to(create_draft))
                .route(web::put().to(update_draft)),
        )
        .service(web::resource(format!("{BASE}/draft/items")).route(web::post().to(add_item)))
        .service(
            web::resource(format!("{BASE}/draft/items/{{item_id}}"))
                .route(web::delete().to(remove_item)),
        )
        .service(web::resource(format!("{BASE}/draft/submit")).route(web::post().to(submit_draft)))
        // 组长确认与教师审核共用同一入口
        .service(
            web::resource(format!("{BASE}/delivery/approve"))
                .route(web::post().to(approve_delivery)),
        )
        .service(
            web::resource(format!("{BASE}/delivery/reject"))
                .route(web::post().to(reject_delivery)),
        )
        .service(web::resource(format!("{BASE}/check")).route(web::get().to(check_submission)));
}
