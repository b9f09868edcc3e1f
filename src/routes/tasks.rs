use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::tasks::requests::{CreateTaskRequest, ReorderTasksRequest, UpdateTaskRequest};
use crate::services::TaskService;

static TASK_SERVICE: Lazy<TaskService> = Lazy::new(TaskService::new_lazy);

pub async fn create_task(
    req: HttpRequest,
    class_id: web::Path<i64>,
    task: web::Json<CreateTaskRequest>,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE
        .create_task(&req, class_id.into_inner(), task.into_inner())
        .await
}

pub async fn update_task(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    update: web::Json<UpdateTaskRequest>,
) -> ActixResult<HttpResponse> {
    let (class_id, task_id) = path.into_inner();
    TASK_SERVICE
        .update_task(&req, class_id, task_id, update.into_inner())
        .await
}

pub async fn delete_task(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, task_id) = path.into_inner();
    TASK_SERVICE.delete_task(&req, class_id, task_id).await
}

pub async fn reorder_tasks(
    req: HttpRequest,
    class_id: web::Path<i64>,
    order: web::Json<ReorderTasksRequest>,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE
        .reorder_tasks(&req, class_id.into_inner(), order.into_inner())
        .await
}

// 配置路由
pub fn configure_tasks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{class_id}/tasks").route(web::post().to(create_task)))
        // 整体替换任务链顺序
        .service(web::resource("/{class_id}/tasks/order").route(web::put().to(reorder_tasks)))
        .service(
            web::resource("/{class_id}/tasks/{task_id}")
                .route(web::put().to(update_task))
                .route(web::delete().to(delete_task)),
        );
}
