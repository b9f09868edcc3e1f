use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TaskService;
use crate::models::tasks::requests::{CreateTaskRequest, ReorderTasksRequest, UpdateTaskRequest};
use crate::services::respond::run_command;
use crate::workflow::Command;

pub async fn create_task(
    service: &TaskService,
    request: &HttpRequest,
    class_id: i64,
    task: CreateTaskRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::CreateTask(task),
        "Task created successfully",
    )
    .await
}

pub async fn update_task(
    service: &TaskService,
    request: &HttpRequest,
    class_id: i64,
    task_id: i64,
    update: UpdateTaskRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::UpdateTask { task_id, update },
        "Task updated successfully",
    )
    .await
}

// 已被任一分组锁定的任务不能删除
pub async fn delete_task(
    service: &TaskService,
    request: &HttpRequest,
    class_id: i64,
    task_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::DeleteTask { task_id },
        "Task deleted successfully",
    )
    .await
}

pub async fn reorder_tasks(
    service: &TaskService,
    request: &HttpRequest,
    class_id: i64,
    order: ReorderTasksRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::ReorderTasks {
            task_ids: order.task_ids,
        },
        "Task order updated successfully",
    )
    .await
}
