pub mod chain;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::tasks::requests::{CreateTaskRequest, ReorderTasksRequest, UpdateTaskRequest};
use crate::storage::Storage;

pub struct TaskService {
    storage: Option<Arc<dyn Storage>>,
}

impl TaskService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::respond::storage_from(request),
        }
    }

    // 新任务追加到任务链末尾
    pub async fn create_task(
        &self,
        request: &HttpRequest,
        class_id: i64,
        task: CreateTaskRequest,
    ) -> ActixResult<HttpResponse> {
        chain::create_task(self, request, class_id, task).await
    }

    pub async fn update_task(
        &self,
        request: &HttpRequest,
        class_id: i64,
        task_id: i64,
        update: UpdateTaskRequest,
    ) -> ActixResult<HttpResponse> {
        chain::update_task(self, request, class_id, task_id, update).await
    }

    pub async fn delete_task(
        &self,
        request: &HttpRequest,
        class_id: i64,
        task_id: i64,
    ) -> ActixResult<HttpResponse> {
        chain::delete_task(self, request, class_id, task_id).await
    }

    pub async fn reorder_tasks(
        &self,
        request: &HttpRequest,
        class_id: i64,
        order: ReorderTasksRequest,
    ) -> ActixResult<HttpResponse> {
        chain::reorder_tasks(self, request, class_id, order).await
    }
}
