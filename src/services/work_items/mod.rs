pub mod manage;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::work_items::requests::{
    CreateWorkItemRequest, UpdateWorkItemRequest, WorkItemQuery,
};
use crate::storage::Storage;

pub struct WorkItemService {
    storage: Option<Arc<dyn Storage>>,
}

impl WorkItemService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::respond::storage_from(request),
        }
    }

    pub async fn create_work_item(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        body: CreateWorkItemRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_work_item(self, request, class_id, group_id, body).await
    }

    pub async fn update_work_item(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        work_item_id: i64,
        body: UpdateWorkItemRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_work_item(self, request, class_id, group_id, work_item_id, body).await
    }

    pub async fn delete_work_item(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        work_item_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_work_item(self, request, class_id, group_id, work_item_id).await
    }

    pub async fn list_work_items(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        query: WorkItemQuery,
    ) -> ActixResult<HttpResponse> {
        query::list_work_items(self, request, class_id, group_id, query).await
    }

    pub async fn get_work_item(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        work_item_id: i64,
    ) -> ActixResult<HttpResponse> {
        query::get_work_item(self, request, class_id, group_id, work_item_id).await
    }
}
