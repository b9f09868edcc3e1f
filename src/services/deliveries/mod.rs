pub mod draft;
pub mod query;
pub mod review;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::deliveries::requests::{
    AddItemRequest, ApproveDeliveryRequest, DraftRequest, RejectDeliveryRequest,
};
use crate::storage::Storage;

/// 交付定位：班级、分组、任务
#[derive(Debug, Clone, Copy)]
pub struct DeliveryTarget {
    pub class_id: i64,
    pub group_id: i64,
    pub task_id: i64,
}

pub struct DeliveryService {
    storage: Option<Arc<dyn Storage>>,
}

impl DeliveryService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::respond::storage_from(request),
        }
    }

    // 草稿
    pub async fn create_draft(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        body: DraftRequest,
    ) -> ActixResult<HttpResponse> {
        draft::create_draft(self, request, target, body).await
    }

    pub async fn update_draft(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        body: DraftRequest,
    ) -> ActixResult<HttpResponse> {
        draft::update_draft(self, request, target, body).await
    }

    pub async fn add_item(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        item: AddItemRequest,
    ) -> ActixResult<HttpResponse> {
        draft::add_item(self, request, target, item).await
    }

    pub async fn remove_item(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        item_id: i64,
    ) -> ActixResult<HttpResponse> {
        draft::remove_item(self, request, target, item_id).await
    }

    pub async fn submit_draft(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        draft::submit_draft(self, request, target).await
    }

    // 审核
    pub async fn approve_delivery(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        body: ApproveDeliveryRequest,
    ) -> ActixResult<HttpResponse> {
        review::approve_delivery(self, request, target, body).await
    }

    pub async fn reject_delivery(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        body: RejectDeliveryRequest,
    ) -> ActixResult<HttpResponse> {
        review::reject_delivery(self, request, target, body).await
    }

    // 查询
    pub async fn list_deliveries(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        query::list_deliveries(self, request, target).await
    }

    pub async fn get_latest(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        query::get_latest(self, request, target).await
    }

    pub async fn get_draft(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        query::get_draft(self, request, target).await
    }

    pub async fn check_submission(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        query::check_submission(self, request, target).await
    }
}
