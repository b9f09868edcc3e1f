pub mod create;
pub mod get;
pub mod lifecycle;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::classes::requests::{AddMemberRequest, CreateClassRequest};
use crate::storage::Storage;

pub struct ClassService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::respond::storage_from(request),
        }
    }

    // 获取班级列表
    pub async fn list_classes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_classes(self, request).await
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, request, class_data).await
    }

    // 班级概览
    pub async fn get_overview(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_overview(self, request, class_id).await
    }

    // 成绩汇总
    pub async fn get_grades(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_grades(self, request, class_id).await
    }

    pub async fn start_grouping(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        lifecycle::start_grouping(self, request, class_id).await
    }

    pub async fn start_teaching(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        lifecycle::start_teaching(self, request, class_id).await
    }

    pub async fn finish_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        lifecycle::finish_class(self, request, class_id).await
    }

    // 添加班级成员
    pub async fn add_member(
        &self,
        request: &HttpRequest,
        class_id: i64,
        member: AddMemberRequest,
    ) -> ActixResult<HttpResponse> {
        lifecycle::add_member(self, request, class_id, member).await
    }
}
