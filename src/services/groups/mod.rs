pub mod manage;
pub mod membership;
pub mod roles;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::groups::requests::{
    AssignRolesRequest, CreateGroupRequest, CreateRoleRequest, MembershipRequest,
    UpdateGroupRequest,
};
use crate::storage::Storage;

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::respond::storage_from(request),
        }
    }

    // 分组角色
    pub async fn create_role(
        &self,
        request: &HttpRequest,
        class_id: i64,
        role: CreateRoleRequest,
    ) -> ActixResult<HttpResponse> {
        roles::create_role(self, request, class_id, role).await
    }

    pub async fn delete_role(
        &self,
        request: &HttpRequest,
        class_id: i64,
        role_id: i64,
    ) -> ActixResult<HttpResponse> {
        roles::delete_role(self, request, class_id, role_id).await
    }

    // 分组
    pub async fn create_group(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group: CreateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_group(self, request, class_id, group).await
    }

    pub async fn update_group(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        update: UpdateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_group(self, request, class_id, group_id, update).await
    }

    pub async fn delete_group(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::delete_group(self, request, class_id, group_id).await
    }

    pub async fn approve_group(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::approve_group(self, request, class_id, group_id).await
    }

    pub async fn unapprove_group(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::unapprove_group(self, request, class_id, group_id).await
    }

    // 推进到下一个任务
    pub async fn advance_group(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::advance_group(self, request, class_id, group_id).await
    }

    // 成员
    pub async fn request_membership(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        body: MembershipRequest,
    ) -> ActixResult<HttpResponse> {
        membership::request_membership(self, request, class_id, group_id, body).await
    }

    pub async fn approve_membership(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        class_member_id: i64,
    ) -> ActixResult<HttpResponse> {
        membership::approve_membership(self, request, class_id, group_id, class_member_id).await
    }

    pub async fn remove_member(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        class_member_id: i64,
    ) -> ActixResult<HttpResponse> {
        membership::remove_member(self, request, class_id, group_id, class_member_id).await
    }

    pub async fn assign_roles(
        &self,
        request: &HttpRequest,
        class_id: i64,
        group_id: i64,
        class_member_id: i64,
        body: AssignRolesRequest,
    ) -> ActixResult<HttpResponse> {
        membership::assign_roles(self, request, class_id, group_id, class_member_id, body).await
    }
}
