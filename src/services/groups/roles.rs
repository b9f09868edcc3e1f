use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::groups::requests::CreateRoleRequest;
use crate::services::respond::run_command;
use crate::workflow::Command;

// 角色只能在班级未开始时编辑
pub async fn create_role(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    role: CreateRoleRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::CreateRole(role),
        "Role created successfully",
    )
    .await
}

pub async fn delete_role(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    role_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::DeleteRole { role_id },
        "Role deleted successfully",
    )
    .await
}
