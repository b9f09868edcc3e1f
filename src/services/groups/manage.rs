use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::groups::requests::{CreateGroupRequest, UpdateGroupRequest};
use crate::services::respond::run_command;
use crate::workflow::Command;

pub async fn create_group(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group: CreateGroupRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::CreateGroup(group),
        "Group created successfully",
    )
    .await
}

pub async fn update_group(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    update: UpdateGroupRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::UpdateGroup {
            group_id,
            name: update.name,
        },
        "Group updated successfully",
    )
    .await
}

pub async fn delete_group(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::DeleteGroup { group_id },
        "Group deleted successfully",
    )
    .await
}

pub async fn approve_group(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::ApproveGroup { group_id },
        "Group approved",
    )
    .await
}

pub async fn unapprove_group(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::UnapproveGroup { group_id },
        "Group approval revoked",
    )
    .await
}

pub async fn advance_group(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::AdvanceGroup { group_id },
        "Group moved to the next task",
    )
    .await
}
