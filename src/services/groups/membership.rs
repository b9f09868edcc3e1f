use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::groups::requests::{AssignRolesRequest, MembershipRequest};
use crate::services::respond::run_command;
use crate::workflow::Command;

// class_member_id 为自己时是申请加入，为他人时是邀请
pub async fn request_membership(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    body: MembershipRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::RequestMembership {
            group_id,
            class_member_id: body.class_member_id,
        },
        "Membership request recorded",
    )
    .await
}

pub async fn approve_membership(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    class_member_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::ApproveMembership {
            group_id,
            class_member_id,
        },
        "Membership approved",
    )
    .await
}

pub async fn remove_member(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    class_member_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::RemoveMember {
            group_id,
            class_member_id,
        },
        "Member removed from group",
    )
    .await
}

pub async fn assign_roles(
    service: &GroupService,
    request: &HttpRequest,
    class_id: i64,
    group_id: i64,
    class_member_id: i64,
    body: AssignRolesRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::AssignRoles {
            group_id,
            class_member_id,
            role_ids: body.role_ids,
        },
        "Roles assigned successfully",
    )
    .await
}
