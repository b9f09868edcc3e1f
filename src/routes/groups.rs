use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::groups::requests::{
    AssignRolesRequest, CreateGroupRequest, CreateRoleRequest, MembershipRequest,
    UpdateGroupRequest,
};
use crate::services::GroupService;

static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);

// 分组角色
pub async fn create_role(
    req: HttpRequest,
    class_id: web::Path<i64>,
    role: web::Json<CreateRoleRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .create_role(&req, class_id.into_inner(), role.into_inner())
        .await
}

pub async fn delete_role(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, role_id) = path.into_inner();
    GROUP_SERVICE.delete_role(&req, class_id, role_id).await
}

// 分组
pub async fn create_group(
    req: HttpRequest,
    class_id: web::Path<i64>,
    group: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .create_group(&req, class_id.into_inner(), group.into_inner())
        .await
}

pub async fn update_group(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    update: web::Json<UpdateGroupRequest>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    GROUP_SERVICE
        .update_group(&req, class_id, group_id, update.into_inner())
        .await
}

pub async fn delete_group(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    GROUP_SERVICE.delete_group(&req, class_id, group_id).await
}

pub async fn approve_group(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    GROUP_SERVICE.approve_group(&req, class_id, group_id).await
}

pub async fn unapprove_group(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    GROUP_SERVICE
        .unapprove_group(&req, class_id, group_id)
        .await
}

pub async fn advance_group(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    GROUP_SERVICE.advance_group(&req, class_id, group_id).await
}

// 分组成员
pub async fn request_membership(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<MembershipRequest>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id) = path.into_inner();
    GROUP_SERVICE
        .request_membership(&req, class_id, group_id, body.into_inner())
        .await
}

pub async fn approve_membership(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, member_id) = path.into_inner();
    GROUP_SERVICE
        .approve_membership(&req, class_id, group_id, member_id)
        .await
}

pub async fn remove_member(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, member_id) = path.into_inner();
    GROUP_SERVICE
        .remove_member(&req, class_id, group_id, member_id)
        .await
}

pub async fn assign_roles(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    body: web::Json<AssignRolesRequest>,
) -> ActixResult<HttpResponse> {
    let (class_id, group_id, member_id) = path.into_inner();
    GROUP_SERVICE
        .assign_roles(&req, class_id, group_id, member_id, body.into_inner())
        .await
}

// 配置路由
pub fn configure_groups_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{class_id}/roles").route(web::post().to(create_role)))
        .service(
            web::resource("/{class_id}/roles/{role_id}").route(web::delete().to(delete_role)),
        )
        .service(web::resource("/{class_id}/groups").route(web::post().to(create_group)))
        .service(
            web::resource("/{class_id}/groups/{group_id}")
                .route(web::put().to(update_group))
                .route(web::delete().to(delete_group)),
        )
        // 教师审核分组
        .service(
            web::resource("/{class_id}/groups/{group_id}/approve")
                .route(web::post().to(approve_group)),
        )
        .service(
            web::resource("/{class_id}/groups/{group_id}/unapprove")
                .route(web::post().to(unapprove_group)),
        )
        .service(
            web::resource("/{class_id}/groups/{group_id}/next_task")
                .route(web::post().to(advance_group)),
        )
        .service(
            web::resource("/{class_id}/groups/{group_id}/members")
                .route(web::post().to(request_membership)),
        )
        .service(
            web::resource("/{class_id}/groups/{group_id}/members/{member_id}")
                .route(web::delete().to(remove_member)),
        )
        .service(
            web::resource("/{class_id}/groups/{group_id}/members/{member_id}/approve")
                .route(web::post().to(approve_membership)),
        )
        .service(
            web::resource("/{class_id}/groups/{group_id}/members/{member_id}/roles")
                .route(web::put().to(assign_roles)),
        );
}
