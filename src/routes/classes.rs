use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::classes::requests::{AddMemberRequest, CreateClassRequest};
use crate::services::ClassService;

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);

// HTTP处理程序
pub async fn list_classes(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req).await
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn get_class(req: HttpRequest, class_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_overview(&req, class_id.into_inner()).await
}

pub async fn get_grades(req: HttpRequest, class_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_grades(&req, class_id.into_inner()).await
}

pub async fn start_grouping(
    req: HttpRequest,
    class_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .start_grouping(&req, class_id.into_inner())
        .await
}

pub async fn start_teaching(
    req: HttpRequest,
    class_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .start_teaching(&req, class_id.into_inner())
        .await
}

pub async fn finish_class(req: HttpRequest, class_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.finish_class(&req, class_id.into_inner()).await
}

pub async fn add_member(
    req: HttpRequest,
    class_id: web::Path<i64>,
    member: web::Json<AddMemberRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .add_member(&req, class_id.into_inner(), member.into_inner())
        .await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        // 用户查询自己所在的班级，管理员可以查询所有班级；教职人员创建班级
        web::resource("")
            .route(web::get().to(list_classes))
            .route(web::post().to(create_class)),
    )
    .service(web::resource("/{class_id}").route(web::get().to(get_class)))
    .service(web::resource("/{class_id}/grades").route(web::get().to(get_grades)))
    // 班级生命周期：未开始 -> 分组中 -> 进行中 -> 已结束
    .service(web::resource("/{class_id}/start_grouping").route(web::post().to(start_grouping)))
    .service(web::resource("/{class_id}/start_teaching").route(web::post().to(start_teaching)))
    .service(web::resource("/{class_id}/finish").route(web::post().to(finish_class)))
    .service(web::resource("/{class_id}/members").route(web::post().to(add_member)));
}
