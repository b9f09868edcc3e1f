use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::services::respond::run_view;
use crate::workflow::views;

pub async fn get_overview(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        class_id,
        "Class information retrieved successfully",
        views::class_overview,
    )
    .await
}

pub async fn get_grades(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    run_view(
        service.get_storage(request),
        request,
        class_id,
        "Grade summary retrieved successfully",
        views::grade_summary,
    )
    .await
}
