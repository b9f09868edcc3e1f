use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::ApiResponse;
use crate::services::respond::{error_response, require_actor};

// 管理员看到全部班级，其他用户只看到自己所在的班级
pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let storage = service.get_storage(request)?;
        let actor = require_actor(request)?;
        storage.list_classes(&actor).await
    }
    .await;

    match outcome {
        Ok(classes) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            classes,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
