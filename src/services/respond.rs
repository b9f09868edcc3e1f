//! 服务层共用的响应辅助函数

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use ts_rs::TS;

use crate::errors::{Result, WorkflowError};
use crate::middlewares::RequireIdentity;
use crate::models::actors::entities::Actor;
use crate::models::ApiResponse;
use crate::storage::Storage;
use crate::workflow::{ClassState, Command, views};

/// 从应用数据中取存储实例
pub(crate) fn storage_from(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| WorkflowError::database_config("Storage not found in app data"))
}

/// 工作流错误转换为 HTTP 响应，基础设施错误记录 error 日志并隐藏细节
pub(crate) fn error_response(err: &WorkflowError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if err.is_infrastructure() {
        error!("{}", err.format_simple());
        "Internal server error".to_string()
    } else {
        debug!("Request rejected: {}", err.format_simple());
        err.message().to_string()
    };
    HttpResponse::build(status).json(ApiResponse::from_error(err, message))
}

pub(crate) fn require_actor(request: &HttpRequest) -> Result<Actor> {
    RequireIdentity::extract_actor(request)
        .ok_or_else(|| WorkflowError::authentication("Missing identity"))
}

/// 执行一条写命令，返回操作主体的最新状态
pub(crate) async fn run_command(
    storage: Result<Arc<dyn Storage>>,
    request: &HttpRequest,
    class_id: i64,
    command: Command,
    message: &str,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let storage = storage?;
        let actor = require_actor(request)?;
        let executed = storage.execute(class_id, &actor, command).await?;
        views::render(&executed.state, &actor, executed.applied.subject)
    }
    .await;

    match outcome {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data, message))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 加载班级后执行只读查询
pub(crate) async fn run_view<T, F>(
    storage: Result<Arc<dyn Storage>>,
    request: &HttpRequest,
    class_id: i64,
    message: &str,
    view: F,
) -> ActixResult<HttpResponse>
where
    T: Serialize + TS,
    F: FnOnce(&ClassState, &Actor) -> Result<T>,
{
    let outcome = async {
        let storage = storage?;
        let actor = require_actor(request)?;
        let state = storage.load_class(class_id, &actor).await?;
        view(&state, &actor)
    }
    .await;

    match outcome {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data, message))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status_follows_error() {
        let res = error_response(&WorkflowError::integrity_violation("Group is full"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = error_response(&WorkflowError::conflict("retry"));
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = error_response(&WorkflowError::database_operation("disk full"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
