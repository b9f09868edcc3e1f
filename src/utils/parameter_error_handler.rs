use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

fn bad_request<E>(err: E, message: String) -> Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(err, response).into()
}

// JSON 请求体解析失败
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("Invalid JSON payload for {}: {}", req.path(), err);
    let message = format!("Invalid JSON payload: {err}");
    bad_request(err, message)
}

// 查询参数解析失败
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    debug!("Invalid query parameters for {}: {}", req.path(), err);
    let message = format!("Invalid query parameters: {err}");
    bad_request(err, message)
}

// 路径参数解析失败，例如非数字的 ID
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> Error {
    debug!("Invalid path parameters for {}: {}", req.path(), err);
    let message = format!("Invalid path parameters: {err}");
    bad_request(err, message)
}
