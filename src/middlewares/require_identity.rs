/*!
 * 身份中间件
 *
 * 服务部署在认证网关之后，网关在转发请求时写入两个请求头：用户ID与用户类型。
 * 此中间件读取这两个请求头，构造 [`Actor`] 存入请求扩展；缺失或格式错误时返回 401。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireIdentity;
 *
 * App::new().service(
 *     web::scope("/api/v1/classes")
 *         .wrap(RequireIdentity::from_config())
 *         .route("", web::get().to(list_classes)),
 * );
 * ```
 *
 * 处理程序中通过 `RequireIdentity::extract_actor(&req)` 取得操作者。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, info};

use crate::config::{AppConfig, IdentityConfig};
use crate::models::actors::entities::{Actor, UserType};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireIdentity {
    headers: Rc<IdentityConfig>,
}

impl RequireIdentity {
    pub fn new(headers: IdentityConfig) -> Self {
        Self {
            headers: Rc::new(headers),
        }
    }

    /// 使用全局配置中的请求头名称
    pub fn from_config() -> Self {
        Self::new(AppConfig::get().identity.clone())
    }

    /// 从请求扩展中提取操作者
    /// 此函数应该在应用了 RequireIdentity 中间件的路由处理程序中使用
    pub fn extract_actor(req: &HttpRequest) -> Option<Actor> {
        req.extensions().get::<Actor>().copied()
    }
}

// 辅助函数：从请求头解析操作者
fn extract_actor_from_headers(
    req: &ServiceRequest,
    headers: &IdentityConfig,
) -> Result<Actor, String> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let user_id = header(&headers.user_id_header)
        .ok_or_else(|| format!("Missing {} header", headers.user_id_header))?
        .parse::<i64>()
        .map_err(|_| format!("Invalid {} header", headers.user_id_header))?;

    let user_type = header(&headers.user_type_header)
        .ok_or_else(|| format!("Missing {} header", headers.user_type_header))?
        .parse::<UserType>()?;

    Ok(Actor::new(user_id, user_type))
}

impl<S, B> Transform<S, ServiceRequest> for RequireIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireIdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireIdentityMiddleware {
            service: Rc::new(service),
            headers: self.headers.clone(),
        }))
    }
}

pub struct RequireIdentityMiddleware<S> {
    service: Rc<S>,
    headers: Rc<IdentityConfig>,
}

impl<S, B> Service<ServiceRequest> for RequireIdentityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let headers = self.headers.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, "").map_into_right_body(),
                ));
            }

            match extract_actor_from_headers(&req, &headers) {
                Ok(actor) => {
                    debug!(
                        "Identity accepted: user {} ({})",
                        actor.user_id, actor.user_type
                    );
                    req.extensions_mut().insert(actor);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!("Identity rejected for request to {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    fn identity() -> RequireIdentity {
        RequireIdentity::new(IdentityConfig {
            user_id_header: "X-User-Id".to_string(),
            user_type_header: "X-User-Type".to_string(),
        })
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireIdentity::extract_actor(&req) {
            Some(actor) => {
                HttpResponse::Ok().body(format!("{}:{}", actor.user_id, actor.user_type))
            }
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_valid_headers_produce_actor() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(identity())
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("X-User-Id", "42"))
            .insert_header(("X-User-Type", "teacher"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "42:teacher");
    }

    #[actix_web::test]
    async fn test_missing_or_bad_headers_are_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(identity())
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("X-User-Id", "42"))
            .insert_header(("X-User-Type", "guest"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
