use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::ApiResponse;
use crate::models::classes::requests::CreateClassRequest;
use crate::services::respond::{error_response, require_actor};

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let storage = service.get_storage(request)?;
        let actor = require_actor(request)?;
        storage.create_class(&actor, class_data).await
    }
    .await;

    match outcome {
        Ok(class) => {
            info!("Class {} ({}) created", class.id, class.name);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
