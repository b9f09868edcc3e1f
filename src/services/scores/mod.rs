pub mod peer;
pub mod teacher;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::scores::requests::{PeerScoreRequest, TeacherScoreRequest};
use crate::services::deliveries::DeliveryTarget;
use crate::storage::Storage;

pub struct ScoreService {
    storage: Option<Arc<dyn Storage>>,
}

impl ScoreService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::respond::storage_from(request),
        }
    }

    // 组内互评
    pub async fn get_peer_scores(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        peer::get_peer_scores(self, request, target).await
    }

    pub async fn submit_peer_scores(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        body: PeerScoreRequest,
    ) -> ActixResult<HttpResponse> {
        peer::submit_peer_scores(self, request, target, body).await
    }

    // 教师评分
    pub async fn list_teacher_scores(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
    ) -> ActixResult<HttpResponse> {
        teacher::list_teacher_scores(self, request, target).await
    }

    pub async fn score_member(
        &self,
        request: &HttpRequest,
        target: DeliveryTarget,
        body: TeacherScoreRequest,
    ) -> ActixResult<HttpResponse> {
        teacher::score_member(self, request, target, body).await
    }
}
