use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::classes::requests::AddMemberRequest;
use crate::services::respond::run_command;
use crate::workflow::Command;

pub async fn start_grouping(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::StartGrouping,
        "Grouping started",
    )
    .await
}

// 所有学生已入组且分组均已审核、任务链完整时才能开始教学
pub async fn start_teaching(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::StartTeaching,
        "Teaching started",
    )
    .await
}

pub async fn finish_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::FinishClass,
        "Class finished",
    )
    .await
}

pub async fn add_member(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    member: AddMemberRequest,
) -> ActixResult<HttpResponse> {
    run_command(
        service.get_storage(request),
        request,
        class_id,
        Command::AddMember {
            user_id: member.user_id,
            is_teacher: member.is_teacher,
        },
        "Member added successfully",
    )
    .await
}
