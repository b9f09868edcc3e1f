use serde::Deserialize;
use ts_rs::TS;

// 创建分组角色请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateRoleRequest {
    pub role_name: String,
    pub role_description: Option<String>,
    #[serde(default)]
    pub is_manager: bool,
}

// 创建分组请求
//
// 学生创建时 leader_member_id 被忽略，创建者自动成为组长；
// 教师/管理员创建时必须指定组长的班级成员ID
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateGroupRequest {
    pub name: String,
    pub leader_member_id: Option<i64>,
}

// 修改分组请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct UpdateGroupRequest {
    pub name: String,
}

// 加入/邀请请求：class_member_id 为自己时是申请，为他人时是邀请
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct MembershipRequest {
    pub class_member_id: i64,
}

// 分配角色请求，整批生效或整批拒绝
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct AssignRolesRequest {
    pub role_ids: Vec<i64>,
}
