use serde::Deserialize;
use ts_rs::TS;

// 创建班级请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub description: Option<String>,
}

// 添加班级成员请求
//
// 教师成员不参与分组，只用于判断其是否拥有本班级的管理权限
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct AddMemberRequest {
    pub user_id: i64,
    #[serde(default)]
    pub is_teacher: bool,
}
