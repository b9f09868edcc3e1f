use super::entities::DeliveryType;
use serde::Deserialize;
use ts_rs::TS;

// 创建或修改草稿请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct DraftRequest {
    pub delivery_comments: Option<String>,
}

// 添加交付项请求
//
// owner_group_id 是文件/仓库存储记录的归属分组，必须与交付所属分组一致
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct AddItemRequest {
    pub item_type: DeliveryType,
    pub item_id: i64,
    pub owner_group_id: i64,
}

// 审核通过请求，教师最终通过时必须给出分数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct ApproveDeliveryRequest {
    pub score: Option<f64>,
    pub comments: Option<String>,
}

// 驳回请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/delivery.ts")]
pub struct RejectDeliveryRequest {
    pub comments: Option<String>,
}
