use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    actors::entities::Actor,
    classes::{entities::Class, requests::CreateClassRequest},
};
use crate::workflow::{Applied, ClassState, Command, EventSink, TracingEventSink};

pub mod sea_orm_storage;

/// 一次成功写操作的结果：提交后的班级状态与已替换为真实 ID 的事件
#[derive(Debug, Clone)]
pub struct Executed {
    pub state: ClassState,
    pub applied: Applied,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 班级管理方法
    // 创建班级，教师创建者自动成为教师成员
    async fn create_class(&self, actor: &Actor, class: CreateClassRequest) -> Result<Class>;
    // 列出操作者可见的班级
    async fn list_classes(&self, actor: &Actor) -> Result<Vec<Class>>;

    /// 工作流方法
    // 加载班级聚合，对操作者不可见时返回 NotFound
    async fn load_class(&self, class_id: i64, actor: &Actor) -> Result<ClassState>;
    // 在单个事务内执行一条命令并写回
    async fn execute(&self, class_id: i64, actor: &Actor, command: Command) -> Result<Executed>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let sink: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let storage = sea_orm_storage::SeaOrmStorage::new_async(sink).await?;
    Ok(Arc::new(storage))
}
