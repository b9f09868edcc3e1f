//! 工作流命令执行

use super::SeaOrmStorage;
use super::load::load_state;
use super::persist::persist;
use crate::errors::Result;
use crate::models::actors::entities::Actor;
use crate::storage::Executed;
use crate::workflow::{self, Command};
use sea_orm::TransactionTrait;
use tracing::{error, info};

impl SeaOrmStorage {
    /// 加载、执行、写回都在同一事务中；事件只在提交成功后发出
    pub async fn execute_impl(
        &self,
        class_id: i64,
        actor: &Actor,
        command: Command,
    ) -> Result<Executed> {
        let name = command.name();
        let txn = self.db.begin().await?;

        let before = load_state(&txn, class_id, true).await?;
        let mut after = before.clone();
        let mut applied = workflow::execute(&mut after, actor, command)?;

        let class = after.class_mut();
        class.version += 1;

        let map = match persist(&txn, &before, &mut after).await {
            Ok(map) => map,
            Err(e) => {
                if e.is_infrastructure() {
                    error!("Failed to persist {} for class {}: {}", name, class_id, e);
                }
                return Err(e);
            }
        };
        txn.commit().await?;

        applied.rekey(&map);
        info!(
            "Command {} committed for class {} by user {} (version {})",
            name,
            class_id,
            actor.user_id,
            after.class().version
        );

        for event in &applied.events {
            self.sink.emit(event);
        }

        Ok(Executed {
            state: after,
            applied,
        })
    }
}
