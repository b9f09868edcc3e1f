use actix_web::web;

use crate::middlewares;

pub mod classes;

pub mod tasks;

pub mod groups;

pub mod deliveries;

pub mod scores;

pub mod work_items;

pub use classes::configure_classes_routes;
pub use deliveries::configure_deliveries_routes;
pub use groups::configure_groups_routes;
pub use scores::configure_scores_routes;
pub use tasks::configure_tasks_routes;
pub use work_items::configure_work_items_routes;

// 所有接口共用同一个 scope，同前缀的多个 scope 不会互相回退匹配
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireIdentity::from_config())
            .configure(configure_classes_routes)
            .configure(configure_tasks_routes)
            .configure(configure_groups_routes)
            .configure(configure_deliveries_routes)
            .configure(configure_scores_routes)
            .configure(configure_work_items_routes),
    );
}
