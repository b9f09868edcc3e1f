pub mod classes;
pub mod deliveries;
pub mod groups;
pub mod respond;
pub mod scores;
pub mod tasks;
pub mod work_items;

pub use classes::ClassService;
pub use deliveries::DeliveryService;
pub use groups::GroupService;
pub use scores::ScoreService;
pub use tasks::TaskService;
pub use work_items::WorkItemService;
