pub mod parameter_error_handler;
pub mod validate;

pub use parameter_error_handler::{json_error_handler, path_error_handler, query_error_handler};
pub use validate::{
    validate_class_name, validate_grade, validate_group_name, validate_percentage,
    validate_role_name, validate_task_name, validate_work_item_name,
};
