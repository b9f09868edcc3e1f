//! 输入校验
//!
//! 返回 `&'static str` 错误信息，调用方按需包装为 `WorkflowError::validation`。

fn validate_name(
    name: &str,
    max: usize,
    empty: &'static str,
    long: &'static str,
) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    // 按字符计数，中文名称与英文名称同样计长
    if trimmed.chars().count() > max {
        return Err(long);
    }
    Ok(())
}

pub fn validate_class_name(name: &str) -> Result<(), &'static str> {
    validate_name(
        name,
        100,
        "Class name cannot be empty",
        "Class name must be at most 100 characters",
    )
}

pub fn validate_group_name(name: &str) -> Result<(), &'static str> {
    validate_name(
        name,
        50,
        "Group name cannot be empty",
        "Group name must be at most 50 characters",
    )
}

pub fn validate_role_name(name: &str) -> Result<(), &'static str> {
    validate_name(
        name,
        50,
        "Role name cannot be empty",
        "Role name must be at most 50 characters",
    )
}

pub fn validate_task_name(name: &str) -> Result<(), &'static str> {
    validate_name(
        name,
        100,
        "Task name cannot be empty",
        "Task name must be at most 100 characters",
    )
}

pub fn validate_work_item_name(name: &str) -> Result<(), &'static str> {
    validate_name(
        name,
        100,
        "Work item name cannot be empty",
        "Work item name must be at most 100 characters",
    )
}

/// 任务成绩占比：[0, 100]
pub fn validate_percentage(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err("Grade percentage must be between 0 and 100");
    }
    Ok(())
}

/// 教师评分：[0, 100]，0 分是有效成绩
pub fn validate_grade(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err("Score must be between 0 and 100");
    }
    Ok(())
}
