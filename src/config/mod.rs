//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、`config.toml`、`config.{APP_ENV}.toml`、
//! `GROUPWORK_*` 环境变量、常用的独立环境变量（如 `DATABASE_URL`）。

mod r#impl;
mod structs;

pub use structs::*;
