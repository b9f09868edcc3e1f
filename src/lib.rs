//! GroupWork - 课程项目工作流引擎
//!
//! 基于 Actix Web 构建的课程分组协作后端：分组、任务链、交付审核与评分。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 身份头中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 请求处理层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数
//! - `workflow`: 工作流引擎（状态机、权限与视图）

pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;
