//! AI-RAG-Know 后端的 Rust 客户端。
//!
//! 职责只有三层：统一配置的 HTTP 传输（[`services::ApiClient`]）、
//! 响应包装的成败判定与解包（[`models::ApiResponse`]）、
//! 以及每个后端操作对应一个函数的接口封装（[`api`]）。
//! 页面渲染与路由由宿主 UI 负责，通过 [`services::Notifier`] 与
//! [`admin::Confirm`] 两个注入点接收提示与确认请求。

pub mod admin;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use services::ApiClient;
