//! HTTP 服务层
//!
//! - `body`: 统一的响应体类型
//! - `responses`: JSON 响应与错误模板
//! - `router`: 路由表
//! - `map_server`: 监听与连接处理

pub mod body;
pub mod map_server;
pub mod responses;
pub mod router;

pub use body::{box_body, BoxBody};
pub use map_server::MapServer;
pub use router::route;
