// lib.rs - 地图应用的核心库，供 HTTP 服务入口和测试使用

pub mod core;
pub mod data;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

pub use models::*;
pub use server::MapServer;
pub use services::{MapService, RenderOutput, RenderRequest};

pub use core::{init_logger, update_log_level, AppError, AppResult};
