//! HTTP API 模块 - 按资源划分的路由和处理器

pub mod auth;
pub mod checkin;
pub mod dashboard;
pub mod guests;
pub mod health;
pub mod members;
pub mod stats;
