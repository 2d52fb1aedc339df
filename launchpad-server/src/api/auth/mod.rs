//! 认证 API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/auth/login | POST | 管理员登录 | 无 |
//! | /api/auth/me | GET | 当前管理员信息 | JWT |
//! | /api/auth/logout | POST | 登出 | JWT |
//! | /api/auth/account | PUT | 修改显示名 | JWT |
//! | /api/auth/password | PUT | 修改密码 | JWT |

mod handler;

use axum::routing::{get, post, put};
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
        .route("/logout", post(handler::logout))
        .route("/account", put(handler::update_account))
        .route("/password", put(handler::change_password))
}
