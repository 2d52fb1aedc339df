//! 成员 API 模块
//!
//! 所有路由都在全局认证中间件之后，社团范围取自管理员令牌。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/members | GET | 成员列表 (含出勤汇总) |
//! | /api/members | POST | 添加成员 |
//! | /api/members/{usn} | DELETE | 删除成员 |
//! | /api/members/{usn}/attendance | GET | 成员出勤历史 |

mod handler;

use axum::routing::{delete, get};
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{usn}", delete(handler::delete))
        .route("/{usn}/attendance", get(handler::attendance_history))
}
