//! 访客 API 模块
//!
//! 访客不分社团，任何管理员都能看到完整列表。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/guests | GET | 访客列表 (含最近到访时长) |

mod handler;

use axum::routing::get;
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/guests", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::list))
}
