//! 自助终端 API 模块
//!
//! 签到机不登录，所有路由都是公共的 (见 `require_auth` 的跳过列表)。
//! 会话 id 是签到成功后唯一的凭据，后续的状态查询、签退和提醒开关都凭它。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/checkin | POST | 成员签到 (查无此人转访客注册) |
//! | /api/checkin/guest | POST | 访客登记 + 签到 |
//! | /api/checkin/session/{id} | GET | 会话状态 |
//! | /api/checkin/checkout | POST | 签退 |
//! | /api/checkin/reminder | POST | 签退提醒开关 |

mod handler;

use axum::routing::{get, post};
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::check_in))
        .route("/guest", post(handler::register_guest))
        .route("/session/{id}", get(handler::session_status))
        .route("/checkout", post(handler::check_out))
        .route("/reminder", post(handler::set_reminder))
}
