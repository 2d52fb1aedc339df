//! 统计 API 模块
//!
//! | 路径 | 方法 | 说明 | 授权 |
//! |------|------|------|------|
//! | /api/stats | GET | 本社团出勤报表 | 任意管理员 |
//! | /api/stats/all | GET | 全部社团报表 + 汇总 | 仅 SOSC 管理员 |

mod handler;

use axum::routing::get;
use axum::{Router, middleware};

use crate::auth::require_club;
use crate::core::ServerState;
use crate::db::models::Club;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stats", routes())
}

fn routes() -> Router<ServerState> {
    let own_club = Router::new().route("/", get(handler::club_stats));

    // 跨社团报表在服务端把关，不信任前端路由守卫
    let all_clubs = Router::new()
        .route("/all", get(handler::all_club_stats))
        .layer(middleware::from_fn(require_club(Club::Sosc)));

    own_club.merge(all_clubs)
}
