//! 认证中间件
//!
//! 为 JWT 认证和社团授权提供 Axum 中间件

use std::future::Future;
use std::pin::Pin;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::{CurrentAdmin, JwtError, JwtService};
use crate::core::ServerState;
use crate::db::models::Club;
use crate::security_log;
use crate::utils::AppError;

/// 认证中间件 - 要求管理员登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 验证成功后将 [`CurrentAdmin`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (健康检查等)
/// - `/api/auth/login` (登录接口)
/// - `/api/checkin/**` (自助终端公共接口)
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/auth/login" || path.starts_with("/api/checkin");
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => match JwtService::extract_from_header(header) {
            Some(token) => token,
            None => {
                security_log!(
                    "WARN",
                    "auth_malformed_header",
                    uri = format!("{}", req.uri())
                );
                return Err(AppError::InvalidToken);
            }
        },
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    match state.get_jwt_service().validate_token(token) {
        Ok(claims) => {
            let admin = CurrentAdmin::from(claims);
            req.extensions_mut().insert(admin);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{}", req.uri())
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// 社团授权中间件 - 要求管理员属于指定社团
///
/// 必须挂在 [`require_auth`] 之后 (依赖请求扩展中的 [`CurrentAdmin`])。
/// 用于 `/api/stats/all`：跨社团报表只对特权社团开放。
pub fn require_club(
    club: Club,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>> + Clone
{
    move |req: Request, next: Next| {
        Box::pin(async move {
            let admin = req
                .extensions()
                .get::<CurrentAdmin>()
                .ok_or(AppError::Unauthorized)?;

            if admin.club != club {
                security_log!(
                    "WARN",
                    "club_scope_denied",
                    admin_id = admin.id.clone(),
                    admin_club = admin.club.to_string(),
                    required_club = club.to_string()
                );
                return Err(AppError::Forbidden(format!(
                    "Restricted to {} administrators",
                    club.display_name()
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
