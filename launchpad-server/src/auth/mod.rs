//! 认证模块 - JWT 令牌服务与中间件

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentAdmin, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_club};
