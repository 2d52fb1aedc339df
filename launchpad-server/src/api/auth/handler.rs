//! Authentication Handlers

use std::time::Duration;

use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::db::models::{Admin, Club};
use crate::db::repository::AdminRepository;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_new_password, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin identity returned to the console
#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub club: Club,
}

impl AdminProfile {
    fn from_admin(admin: &Admin) -> Self {
        Self {
            id: admin
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            club: admin.club,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminProfile,
}

/// POST /api/auth/login - 管理员登录
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim().to_string();
    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let repo = AdminRepository::new(state.db.clone());
    let admin = repo.find_by_email(&email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message, the caller cannot probe which emails exist
    let admin = match admin {
        Some(admin) => {
            let password_valid = admin
                .verify_password(&req.password)
                .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))?;
            if !password_valid {
                tracing::warn!(email = %email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            admin
        }
        None => {
            tracing::warn!(email = %email, "Login failed - admin not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let admin_id = admin
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let token = state
        .get_jwt_service()
        .generate_token(&admin_id, &admin.email, &admin.name, admin.club)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        admin_id = %admin_id,
        email = %admin.email,
        club = %admin.club,
        "Admin logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        admin: AdminProfile::from_admin(&admin),
    }))
}

/// GET /api/auth/me - 当前管理员信息 (每次从数据库取最新)
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentAdmin>,
) -> AppResult<Json<AdminProfile>> {
    let admin = AdminRepository::new(state.db.clone())
        .find_by_id(&current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(AdminProfile::from_admin(&admin)))
}

/// POST /api/auth/logout - 登出
///
/// 无状态 JWT：客户端丢弃令牌，服务端只留审计日志。
pub async fn logout(Extension(current): Extension<CurrentAdmin>) -> AppResult<Json<()>> {
    tracing::info!(admin_id = %current.id, email = %current.email, "Admin logged out");
    Ok(Json(()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: String,
}

/// PUT /api/auth/account - 修改显示名
pub async fn update_account(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentAdmin>,
    Json(req): Json<UpdateAccountRequest>,
) -> AppResult<Json<AdminProfile>> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;

    let admin = AdminRepository::new(state.db.clone())
        .update_name(&current.id, req.name.trim().to_string())
        .await?;

    tracing::info!(admin_id = %current.id, "Admin display name updated");
    Ok(Json(AdminProfile::from_admin(&admin)))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/auth/password - 修改密码
///
/// 需要重新验证当前密码，新密码走统一的强度校验。
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentAdmin>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<()>> {
    validate_new_password(&req.new_password)?;

    let repo = AdminRepository::new(state.db.clone());
    let admin = repo
        .find_by_id(&current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Re-authentication uses the same fixed delay as login
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;
    let password_valid = admin
        .verify_password(&req.current_password)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        tracing::warn!(admin_id = %current.id, "Password change failed - wrong current password");
        return Err(AppError::invalid_credentials());
    }

    let hash_pass = Admin::hash_password(&req.new_password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;
    repo.update_password(&current.id, hash_pass).await?;

    tracing::info!(admin_id = %current.id, "Admin password changed");
    Ok(Json(()))
}
