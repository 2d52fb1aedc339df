use thiserror::Error;

/// 服务器引导错误
///
/// Handler 层的错误统一走 [`crate::utils::AppError`]；
/// 这里只覆盖启动 / 关闭路径。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 启动路径的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
