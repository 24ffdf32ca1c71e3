use thiserror::Error;

use crate::common::client::error::ApiError;
use crate::parser::errors::ParseError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("网络请求失败: {0}")]
    Api(#[from] ApiError),

    #[error("登录页解析失败: {0}")]
    Parse(#[from] ParseError),

    #[error("登录被拒绝，请检查邮箱和密码")]
    Rejected,

    #[error("没有可用的登录信息：需要 --email/--password 或有效的 --cookie-file")]
    MissingCredentials,
}

pub type Result<T> = std::result::Result<T, AuthError>;
