use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("HTTP 状态异常 {status}: {url}")]
    Status { status: u16, url: String },

    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("响应解析失败: {0}")]
    InvalidResponse(String),

    #[error("Cookie 读写失败: {0}")]
    CookieStore(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    // reqwest 的超时单独归类，方便日志里区分
    pub fn from_request(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(url.to_string())
        } else {
            ApiError::Reqwest(err)
        }
    }
}
