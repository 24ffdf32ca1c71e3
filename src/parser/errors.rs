use thiserror::Error;

use crate::common::client::error::ApiError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("无效的URL: {0}")]
    InvalidUrl(String),
    #[error("页面中未找到: {0}")]
    MissingElement(String),
    #[error("episodeArray 解析失败: {0}")]
    EpisodeArray(String),
    #[error("响应中没有视频源: {0}")]
    NoVideoSource(String),
    #[error("选择器无效: {0}")]
    Selector(String),
    #[error("请求失败: {0}")]
    Api(#[from] ApiError),
}

impl From<url::ParseError> for ParseError {
    fn from(err: url::ParseError) -> Self {
        ParseError::InvalidUrl(err.to_string())
    }
}
