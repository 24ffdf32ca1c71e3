use thiserror::Error;

use crate::common::client::error::ApiError;
use crate::parser::errors::ParseError;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("视频地址解析失败: {0}")]
    Resolve(#[from] ParseError),
    #[error("HTTP错误: {0}")]
    Api(#[from] ApiError),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("数据流中断: {0}")]
    Stream(String),
    #[error("超过 {secs} 秒没有收到数据: {url}")]
    Stalled { url: String, secs: u64 },
    #[error("下载不完整: 期望 {expected} 字节，实际 {received} 字节")]
    Incomplete { expected: u64, received: u64 },
    #[error("下载任务异常退出: {0}")]
    Panicked(String),
}
