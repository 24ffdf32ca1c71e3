use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::ProgressBar;
use reqwest::Response;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::common::client::client::NewMooveClient;

use super::error::DownloadError;
use super::progress::DownloadProgress;

/// 把一个视频地址写入指定的临时文件，返回写入的字节数
#[async_trait]
pub trait Transfer: Send + Sync {
    async fn fetch(&self, video_url: &str, temp_path: &Path) -> Result<u64, DownloadError>;
}

/// 基于已登录客户端的流式下载
#[derive(Clone)]
pub struct DownloadCore {
    download_client: NewMooveClient,
    progress: DownloadProgress,
}

impl DownloadCore {
    pub fn new(download_client: &NewMooveClient) -> Self {
        Self {
            download_client: download_client.clone(),
            progress: DownloadProgress::new(),
        }
    }
}

#[async_trait]
impl Transfer for DownloadCore {
    // 每次都从头写临时文件，不做 Range 续传
    async fn fetch(&self, video_url: &str, temp_path: &Path) -> Result<u64, DownloadError> {
        let response = self.download_client.get_stream_response(video_url).await?;
        let total_size = response.content_length().unwrap_or(0);

        let name = temp_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pb = self.progress.transfer_bar(total_size, &name);

        debug!("开始下载二进制文件: {} -> {}", video_url, temp_path.display());

        let stall_timeout = self.download_client.config().stall_timeout;
        let result = write_body(
            response,
            video_url,
            temp_path,
            total_size,
            stall_timeout,
            pb.as_ref(),
        )
        .await;

        if let Some(pb) = pb {
            match &result {
                Ok(_) => pb.finish_with_message(format!("{} 下载完成", name)),
                Err(_) => pb.abandon_with_message(format!("{} 下载失败", name)),
            }
        }

        result
    }
}

/// 从头写入临时文件；每个数据块都必须在 `stall_timeout` 内到达
async fn write_body(
    response: Response,
    video_url: &str,
    temp_path: &Path,
    total_size: u64,
    stall_timeout: Duration,
    pb: Option<&ProgressBar>,
) -> Result<u64, DownloadError> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    let mut stream = response.bytes_stream();

    let mut downloaded = 0u64;
    loop {
        let next = tokio::time::timeout(stall_timeout, stream.next())
            .await
            .map_err(|_| DownloadError::Stalled {
                url: video_url.to_string(),
                secs: stall_timeout.as_secs(),
            })?;

        let Some(chunk_result) = next else {
            break;
        };
        let chunk = chunk_result.map_err(|error| DownloadError::Stream(error.to_string()))?;

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(pb) = pb {
            pb.set_position(downloaded);
        }
    }

    file.flush().await?;

    if total_size > 0 && downloaded != total_size {
        return Err(DownloadError::Incomplete {
            expected: total_size,
            received: downloaded,
        });
    }

    Ok(downloaded)
}
