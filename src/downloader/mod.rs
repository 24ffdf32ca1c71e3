use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;

use futures::{FutureExt, StreamExt, stream};
use tracing::{info, warn};

use crate::common::models::CourseInfo;
use crate::parser::video_resolver::VideoResolve;

use self::core::Transfer;
use error::DownloadError;
use models::{DownloadTarget, EpisodeOutcome, EpisodeStatus, plan_targets};

pub mod core;
pub mod error;
pub mod models;
pub mod progress;

/// 逐集下载一门课程。
///
/// 每集独立成败：目标文件已存在则跳过，否则解析视频地址、写入 `.part`
/// 并在成功后改名。某一集的错误只记录在它自己的结果里。
pub struct CourseDownloader<R, T> {
    resolver: R,
    transfer: T,
    concurrency: usize,
}

impl<R: VideoResolve, T: Transfer> CourseDownloader<R, T> {
    pub fn new(resolver: R, transfer: T, concurrency: usize) -> Self {
        Self {
            resolver,
            transfer,
            concurrency: concurrency.max(1),
        }
    }

    /// 结果按集数顺序返回，与并发数无关
    pub async fn download_course(
        &self,
        info: &CourseInfo,
        course_dir: &Path,
    ) -> Vec<EpisodeOutcome> {
        let targets = plan_targets(info, course_dir);
        info!("课程 {} 共 {} 集待处理", info.url_title, targets.len());

        stream::iter(targets)
            .map(|target| self.download_episode(target))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn download_episode(&self, target: DownloadTarget) -> EpisodeOutcome {
        let result = AssertUnwindSafe(self.try_download(&target))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(DownloadError::Panicked(panic_message(panic))));

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    "Failed to download episode {:?} ({}): {}\n{:?}",
                    target.episode_url, target.file_name, e, e
                );
                EpisodeStatus::Failed(e.to_string())
            }
        };

        EpisodeOutcome {
            index: target.index,
            file_name: target.file_name,
            episode_url: target.episode_url,
            status,
        }
    }

    async fn try_download(&self, target: &DownloadTarget) -> Result<EpisodeStatus, DownloadError> {
        if tokio::fs::try_exists(&target.output_path).await? {
            info!("Skipping download of {}", target.file_name);
            return Ok(EpisodeStatus::Skipped);
        }

        let video_url = self.resolver.resolve(&target.episode_url).await?;
        let temp_path = target.temp_path();

        let bytes = self.transfer.fetch(&video_url, &temp_path).await?;
        tokio::fs::rename(&temp_path, &target.output_path).await?;

        info!("✅ {} 下载完成 ({} 字节)", target.file_name, bytes);
        Ok(EpisodeStatus::Downloaded { video_url, bytes })
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
