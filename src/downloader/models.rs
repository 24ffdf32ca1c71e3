use std::path::{Path, PathBuf};

use crate::common::models::{CourseInfo, video_file_name};

/// 一集的下载目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub index: usize, // 从 1 开始
    pub file_name: String,
    pub episode_url: String,
    pub output_path: PathBuf,
}

impl DownloadTarget {
    pub fn new(index: usize, url_title: &str, episode_url: &str, course_dir: &Path) -> Self {
        let file_name = video_file_name(index, url_title);
        Self {
            index,
            output_path: course_dir.join(&file_name),
            file_name,
            episode_url: episode_url.to_string(),
        }
    }

    /// 下载中的临时文件，与目标文件同目录，完成后 rename
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self.output_path.clone().into_os_string();
        name.push(".part");
        PathBuf::from(name)
    }
}

/// 按集数顺序生成课程的全部下载目标
pub fn plan_targets(info: &CourseInfo, course_dir: &Path) -> Vec<DownloadTarget> {
    info.episode_urls
        .iter()
        .enumerate()
        .map(|(i, url)| DownloadTarget::new(i + 1, &info.url_title, url, course_dir))
        .collect()
}

// --------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeStatus {
    Downloaded { video_url: String, bytes: u64 },
    Skipped, // 目标文件已存在
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeOutcome {
    pub index: usize,
    pub file_name: String,
    pub episode_url: String,
    pub status: EpisodeStatus,
}

impl EpisodeOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, EpisodeStatus::Failed(_))
    }
}

/// 一门课程的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOutcome {
    pub url_title: String,
    pub episodes: Vec<EpisodeOutcome>,
    /// 剧集列表整体无法解析的原因
    pub episode_error: Option<String>,
}

impl CourseOutcome {
    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, EpisodeStatus::Downloaded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, EpisodeStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, EpisodeStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&EpisodeStatus) -> bool) -> usize {
        self.episodes.iter().filter(|e| pred(&e.status)).count()
    }
}
