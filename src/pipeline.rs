use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::common::client::client::NewMooveClient;
use crate::common::models::WorkoutCategory;
use crate::downloader::CourseDownloader;
use crate::downloader::core::{DownloadCore, Transfer};
use crate::downloader::models::CourseOutcome;
use crate::parser::CourseParser;
use crate::parser::errors::ParseError;
use crate::parser::models::ParsedCourse;
use crate::parser::video_resolver::{LightboxResolver, VideoResolve};
use crate::storage::{self, CategoryTitles, StorageError};

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("无法创建目录 {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("未知的健身分类: '{0}'")]
    UnknownCategory(String),
}

/// 整次运行的结果
#[derive(Debug, Default)]
pub struct RunSummary {
    pub courses: Vec<CourseOutcome>,
    /// 无法处理的课程或分类，以及原因
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    pub fn episodes_downloaded(&self) -> usize {
        self.courses.iter().map(|c| c.downloaded()).sum()
    }

    pub fn episodes_skipped(&self) -> usize {
        self.courses.iter().map(|c| c.skipped()).sum()
    }

    pub fn episodes_failed(&self) -> usize {
        self.courses.iter().map(|c| c.failed()).sum()
    }

    pub fn courses_without_episodes(&self) -> usize {
        self.courses.iter().filter(|c| c.episode_error.is_some()).count()
    }

    fn record(&mut self, name: &str, result: Result<CourseOutcome, PipelineError>) {
        match result {
            Ok(outcome) => self.courses.push(outcome),
            Err(e) => {
                error!("课程 {} 处理失败: {}", name, e);
                self.failures.push((name.to_string(), e.to_string()));
            }
        }
    }
}

pub struct Pipeline<R = LightboxResolver, T = DownloadCore> {
    parser: CourseParser,
    downloader: CourseDownloader<R, T>,
}

impl Pipeline {
    pub fn new(client: &NewMooveClient) -> Self {
        let concurrency = client.config().concurrency;
        Self {
            parser: CourseParser::new(client.clone()),
            downloader: CourseDownloader::new(
                LightboxResolver::new(client.clone()),
                DownloadCore::new(client),
                concurrency,
            ),
        }
    }
}

impl<R: VideoResolve, T: Transfer> Pipeline<R, T> {
    pub fn with_parts(parser: CourseParser, downloader: CourseDownloader<R, T>) -> Self {
        Self { parser, downloader }
    }

    pub fn parser(&self) -> &CourseParser {
        &self.parser
    }

    /// 下载单个课程到 `<parent_dir>/<url_title>/`
    pub async fn download_course(
        &self,
        url: &str,
        parent_dir: &Path,
    ) -> Result<CourseOutcome, PipelineError> {
        let parsed = self.parser.parse_course(url).await?;
        self.process_course(parsed, parent_dir).await
    }

    /// 建目录、写 info.json，再逐集下载。
    /// 剧集列表解析失败时仍写入元数据，结果里带上失败原因
    pub async fn process_course(
        &self,
        parsed: ParsedCourse,
        parent_dir: &Path,
    ) -> Result<CourseOutcome, PipelineError> {
        let info = parsed.info;
        let course_dir = parent_dir.join(&info.url_title);
        create_dir(&course_dir).await?;

        storage::write_course_info(&course_dir, &info).await?;

        if parsed.episode_error.is_none()
            && info.episode_descriptions.len() != info.episode_urls.len()
        {
            warn!(
                "课程 {} 的描述数 ({}) 与视频数 ({}) 不一致",
                info.url_title,
                info.episode_descriptions.len(),
                info.episode_urls.len()
            );
        }

        let episodes = self.downloader.download_course(&info, &course_dir).await;

        Ok(CourseOutcome {
            url_title: info.url_title,
            episodes,
            episode_error: parsed.episode_error.map(|e| e.to_string()),
        })
    }

    /// 下载一个分类下的全部课程，单个课程失败不影响其它课程
    pub async fn download_workout(
        &self,
        category: &str,
        root: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let category_dir = root.join(category);
        create_dir(&category_dir).await?;

        let courses = self.parser.list_workout_courses(category).await?;
        info!("分类 {} 共 {} 门课程", category, courses.len());

        for course in courses {
            let result = self.download_course(&course.url, &category_dir).await;
            summary.record(&course.url, result);
        }

        Ok(())
    }

    /// 按选择下载多个分类。根目录无法创建时直接返回错误
    pub async fn download_workouts(
        &self,
        root: &Path,
        selection: &str,
    ) -> Result<RunSummary, PipelineError> {
        let available = self.parser.list_workout_categories().await?;
        let selected = select_categories(&available, selection)?;

        create_dir(root).await?;

        let titles: CategoryTitles = available
            .iter()
            .map(|c| (c.url_title.clone(), c.title.clone()))
            .collect();
        storage::write_category_titles(root, &titles).await?;

        let mut summary = RunSummary::default();
        for category in selected {
            if let Err(e) = self.download_workout(&category, root, &mut summary).await {
                error!("分类 {} 处理失败: {}", category, e);
                summary.failures.push((category, e.to_string()));
            }
        }

        Ok(summary)
    }

    /// 逐个下载给定的课程URL
    pub async fn download_courses(
        &self,
        urls: &[String],
        parent_dir: &Path,
    ) -> Result<RunSummary, PipelineError> {
        create_dir(parent_dir).await?;

        let mut summary = RunSummary::default();
        for url in urls {
            let result = self.download_course(url, parent_dir).await;
            summary.record(url, result);
        }
        Ok(summary)
    }
}

/// `all` 表示全部分类，否则是逗号分隔的 slug 列表，必须都存在
pub fn select_categories(
    available: &[WorkoutCategory],
    selection: &str,
) -> Result<Vec<String>, PipelineError> {
    if selection.trim() == ALL_CATEGORIES {
        return Ok(available.iter().map(|c| c.url_title.clone()).collect());
    }

    selection
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            if available.iter().any(|c| c.url_title == name) {
                Ok(name.to_string())
            } else {
                Err(PipelineError::UnknownCategory(name.to_string()))
            }
        })
        .collect()
}

async fn create_dir(path: &Path) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| PipelineError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<WorkoutCategory> {
        ["yoga", "pilates", "dance"]
            .iter()
            .map(|s| WorkoutCategory {
                url_title: s.to_string(),
                title: s.to_uppercase(),
            })
            .collect()
    }

    #[test]
    fn all_selects_every_category() {
        assert_eq!(
            select_categories(&categories(), "all").unwrap(),
            vec!["yoga", "pilates", "dance"]
        );
    }

    #[test]
    fn comma_list_keeps_given_order() {
        assert_eq!(
            select_categories(&categories(), "dance, yoga").unwrap(),
            vec!["dance", "yoga"]
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(matches!(
            select_categories(&categories(), "yoga,boxing"),
            Err(PipelineError::UnknownCategory(name)) if name == "boxing"
        ));
    }
}
