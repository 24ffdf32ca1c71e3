use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use newmoove_downloader::common::client::client::NewMooveClient;
use newmoove_downloader::common::config::SiteConfig;
use newmoove_downloader::common::models::CourseInfo;
use newmoove_downloader::downloader::CourseDownloader;
use newmoove_downloader::downloader::core::Transfer;
use newmoove_downloader::downloader::error::DownloadError;
use newmoove_downloader::downloader::models::EpisodeStatus;
use newmoove_downloader::parser::CourseParser;
use newmoove_downloader::parser::errors::ParseError;
use newmoove_downloader::parser::models::ParsedCourse;
use newmoove_downloader::parser::video_resolver::VideoResolve;
use newmoove_downloader::pipeline::Pipeline;
use newmoove_downloader::storage;

/// 播放页 -> 视频地址，`failing` 里的播放页解析失败，越靠前的集等待越久
#[derive(Default, Clone)]
struct FakeResolver {
    calls: Arc<AtomicUsize>,
    failing: HashSet<String>,
    stagger: bool,
}

#[async_trait]
impl VideoResolve for FakeResolver {
    async fn resolve(&self, episode_url: &str) -> Result<String, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.stagger {
            let index: u64 = episode_url.rsplit('=').next().unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(50 * (5 - index.min(5)))).await;
        }

        if self.failing.contains(episode_url) {
            return Err(ParseError::NoVideoSource(episode_url.to_string()));
        }
        Ok(format!("{}.mp4", episode_url.replace("lightbox", "media")))
    }
}

/// 把视频地址本身当作文件内容写入；`broken` 里的地址写一半后报错，`panicking` 里的直接 panic
#[derive(Default, Clone)]
struct FakeTransfer {
    calls: Arc<AtomicUsize>,
    broken: HashSet<String>,
    panicking: HashSet<String>,
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn fetch(&self, video_url: &str, temp_path: &Path) -> Result<u64, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.panicking.contains(video_url) {
            panic!("transfer exploded");
        }
        if self.broken.contains(video_url) {
            tokio::fs::write(temp_path, b"partial").await?;
            return Err(DownloadError::Stream("connection reset".to_string()));
        }

        tokio::fs::write(temp_path, video_url.as_bytes()).await?;
        Ok(video_url.len() as u64)
    }
}

fn episode_url(i: usize) -> String {
    format!("https://x.test/lightbox?courseId=1&episodeLink={}", i)
}

fn video_url(i: usize) -> String {
    format!("https://x.test/media?courseId=1&episodeLink={}.mp4", i)
}

fn course(episodes: usize) -> CourseInfo {
    let mut info = CourseInfo::with_slug("core");
    info.title = "Core".into();
    info.episode_urls = (1..=episodes).map(episode_url).collect();
    info.episode_descriptions = (1..=episodes).map(|i| format!("Folge {}", i)).collect();
    info
}

#[tokio::test]
async fn test_download_course_writes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = CourseDownloader::new(FakeResolver::default(), FakeTransfer::default(), 1);

    let outcomes = downloader.download_course(&course(2), dir.path()).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0].status,
        EpisodeStatus::Downloaded {
            video_url: video_url(1),
            bytes: video_url(1).len() as u64,
        }
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("02.core.mp4")).unwrap(),
        video_url(2)
    );
    assert!(!dir.path().join("02.core.mp4.part").exists());
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = FakeResolver::default();
    let transfer = FakeTransfer::default();
    let downloader = CourseDownloader::new(resolver.clone(), transfer.clone(), 2);

    downloader.download_course(&course(3), dir.path()).await;
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
    assert_eq!(transfer.calls.load(Ordering::SeqCst), 3);

    let outcomes = downloader.download_course(&course(3), dir.path()).await;
    assert!(outcomes.iter().all(|o| o.status == EpisodeStatus::Skipped));
    // 已存在的文件不再解析也不再下载
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
    assert_eq!(transfer.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_transfer_leaves_no_final_file() {
    let dir = tempfile::tempdir().unwrap();
    let transfer = FakeTransfer {
        broken: HashSet::from([video_url(1)]),
        ..Default::default()
    };
    let downloader = CourseDownloader::new(FakeResolver::default(), transfer, 1);

    let outcomes = downloader.download_course(&course(1), dir.path()).await;

    assert!(outcomes[0].is_failed());
    assert!(!dir.path().join("01.core.mp4").exists());

    // 下一次运行会重新下载，而不是把残留当成已完成
    let downloader = CourseDownloader::new(FakeResolver::default(), FakeTransfer::default(), 1);
    let outcomes = downloader.download_course(&course(1), dir.path()).await;
    assert!(matches!(outcomes[0].status, EpisodeStatus::Downloaded { .. }));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("01.core.mp4")).unwrap(),
        video_url(1)
    );
}

#[tokio::test]
async fn test_one_failing_episode_does_not_stop_others() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = FakeResolver {
        failing: HashSet::from([episode_url(2)]),
        ..Default::default()
    };
    let transfer = FakeTransfer {
        panicking: HashSet::from([video_url(3)]),
        ..Default::default()
    };
    let downloader = CourseDownloader::new(resolver, transfer, 1);

    let outcomes = downloader.download_course(&course(4), dir.path()).await;

    let failed: Vec<usize> = outcomes.iter().filter(|o| o.is_failed()).map(|o| o.index).collect();
    assert_eq!(failed, vec![2, 3]);
    assert!(dir.path().join("01.core.mp4").exists());
    assert!(!dir.path().join("02.core.mp4").exists());
    assert!(!dir.path().join("03.core.mp4").exists());
    assert!(dir.path().join("04.core.mp4").exists());
}

#[tokio::test]
async fn test_concurrent_download_keeps_episode_order() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = FakeResolver {
        stagger: true,
        ..Default::default()
    };
    let downloader = CourseDownloader::new(resolver, FakeTransfer::default(), 4);

    let outcomes = downloader.download_course(&course(4), dir.path()).await;

    let indexes: Vec<usize> = outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indexes, vec![1, 2, 3, 4]);
    let files: Vec<&str> = outcomes.iter().map(|o| o.file_name.as_str()).collect();
    assert_eq!(files, vec!["01.core.mp4", "02.core.mp4", "03.core.mp4", "04.core.mp4"]);
}

#[tokio::test]
async fn test_empty_course_downloads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let transfer = FakeTransfer::default();
    let downloader = CourseDownloader::new(FakeResolver::default(), transfer.clone(), 1);

    let outcomes = downloader.download_course(&course(0), dir.path()).await;

    assert!(outcomes.is_empty());
    assert_eq!(transfer.calls.load(Ordering::SeqCst), 0);
}

fn pipeline(resolver: FakeResolver, transfer: FakeTransfer) -> Pipeline<FakeResolver, FakeTransfer> {
    let client = NewMooveClient::new(SiteConfig::default()).unwrap();
    Pipeline::with_parts(
        CourseParser::new(client),
        CourseDownloader::new(resolver, transfer, 1),
    )
}

#[tokio::test]
async fn test_process_course_writes_metadata_and_videos() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = pipeline(FakeResolver::default(), FakeTransfer::default());
    let info = course(2);

    let outcome = pipeline
        .process_course(
            ParsedCourse {
                info: info.clone(),
                episode_error: None,
            },
            root.path(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.url_title, "core");
    assert_eq!(outcome.downloaded(), 2);
    assert!(outcome.episode_error.is_none());

    let course_dir = root.path().join("core");
    assert_eq!(storage::read_course_info(&course_dir).await.unwrap(), info);
    assert!(course_dir.join("01.core.mp4").exists());
    assert!(course_dir.join("02.core.mp4").exists());
}

#[tokio::test]
async fn test_process_course_without_episodes_still_writes_metadata() {
    let root = tempfile::tempdir().unwrap();
    let transfer = FakeTransfer::default();
    let pipeline = pipeline(FakeResolver::default(), transfer.clone());

    let mut info = course(0);
    info.episode_descriptions = vec!["Folge 1".into()];

    let outcome = pipeline
        .process_course(
            ParsedCourse {
                info,
                episode_error: Some(ParseError::EpisodeArray("列表没有闭合".into())),
            },
            root.path(),
        )
        .await
        .unwrap();

    assert!(outcome.episodes.is_empty());
    assert!(outcome.episode_error.unwrap().contains("列表没有闭合"));
    assert_eq!(transfer.calls.load(Ordering::SeqCst), 0);

    let saved = storage::read_course_info(&root.path().join("core")).await.unwrap();
    assert!(saved.episode_urls.is_empty());
    assert_eq!(saved.episode_descriptions, vec!["Folge 1"]);
}
