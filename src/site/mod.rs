mod templates;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::common::models::CourseInfo;
use crate::storage::{self, StorageError};

pub use templates::escape_html;
use templates::{
    CATEGORY_LINK, COURSE_PAGE, COURSE_ROW, LISTING_PAGE, MAIN_PAGE, STYLE, VIDEO_BLOCK, render,
};

pub const INDEX_FILE: &str = "index.html";

/// 分类页按难度分组，值来自课程详情页的难度图标
pub const LEVEL_SECTIONS: [&str; 3] = ["Einsteiger", "Fortgeschrittene", "Experten"];
const OTHER_LEVEL: &str = "Sonstige";

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("读写 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub categories: usize,
    pub courses: usize,
}

/// 一集在课程页上的条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    pub file: String,
    pub description: String,
}

/// 以视频数为准配对描述：缺的描述留空，多出来的描述丢弃
pub fn video_entries(info: &CourseInfo) -> Vec<VideoEntry> {
    if info.episode_descriptions.len() != info.episode_urls.len() {
        warn!(
            "课程 {} 的描述数 ({}) 与视频数 ({}) 不一致，按视频数生成页面",
            info.url_title,
            info.episode_descriptions.len(),
            info.episode_urls.len()
        );
    }

    (0..info.episode_urls.len())
        .map(|i| VideoEntry {
            file: info.video_file_name(i + 1),
            description: info.episode_descriptions.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}

/// 根据已下载的 info.json 生成整站静态页面
pub async fn generate_html(root: &Path) -> Result<SiteReport, SiteError> {
    let titles = match storage::read_category_titles(root).await {
        Ok(titles) => titles,
        Err(e) => {
            warn!("无法读取分类标题，使用目录名: {}", e);
            Default::default()
        }
    };

    let mut report = SiteReport::default();
    let mut links = String::new();

    for category_dir in subdirectories(root).await? {
        let slug = dir_name(&category_dir);
        let course_count = generate_category_html(&category_dir).await?;

        let title = titles.get(&slug).cloned().unwrap_or_else(|| slug.clone());
        links.push_str(&render(
            CATEGORY_LINK,
            &[
                ("href", &*urlencoding::encode(&slug)),
                ("title", escape_html(&title).as_str()),
                ("count", course_count.to_string().as_str()),
            ],
        ));

        report.categories += 1;
        report.courses += course_count;
    }

    let page = render(
        MAIN_PAGE,
        &[("links", links.as_str()), ("style", STYLE), ("generated", generated_note().as_str())],
    );
    write_page(&root.join(INDEX_FILE), &page).await?;

    info!("已生成 {} 个分类、{} 门课程的页面", report.categories, report.courses);
    Ok(report)
}

/// 生成分类页和其下每门课程的页面，返回课程数
pub async fn generate_category_html(category_dir: &Path) -> Result<usize, SiteError> {
    let mut courses = Vec::new();

    for course_dir in subdirectories(category_dir).await? {
        match storage::read_course_info(&course_dir).await {
            Ok(info) => {
                generate_course_html(&course_dir, &info).await?;
                courses.push(info);
            }
            Err(e) => warn!("跳过 {}: {}", course_dir.display(), e),
        }
    }

    let mut body = String::new();
    for level in LEVEL_SECTIONS {
        push_level_section(&mut body, level, courses.iter().filter(|c| c.level == level));
    }
    push_level_section(
        &mut body,
        OTHER_LEVEL,
        courses
            .iter()
            .filter(|c| !LEVEL_SECTIONS.contains(&c.level.as_str())),
    );

    let title = escape_html(&dir_name(category_dir));
    let page = render(
        LISTING_PAGE,
        &[
            ("title", title.as_str()),
            ("body", body.as_str()),
            ("style", STYLE),
            ("generated", generated_note().as_str()),
        ],
    );
    write_page(&category_dir.join(INDEX_FILE), &page).await?;

    Ok(courses.len())
}

fn push_level_section<'a>(
    body: &mut String,
    level: &str,
    courses: impl Iterator<Item = &'a CourseInfo>,
) {
    let rows: String = courses.map(course_row).collect();
    // 没有课程的“其它”分组不显示
    if rows.is_empty() && level == OTHER_LEVEL {
        return;
    }
    body.push_str(&format!("<h2>{}</h2>", escape_html(level)));
    body.push_str(&rows);
}

fn course_row(info: &CourseInfo) -> String {
    render(
        COURSE_ROW,
        &[
            ("href", &*urlencoding::encode(&info.url_title)),
            ("title", escape_html(&info.title).as_str()),
            ("description", escape_html(&info.description).as_str()),
            ("duration", escape_html(&info.duration).as_str()),
            ("calories", escape_html(&info.calories).as_str()),
            ("body_area", escape_html(&info.body_area).as_str()),
            ("material", escape_html(&info.material).as_str()),
        ],
    )
}

pub async fn generate_course_html(course_dir: &Path, info: &CourseInfo) -> Result<(), SiteError> {
    let videos: String = video_entries(info)
        .iter()
        .map(|entry| {
            render(
                VIDEO_BLOCK,
                &[
                    ("file", &*urlencoding::encode(&entry.file)),
                    ("description", escape_html(&entry.description).as_str()),
                ],
            )
        })
        .collect();

    let page = render(
        COURSE_PAGE,
        &[
            ("title", escape_html(&info.title).as_str()),
            ("description", escape_html(&info.description).as_str()),
            ("duration", escape_html(&info.duration).as_str()),
            ("calories", escape_html(&info.calories).as_str()),
            ("level", escape_html(&info.level).as_str()),
            ("body_area", escape_html(&info.body_area).as_str()),
            ("material", escape_html(&info.material).as_str()),
            ("bonus_points", escape_html(&info.bonus_points).as_str()),
            ("videos", videos.as_str()),
            ("style", STYLE),
            ("generated", generated_note().as_str()),
        ],
    );

    write_page(&course_dir.join(INDEX_FILE), &page).await
}

fn generated_note() -> String {
    format!("Erstellt am {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 按名称排序的直接子目录
async fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, SiteError> {
    let io_err = |source| SiteError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        if entry.file_type().await.map_err(io_err)?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

async fn write_page(path: &Path, page: &str) -> Result<(), SiteError> {
    tokio::fs::write(path, page)
        .await
        .map_err(|source| SiteError::Io {
            path: path.to_path_buf(),
            source,
        })
}
