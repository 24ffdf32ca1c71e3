use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::common::models::CourseInfo;

pub const INFO_FILE: &str = "info.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读写 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} 不是有效的 JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 分类 slug -> 显示标题，保存在根目录的 info.json
pub type CategoryTitles = BTreeMap<String, String>;

pub async fn write_course_info(
    course_dir: &Path,
    info: &CourseInfo,
) -> Result<PathBuf, StorageError> {
    write_json(&course_dir.join(INFO_FILE), info).await
}

pub async fn read_course_info(course_dir: &Path) -> Result<CourseInfo, StorageError> {
    read_json(&course_dir.join(INFO_FILE)).await
}

pub async fn write_category_titles(
    root: &Path,
    titles: &CategoryTitles,
) -> Result<PathBuf, StorageError> {
    write_json(&root.join(INFO_FILE), titles).await
}

pub async fn read_category_titles(root: &Path) -> Result<CategoryTitles, StorageError> {
    read_json(&root.join(INFO_FILE)).await
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<PathBuf, StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    tokio::fs::write(path, json)
        .await
        .map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("已写入 {}", path.display());
    Ok(path.to_path_buf())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&raw).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}
