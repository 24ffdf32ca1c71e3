use std::fmt;

use crate::common::models::CourseInfo;

use super::errors::ParseError;

/// 页面脚本里 episodeArray 的单个原始条目，尚未拼成完整URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRef(pub String);

impl EpisodeRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EpisodeRef {
    fn from(value: &str) -> Self {
        EpisodeRef(value.to_string())
    }
}

/// 拼接每集播放地址所需的原料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSource {
    pub template_link: String,
    pub refs: Vec<EpisodeRef>,
}

/// 课程页的解析结果。标量字段总能得到（缺失时取默认值），
/// 剧集部分可能整体失败
#[derive(Debug)]
pub struct ExtractedCourse {
    pub info: CourseInfo,
    pub episodes: Result<EpisodeSource, ParseError>,
}

/// 完成URL拼接后的课程
#[derive(Debug)]
pub struct ParsedCourse {
    pub info: CourseInfo,
    /// 剧集无法解析时的原因，此时 info.episode_urls 为空
    pub episode_error: Option<ParseError>,
}
