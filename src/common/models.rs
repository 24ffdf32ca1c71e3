use serde_derive::{Deserialize, Serialize};

pub const UNKNOWN: &str = "unknown";
pub const ZERO: &str = "0";

// -----------------------------------------------------------------------------------------------

/// 一门课程的元数据，对应课程目录下的 info.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub title: String,
    pub url_title: String, // 从URL得到的 slug，用作目录名和文件名前缀
    pub description: String,
    pub duration: String,
    pub calories: String,
    pub level: String,
    pub body_area: String,
    pub material: String,
    pub bonus_points: String,
    #[serde(default)]
    pub episode_descriptions: Vec<String>,
    #[serde(default)]
    pub episode_urls: Vec<String>,
}

impl CourseInfo {
    /// 所有字段取默认值，解析时逐个覆盖
    pub fn with_slug(url_title: impl Into<String>) -> Self {
        Self {
            title: UNKNOWN.to_string(),
            url_title: url_title.into(),
            description: UNKNOWN.to_string(),
            duration: ZERO.to_string(),
            calories: ZERO.to_string(),
            level: UNKNOWN.to_string(),
            body_area: UNKNOWN.to_string(),
            material: UNKNOWN.to_string(),
            bonus_points: ZERO.to_string(),
            episode_descriptions: Vec::new(),
            episode_urls: Vec::new(),
        }
    }

    /// 第 index 集（从 1 开始）的视频文件名
    pub fn video_file_name(&self, index: usize) -> String {
        video_file_name(index, &self.url_title)
    }
}

pub const VIDEO_EXTENSION: &str = "mp4";

pub fn video_file_name(index: usize, url_title: &str) -> String {
    format!("{:02}.{}.{}", index, url_title, VIDEO_EXTENSION)
}

// -----------------------------------------------------------------------------------------------

/// 健身分类（瑜伽、普拉提……）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutCategory {
    pub url_title: String,
    pub title: String,
}

/// 分类页上列出的单个课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseListing {
    pub url: String,
    pub title: String,
    pub description: String,
    pub level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_file_name_is_zero_padded() {
        assert_eq!(video_file_name(1, "balance-yoga"), "01.balance-yoga.mp4");
        assert_eq!(video_file_name(12, "balance-yoga"), "12.balance-yoga.mp4");
        assert_eq!(video_file_name(123, "x"), "123.x.mp4");
    }

    #[test]
    fn defaults_follow_field_kind() {
        let info = CourseInfo::with_slug("core");
        assert_eq!(info.title, "unknown");
        assert_eq!(info.duration, "0");
        assert_eq!(info.calories, "0");
        assert_eq!(info.bonus_points, "0");
        assert_eq!(info.level, "unknown");
        assert!(info.episode_urls.is_empty());
    }
}
