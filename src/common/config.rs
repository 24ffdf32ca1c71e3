use std::time::Duration;

use url::Url;

use crate::common::client::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://www.newmoove.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/41.0.2272.118 Safari/537.36";

// 登录入口，登录成功后 CAS 会跳回课程搜索页
const LOGIN_PATH: &str = "/cas/login?service=https://www.newmoove.com:443/system/login/dispatcher.jsp%3FrequestedResource=/cms/courseSearch.html";
const WORKOUT_PATH: &str = "/workouts";
const LIGHTBOX_PATH: &str = "/cms/LightBox.html";

/// 站点相关的运行配置，由命令行参数填充
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: Url,
    pub user_agent: String,
    /// 单个页面请求的超时时间
    pub request_timeout: Duration,
    /// 视频流两个数据块之间允许的最长等待时间
    pub stall_timeout: Duration,
    /// 同一课程内并行处理的集数，1 表示按顺序下载
    pub concurrency: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("默认站点地址必须合法"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            stall_timeout: Duration::from_secs(60),
            concurrency: 1,
        }
    }
}

impl SiteConfig {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
        concurrency: usize,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        // 0 秒会让所有请求立即超时
        let timeout_secs = timeout_secs.max(1);
        Ok(Self {
            base_url,
            user_agent: user_agent.to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            stall_timeout: Duration::from_secs(timeout_secs * 2),
            concurrency: concurrency.max(1),
        })
    }

    /// 把站内路径解析成绝对地址，已经是绝对地址的保持不变
    pub fn absolute_url(&self, path_or_url: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path_or_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path_or_url, e)))
    }

    pub fn login_url(&self) -> Result<Url, ApiError> {
        self.absolute_url(LOGIN_PATH)
    }

    pub fn workout_url(&self) -> Result<Url, ApiError> {
        self.absolute_url(WORKOUT_PATH)
    }

    pub fn category_url(&self, category: &str) -> Result<Url, ApiError> {
        self.absolute_url(&format!("{}/{}/", WORKOUT_PATH, category))
    }

    pub fn lightbox_url(&self) -> Result<Url, ApiError> {
        self.absolute_url(LIGHTBOX_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_against_base() {
        let config = SiteConfig::default();
        assert_eq!(
            config.absolute_url("/cms/LightBox.html?a=1").unwrap().as_str(),
            "https://www.newmoove.com/cms/LightBox.html?a=1"
        );
        assert_eq!(
            config.absolute_url("workouts/yoga").unwrap().as_str(),
            "https://www.newmoove.com/workouts/yoga"
        );
    }

    #[test]
    fn keeps_absolute_urls() {
        let config = SiteConfig::default();
        assert_eq!(
            config.absolute_url("https://cdn.example.org/v.mp4").unwrap().as_str(),
            "https://cdn.example.org/v.mp4"
        );
    }

    #[test]
    fn category_url_has_trailing_slash() {
        let config = SiteConfig::default();
        assert_eq!(
            config.category_url("yoga").unwrap().as_str(),
            "https://www.newmoove.com/workouts/yoga/"
        );
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let config = SiteConfig::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT, 10, 0).unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let config = SiteConfig::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT, 0, 1).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(config.stall_timeout, Duration::from_secs(2));
    }
}
