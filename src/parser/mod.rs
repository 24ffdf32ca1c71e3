use tracing::{debug, error, info};

use crate::common::client::client::NewMooveClient;
use crate::common::models::{CourseListing, WorkoutCategory};

use errors::ParseError;
use models::ParsedCourse;

pub mod catalog;
pub mod course_page;
pub mod episode_refs;
pub mod errors;
pub mod models;
pub mod url_builder;
pub mod utils;
pub mod video_resolver;

/// 抓取并解析站点页面的入口
pub struct CourseParser {
    client: NewMooveClient,
}

impl CourseParser {
    pub fn new(client: NewMooveClient) -> Self {
        Self { client }
    }

    /// 解析课程详情页并拼出每集的播放地址。
    /// 剧集部分失败时仍返回标量信息，原因记录在 `episode_error`
    pub async fn parse_course(&self, url: &str) -> Result<ParsedCourse, ParseError> {
        debug!("getting infos for {}", url);

        let html = self.client.get_text(url).await?;
        let extracted = course_page::extract_course_page(&html, url)?;
        let mut info = extracted.info;

        let episode_urls = extracted.episodes.and_then(|source| {
            url_builder::build_episode_urls(
                &self.client.config().base_url,
                &source.template_link,
                &source.refs,
            )
        });

        let episode_error = match episode_urls {
            Ok(urls) => {
                info!("课程 {} 解析到 {} 集", info.url_title, urls.len());
                info.episode_urls = urls;
                None
            }
            Err(e) => {
                error!("课程 {} 的剧集无法解析: {}", info.url_title, e);
                Some(e)
            }
        };

        Ok(ParsedCourse { info, episode_error })
    }

    pub async fn list_workout_categories(&self) -> Result<Vec<WorkoutCategory>, ParseError> {
        let url = self.client.config().workout_url()?;
        let html = self.client.get_text(url.as_str()).await?;
        catalog::parse_workout_categories(&html)
    }

    pub async fn list_workout_courses(
        &self,
        category: &str,
    ) -> Result<Vec<CourseListing>, ParseError> {
        let url = self.client.config().category_url(category)?;
        let html = self.client.get_text(url.as_str()).await?;
        catalog::parse_workout_courses(&html, &self.client.config().base_url)
    }
}
