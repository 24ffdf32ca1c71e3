use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::common::client::client::NewMooveClient;

use super::errors::ParseError;
use super::utils::{OrderedParams, first_attr, selector};

pub const BACKGROUND_FIELD: &str = "background";
const BACKGROUND_SCRIPT_MARKER: &str = "/cms/img";
const ACTIVE_BACKGROUND: &str = r#"div[class*="as-radio-aktiv"]"#;

/// 把单集播放页解析成可直接下载的视频地址
#[async_trait]
pub trait VideoResolve: Send + Sync {
    async fn resolve(&self, episode_url: &str) -> Result<String, ParseError>;
}

/// 通过站点的 LightBox 接口解析视频地址：
/// 读取播放页的全部 input 字段，补上 background 参数后 POST 给 LightBox，
/// 返回结果页中第一个 `<source>` 的 src
#[derive(Debug, Clone)]
pub struct LightboxResolver {
    client: NewMooveClient,
}

impl LightboxResolver {
    pub fn new(client: NewMooveClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VideoResolve for LightboxResolver {
    async fn resolve(&self, episode_url: &str) -> Result<String, ParseError> {
        debug!("Retrieving download url for {}", episode_url);

        let page = self.client.get_text(episode_url).await?;
        let payload = build_lightbox_payload(&page)?;

        let endpoint = self.client.config().lightbox_url()?;
        let body = self
            .client
            .post_form_text(endpoint.as_str(), payload.as_pairs())
            .await?;

        let src = extract_video_source(&body)?;
        Ok(self.client.absolute_url(&src)?.to_string())
    }
}

/// 播放页的表单字段加上 background 参数（取不到时省略）
pub fn build_lightbox_payload(html: &str) -> Result<OrderedParams, ParseError> {
    let document = Html::parse_document(html);
    let mut payload = collect_form_fields(&document)?;

    match extract_background(&document)? {
        Some(background) => payload.set(BACKGROUND_FIELD, &background),
        None => debug!("Could not get background parameter"),
    }

    Ok(payload)
}

/// 收集页面里所有有 name 的 input 的当前值；同名字段后出现的覆盖先出现的。
/// 复选框和单选框只在选中时提交
pub fn collect_form_fields(document: &Html) -> Result<OrderedParams, ParseError> {
    let inputs = selector("input")?;
    let mut fields = OrderedParams::new();

    for input in document.select(&inputs) {
        let element = input.value();
        let Some(name) = element.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };

        let input_type = element.attr("type").unwrap_or("text").to_ascii_lowercase();
        let value = if input_type == "checkbox" || input_type == "radio" {
            if element.attr("checked").is_none() {
                continue;
            }
            element.attr("value").unwrap_or("on")
        } else {
            match element.attr("value") {
                Some(value) => value,
                None => continue,
            }
        };

        fields.set(name, value);
    }

    Ok(fields)
}

/// 两种方式依次尝试：
/// 1. 脚本里 `/cms/img...` 开头的图片路径
/// 2. 处于选中状态的背景选项 div 的 id
pub fn extract_background(document: &Html) -> Result<Option<String>, ParseError> {
    lazy_static! {
        static ref CMS_PATH: Regex = Regex::new(r"/cms[^']+").unwrap();
    }

    let scripts = selector("script")?;
    let from_script = document
        .select(&scripts)
        .filter(|el| {
            el.value()
                .attr("type")
                .map_or(true, |t| t.eq_ignore_ascii_case("text/javascript"))
        })
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(BACKGROUND_SCRIPT_MARKER))
        .and_then(|text| CMS_PATH.find(&text).map(|m| m.as_str().to_string()));

    if from_script.is_some() {
        return Ok(from_script);
    }

    first_attr(document, ACTIVE_BACKGROUND, "id")
}

/// LightBox 返回页里第一个 `<source>` 的 src
pub fn extract_video_source(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);
    first_attr(&document, "source[src]", "src")?
        .ok_or_else(|| ParseError::NoVideoSource("LightBox 响应中没有 <source src>".to_string()))
}
