use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::common::models::CourseInfo;

use super::episode_refs::extract_episode_source;
use super::errors::ParseError;
use super::models::ExtractedCourse;
use super::utils::{first_attr, own_text, selector, text_content};

// 课程详情页上用图标标记的各项信息，值在 img 的 title 属性里
const ICON_DURATION: &str = "/res/img/icons/Icon_Uhr.png";
const ICON_CALORIES: &str = "/res/img/icons/Icon_Apfel.png";
const ICON_LEVEL: &str = "/res/img/icons/Icon_Schwierigkeit.png";
const ICON_BODY_AREA: &str = "/res/img/icons/Icon_Manderl.png";
const ICON_MATERIAL: &str = "/res/img/icons/Icon_Material.png";
const ICON_BONUS_POINTS: &str = "/res/img/icons/icon_plus_gruen.png";

const EPISODE_DESCRIPTION: &str = r#"p[class*="as-kursdetail-folgentext"]"#;

/// 课程 slug：URL 路径的最后一段
pub fn course_slug(page_url: &str) -> Result<String, ParseError> {
    let url = Url::parse(page_url)?;
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.to_string())
        .ok_or_else(|| ParseError::InvalidUrl(format!("无法从URL得到课程名: {}", page_url)))
}

/// 解析课程详情页。
///
/// 每个标量字段单独定位，找不到时保留默认值并记录警告，不影响其它字段；
/// 剧集部分（脚本里的 episodeArray 和开始按钮的模板链接）失败时放在 `episodes` 里返回。
pub fn extract_course_page(html: &str, page_url: &str) -> Result<ExtractedCourse, ParseError> {
    let document = Html::parse_document(html);
    let mut info = CourseInfo::with_slug(course_slug(page_url)?);

    fill("title", locate_title(&document), &mut info.title);
    fill("description", locate_description(&document), &mut info.description);
    fill(
        "duration",
        locate_icon_title(&document, ICON_DURATION).map(|v| v.map(strip_label)),
        &mut info.duration,
    );
    fill(
        "calories",
        locate_icon_title(&document, ICON_CALORIES).map(|v| v.map(strip_label)),
        &mut info.calories,
    );
    fill("level", locate_icon_title(&document, ICON_LEVEL), &mut info.level);
    fill("body_area", locate_icon_title(&document, ICON_BODY_AREA), &mut info.body_area);
    fill("material", locate_icon_title(&document, ICON_MATERIAL), &mut info.material);
    fill(
        "bonus_points",
        locate_icon_title(&document, ICON_BONUS_POINTS),
        &mut info.bonus_points,
    );

    info.episode_descriptions = locate_episode_descriptions(&document)?;
    debug!(
        "课程 {} 共 {} 条剧集描述",
        info.url_title,
        info.episode_descriptions.len()
    );

    let episodes = extract_episode_source(&document);

    Ok(ExtractedCourse { info, episodes })
}

fn fill(field: &str, located: Result<Option<String>, ParseError>, target: &mut String) {
    match located {
        Ok(Some(value)) => *target = value,
        Ok(None) => warn!("无法提取 {}: 未找到匹配元素，使用默认值 {:?}", field, target),
        Err(e) => warn!("无法提取 {}: {}，使用默认值 {:?}", field, e, target),
    }
}

fn locate_title(document: &Html) -> Result<Option<String>, ParseError> {
    let sel = selector("h2")?;
    Ok(document
        .select(&sel)
        .map(own_text)
        .find(|text| !text.is_empty()))
}

fn locate_description(document: &Html) -> Result<Option<String>, ParseError> {
    let sel = selector(r#"p[itemprop="description"]"#)?;
    Ok(document
        .select(&sel)
        .next()
        .map(text_content)
        .filter(|text| !text.is_empty()))
}

fn locate_icon_title(document: &Html, icon: &str) -> Result<Option<String>, ParseError> {
    first_attr(document, &format!(r#"img[src="{}"]"#, icon), "title")
}

fn locate_episode_descriptions(document: &Html) -> Result<Vec<String>, ParseError> {
    let sel = selector(EPISODE_DESCRIPTION)?;
    Ok(document.select(&sel).map(text_content).collect())
}

/// "Dauer: 45 Min" -> "45 Min"，去掉最后一个冒号及之前的标签
fn strip_label(value: String) -> String {
    lazy_static! {
        static ref LABEL: Regex = Regex::new(r"^.*: ?").unwrap();
    }
    LABEL.replace(&value, "").into_owned()
}
