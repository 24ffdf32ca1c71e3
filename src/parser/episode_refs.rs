use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

use super::errors::ParseError;
use super::models::{EpisodeRef, EpisodeSource};
use super::utils::selector;

pub const EPISODE_ARRAY_MARKER: &str = "episodeArray";
// 「开始课程」按钮，onclick 里是 openInLightBox('<模板链接>', ...)
const START_BUTTON: &str = ".as-kursstarten";

/// 从课程页里取出模板链接和 episodeArray。任何一步失败整个剧集列表都不可用
pub fn extract_episode_source(document: &Html) -> Result<EpisodeSource, ParseError> {
    let script = find_episode_script(document)?;
    let refs = parse_episode_array(&script)?;

    let button = selector(START_BUTTON)?;
    let onclick = document
        .select(&button)
        .next()
        .and_then(|el| el.value().attr("onclick"))
        .ok_or_else(|| ParseError::MissingElement(format!("{}[onclick]", START_BUTTON)))?;
    let template_link = extract_template_link(onclick)?;

    Ok(EpisodeSource { template_link, refs })
}

fn find_episode_script(document: &Html) -> Result<String, ParseError> {
    let scripts = selector("script")?;

    document
        .select(&scripts)
        .filter(|el| {
            el.value()
                .attr("type")
                .map_or(true, |t| t.eq_ignore_ascii_case("text/javascript"))
        })
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(EPISODE_ARRAY_MARKER))
        .ok_or_else(|| ParseError::MissingElement(format!("包含 {} 的脚本", EPISODE_ARRAY_MARKER)))
}

/// 解析脚本里形如 `episodeArray = ['a', 'b'];` 的列表字面量。
///
/// 不是 JS 解析器：取标记之后第一个 `[` 到随后第一个 `]` 之间的内容，
/// 去掉空白和引号后按逗号切分，空条目丢弃。
pub fn parse_episode_array(script: &str) -> Result<Vec<EpisodeRef>, ParseError> {
    let flat = script.replace(['\r', '\n'], " ");

    let start = flat
        .find(EPISODE_ARRAY_MARKER)
        .ok_or_else(|| ParseError::EpisodeArray("未找到标记".to_string()))?;
    let rest = &flat[start + EPISODE_ARRAY_MARKER.len()..];

    let open = rest
        .find('[')
        .ok_or_else(|| ParseError::EpisodeArray("标记之后没有 '['".to_string()))?;
    if rest[..open].contains(']') {
        return Err(ParseError::EpisodeArray("'[' 之前出现了 ']'".to_string()));
    }

    let body = &rest[open + 1..];
    let close = body
        .find(']')
        .ok_or_else(|| ParseError::EpisodeArray("列表没有闭合".to_string()))?;

    Ok(body[..close]
        .split(',')
        .map(|token| {
            token
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .map(EpisodeRef)
        .collect())
}

/// `openInLightBox('/cms/LightBox.html?a=1', 900, 600)` -> `/cms/LightBox.html?a=1`
pub fn extract_template_link(onclick: &str) -> Result<String, ParseError> {
    lazy_static! {
        static ref LIGHTBOX_CALL: Regex =
            Regex::new(r#"^\s*openInLightBox\(\s*['"]([^'"]+)['"]"#).unwrap();
    }

    LIGHTBOX_CALL
        .captures(onclick)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|link| !link.is_empty())
        .ok_or_else(|| ParseError::MissingElement(format!("openInLightBox 链接: {}", onclick)))
}
