use tracing::debug;
use url::Url;

use super::errors::ParseError;
use super::models::EpisodeRef;
use super::utils::OrderedParams;

pub const EPISODE_LINK_KEY: &str = "episodeLink";

/// 以模板链接为基础，为每个 episodeArray 条目生成一条播放地址。
///
/// 模板的查询参数按原顺序保留（重复键取第一次出现的值），
/// `episodeLink` 被覆盖或追加，相对链接基于站点地址补全。输出顺序与 `refs` 一致。
pub fn build_episode_urls(
    base: &Url,
    template_link: &str,
    refs: &[EpisodeRef],
) -> Result<Vec<String>, ParseError> {
    let template = base
        .join(template_link.trim())
        .map_err(|e| ParseError::InvalidUrl(format!("{}: {}", template_link, e)))?;
    let params = OrderedParams::from_query(template.query().unwrap_or_default());

    debug!(
        "模板链接: {}，保留参数: {:?}",
        template,
        params.keys().collect::<Vec<_>>()
    );

    Ok(refs
        .iter()
        .map(|episode| {
            let mut query = params.clone();
            query.set(EPISODE_LINK_KEY, episode.as_str());

            let mut url = template.clone();
            url.set_query(Some(&query.to_query()));
            url.to_string()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.newmoove.com").unwrap()
    }

    fn refs(values: &[&str]) -> Vec<EpisodeRef> {
        values.iter().map(|v| EpisodeRef::from(*v)).collect()
    }

    #[test]
    fn appends_episode_link_keeping_order() {
        let urls =
            build_episode_urls(&base(), "https://x/lightbox?foo=1&bar=2", &refs(&["a", "b"])).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://x/lightbox?foo=1&bar=2&episodeLink=a",
                "https://x/lightbox?foo=1&bar=2&episodeLink=b",
            ]
        );
    }

    #[test]
    fn overwrites_existing_episode_link_in_place() {
        let urls = build_episode_urls(
            &base(),
            "/cms/LightBox.html?courseId=7&episodeLink=placeholder&lang=de",
            &refs(&["/cms/ep/1"]),
        )
        .unwrap();
        assert_eq!(
            urls,
            vec!["https://www.newmoove.com/cms/LightBox.html?courseId=7&episodeLink=/cms/ep/1&lang=de"]
        );
    }

    #[test]
    fn repeated_keys_keep_first_value() {
        let urls =
            build_episode_urls(&base(), "/lb?a=1&a=2&b=3", &refs(&["e"])).unwrap();
        assert_eq!(urls, vec!["https://www.newmoove.com/lb?a=1&b=3&episodeLink=e"]);
    }

    #[test]
    fn template_without_query_gets_only_episode_link() {
        let urls = build_episode_urls(&base(), "cms/LightBox.html", &refs(&["9"])).unwrap();
        assert_eq!(urls, vec!["https://www.newmoove.com/cms/LightBox.html?episodeLink=9"]);
    }

    #[test]
    fn each_url_has_exactly_one_episode_link() {
        let episode_refs = refs(&["a", "b", "c"]);
        let urls = build_episode_urls(
            &base(),
            "/lb?episodeLink=x&foo=1&episodeLink=y",
            &episode_refs,
        )
        .unwrap();

        assert_eq!(urls.len(), episode_refs.len());
        for (url, episode) in urls.iter().zip(&episode_refs) {
            let parsed = Url::parse(url).unwrap();
            let links: Vec<_> = parsed
                .query_pairs()
                .filter(|(k, _)| k == EPISODE_LINK_KEY)
                .map(|(_, v)| v.into_owned())
                .collect();
            assert_eq!(links, vec![episode.as_str().to_string()]);
        }
    }

    #[test]
    fn no_refs_no_urls() {
        assert!(build_episode_urls(&base(), "/lb?a=1", &[]).unwrap().is_empty());
    }
}
