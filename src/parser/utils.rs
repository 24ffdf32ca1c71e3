use scraper::{ElementRef, Html, Selector};

use super::errors::ParseError;

pub fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{}: {:?}", css, e)))
}

/// 元素自身的文本节点（不含子元素），去掉首尾空白
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// 元素及其所有子孙的文本
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 第一个匹配元素的属性值，空值视为不存在
pub fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>, ParseError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

// -----------------------------------------------------------------------------------------------

/// 保持插入顺序的键值对，用于查询参数和表单字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedParams(Vec<(String, String)>);

impl OrderedParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 解析原始查询串。重复的键只保留第一次出现的值，空值和没有 `=` 的片段被丢弃
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if key.is_empty() || value.is_empty() {
                continue;
            }
            params.insert_first(key, value);
        }
        params
    }

    /// 键已存在时保持原值
    pub fn insert_first(&mut self, key: &str, value: &str) {
        if self.get(key).is_none() {
            self.0.push((key.to_string(), value.to_string()));
        }
    }

    /// 覆盖已有的键（位置不变），否则追加到末尾
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// 按插入顺序拼回 `k=v&k=v`，不做额外编码
    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}
