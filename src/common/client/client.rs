use std::path::Path;
use std::sync::Arc;

use cookie_store::CookieStore;
use reqwest::{
    Client, ClientBuilder, Response,
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER, USER_AGENT},
};
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, error, info};
use url::Url;

use crate::common::client::error::ApiError;
use crate::common::config::SiteConfig;

// 支持自动携带登录状态的客户端，clone 之后共享同一个 Cookie 存储
#[derive(Debug, Clone)]
pub struct NewMooveClient {
    pub inner: Client,
    pub cookie_store: Arc<CookieStoreMutex>,
    config: Arc<SiteConfig>,
}

impl NewMooveClient {
    // 创建基础客户端，未登录
    pub fn new(config: SiteConfig) -> Result<Self, ApiError> {
        let cookie_store = Arc::new(CookieStoreMutex::new(CookieStore::default()));

        let inner = ClientBuilder::new()
            .connect_timeout(config.request_timeout)
            .cookie_provider(Arc::clone(&cookie_store))
            .default_headers(Self::get_default_headers(&config)?)
            .build()
            .map_err(|e| {
                error!("创建 HTTP 客户端失败: {}", e);
                ApiError::Reqwest(e)
            })?;

        Ok(Self {
            inner,
            cookie_store,
            config: Arc::new(config),
        })
    }

    pub fn get_default_headers(config: &SiteConfig) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("de-DE,de;q=0.9,en;q=0.8"));

        let referer = HeaderValue::from_str(config.base_url.as_str())
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        headers.insert(REFERER, referer);

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ApiError::InvalidResponse(format!("无效的 User-Agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);

        Ok(headers)
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn absolute_url(&self, path_or_url: &str) -> Result<Url, ApiError> {
        self.config.absolute_url(path_or_url)
    }

    // GET 页面并返回正文
    pub async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_request(e, url))?;

        Self::read_text(resp, url).await
    }

    // 以 application/x-www-form-urlencoded 提交表单，字段顺序保持不变
    pub async fn post_form_text(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<String, ApiError> {
        let body = serde_urlencoded::to_string(fields)
            .map_err(|e| ApiError::InvalidResponse(format!("表单编码失败: {}", e)))?;
        debug!("POST {} ({} 个字段)", url, fields.len());

        let resp = self
            .inner
            .post(url)
            .timeout(self.config.request_timeout)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::from_request(e, url))?;

        Self::read_text(resp, url).await
    }

    // 视频下载用的原始响应。只限制等待响应头的时间，正文的数据块间隔由调用方控制
    pub async fn get_stream_response(&self, url: &str) -> Result<Response, ApiError> {
        debug!("🎬 正在请求视频下载: {}", url);

        let resp = tokio::time::timeout(self.config.request_timeout, self.inner.get(url).send())
            .await
            .map_err(|_| ApiError::Timeout(url.to_string()))?
            .map_err(|e| ApiError::from_request(e, url))?;

        Self::check_status(&resp, url)?;
        Ok(resp)
    }

    async fn read_text(resp: Response, url: &str) -> Result<String, ApiError> {
        Self::check_status(&resp, url)?;
        resp.text().await.map_err(|e| ApiError::from_request(e, url))
    }

    fn check_status(resp: &Response, url: &str) -> Result<(), ApiError> {
        let status = resp.status();
        debug!("Response Status: {}", status);

        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    pub fn save_cookies_to_local(&self, path: &Path) -> Result<(), ApiError> {
        let store = self
            .cookie_store
            .lock()
            .map_err(|_| ApiError::CookieStore("Cookie 存储加锁失败".to_string()))?;

        let mut writer = std::fs::File::create(path).map(std::io::BufWriter::new)?;
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut writer)
            .map_err(|e| ApiError::CookieStore(e.to_string()))?;

        info!("Cookies saved to {}", path.display());
        Ok(())
    }

    // 载入之前保存的 Cookie，替换当前存储的内容
    pub fn load_cookies_from_local(&self, path: &Path) -> Result<(), ApiError> {
        info!("从 {} 加载 Cookie", path.display());

        let reader = std::fs::File::open(path).map(std::io::BufReader::new)?;
        let loaded = cookie_store::serde::json::load_all(reader)
            .map_err(|e| ApiError::CookieStore(e.to_string()))?;

        let mut store = self
            .cookie_store
            .lock()
            .map_err(|_| ApiError::CookieStore("Cookie 存储加锁失败".to_string()))?;
        *store = loaded;

        Ok(())
    }

    pub fn cookie_count(&self) -> usize {
        self.cookie_store
            .lock()
            .map(|store| store.iter_any().count())
            .unwrap_or(0)
    }
}
